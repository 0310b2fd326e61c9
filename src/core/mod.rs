// Parse, serialize, compare, and timing-statistics building blocks.
pub mod artifact;
pub mod compare;
pub mod error;
pub mod pipeline;
pub mod sched;
pub mod source;
pub mod stats;
pub mod syntax;
pub mod timing;
