//! Purpose: Library crate backing the `astregress` parser regression CLI and its tests.
//! Exports: `core` (discovery, parse boundary, artifacts, timing log, statistics, comparison).
//! Role: Keeps command logic testable without spawning the binary.
//! Invariants: Parsing is only reached through `core::syntax::SourceParser`.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod core;
