//! Purpose: Best-effort request for real-time FIFO scheduling to steady timing measurements.
//! Exports: `SchedOutcome`, `request_fifo_scheduling`.
//! Role: Optimization only; callers must continue normally on any outcome.
//! Invariants: Never panics; denial is reported as a value, not an error.
use std::io;

#[derive(Debug)]
pub enum SchedOutcome {
    Applied { priority: i32 },
    Denied(io::Error),
    Unsupported,
}

#[cfg(target_os = "linux")]
pub fn request_fifo_scheduling() -> SchedOutcome {
    let priority = unsafe { libc::sched_get_priority_max(libc::SCHED_FIFO) };
    if priority == -1 {
        return SchedOutcome::Denied(io::Error::last_os_error());
    }
    let param = libc::sched_param {
        sched_priority: priority,
    };
    let rc = unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) };
    if rc == -1 {
        return SchedOutcome::Denied(io::Error::last_os_error());
    }
    SchedOutcome::Applied { priority }
}

#[cfg(not(target_os = "linux"))]
pub fn request_fifo_scheduling() -> SchedOutcome {
    SchedOutcome::Unsupported
}
