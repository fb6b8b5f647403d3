//! Scheduler subsystem
//!
//! Priority ready queues, quantum preemption, sleep/wake and the
//! signal-interleaved switch loop.

pub mod core;
pub mod idle;
pub mod thread;

// Re-exports
pub use self::core::{SchedConfig, SchedError, SchedResult, Scheduler, SchedulerStats};
pub use idle::spawn_idle;
pub use thread::{
    CpuMode, ExecContext, Process, ProcessId, Thread, ThreadId, ThreadKind, ThreadPriority,
    ThreadState,
};
