//! Corvus-OS kernel scheduling subsystem
//!
//! Preemptive, priority-based thread scheduler: per-priority FIFO ready
//! queues, quantum-driven preemption, timer-mediated sleep/wake and
//! signal-interleaved switching, under interrupt-masked, reference-counted
//! ownership of thread objects.
//!
//! The crate is `no_std` + `alloc`; context save/restore, the interrupt
//! controller and the timer hardware stay behind the small hooks in
//! [`sync::irq`], [`time`] and [`signal`].

#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod logger;
pub mod scheduler;
pub mod signal;
pub mod sync;
pub mod time;

// Re-exports
pub use scheduler::core::{SchedConfig, SchedError, SchedResult, Scheduler, SchedulerStats};
pub use scheduler::thread::{
    CpuMode, ExecContext, Process, ProcessId, Thread, ThreadId, ThreadKind, ThreadPriority,
    ThreadState,
};
pub use signal::{SignalDelivery, SignalVerdict};
pub use sync::IrqGuard;
pub use time::{Clock, Duration, Timestamp};
