//! Thread and process model
//!
//! Thread control blocks, the state machine and the process bookkeeping the
//! scheduler consumes.

pub mod process;
pub mod state;
pub mod thread;

// Re-exports
pub use process::{ProcFlags, Process, ProcessId};
pub use state::{validate_transition, AtomicThreadState, ThreadState};
pub use thread::{
    alloc_thread_id, CpuMode, ExecContext, Thread, ThreadId, ThreadKind, ThreadPriority,
};
