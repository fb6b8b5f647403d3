//! Idle thread
//!
//! A permanently admitted thread on the lowest priority level guarantees
//! selection never finds every queue empty. Its body (halt loop) belongs to
//! the platform; here it is the floor under the ready-queue set.

use alloc::format;
use alloc::sync::Arc;

use super::core::Scheduler;
use super::thread::{Thread, ThreadPriority};
use crate::logger;

pub const IDLE_THREAD_NAME: &str = "idle";

/// Create the idle thread and admit it at the lowest priority.
pub fn spawn_idle(scheduler: &Scheduler) -> Arc<Thread> {
    let thread = Thread::new_kernel(IDLE_THREAD_NAME, ThreadPriority::Idle);
    let _ = scheduler.add_thread(&thread);
    logger::info(&format!("[SCHED] idle thread admitted (TID {})", thread.id()));
    thread
}

/// The idle level belongs to the idle thread alone.
pub fn is_idle_thread(thread: &Thread) -> bool {
    thread.priority() == ThreadPriority::Idle
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::core::SchedConfig;

    #[test]
    fn idle_thread_sits_on_the_floor() {
        let scheduler = Scheduler::new(SchedConfig::new());
        let idle_thread = spawn_idle(&scheduler);

        assert!(is_idle_thread(&idle_thread));
        assert!(idle_thread.is_queued());
        assert!(scheduler.stats().ready_lengths[ThreadPriority::Idle.index()] == 1);
    }

    #[test]
    fn worker_threads_are_not_idle() {
        let worker = Thread::new_kernel("worker", ThreadPriority::Low);
        assert!(!is_idle_thread(&worker));
    }
}
