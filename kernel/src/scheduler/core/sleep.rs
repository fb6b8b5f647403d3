//! Sleep Bridge
//!
//! Turns a block request into a state transition plus, for timed sleep, an
//! armed one-shot timer that re-admits the thread on expiry. The claim
//! handoff is strict: the timer takes its claim before the slot claim is
//! released, and expiry re-admits before the timer claim drops, so a
//! sleeping thread is always owned by at least one structure.

use alloc::format;
use alloc::sync::Arc;
use core::sync::atomic::Ordering;

use super::current::RunningEntry;
use super::scheduler::Scheduler;
use crate::logger;
use crate::scheduler::thread::{ExecContext, ThreadState};
use crate::sync::IrqGuard;
use crate::time::Duration;

impl Scheduler {
    /// Put the current thread to sleep for `duration`, switching to the
    /// next selection. The sleeper resumes, with the context saved here,
    /// once its timer has expired, it was re-admitted and re-selected.
    pub fn sleep_for(&self, ctx: ExecContext, duration: Duration) -> ExecContext {
        let _irq = IrqGuard::new();

        let Some(entry) = self.running.lock().take() else {
            panic!("[SCHED CRITICAL] Invariant violated: sleep with no running thread");
        };
        let RunningEntry { thread, .. } = entry;
        thread.save_context(ctx);

        // timer claim first, slot claim released last
        let deadline = self.clock().now() + duration;
        let timer_id = self.timers.lock().register(Arc::clone(&thread), deadline);
        thread.set_timer(Some(timer_id));
        thread.transition(ThreadState::Sleeping);
        crate::sched_assert!(
            Arc::strong_count(&thread) > 1,
            "sleeping thread without a timer claim"
        );

        self.sleeps.fetch_add(1, Ordering::Relaxed);
        logger::debug(&format!(
            "[SCHED] '{}' (TID {}) sleeping {} ms",
            thread.name(),
            thread.id(),
            duration.as_ms()
        ));
        drop(thread); // slot claim released

        self.do_switch(None)
    }

    /// Park the current thread with no wake-up mechanism of its own; some
    /// external actor must re-admit it via `add_thread`.
    pub fn block_current(&self, ctx: ExecContext) -> ExecContext {
        let _irq = IrqGuard::new();

        let Some(entry) = self.running.lock().take() else {
            panic!("[SCHED CRITICAL] Invariant violated: block with no running thread");
        };
        let RunningEntry { thread, .. } = entry;
        thread.save_context(ctx);
        thread.transition(ThreadState::Sleeping);

        self.sleeps.fetch_add(1, Ordering::Relaxed);
        logger::debug(&format!(
            "[SCHED] '{}' (TID {}) parked until external wake-up",
            thread.name(),
            thread.id()
        ));
        drop(thread); // slot claim released

        self.do_switch(None)
    }

    /// Expire due sleep timers; called from the platform tick after the
    /// clock has advanced. Each fired entry re-admits its thread (taking a
    /// fresh queue claim), then drops the timer claim and disarms.
    pub fn timer_tick(&self) {
        let _irq = IrqGuard::new();

        let due = self.timers.lock().expire(self.clock().now());
        for thread in due {
            let _ = self.add_thread(&thread);
            thread.set_timer(None);
            // the timer claim drops with `thread` at the end of the iteration
        }
    }
}
