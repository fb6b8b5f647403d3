//! Thread Lifecycle Manager
//!
//! Admission and removal of threads (and whole process thread sets) into
//! the ready queues, the current-thread accessors, voluntary yield and
//! exit. Owns the claim protocol: queue membership is one `Arc` claim,
//! taken on admission and released on withdrawal.

use alloc::format;
use alloc::sync::Arc;
use core::sync::atomic::Ordering;

use super::error::{SchedError, SchedResult};
use super::scheduler::Scheduler;
use crate::logger;
use crate::scheduler::thread::{ExecContext, Process, Thread, ThreadState};
use crate::sync::IrqGuard;

impl Scheduler {
    /// Admit a thread to its priority's ready queue.
    ///
    /// Dead threads are never re-admitted (no-op). The thread is marked
    /// Ready first; a user thread whose process is locked stays Ready but
    /// unlinked and takes no claim; re-admission after unlock is the
    /// caller's job. Admitting an already-linked thread is a no-op.
    pub fn add_thread(&self, thread: &Arc<Thread>) -> SchedResult<()> {
        let _irq = IrqGuard::new();

        if thread.state() == ThreadState::Dead {
            return Ok(());
        }
        thread.transition(ThreadState::Ready);

        if let Some(process) = thread.process() {
            if process.is_locked() {
                logger::debug(&format!(
                    "[SCHED] TID {} ready but not linked: process {} is locked",
                    thread.id(),
                    process.id()
                ));
                return Ok(());
            }
        }

        let mut ready = self.ready.lock();
        if thread.is_queued() {
            return Ok(());
        }
        ready.push(Arc::clone(thread));
        thread.set_queued(true);
        self.admits.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Withdraw a thread from its ready queue, releasing the queue claim.
    pub fn remove_thread(&self, thread: &Arc<Thread>) -> SchedResult<()> {
        let _irq = IrqGuard::new();

        let mut ready = self.ready.lock();
        if !thread.is_queued() {
            return Err(SchedError::InvalidState {
                thread_id: thread.id(),
                state: thread.state(),
            });
        }
        let unlinked = ready.remove(thread.id(), thread.priority());
        crate::sched_assert!(unlinked.is_some(), "queued thread missing from its level");
        thread.set_queued(false);
        Ok(())
    }

    /// Admit every thread of `process`. Aborts on the first failure and
    /// propagates it; threads admitted before the failure stay admitted.
    pub fn add_process(&self, process: &Arc<Process>) -> SchedResult<usize> {
        let mut admitted = 0;
        for thread in process.threads() {
            self.add_thread(&thread)?;
            admitted += 1;
        }
        Ok(admitted)
    }

    /// Withdraw every thread of `process`. Unlike admission this never
    /// aborts; the return value counts the successful removals only.
    pub fn remove_process(&self, process: &Arc<Process>) -> usize {
        let mut removed = 0;
        for thread in process.threads() {
            if self.remove_thread(&thread).is_ok() {
                removed += 1;
            }
        }
        removed
    }

    /// Currently running thread, if any.
    pub fn current_thread(&self) -> Option<Arc<Thread>> {
        self.running.lock().current()
    }

    /// Owning process of the current thread (user threads only).
    pub fn current_process(&self) -> Option<Arc<Process>> {
        self.running
            .lock()
            .thread()
            .and_then(|thread| thread.process().cloned())
    }

    /// Voluntarily cede the CPU. A no-op when nothing above the idle floor
    /// is ready: the caller just keeps running.
    pub fn yield_now(&self, ctx: ExecContext) -> ExecContext {
        if self.ready.lock().is_idling() {
            return ctx;
        }
        self.switch_to_next(ctx)
    }

    /// Terminate the current thread and hand the CPU to the next one.
    ///
    /// Control never returns to the exited thread: the returned context
    /// belongs to the new selection and the old stack is abandoned.
    pub fn exit_current(&self) -> ExecContext {
        let _irq = IrqGuard::new();

        let Some(entry) = self.running.lock().take() else {
            panic!("[SCHED CRITICAL] Invariant violated: exit with no running thread");
        };
        entry.thread.transition(ThreadState::Dead);
        logger::info(&format!(
            "[SCHED] '{}' (TID {}) exited",
            entry.thread.name(),
            entry.thread.id()
        ));
        self.exits.fetch_add(1, Ordering::Relaxed);
        drop(entry); // slot claim released; the creator's handle is the rest

        self.do_switch(None)
    }
}
