//! Scheduling Core
//!
//! The quantum check, next-thread selection and the signal-interleaved
//! switch loop. The `Scheduler` is an owned object passed by reference to
//! every entry point (there is no global instance), and all state
//! mutation happens with interrupts masked.
//!
//! Suspension leaves the running slot through exactly three doors: quantum
//! expiry, voluntary sleep and exit. Resumption is always re-admission to a
//! ready queue followed by selection.

use alloc::boxed::Box;
use alloc::format;
use alloc::sync::Arc;
use core::sync::atomic::{AtomicU64, Ordering};
use spin::{Mutex, Once};

use super::current::RunningSlot;
use super::policy::{self, SchedConfig, PRIORITY_LEVELS};
use super::queue::ReadyQueueSet;
use crate::logger;
use crate::scheduler::thread::{ExecContext, Thread, ThreadState};
use crate::signal::{SignalDelivery, SignalVerdict};
use crate::sync::IrqGuard;
use crate::time::{Clock, TimerWheel};

/// Global scheduler state
pub struct Scheduler {
    config: SchedConfig,

    /// Monotonic time source, advanced by the platform tick
    clock: Clock,

    /// Ready queues (one FIFO per priority level)
    pub(super) ready: Mutex<ReadyQueueSet>,

    /// Currently running thread
    pub(super) running: Mutex<RunningSlot>,

    /// Armed sleep timers
    pub(super) timers: Mutex<TimerWheel>,

    /// Signal-delivery hook, registered once
    signal_hook: Once<Box<dyn SignalDelivery>>,

    // Statistics (observability only)
    pub(super) switches: AtomicU64,
    pub(super) preemptions: AtomicU64,
    pub(super) admits: AtomicU64,
    pub(super) sleeps: AtomicU64,
    pub(super) exits: AtomicU64,
}

impl Scheduler {
    /// Create a scheduler with empty queues and an unset running slot.
    pub fn new(config: SchedConfig) -> Self {
        Self {
            config,
            clock: Clock::new(),
            ready: Mutex::new(ReadyQueueSet::new()),
            running: Mutex::new(RunningSlot::new()),
            timers: Mutex::new(TimerWheel::new()),
            signal_hook: Once::new(),
            switches: AtomicU64::new(0),
            preemptions: AtomicU64::new(0),
            admits: AtomicU64::new(0),
            sleeps: AtomicU64::new(0),
            exits: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &SchedConfig {
        &self.config
    }

    /// The scheduler's time source (the platform tick advances it).
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Register the signal-delivery hook. First call wins.
    pub fn set_signal_delivery(&self, hook: Box<dyn SignalDelivery>) {
        self.signal_hook.call_once(|| hook);
    }

    /// Begin scheduling. No thread may be current yet.
    pub fn start(&self) {
        let _irq = IrqGuard::new();
        crate::sched_assert!(
            self.running.lock().is_empty(),
            "start with a thread already current"
        );
        logger::info("[SCHED] scheduling started");
    }

    /// Quantum-checked entry point for the trap/interrupt return path.
    ///
    /// Returns the context to restore: the same handle if the current
    /// thread keeps running, or the next thread's saved context after a
    /// switch. A privileged `ctx` is never preempted.
    pub fn schedule(&self, ctx: ExecContext) -> ExecContext {
        let (cold_start, expired) = {
            let _irq = IrqGuard::new();
            let running = self.running.lock();
            match running.entry() {
                None => (true, false),
                Some(entry) => {
                    let ran = self.clock.elapsed_since(entry.since);
                    let expired =
                        policy::should_preempt(&self.config, entry.thread.priority(), ran, &ctx);
                    (false, expired)
                }
            }
        };

        if cold_start {
            return self.switch_to_next(ctx);
        }
        if expired {
            self.preemptions.fetch_add(1, Ordering::Relaxed);
            return self.switch_to_next(ctx);
        }
        ctx
    }

    /// Unconditional switch: attach `ctx` to the outgoing thread and hand
    /// the CPU to a fresh selection.
    pub fn switch_to_next(&self, ctx: ExecContext) -> ExecContext {
        self.do_switch(Some(ctx))
    }

    /// The switch loop shared by every suspension path.
    ///
    /// Claim accounting: popping a queue hands us that claim; installing
    /// the thread in the slot transfers it there. The outgoing thread's
    /// slot claim is released after it has been re-admitted (if still
    /// Running), never before, so its count cannot reach zero in between.
    pub(super) fn do_switch(&self, outgoing_ctx: Option<ExecContext>) -> ExecContext {
        let _irq = IrqGuard::new();

        let previous = self.running.lock().take();
        if let (Some(entry), Some(ctx)) = (&previous, outgoing_ctx) {
            entry.thread.save_context(ctx);
        }

        let next = loop {
            let Some(candidate) = self.ready.lock().pop_highest() else {
                panic!("[SCHED CRITICAL] Invariant violated: every ready queue is empty (the idle thread is always admitted)");
            };
            candidate.set_queued(false);
            self.running.lock().set(Arc::clone(&candidate), self.clock.now());

            // Never resume a thread with an undelivered state-changing
            // signal: deliver here, and on an eligibility change discard
            // the selection and pick again. Each discarded candidate has
            // left the queues, so the loop is bounded.
            if let Some(process) = candidate.process() {
                if process.has_pending_signal() {
                    if let Some(hook) = self.signal_hook.get() {
                        if hook.deliver_pending(&candidate, process)
                            == SignalVerdict::EligibilityChanged
                        {
                            logger::debug(&format!(
                                "[SCHED] TID {} dropped from selection after signal delivery",
                                candidate.id()
                            ));
                            drop(self.running.lock().take());
                            continue;
                        }
                    }
                }
            }
            break candidate;
        };

        self.switches.fetch_add(1, Ordering::Relaxed);
        logger::debug(&format!(
            "[SCHED] switching to '{}' (TID {})",
            next.name(),
            next.id()
        ));

        if let Some(entry) = previous {
            if entry.thread.state() == ThreadState::Running {
                let _ = self.add_thread(&entry.thread);
            }
            // entry drops here, releasing the outgoing thread's slot claim
        }

        let Some(resume) = next.take_context() else {
            panic!("[SCHED CRITICAL] Invariant violated: selected thread has no saved context");
        };
        resume
    }

    /// Snapshot of the counters and queue lengths.
    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            context_switches: self.switches.load(Ordering::Relaxed),
            preemptions: self.preemptions.load(Ordering::Relaxed),
            admits: self.admits.load(Ordering::Relaxed),
            sleeps: self.sleeps.load(Ordering::Relaxed),
            exits: self.exits.load(Ordering::Relaxed),
            ready_lengths: self.ready.lock().lengths(),
        }
    }

    /// Print scheduler statistics
    pub fn print_stats(&self) {
        let stats = self.stats();
        logger::info("=== Scheduler Statistics ===");
        logger::info(&format!("Context switches: {}", stats.context_switches));
        logger::info(&format!("Preemptions:      {}", stats.preemptions));
        logger::info(&format!("Admissions:       {}", stats.admits));
        logger::info(&format!("Sleeps:           {}", stats.sleeps));
        logger::info(&format!("Exits:            {}", stats.exits));
        logger::info(&format!("Ready lengths:    {:?}", stats.ready_lengths));
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(SchedConfig::default())
    }
}

/// Scheduler statistics
#[derive(Debug, Clone, Copy)]
pub struct SchedulerStats {
    pub context_switches: u64,
    pub preemptions: u64,
    pub admits: u64,
    pub sleeps: u64,
    pub exits: u64,
    pub ready_lengths: [usize; PRIORITY_LEVELS],
}
