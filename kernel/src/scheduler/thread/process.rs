//! Process bookkeeping consumed by the scheduler
//!
//! Process construction/destruction is managed elsewhere; scheduling only
//! needs the owned-thread set (iterated by batch admission/removal), the
//! scheduling-lock flag and the pending-signal indicator.

use alloc::boxed::Box;
use alloc::sync::{Arc, Weak};
use alloc::vec::Vec;
use bitflags::bitflags;
use core::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use spin::Mutex;

use super::thread::Thread;

/// Process ID type
pub type ProcessId = u64;

static NEXT_PROCESS_ID: AtomicU64 = AtomicU64::new(1);

bitflags! {
    /// Per-process flag word
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ProcFlags: u32 {
        /// Scheduling of all owned threads is suspended
        const LOCKED = 1 << 0;
        /// The signal subsystem has work pending for this process
        const SIG_PENDING = 1 << 1;
    }
}

/// Process record
pub struct Process {
    id: ProcessId,
    name: Box<str>,

    /// Owned threads as weak handles; the set is iterated, never owned
    threads: Mutex<Vec<Weak<Thread>>>,

    flags: AtomicU32,
}

impl Process {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            id: NEXT_PROCESS_ID.fetch_add(1, Ordering::Relaxed),
            name: name.into(),
            threads: Mutex::new(Vec::new()),
            flags: AtomicU32::new(0),
        })
    }

    pub fn id(&self) -> ProcessId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Record a newly created thread in the owned set.
    pub fn register_thread(&self, thread: &Arc<Thread>) {
        self.threads.lock().push(Arc::downgrade(thread));
    }

    /// Snapshot of the live owned threads, pruning reclaimed entries.
    pub fn threads(&self) -> Vec<Arc<Thread>> {
        let mut set = self.threads.lock();
        set.retain(|weak| weak.strong_count() > 0);
        set.iter().filter_map(Weak::upgrade).collect()
    }

    pub fn thread_count(&self) -> usize {
        self.threads().len()
    }

    fn flags(&self) -> ProcFlags {
        ProcFlags::from_bits_truncate(self.flags.load(Ordering::Acquire))
    }

    fn set_flag(&self, flag: ProcFlags, value: bool) {
        if value {
            self.flags.fetch_or(flag.bits(), Ordering::AcqRel);
        } else {
            self.flags.fetch_and(!flag.bits(), Ordering::AcqRel);
        }
    }

    /// Suspend or resume admission of this process's threads.
    pub fn set_locked(&self, locked: bool) {
        self.set_flag(ProcFlags::LOCKED, locked);
    }

    pub fn is_locked(&self) -> bool {
        self.flags().contains(ProcFlags::LOCKED)
    }

    /// Raise or clear the pending-signal indicator (signal subsystem side).
    pub fn set_signal_pending(&self, pending: bool) {
        self.set_flag(ProcFlags::SIG_PENDING, pending);
    }

    pub fn has_pending_signal(&self) -> bool {
        self.flags().contains(ProcFlags::SIG_PENDING)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::thread::{ThreadPriority, ThreadState};

    #[test]
    fn flags_default_clear() {
        let proc = Process::new("p");
        assert!(!proc.is_locked());
        assert!(!proc.has_pending_signal());
    }

    #[test]
    fn lock_flag_toggles() {
        let proc = Process::new("p");
        proc.set_locked(true);
        assert!(proc.is_locked());
        proc.set_locked(false);
        assert!(!proc.is_locked());
    }

    #[test]
    fn signal_pending_is_independent_of_lock() {
        let proc = Process::new("p");
        proc.set_signal_pending(true);
        proc.set_locked(true);
        proc.set_signal_pending(false);
        assert!(proc.is_locked());
        assert!(!proc.has_pending_signal());
    }

    #[test]
    fn thread_set_prunes_reclaimed_threads() {
        let proc = Process::new("p");
        let keep = Thread::new_user("keep", ThreadPriority::Normal, &proc);
        let gone = Thread::new_user("gone", ThreadPriority::Normal, &proc);
        assert_eq!(proc.thread_count(), 2);
        assert_eq!(gone.state(), ThreadState::Ready);

        drop(gone);
        let live = proc.threads();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].id(), keep.id());
    }
}
