//! Running-thread slot
//!
//! The single record of which thread executes and since when. Storing a
//! thread transfers the claim popped from the ready queue into the slot;
//! taking the entry hands that claim back to the caller, which must
//! re-admit, park or retire the thread.

use alloc::sync::Arc;

use crate::scheduler::thread::{Thread, ThreadState};
use crate::time::Timestamp;

/// Occupant of the slot.
pub struct RunningEntry {
    pub thread: Arc<Thread>,
    /// When the thread started running (quantum accounting)
    pub since: Timestamp,
}

/// At most one running thread.
pub struct RunningSlot {
    entry: Option<RunningEntry>,
}

impl RunningSlot {
    pub const fn new() -> Self {
        Self { entry: None }
    }

    /// Install `thread` as current, marking it Running and stamping the
    /// start time. The slot must be empty.
    pub fn set(&mut self, thread: Arc<Thread>, now: Timestamp) {
        crate::sched_assert!(self.entry.is_none(), "running slot already occupied");
        thread.transition(ThreadState::Running);
        self.entry = Some(RunningEntry { thread, since: now });
    }

    /// Vacate the slot, returning the occupant and its claim.
    pub fn take(&mut self) -> Option<RunningEntry> {
        self.entry.take()
    }

    pub fn entry(&self) -> Option<&RunningEntry> {
        self.entry.as_ref()
    }

    /// Borrow the current thread.
    pub fn thread(&self) -> Option<&Arc<Thread>> {
        self.entry.as_ref().map(|entry| &entry.thread)
    }

    /// New handle (claim) on the current thread.
    pub fn current(&self) -> Option<Arc<Thread>> {
        self.entry.as_ref().map(|entry| Arc::clone(&entry.thread))
    }

    pub fn is_empty(&self) -> bool {
        self.entry.is_none()
    }
}

impl Default for RunningSlot {
    fn default() -> Self {
        Self::new()
    }
}
