//! Ready queues
//!
//! One FIFO queue per priority level. Selection scans from the highest
//! level down and pops the head, so threads of equal priority round-robin
//! in admission order. The collection is policy-free: claim bookkeeping,
//! interrupt masking and the never-empty guarantee live in the core paths
//! driving it.

use alloc::collections::VecDeque;
use alloc::sync::Arc;

use super::policy::PRIORITY_LEVELS;
use crate::scheduler::thread::{Thread, ThreadId, ThreadPriority};

/// Per-priority FIFO ready queues.
pub struct ReadyQueueSet {
    levels: [VecDeque<Arc<Thread>>; PRIORITY_LEVELS],
}

impl ReadyQueueSet {
    pub fn new() -> Self {
        Self {
            levels: [
                VecDeque::new(),
                VecDeque::new(),
                VecDeque::new(),
                VecDeque::new(),
                VecDeque::new(),
            ],
        }
    }

    /// Append at the tail of the thread's priority level.
    pub fn push(&mut self, thread: Arc<Thread>) {
        let level = thread.priority().index();
        self.levels[level].push_back(thread);
    }

    /// Pop the head of the first non-empty level, highest priority first.
    pub fn pop_highest(&mut self) -> Option<Arc<Thread>> {
        for queue in self.levels.iter_mut().rev() {
            if let Some(thread) = queue.pop_front() {
                return Some(thread);
            }
        }
        None
    }

    /// Unlink a specific thread, wherever it sits in its level.
    pub fn remove(&mut self, id: ThreadId, priority: ThreadPriority) -> Option<Arc<Thread>> {
        let queue = &mut self.levels[priority.index()];
        let position = queue.iter().position(|thread| thread.id() == id)?;
        queue.remove(position)
    }

    /// True iff every level above the idle floor is empty.
    pub fn is_idling(&self) -> bool {
        self.levels[ThreadPriority::MIN.index() + 1..]
            .iter()
            .all(VecDeque::is_empty)
    }

    pub fn is_empty(&self) -> bool {
        self.levels.iter().all(VecDeque::is_empty)
    }

    pub fn len(&self) -> usize {
        self.levels.iter().map(VecDeque::len).sum()
    }

    pub fn level_len(&self, priority: ThreadPriority) -> usize {
        self.levels[priority.index()].len()
    }

    pub fn lengths(&self) -> [usize; PRIORITY_LEVELS] {
        let mut lengths = [0; PRIORITY_LEVELS];
        for (slot, queue) in lengths.iter_mut().zip(self.levels.iter()) {
            *slot = queue.len();
        }
        lengths
    }

    pub fn contains(&self, id: ThreadId) -> bool {
        self.levels
            .iter()
            .any(|queue| queue.iter().any(|thread| thread.id() == id))
    }
}

impl Default for ReadyQueueSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    fn thread(name: &str, priority: ThreadPriority) -> Arc<Thread> {
        Thread::new_kernel(name, priority)
    }

    #[test]
    fn pop_prefers_highest_priority() {
        let mut queues = ReadyQueueSet::new();
        let low = thread("low", ThreadPriority::Low);
        let high = thread("high", ThreadPriority::High);
        queues.push(Arc::clone(&low));
        queues.push(Arc::clone(&high));

        assert_eq!(queues.pop_highest().unwrap().id(), high.id());
        assert_eq!(queues.pop_highest().unwrap().id(), low.id());
        assert!(queues.pop_highest().is_none());
    }

    #[test]
    fn fifo_within_a_level() {
        let mut queues = ReadyQueueSet::new();
        let first = thread("first", ThreadPriority::Normal);
        let second = thread("second", ThreadPriority::Normal);
        queues.push(Arc::clone(&first));
        queues.push(Arc::clone(&second));

        assert_eq!(queues.pop_highest().unwrap().id(), first.id());
        assert_eq!(queues.pop_highest().unwrap().id(), second.id());
    }

    #[test]
    fn remove_unlinks_mid_queue() {
        let mut queues = ReadyQueueSet::new();
        let a = thread("a", ThreadPriority::Normal);
        let b = thread("b", ThreadPriority::Normal);
        let c = thread("c", ThreadPriority::Normal);
        for t in [&a, &b, &c] {
            queues.push(Arc::clone(t));
        }

        let removed = queues.remove(b.id(), b.priority()).unwrap();
        assert_eq!(removed.id(), b.id());
        assert!(queues.remove(b.id(), b.priority()).is_none());
        assert_eq!(queues.pop_highest().unwrap().id(), a.id());
        assert_eq!(queues.pop_highest().unwrap().id(), c.id());
    }

    #[test]
    fn idling_means_only_the_idle_floor_is_populated() {
        let mut queues = ReadyQueueSet::new();
        assert!(queues.is_idling());

        queues.push(thread("idle", ThreadPriority::Idle));
        assert!(queues.is_idling());

        let worker = thread("worker", ThreadPriority::Low);
        queues.push(Arc::clone(&worker));
        assert!(!queues.is_idling());

        queues.remove(worker.id(), worker.priority());
        assert!(queues.is_idling());
    }

    #[test]
    fn lengths_track_levels() {
        let mut queues = ReadyQueueSet::new();
        queues.push(thread("a", ThreadPriority::Realtime));
        queues.push(thread("b", ThreadPriority::Realtime));
        queues.push(thread("c", ThreadPriority::Idle));

        assert_eq!(queues.len(), 3);
        assert_eq!(queues.level_len(ThreadPriority::Realtime), 2);
        assert_eq!(queues.lengths(), [1, 0, 0, 0, 2]);
    }

    proptest! {
        // Selection order is a stable sort: priority descending, admission
        // order within a level.
        #[test]
        fn pop_order_is_priority_then_admission(levels in proptest::collection::vec(0usize..PRIORITY_LEVELS, 1..24)) {
            let mut queues = ReadyQueueSet::new();
            let mut admitted: Vec<(usize, ThreadId)> = Vec::new();

            for (seq, &level) in levels.iter().enumerate() {
                let priority = ThreadPriority::from_index(level).unwrap();
                let t = thread(&format!("t{}", seq), priority);
                admitted.push((level, t.id()));
                queues.push(t);
            }

            let mut expected = admitted.clone();
            expected.sort_by_key(|&(level, _)| core::cmp::Reverse(level));
            let expected: Vec<ThreadId> = expected.into_iter().map(|(_, id)| id).collect();

            let mut popped = Vec::new();
            while let Some(t) = queues.pop_highest() {
                popped.push(t.id());
            }
            prop_assert_eq!(popped, expected);
        }
    }
}
