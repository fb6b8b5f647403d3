//! One-shot sleep timers
//!
//! Registry of armed wake-ups for sleeping threads. Each armed entry owns
//! one reference claim on its thread; the claim is handed back to the
//! scheduling core when the entry expires. Expiry is driven by the platform
//! tick through `Scheduler::timer_tick`.

use alloc::sync::Arc;
use alloc::vec::Vec;
use hashbrown::HashMap;

use super::clock::Timestamp;
use crate::scheduler::thread::Thread;

/// Timer ID (unique per wheel)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

struct TimerEntry {
    thread: Arc<Thread>,
    deadline: Timestamp,
}

/// One-shot timer registry.
pub struct TimerWheel {
    armed: HashMap<TimerId, TimerEntry>,
    next_id: u64,
}

impl TimerWheel {
    pub fn new() -> Self {
        Self {
            armed: HashMap::new(),
            next_id: 1,
        }
    }

    fn alloc_id(&mut self) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Arm a one-shot wake-up. The entry holds one claim on the thread
    /// until it expires or is disarmed.
    pub fn register(&mut self, thread: Arc<Thread>, deadline: Timestamp) -> TimerId {
        let id = self.alloc_id();
        self.armed.insert(id, TimerEntry { thread, deadline });
        id
    }

    /// Disarm an entry, dropping its claim. Returns false if unknown.
    pub fn disarm(&mut self, id: TimerId) -> bool {
        self.armed.remove(&id).is_some()
    }

    /// Remove and return every entry due at `now`, oldest deadline first.
    pub fn expire(&mut self, now: Timestamp) -> Vec<Arc<Thread>> {
        let mut due: Vec<(TimerId, Timestamp)> = self
            .armed
            .iter()
            .filter(|(_, entry)| entry.deadline <= now)
            .map(|(id, entry)| (*id, entry.deadline))
            .collect();
        due.sort_by_key(|&(id, deadline)| (deadline, id.0));

        due.into_iter()
            .filter_map(|(id, _)| self.armed.remove(&id))
            .map(|entry| entry.thread)
            .collect()
    }

    pub fn armed_count(&self) -> usize {
        self.armed.len()
    }

    pub fn is_armed(&self, id: TimerId) -> bool {
        self.armed.contains_key(&id)
    }
}

impl Default for TimerWheel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::thread::ThreadPriority;
    use crate::time::Duration;

    fn thread(name: &str) -> Arc<Thread> {
        Thread::new_kernel(name, ThreadPriority::Normal)
    }

    #[test]
    fn expire_fires_only_due_entries() {
        let mut wheel = TimerWheel::new();
        let t1 = thread("t1");
        let t2 = thread("t2");
        wheel.register(Arc::clone(&t1), Timestamp::from_ms(100));
        wheel.register(Arc::clone(&t2), Timestamp::from_ms(300));

        let fired = wheel.expire(Timestamp::from_ms(100));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].id(), t1.id());
        assert_eq!(wheel.armed_count(), 1);

        let fired = wheel.expire(Timestamp::from_ms(99));
        assert!(fired.is_empty());

        let fired = wheel.expire(Timestamp::from_ms(300));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].id(), t2.id());
        assert_eq!(wheel.armed_count(), 0);
    }

    #[test]
    fn expire_orders_by_deadline() {
        let mut wheel = TimerWheel::new();
        let late = thread("late");
        let early = thread("early");
        wheel.register(Arc::clone(&late), Timestamp::from_ms(200));
        wheel.register(Arc::clone(&early), Timestamp::from_ms(50));

        let fired = wheel.expire(Timestamp::from_ms(500));
        let ids: Vec<_> = fired.iter().map(|t| t.id()).collect();
        assert_eq!(ids, [early.id(), late.id()]);
    }

    #[test]
    fn armed_entry_holds_one_claim() {
        let mut wheel = TimerWheel::new();
        let t = thread("t");
        assert_eq!(Arc::strong_count(&t), 1);

        let id = wheel.register(Arc::clone(&t), Timestamp::from_ms(10));
        assert!(wheel.is_armed(id));
        assert_eq!(Arc::strong_count(&t), 2);

        assert!(wheel.disarm(id));
        assert_eq!(Arc::strong_count(&t), 1);
        assert!(!wheel.disarm(id));
    }

    #[test]
    fn deadline_from_duration() {
        let base = Timestamp::from_ms(1_000);
        assert_eq!(base + Duration::from_ms(200), Timestamp::from_ms(1_200));
    }
}
