//! Scheduling Policy - quanta and the preemption decision
//!
//! One quantum per priority level, independently tunable, identical by
//! default. The preemption predicate is pure so the trap path and tests
//! share the exact decision.

use crate::scheduler::thread::{ExecContext, ThreadPriority};
use crate::time::Duration;

/// Number of priority levels (`ThreadPriority::Idle` .. `Realtime`)
pub const PRIORITY_LEVELS: usize = 5;

/// Default quantum for every level
pub const DEFAULT_QUANTUM: Duration = Duration::from_ms(100);

/// Per-priority quantum table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedConfig {
    quantum: [Duration; PRIORITY_LEVELS],
}

impl SchedConfig {
    pub const fn new() -> Self {
        Self {
            quantum: [DEFAULT_QUANTUM; PRIORITY_LEVELS],
        }
    }

    /// Same quantum for every level.
    pub const fn uniform(quantum: Duration) -> Self {
        Self {
            quantum: [quantum; PRIORITY_LEVELS],
        }
    }

    /// Tune a single level.
    pub const fn with_quantum(mut self, priority: ThreadPriority, quantum: Duration) -> Self {
        self.quantum[priority.index()] = quantum;
        self
    }

    pub const fn quantum_for(&self, priority: ThreadPriority) -> Duration {
        self.quantum[priority.index()]
    }
}

impl Default for SchedConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Quantum-expiry preemption decision.
///
/// Kernel-mode contexts are never preempted: in-kernel critical sections
/// run to completion without locking against the scheduler. A user-mode
/// context is switched out at the first check after its level's quantum
/// has elapsed.
pub fn should_preempt(
    config: &SchedConfig,
    priority: ThreadPriority,
    ran: Duration,
    ctx: &ExecContext,
) -> bool {
    ctx.is_preemptible() && ran >= config.quantum_for(priority)
}

#[cfg(test)]
mod tests {
    use super::*;
    use static_assertions::const_assert_eq;

    const_assert_eq!(PRIORITY_LEVELS, 5);

    fn quantum_1s() -> SchedConfig {
        SchedConfig::uniform(Duration::from_secs(1))
    }

    #[test]
    fn default_quanta_are_identical() {
        let config = SchedConfig::new();
        for index in 0..PRIORITY_LEVELS {
            let priority = ThreadPriority::from_index(index).unwrap();
            assert_eq!(config.quantum_for(priority), DEFAULT_QUANTUM);
        }
    }

    #[test]
    fn levels_are_independently_tunable() {
        let config = SchedConfig::new().with_quantum(ThreadPriority::High, Duration::from_ms(20));
        assert_eq!(
            config.quantum_for(ThreadPriority::High),
            Duration::from_ms(20)
        );
        assert_eq!(config.quantum_for(ThreadPriority::Normal), DEFAULT_QUANTUM);
    }

    #[test]
    fn no_preemption_before_quantum() {
        let ctx = ExecContext::user(0);
        assert!(!should_preempt(
            &quantum_1s(),
            ThreadPriority::Normal,
            Duration::from_ms(900),
            &ctx
        ));
    }

    #[test]
    fn preemption_after_quantum() {
        let ctx = ExecContext::user(0);
        assert!(should_preempt(
            &quantum_1s(),
            ThreadPriority::Normal,
            Duration::from_ms(1_500),
            &ctx
        ));
        // boundary: the quantum has elapsed
        assert!(should_preempt(
            &quantum_1s(),
            ThreadPriority::Normal,
            Duration::from_ms(1_000),
            &ctx
        ));
    }

    #[test]
    fn kernel_contexts_are_immune() {
        let ctx = ExecContext::kernel(0);
        assert!(!should_preempt(
            &quantum_1s(),
            ThreadPriority::Normal,
            Duration::from_ms(5_000),
            &ctx
        ));
    }
}
