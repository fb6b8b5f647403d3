//! Scheduler Error Handling
//!
//! Recoverable conditions are `SchedError` values returned to the caller;
//! invariant violations are fatal via `sched_assert!`: the design
//! guarantees (idle thread, claim accounting) make them corruption, not
//! conditions to recover from.

use core::fmt;

use crate::scheduler::thread::{ThreadId, ThreadState};

/// Scheduler error types with context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedError {
    /// Operation requires a state the thread is not in (e.g. withdrawing a
    /// thread that is not linked into any ready queue).
    InvalidState {
        thread_id: ThreadId,
        state: ThreadState,
    },
}

impl fmt::Display for SchedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidState { thread_id, state } => {
                write!(f, "thread {} in invalid state {}", thread_id, state)
            }
        }
    }
}

impl SchedError {
    /// Is this a recoverable error?
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::InvalidState { .. } => true,
        }
    }
}

/// Result type for scheduler operations
pub type SchedResult<T> = Result<T, SchedError>;

/// Macro for critical scheduler assertions
#[macro_export]
macro_rules! sched_assert {
    ($cond:expr, $reason:expr) => {
        if !$cond {
            panic!("[SCHED CRITICAL] Invariant violated: {}", $reason);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_state_displays_context() {
        let err = SchedError::InvalidState {
            thread_id: 7,
            state: ThreadState::Sleeping,
        };
        assert!(err.is_recoverable());
        let text = alloc::format!("{}", err);
        assert!(text.contains('7'));
        assert!(text.contains("Sleeping"));
    }

    #[test]
    #[should_panic(expected = "Invariant violated: broken")]
    fn sched_assert_panics_with_reason() {
        sched_assert!(1 + 1 == 3, "broken");
    }
}
