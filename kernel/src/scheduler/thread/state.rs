//! Thread state machine
//!
//! Manages thread lifecycle and state transitions

use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};

/// Thread state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u64)]
pub enum ThreadState {
    /// Thread is ready to run (admitted or awaiting admission)
    Ready = 0,

    /// Thread currently occupies the running slot
    Running = 1,

    /// Thread is parked, waiting for a timer or an external wake-up
    Sleeping = 2,

    /// Thread has terminated; never scheduled again
    Dead = 3,
}

impl ThreadState {
    /// Convert from u64
    pub fn from_u64(value: u64) -> Option<Self> {
        match value {
            0 => Some(Self::Ready),
            1 => Some(Self::Running),
            2 => Some(Self::Sleeping),
            3 => Some(Self::Dead),
            _ => None,
        }
    }

    /// Convert to u64
    pub fn to_u64(self) -> u64 {
        self as u64
    }

    /// Check if state is schedulable
    pub fn is_schedulable(self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Check if state is active
    pub fn is_active(self) -> bool {
        matches!(self, Self::Ready | Self::Running)
    }
}

impl fmt::Display for ThreadState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Ready => write!(f, "Ready"),
            Self::Running => write!(f, "Running"),
            Self::Sleeping => write!(f, "Sleeping"),
            Self::Dead => write!(f, "Dead"),
        }
    }
}

/// Atomic thread state
pub struct AtomicThreadState {
    state: AtomicU64,
}

impl AtomicThreadState {
    /// Create new atomic state
    pub const fn new(state: ThreadState) -> Self {
        Self {
            state: AtomicU64::new(state as u64),
        }
    }

    /// Load current state
    pub fn load(&self) -> ThreadState {
        let value = self.state.load(Ordering::Acquire);
        ThreadState::from_u64(value).unwrap_or(ThreadState::Ready)
    }

    /// Store new state
    pub fn store(&self, state: ThreadState) {
        self.state.store(state as u64, Ordering::Release);
    }

    /// Compare and exchange state
    pub fn compare_exchange(
        &self,
        current: ThreadState,
        new: ThreadState,
    ) -> Result<ThreadState, ThreadState> {
        match self.state.compare_exchange(
            current as u64,
            new as u64,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(old) => Ok(ThreadState::from_u64(old).unwrap_or(ThreadState::Ready)),
            Err(actual) => Err(ThreadState::from_u64(actual).unwrap_or(ThreadState::Ready)),
        }
    }
}

/// Validate state transition
pub fn validate_transition(from: ThreadState, to: ThreadState) -> bool {
    use ThreadState::*;

    match (from, to) {
        // idempotent re-admission
        (Ready, Ready) => true,

        // selection
        (Ready, Running) => true,

        // preemption / voluntary yield
        (Running, Ready) => true,

        // parked (timed sleep or event wait)
        (Running, Sleeping) => true,

        // exit
        (Running, Dead) => true,

        // timer expiry or external wake-up
        (Sleeping, Ready) => true,

        // killed while parked
        (Sleeping, Dead) => true,

        // all other transitions invalid; Dead is terminal
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use static_assertions::const_assert_eq;

    const_assert_eq!(core::mem::size_of::<ThreadState>(), 8);

    #[test]
    fn u64_roundtrip() {
        for state in [
            ThreadState::Ready,
            ThreadState::Running,
            ThreadState::Sleeping,
            ThreadState::Dead,
        ] {
            assert_eq!(ThreadState::from_u64(state.to_u64()), Some(state));
        }
        assert_eq!(ThreadState::from_u64(42), None);
    }

    #[test]
    fn lifecycle_transitions_are_valid() {
        use ThreadState::*;
        assert!(validate_transition(Ready, Running));
        assert!(validate_transition(Running, Ready));
        assert!(validate_transition(Running, Sleeping));
        assert!(validate_transition(Sleeping, Ready));
        assert!(validate_transition(Running, Dead));
        assert!(validate_transition(Sleeping, Dead));
        assert!(validate_transition(Ready, Ready));
    }

    #[test]
    fn dead_is_terminal() {
        use ThreadState::*;
        assert!(!validate_transition(Dead, Ready));
        assert!(!validate_transition(Dead, Running));
        assert!(!validate_transition(Dead, Sleeping));
    }

    #[test]
    fn skipping_states_is_invalid() {
        use ThreadState::*;
        assert!(!validate_transition(Ready, Sleeping));
        assert!(!validate_transition(Ready, Dead));
        assert!(!validate_transition(Sleeping, Running));
    }

    #[test]
    fn atomic_state_compare_exchange() {
        let state = AtomicThreadState::new(ThreadState::Ready);
        assert_eq!(state.load(), ThreadState::Ready);

        assert!(state
            .compare_exchange(ThreadState::Ready, ThreadState::Running)
            .is_ok());
        assert_eq!(state.load(), ThreadState::Running);

        assert_eq!(
            state.compare_exchange(ThreadState::Ready, ThreadState::Dead),
            Err(ThreadState::Running)
        );
    }
}
