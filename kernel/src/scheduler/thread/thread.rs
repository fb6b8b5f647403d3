//! Thread Structure and Management
//!
//! The thread control block and the opaque execution-context handle moved
//! between the trap path and the scheduler. Ownership of a thread is a set
//! of reference claims (`Arc` clones): one per ready-queue membership, one
//! per armed sleep timer, one for the running slot, plus whatever handles
//! the creator keeps. The last claim dropped reclaims the thread.

use alloc::format;
use alloc::sync::Arc;
use core::fmt;
use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use spin::Mutex;

use super::process::Process;
use super::state::{validate_transition, AtomicThreadState, ThreadState};
use crate::logger;
use crate::time::TimerId;

/// Thread ID type
pub type ThreadId = u64;

static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);

/// Allocate a fresh thread ID
pub fn alloc_thread_id() -> ThreadId {
    NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed)
}

/// Thread priority levels
///
/// `Idle` is reserved for the permanently admitted idle thread; `Realtime`
/// is the most urgent level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ThreadPriority {
    Idle = 0,
    Low = 1,
    Normal = 2,
    High = 3,
    Realtime = 4,
}

impl ThreadPriority {
    pub const MIN: Self = Self::Idle;
    pub const MAX: Self = Self::Realtime;

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Idle),
            1 => Some(Self::Low),
            2 => Some(Self::Normal),
            3 => Some(Self::High),
            4 => Some(Self::Realtime),
            _ => None,
        }
    }
}

impl fmt::Display for ThreadPriority {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Low => write!(f, "Low"),
            Self::Normal => write!(f, "Normal"),
            Self::High => write!(f, "High"),
            Self::Realtime => write!(f, "Realtime"),
        }
    }
}

/// Privilege mode an execution context was interrupted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuMode {
    User,
    Kernel,
}

/// Opaque saved execution context.
///
/// The actual register save/restore lives in the architecture layer; the
/// scheduler only moves these handles between the trap path and thread
/// control blocks. Deliberately neither `Clone` nor `Copy`: a context is
/// owned by exactly one place at a time.
#[derive(Debug)]
pub struct ExecContext {
    mode: CpuMode,
    frame: usize,
}

impl ExecContext {
    pub const fn new(mode: CpuMode, frame: usize) -> Self {
        Self { mode, frame }
    }

    pub const fn user(frame: usize) -> Self {
        Self::new(CpuMode::User, frame)
    }

    pub const fn kernel(frame: usize) -> Self {
        Self::new(CpuMode::Kernel, frame)
    }

    pub fn mode(&self) -> CpuMode {
        self.mode
    }

    /// Architecture-level frame handle.
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Contexts interrupted in user mode are eligible for quantum
    /// preemption; kernel-mode contexts never are.
    pub fn is_preemptible(&self) -> bool {
        matches!(self.mode, CpuMode::User)
    }
}

/// Thread kind: kernel-only, or user with an owning process.
pub enum ThreadKind {
    Kernel,
    User { process: Arc<Process> },
}

/// Thread Control Block (TCB)
pub struct Thread {
    /// Unique thread ID
    id: ThreadId,

    /// Thread name (for diagnostics)
    name: alloc::boxed::Box<str>,

    /// Kernel-only or user thread
    kind: ThreadKind,

    /// Priority, fixed at creation
    priority: ThreadPriority,

    /// Current state
    state: AtomicThreadState,

    /// Saved context; present whenever the thread is not running
    context: Mutex<Option<ExecContext>>,

    /// Linked into a ready queue
    queued: AtomicBool,

    /// Armed sleep timer, if any
    timer: Mutex<Option<TimerId>>,
}

impl Thread {
    /// Create a new kernel thread, born Ready with a bootstrap context.
    pub fn new_kernel(name: &str, priority: ThreadPriority) -> Arc<Self> {
        Self::build(name, ThreadKind::Kernel, priority)
    }

    /// Create a new user thread owned by `process`.
    ///
    /// The thread is registered in the process's thread set (the set holds
    /// no claim; it is iterated by batch admission, never owned).
    pub fn new_user(name: &str, priority: ThreadPriority, process: &Arc<Process>) -> Arc<Self> {
        let thread = Self::build(
            name,
            ThreadKind::User {
                process: Arc::clone(process),
            },
            priority,
        );
        process.register_thread(&thread);
        thread
    }

    fn build(name: &str, kind: ThreadKind, priority: ThreadPriority) -> Arc<Self> {
        let id = alloc_thread_id();
        // Bootstrap context: the thread manager points it at the entry
        // trampoline before the thread first runs.
        let context = ExecContext::kernel(0);

        Arc::new(Self {
            id,
            name: name.into(),
            kind,
            priority,
            state: AtomicThreadState::new(ThreadState::Ready),
            context: Mutex::new(Some(context)),
            queued: AtomicBool::new(false),
            timer: Mutex::new(None),
        })
    }

    pub fn id(&self) -> ThreadId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ThreadKind {
        &self.kind
    }

    pub fn priority(&self) -> ThreadPriority {
        self.priority
    }

    /// Owning process, for user threads.
    pub fn process(&self) -> Option<&Arc<Process>> {
        match &self.kind {
            ThreadKind::Kernel => None,
            ThreadKind::User { process } => Some(process),
        }
    }

    pub fn state(&self) -> ThreadState {
        self.state.load()
    }

    /// Move to `to`, enforcing the transition table.
    pub fn transition(&self, to: ThreadState) {
        let from = self.state.load();
        crate::sched_assert!(
            validate_transition(from, to),
            "illegal thread state transition"
        );
        self.state.store(to);
    }

    /// Attach a saved context (thread is being switched out or parked).
    pub fn save_context(&self, ctx: ExecContext) {
        *self.context.lock() = Some(ctx);
    }

    /// Detach the saved context for restoration (thread is being resumed).
    pub fn take_context(&self) -> Option<ExecContext> {
        self.context.lock().take()
    }

    pub fn has_saved_context(&self) -> bool {
        self.context.lock().is_some()
    }

    pub(crate) fn set_queued(&self, queued: bool) {
        self.queued.store(queued, Ordering::Release);
    }

    /// Linked into a ready queue right now.
    pub fn is_queued(&self) -> bool {
        self.queued.load(Ordering::Acquire)
    }

    pub(crate) fn set_timer(&self, timer: Option<TimerId>) {
        *self.timer.lock() = timer;
    }

    /// Armed sleep timer, if the thread is in a timed sleep.
    pub fn armed_timer(&self) -> Option<TimerId> {
        *self.timer.lock()
    }
}

impl Drop for Thread {
    fn drop(&mut self) {
        // Last claim released: the thread is being reclaimed.
        logger::debug(&format!(
            "[THREAD] '{}' (TID {}) reclaimed",
            self.name, self.id
        ));
    }
}
