//! Scoped interrupt masking
//!
//! Every mutation of scheduling state runs inside an [`IrqGuard`]: interrupts
//! are masked on entry and restored on every exit path. The guard keeps a
//! mask depth and delegates the actual mask/unmask to a platform controller
//! registered at boot. Without a controller (host tests, early boot) only the
//! depth is tracked.

use core::sync::atomic::{AtomicUsize, Ordering};
use spin::Once;

/// Platform interrupt controller hook (mask/unmask).
pub trait IrqController: Send + Sync {
    /// Mask interrupts on the current CPU; returns whether they were enabled.
    fn mask(&self) -> bool;

    /// Restore the pre-mask state.
    fn restore(&self, was_enabled: bool);
}

static CONTROLLER: Once<&'static dyn IrqController> = Once::new();

static MASK_DEPTH: AtomicUsize = AtomicUsize::new(0);

/// Register the platform controller. First call wins.
pub fn set_irq_controller(controller: &'static dyn IrqController) {
    CONTROLLER.call_once(|| controller);
}

/// Current nesting depth of live guards.
pub fn mask_depth() -> usize {
    MASK_DEPTH.load(Ordering::Relaxed)
}

/// RAII interrupt mask. Nests: inner guards see interrupts already masked
/// and restoring them is a no-op until the outermost guard drops.
pub struct IrqGuard {
    was_enabled: bool,
}

impl IrqGuard {
    pub fn new() -> Self {
        let was_enabled = match CONTROLLER.get() {
            Some(controller) => controller.mask(),
            None => false,
        };
        MASK_DEPTH.fetch_add(1, Ordering::Acquire);
        Self { was_enabled }
    }
}

impl Default for IrqGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for IrqGuard {
    fn drop(&mut self) {
        MASK_DEPTH.fetch_sub(1, Ordering::Release);
        if let Some(controller) = CONTROLLER.get() {
            controller.restore(self.was_enabled);
        }
    }
}
