pub mod irq;

pub use irq::{set_irq_controller, IrqController, IrqGuard};
