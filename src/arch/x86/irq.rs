//! Hardware IRQ dispatch table.
//!
//! A fixed 16-entry array of handler function pointers, indexed directly by
//! IRQ number (0-15) - the same shape as the original firmware's
//! `interrupt_handlers[16]`, rather than a general 256-slot registry keyed
//! by interrupt vector. Unregistered lines are simply acknowledged and
//! dropped.

use super::idt::Regs;
use spin::Mutex;

pub type IrqHandler = fn(&mut Regs);

struct HandlerTable {
    handlers: [Option<IrqHandler>; 16],
}

static HANDLERS: Mutex<HandlerTable> = Mutex::new(HandlerTable { handlers: [None; 16] });

/// Register a handler for the given IRQ line (0-15). Overwrites any
/// previous registration.
pub fn register(irq: u8, handler: IrqHandler) {
    debug_assert!(irq < 16);
    HANDLERS.lock().handlers[irq as usize] = Some(handler);
}

/// Invoked by the common IRQ stub in `idt.rs`. `regs.int_no` carries the
/// synthetic IRQ number (0-15), not the raw interrupt vector - the stub
/// macros for each `irqN` entry point push the IRQ index, not 32+index.
pub fn dispatch(regs: &mut Regs) {
    let irq = regs.int_no as u8;

    if let Some(handler) = HANDLERS.lock().handlers.get(irq as usize).copied().flatten() {
        handler(regs);
    }

    let vector = super::pic::PIC1_OFFSET + irq;
    unsafe { super::pic::end_of_interrupt(vector) };
}
