//! # Legacy 8259A PIC
//!
//! Remaps the cascaded master/slave 8259A pair from their power-on vectors
//! (0-15, which collide with the CPU exception vectors) to 32-47, using the
//! `pic8259` crate's `ChainedPics` for the ICW1-ICW4 initialization
//! sequence.
//!
//! `initialize()` only reprograms the offsets; it says nothing about which
//! lines end up masked afterward, and that's boot-stage-dependent state
//! this kernel cannot rely on. So `init` explicitly writes both PICs' mask
//! registers afterward to the selective set this kernel actually services
//! - IRQ0 (timer), IRQ1 (keyboard), IRQ2 (the master->slave cascade, which
//! must stay unmasked or no slave-PIC line, including the mouse's, can
//! ever reach the CPU), and IRQ12 (mouse) - leaving everything else,
//! notably IRQ14 (the ATA controller, polled rather than interrupt-driven
//! per `ata.rs`), masked. This mirrors the original firmware's
//! `master &= ~((1<<0)|(1<<1))` selective-unmask write in `kernel.c`.

use pic8259::ChainedPics;
use spin::Mutex;

pub const PIC1_OFFSET: u8 = 32;
pub const PIC2_OFFSET: u8 = PIC1_OFFSET + 8;

/// IRQ vector assignments, matching the PIC's fixed wiring.
pub const IRQ_TIMER: u8 = PIC1_OFFSET;
pub const IRQ_KEYBOARD: u8 = PIC1_OFFSET + 1;
pub const IRQ_MOUSE: u8 = PIC2_OFFSET + 4;
pub const IRQ_ATA: u8 = PIC2_OFFSET + 6;

const PIC1_DATA: u16 = 0x21;
const PIC2_DATA: u16 = 0xA1;

const MASTER_IRQ0_TIMER: u8 = 1 << 0;
const MASTER_IRQ1_KEYBOARD: u8 = 1 << 1;
const MASTER_IRQ2_CASCADE: u8 = 1 << 2;
const SLAVE_IRQ12_MOUSE: u8 = 1 << 4;

pub static PICS: Mutex<ChainedPics> = Mutex::new(unsafe { ChainedPics::new(PIC1_OFFSET, PIC2_OFFSET) });

/// Remap both PICs, then explicitly program the selective mask: timer,
/// keyboard, cascade, and mouse unmasked, everything else (including the
/// polled ATA line) masked.
///
/// # Safety
/// Must run once during boot with interrupts disabled.
pub unsafe fn init() {
    PICS.lock().initialize();

    super::io::outb(PIC1_DATA, !(MASTER_IRQ0_TIMER | MASTER_IRQ1_KEYBOARD | MASTER_IRQ2_CASCADE));
    super::io::outb(PIC2_DATA, !SLAVE_IRQ12_MOUSE);
}

/// Send end-of-interrupt for the given vector. Handles the
/// slave-then-master ordering required when the IRQ came off the slave PIC.
pub unsafe fn end_of_interrupt(vector: u8) {
    PICS.lock().notify_end_of_interrupt(vector);
}
