//! # x86 (32-bit protected mode) architecture support
//!
//! Everything platform-specific the kernel needs on the target: the IDT,
//! the PIC/PIT, the PS/2 keyboard and mouse, the ATA PIO disk driver, the
//! `int 0x80` syscall entry, and the serial console used for ambient
//! logging.
//!
//! This kernel assumes boot has already brought the CPU into 32-bit
//! protected mode with a flat GDT in place (selector 0x08 for ring-0 code,
//! 0x10 for data) before any code in this module runs; setting that up is
//! an earlier, out-of-scope boot stage.

pub mod io;
pub mod idt;
pub mod exceptions;
pub mod irq;
pub mod pic;
pub mod pit;
pub mod keyboard;
pub mod mouse;
pub mod ata;
pub mod syscall;
pub mod serial;

/// Bring up every architecture subsystem in the order the hardware
/// requires: IDT before PIC/PIT (so a stray interrupt during remapping
/// doesn't triple-fault), PIC before unmasking anything, then the
/// individual device drivers, then the syscall gate, then `sti`.
///
/// # Safety
/// Must be called exactly once, very early in kernel entry, with
/// interrupts disabled on entry.
pub unsafe fn init(gfx_bounds: Option<(u32, u32)>) {
    idt::init();
    pic::init();
    pit::init(100);

    irq::register(0, timer_irq);
    irq::register(1, keyboard::irq_handler);
    irq::register(12, mouse::irq_handler);

    mouse::init(gfx_bounds);
    syscall::init();

    core::arch::asm!("sti");
}

fn timer_irq(_regs: &mut idt::Regs) {
    pit::on_tick();
    crate::console::cursor::on_timer_tick();
}

/// Halt the CPU until the next interrupt.
#[inline]
pub fn halt() {
    unsafe { core::arch::asm!("hlt") };
}
