//! Minimal port I/O primitives shared by every driver in `arch::x86`.
//!
//! Everything here is a thin wrapper over the `x86_64` crate's `Port<T>`
//! type, which is a width-generic `in`/`out` instruction wrapper with no
//! dependency on long mode. It is the only piece of that crate this kernel
//! uses: the crate's `InterruptDescriptorTable`/GDT/TSS types all assume
//! 64-bit gate descriptors and do not fit a 32-bit protected-mode target,
//! so `idt.rs` builds its own gate table by hand instead.

use x86_64::instructions::port::Port;

/// Read a byte from an I/O port.
#[inline]
pub unsafe fn inb(port: u16) -> u8 {
    Port::new(port).read()
}

/// Write a byte to an I/O port.
#[inline]
pub unsafe fn outb(port: u16, value: u8) {
    Port::new(port).write(value)
}

/// Read a word from an I/O port.
#[inline]
pub unsafe fn inw(port: u16) -> u16 {
    Port::new(port).read()
}

/// Write a word to an I/O port.
#[inline]
pub unsafe fn outw(port: u16, value: u16) {
    Port::new(port).write(value)
}

/// Burn a handful of I/O cycles writing to an unused POST-diagnostic port.
/// The classic ISA settle delay for devices that need a moment to notice a
/// reprogramming write; `pic8259::ChainedPics::initialize` already performs
/// this internally during remap, and the ATA driver's own 400ns delay reads
/// the alt-status register instead (see `ata::delay_400ns`), so this is the
/// generic primitive kept for any future port-I/O driver that needs it.
#[inline]
#[allow(dead_code)]
pub unsafe fn io_wait() {
    Port::new(0x80).write(0u8);
}
