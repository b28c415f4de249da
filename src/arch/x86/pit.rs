//! # PIT (Programmable Interval Timer) - Intel 8253/8254
//!
//! Channel 0 drives the system tick counter via IRQ0. We program Mode 3
//! (square wave / rate generator) at a default of 100 Hz, matching the
//! firmware default of "if no frequency requested, use 100".

use core::sync::atomic::{AtomicU32, Ordering};

const CHANNEL0_DATA: u16 = 0x40;
const COMMAND: u16 = 0x43;
const PIT_FREQUENCY: u32 = 1_193_182;
const MODE3_CHANNEL0: u8 = 0x36;

const DEFAULT_HZ: u32 = 100;

static TICKS: AtomicU32 = AtomicU32::new(0);

/// Program PIT channel 0. A frequency of 0 falls back to the 100 Hz default.
///
/// # Safety
/// Must run once during boot, before IRQ0 is unmasked.
pub unsafe fn init(hz: u32) {
    let hz = if hz == 0 { DEFAULT_HZ } else { hz };
    let divisor = (PIT_FREQUENCY / hz) as u16;

    super::io::outb(COMMAND, MODE3_CHANNEL0);
    super::io::outb(CHANNEL0_DATA, (divisor & 0xFF) as u8);
    super::io::outb(CHANNEL0_DATA, (divisor >> 8) as u8);
}

/// Called from the IRQ0 handler on every tick.
pub fn on_tick() {
    TICKS.fetch_add(1, Ordering::Relaxed);
}

/// Monotonically nondecreasing tick counter, incremented once per PIT
/// interrupt. Never reset for the lifetime of the kernel.
pub fn ticks() -> u32 {
    TICKS.load(Ordering::Relaxed)
}

/// Busy-wait (parking the CPU with `hlt` between checks) until at least
/// `count` ticks have elapsed since now.
pub fn sleep_ticks(count: u32) {
    let target = ticks().wrapping_add(count);
    while (ticks().wrapping_sub(target) as i32) < 0 {
        unsafe { core::arch::asm!("hlt") };
    }
}
