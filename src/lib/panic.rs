//! Panic handler.
//!
//! No allocator exists on this target, so unlike a hosted panic handler this
//! one never formats into a `String` - it writes location and message
//! fields straight to the serial console through `serial_println!`, guards
//! against a panic happening while already panicking, and halts forever.

use core::panic::PanicInfo;
use core::sync::atomic::{AtomicBool, Ordering};

static PANICKING: AtomicBool = AtomicBool::new(false);

pub fn panic_handler(info: &PanicInfo) -> ! {
    unsafe { core::arch::asm!("cli") };

    if PANICKING.swap(true, Ordering::SeqCst) {
        crate::serial_println!("\n[PANIC] recursive panic, halting");
        halt_forever();
    }

    crate::serial_println!("\n[PANIC]");

    if let Some(location) = info.location() {
        crate::serial_println!("  at {}:{}:{}", location.file(), location.line(), location.column());
    } else {
        crate::serial_println!("  at <unknown location>");
    }

    crate::serial_println!("  {}", info.message());

    halt_forever();
}

fn halt_forever() -> ! {
    loop {
        unsafe { core::arch::asm!("cli", "hlt") };
    }
}
