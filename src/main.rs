//! ASOS - a small 32-bit protected-mode kernel: PS/2 input, a VGA-text or
//! VBE-framebuffer console, a flat on-disk filesystem over ATA PIO, and an
//! `int 0x80` syscall surface for a single position-fixed user program.
//!
//! Everything before this file runs is out of this crate's scope: a
//! bootloader has already brought the CPU into 32-bit protected mode with
//! a flat GDT (ring-0 code at selector 0x08, data at 0x10), built a
//! working stack, and populated the VBE mode-info block this crate reads
//! at a fixed physical address (see `graphics::init`).

#![no_std]
#![no_main]
#![cfg_attr(feature = "strict", deny(warnings))]
#![cfg_attr(feature = "strict", deny(unsafe_op_in_unsafe_fn))]

#[allow(special_module_name)]
pub mod lib;
pub mod log;
pub mod build_info;
pub mod arch;
pub mod console;
pub mod graphics;
pub mod fs;
pub mod syscall;

use core::sync::atomic::{AtomicBool, Ordering};

/// The program the shell loop loads on every (re)start.
const SHELL_PROGRAM: &[u8] = b"terminal.bin";

/// Set once the first call to [`kernel_main`] has brought every subsystem
/// up. A later call - reached only via the direct `jmp` the `exit`
/// syscall (`syscall::dispatch`, case 2) performs back into this function
/// - skips straight to the shell loop instead of re-running `arch::x86::init`
/// and re-loading the superblock.
static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Kernel entry point and the `exit` syscall's re-entry target.
///
/// The boot stage (out of scope for this crate) transfers control here
/// exactly once, with interrupts masked. A later "return" from `exit`
/// lands here a second time via a bare `jmp`, not a call, so this
/// function must never assume anything about its caller's stack frame
/// beyond "some valid stack is live" - which is exactly why it takes no
/// arguments and never returns.
#[no_mangle]
pub extern "C" fn kernel_main() -> ! {
    if !INITIALIZED.swap(true, Ordering::SeqCst) {
        arch::x86::serial::init_serial();
        build_info::print_build_info();
        log::policy::set_development();
        crate::serial_println!("[ASOS] booting...");

        let gfx = graphics::init();
        match gfx {
            Ok(info) => crate::serial_println!("[ASOS] graphics mode {}x{} @ {}bpp", info.w, info.h, info.bpp),
            Err(_) => crate::serial_println!("[ASOS] no graphics mode, falling back to VGA text"),
        }
        console::init(gfx.is_ok());

        // SAFETY: called exactly once, this early, with interrupts still
        // masked - the invariant `arch::x86::init` documents.
        unsafe {
            arch::x86::init(gfx.ok().map(|info| (info.w as u32, info.h as u32)));
        }

        if fs::load_superblock().is_err() {
            crate::serial_println!("[ASOS] halt: invalid ASOFS superblock");
            console::write(b"[ASOFS] Invalid filesystem, halting.\n");
            loop {
                arch::x86::halt();
            }
        }
    }

    shell_loop()
}

/// "Run the shell, repeat" - the top-level loop every application
/// ultimately returns (or `exit`s) back into. Each iteration clears the
/// console before loading the shell fresh, so a crashed or misbehaving
/// previous program never leaves stale output on screen.
fn shell_loop() -> ! {
    loop {
        console::clear();
        fs::run(SHELL_PROGRAM);
        crate::serial_println!("[ASOS] {} returned, restarting shell", core::str::from_utf8(SHELL_PROGRAM).unwrap_or("?"));
    }
}

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    crate::lib::panic::panic_handler(info)
}
