//! `int 0x80` syscall dispatch table.
//!
//! Numeric dispatch over a fixed register ABI: `eax` carries the syscall
//! number, `ebx`/`ecx`/`edx` carry up to three arguments, and the return
//! value goes back in `eax` (see `arch::x86::syscall` for the trampoline
//! that saves/restores registers around this call). There is no user/
//! kernel address space split - every pointer argument is just a `u32`
//! that happens to be dereferenced directly, so the only validation any
//! handler here can do is reject a null pointer.

use crate::lib::error::Error;
use spin::Mutex;

/// Upper bound on how far a NUL-terminated string argument is scanned
/// before giving up. The original firmware scanned unboundedly; this
/// keeps a stray unterminated buffer from walking off into unmapped
/// memory forever.
const MAX_CSTR: usize = 4096;

static LAST_EXEC_ARG: Mutex<([u8; 32], usize)> = Mutex::new(([0; 32], 0));

unsafe fn cstr_slice<'a>(ptr: u32) -> &'a [u8] {
    if ptr == 0 {
        return &[];
    }
    let base = ptr as *const u8;
    let mut len = 0;
    while len < MAX_CSTR && core::ptr::read_volatile(base.add(len)) != 0 {
        len += 1;
    }
    core::slice::from_raw_parts(base, len)
}

unsafe fn buf_mut<'a>(ptr: u32, len: usize) -> &'a mut [u8] {
    core::slice::from_raw_parts_mut(ptr as *mut u8, len)
}

unsafe fn buf<'a>(ptr: u32, len: usize) -> &'a [u8] {
    core::slice::from_raw_parts(ptr as *const u8, len)
}

fn sys_write(ebx: u32) -> i32 {
    if ebx == 0 {
        return 0;
    }
    let s = unsafe { cstr_slice(ebx) };
    crate::console::write(s);
    0
}

/// Abandon the current application and transfer control straight back to
/// the kernel's shell loop via `kernel_main`, skipping every stack frame
/// between here and the syscall trampoline. This never returns: the
/// jump lands inside `kernel_main`'s re-entry branch, which falls into
/// `shell_loop` and never comes back up this call chain. Every frame
/// below it (the exited application's, and any `exec` nesting above it)
/// is simply abandoned - their stack space is never reclaimed, exactly
/// as in the firmware this was ported from.
fn sys_exit() -> ! {
    unsafe {
        core::arch::asm!(
            "jmp {0}",
            sym crate::kernel_main,
            options(noreturn)
        );
    }
}

/// Split "app [arg]" into a program name and a persisted argument, then
/// run the program. Leading/inter-token spaces are skipped; both halves
/// are truncated to fit their fixed-size buffers.
fn sys_exec(ebx: u32) -> i32 {
    if ebx == 0 {
        return -1;
    }
    let full = unsafe { cstr_slice(ebx) };

    let mut i = 0;
    while i < full.len() && full[i] == b' ' {
        i += 1;
    }

    let mut app = [0u8; 32];
    let mut j = 0;
    while i < full.len() && full[i] != b' ' && j < app.len() - 1 {
        app[j] = full[i];
        j += 1;
        i += 1;
    }

    while i < full.len() && full[i] == b' ' {
        i += 1;
    }

    let mut arg_slot = LAST_EXEC_ARG.lock();
    let mut k = 0;
    while i < full.len() && k < arg_slot.0.len() - 1 {
        arg_slot.0[k] = full[i];
        k += 1;
        i += 1;
    }
    arg_slot.0[k] = 0;
    arg_slot.1 = k;
    drop(arg_slot);

    crate::fs::run(&app[..j]);
    0
}

fn sys_getchar() -> i32 {
    crate::arch::x86::keyboard::read_blocking() as i32
}

fn sys_clear() -> i32 {
    crate::console::clear();
    0
}

fn sys_writefile(ebx: u32, ecx: u32, edx: u32) -> i32 {
    if ebx == 0 || ecx == 0 || edx == 0 {
        return -1;
    }
    let name = unsafe { cstr_slice(ebx) };
    let data = unsafe { buf(ecx, edx as usize) };
    match crate::fs::write(name, data) {
        Ok(()) => 0,
        Err(e) => e.code(),
    }
}

fn sys_listfiles() -> i32 {
    crate::fs::list_files();
    0
}

/// Copy `min(file size, max)` bytes into `dest`, returning the byte
/// count. Unlike the firmware this was ported from - which always
/// loaded the whole file into the caller's buffer regardless of `max`,
/// only the *reported* count was bounded - the copy itself never writes
/// past `max` bytes here.
fn sys_readfile(ebx: u32, ecx: u32, edx: u32) -> i32 {
    if ebx == 0 || ecx == 0 || edx == 0 {
        return -1;
    }
    let name = unsafe { cstr_slice(ebx) };
    let dest = unsafe { buf_mut(ecx, edx as usize) };
    match crate::fs::load(name, dest) {
        Ok(n) => n as i32,
        Err(Error::NotFound) => -2,
        Err(_) => -3,
    }
}

fn sys_enumfiles(ebx: u32, ecx: u32, edx: u32) -> i32 {
    if ebx == 0 {
        return -1;
    }
    let max_entries = ecx as usize;
    let name_max = edx as usize;
    let out = unsafe { buf_mut(ebx, max_entries.saturating_mul(name_max)) };
    match crate::fs::enumerate(out, max_entries, name_max) {
        Ok(count) => count as i32,
        Err(_) => -1,
    }
}

fn sys_getarg(ebx: u32, edx: u32) -> i32 {
    if ebx == 0 || edx == 0 {
        return -1;
    }
    let max = edx as usize;
    let out = unsafe { buf_mut(ebx, max) };
    let arg = LAST_EXEC_ARG.lock();
    let mut n = 0;
    while n < arg.1 && n + 1 < max {
        out[n] = arg.0[n];
        n += 1;
    }
    out[n] = 0;
    n as i32
}

fn sys_put_at(ebx: u32, ecx: u32, edx: u32) -> i32 {
    let x = ebx as i32;
    let y = ecx as i32;
    let c = (edx & 0xFF) as u8;
    let attr = ((edx >> 8) & 0xFF) as u8;
    crate::console::put_at_color(x, y, c, attr);
    0
}

fn sys_setcursor(ebx: u32, ecx: u32) -> i32 {
    crate::console::set_cursor(ebx as i32, ecx as i32);
    0
}

fn sys_trygetchar() -> i32 {
    match crate::arch::x86::keyboard::try_read() {
        Some(k) => k as i32,
        None => 0,
    }
}

fn sys_getticks() -> i32 {
    crate::arch::x86::pit::ticks() as i32
}

fn sys_sleep(ebx: u32) -> i32 {
    crate::arch::x86::pit::sleep_ticks(ebx);
    0
}

fn sys_getsize() -> i32 {
    let (cols, rows) = crate::console::get_size();
    (((cols as u32) & 0xFFFF) << 16 | ((rows as u32) & 0xFFFF)) as i32
}

fn sys_blit(ebx: u32, ecx: u32) -> i32 {
    if ebx == 0 {
        return 0;
    }
    let count = ecx as usize;
    let cells = unsafe { buf(ebx, count.saturating_mul(2)) };
    crate::console::blit(cells) as i32
}

fn sys_mouse_get(ebx: u32) -> i32 {
    if ebx == 0 {
        return -1;
    }
    let out = unsafe { buf_mut(ebx, 12) };
    let (x, y, buttons) = crate::arch::x86::mouse::position();
    out[0..4].copy_from_slice(&x.to_ne_bytes());
    out[4..8].copy_from_slice(&y.to_ne_bytes());
    out[8..12].copy_from_slice(&(buttons as i32).to_ne_bytes());
    0
}

fn sys_mouse_show(ebx: u32) -> i32 {
    crate::arch::x86::mouse::set_visible(ebx != 0);
    0
}

fn sys_gfx_info() -> i32 {
    match crate::graphics::info() {
        Some(info) if info.w != 0 && info.h != 0 => {
            (((info.w as u32) & 0xFFFF) << 16 | ((info.h as u32) & 0xFFFF)) as i32
        }
        _ => 0,
    }
}

fn sys_gfx_clear(ebx: u32) -> i32 {
    if crate::graphics::info().is_none() {
        return -1;
    }
    crate::graphics::clear(ebx);
    0
}

fn sys_gfx_putpixel(ebx: u32, ecx: u32, edx: u32) -> i32 {
    if crate::graphics::info().is_none() {
        return -1;
    }
    crate::graphics::put_pixel(ebx as i32, ecx as i32, edx);
    0
}

/// No counterpart in the firmware this was ported from; grounded by
/// analogy to `gfx_putpixel`/`gfx_clear` (syscalls 21-22), which already
/// expose the same per-pixel primitive this just calls in bulk.
fn sys_gfx_blit(ebx: u32) -> i32 {
    let Some(info) = crate::graphics::info() else { return -1 };
    if ebx == 0 {
        return -1;
    }
    let count = info.w as usize * info.h as usize;
    let bytes = unsafe { buf(ebx, count * 4) };
    // bytes.len() == count * 4, so this reinterpretation covers exactly
    // `count` u32 pixels with no out-of-bounds access.
    let pixel_slice = unsafe { core::slice::from_raw_parts(bytes.as_ptr() as *const u32, count) };
    crate::graphics::blit(pixel_slice);
    0
}

fn sys_unknown() -> i32 {
    crate::console::write(b"[SYSCALL] Unknown syscall!\n");
    -1
}

/// Route one `int 0x80` invocation to its handler. Syscall 2 (`exit`)
/// never returns to its caller; every other path returns a value that
/// goes straight back into `eax` by the trampoline in `arch::x86::syscall`.
pub fn dispatch(eax: u32, ebx: u32, ecx: u32, edx: u32) -> i32 {
    match eax {
        1 => sys_write(ebx),
        2 => sys_exit(),
        3 => sys_exec(ebx),
        4 => sys_getchar(),
        5 => sys_clear(),
        6 => sys_writefile(ebx, ecx, edx),
        7 => sys_listfiles(),
        8 => sys_readfile(ebx, ecx, edx),
        9 => sys_getarg(ebx, edx),
        10 => sys_put_at(ebx, ecx, edx),
        11 => sys_setcursor(ebx, ecx),
        12 => sys_trygetchar(),
        13 => sys_getticks(),
        14 => sys_sleep(ebx),
        15 => sys_getsize(),
        16 => sys_blit(ebx, ecx),
        17 => sys_mouse_get(ebx),
        18 => sys_mouse_show(ebx),
        19 => sys_enumfiles(ebx, ecx, edx),
        20 => sys_gfx_info(),
        21 => sys_gfx_clear(ebx),
        22 => sys_gfx_putpixel(ebx, ecx, edx),
        23 => sys_gfx_blit(ebx),
        _ => sys_unknown(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn getsize_packs_cols_and_rows_into_one_word() {
        let packed = sys_getsize();
        let cols = (packed as u32) >> 16;
        let rows = (packed as u32) & 0xFFFF;
        assert!(cols > 0 && rows > 0);
    }

    #[test]
    fn unknown_syscall_returns_sentinel() {
        assert_eq!(dispatch(9999, 0, 0, 0), -1);
    }

    #[test]
    fn write_with_null_pointer_is_a_no_op() {
        assert_eq!(sys_write(0), 0);
    }
}
