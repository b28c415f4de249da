//! VBE linear framebuffer access.
//!
//! The bootloader (out of scope for this crate) leaves a VBE mode-info
//! block at a fixed physical address before jumping into the kernel. Since
//! this kernel never enables paging, physical and virtual addresses
//! coincide, so reading it and drawing into the framebuffer it describes is
//! just raw pointer arithmetic guarded by `read_volatile`/`write_volatile`.
//!
//! Only 32bpp (packed 0x00RRGGBB, stored in memory as little-endian BGRX)
//! modes are supported; anything else is reported as [`Error::NoGraphics`]
//! and the caller falls back to the VGA text console.

use crate::lib::error::{Error, Result};
use spin::Once;

const MODEINFO_ADDR: usize = 0x0008_0000;
const FONT8X16_ADDR: usize = 0x0008_0100;

const OFF_BYTES_PER_SCANLINE: usize = 0x10;
const OFF_X_RESOLUTION: usize = 0x12;
const OFF_Y_RESOLUTION: usize = 0x14;
const OFF_BITS_PER_PIXEL: usize = 0x19;
const OFF_PHYS_BASE_PTR: usize = 0x28;
const OFF_LIN_BYTES_PER_SCANLINE: usize = 0x58;

#[derive(Debug, Clone, Copy)]
pub struct GfxInfo {
    pub fb: u32,
    pub w: u16,
    pub h: u16,
    pub pitch: u16,
    pub bpp: u8,
}

static INFO: Once<GfxInfo> = Once::new();

unsafe fn rd16(addr: usize) -> u16 {
    core::ptr::read_volatile(addr as *const u16)
}

unsafe fn rd32(addr: usize) -> u32 {
    core::ptr::read_volatile(addr as *const u32)
}

/// Read the mode-info block once and cache it. Returns the parsed info on
/// success; `Err(Error::NoGraphics)` if the mode is not 32bpp.
pub fn init() -> Result<GfxInfo> {
    let info = unsafe {
        let w = rd16(MODEINFO_ADDR + OFF_X_RESOLUTION);
        let h = rd16(MODEINFO_ADDR + OFF_Y_RESOLUTION);
        let bpp = core::ptr::read_volatile((MODEINFO_ADDR + OFF_BITS_PER_PIXEL) as *const u8);
        let phys = rd32(MODEINFO_ADDR + OFF_PHYS_BASE_PTR);
        let lin_pitch = rd32(MODEINFO_ADDR + OFF_LIN_BYTES_PER_SCANLINE);
        let pitch = rd16(MODEINFO_ADDR + OFF_BYTES_PER_SCANLINE);

        GfxInfo {
            fb: phys,
            w,
            h,
            pitch: if lin_pitch != 0 { lin_pitch as u16 } else { pitch },
            bpp,
        }
    };

    if info.bpp != 32 {
        return Err(Error::NoGraphics);
    }

    INFO.call_once(|| info);
    Ok(info)
}

/// The cached mode info, if [`init`] previously succeeded.
pub fn info() -> Option<GfxInfo> {
    INFO.get().copied()
}

fn fb_ptr() -> Option<*mut u8> {
    INFO.get().map(|i| i.fb as *mut u8)
}

/// `0x00RRGGBB` -> the 0x00BBGGRR word the linear framebuffer expects.
#[inline]
fn pack_bgr(rgb: u32) -> u32 {
    ((rgb & 0x0000_00FF) << 16) | (rgb & 0x0000_FF00) | ((rgb & 0x00FF_0000) >> 16)
}

unsafe fn put32(fb: *mut u8, pitch: u16, x: i32, y: i32, bgr: u32) {
    let offset = y as usize * pitch as usize + x as usize * 4;
    core::ptr::write_volatile(fb.add(offset) as *mut u32, bgr);
}

/// Fill the entire framebuffer with one packed RGB color.
pub fn clear(rgb: u32) {
    let Some(info) = INFO.get().copied() else { return };
    let Some(fb) = fb_ptr() else { return };
    let bgr = pack_bgr(rgb);
    for y in 0..info.h as i32 {
        for x in 0..info.w as i32 {
            unsafe { put32(fb, info.pitch, x, y, bgr) };
        }
    }
}

/// Plot a single pixel; silently clipped if out of bounds.
pub fn put_pixel(x: i32, y: i32, rgb: u32) {
    let Some(info) = INFO.get().copied() else { return };
    if x < 0 || y < 0 || x as u32 >= info.w as u32 || y as u32 >= info.h as u32 {
        return;
    }
    if let Some(fb) = fb_ptr() {
        unsafe { put32(fb, info.pitch, x, y, pack_bgr(rgb)) };
    }
}

/// Read a pixel back out, converting the stored BGRX word to 0x00RRGGBB.
pub fn get_pixel(x: i32, y: i32) -> u32 {
    let Some(info) = INFO.get().copied() else { return 0 };
    if x < 0 || y < 0 || x as u32 >= info.w as u32 || y as u32 >= info.h as u32 {
        return 0;
    }
    let Some(fb) = fb_ptr() else { return 0 };
    let bgr = unsafe {
        let offset = y as usize * info.pitch as usize + x as usize * 4;
        core::ptr::read_volatile(fb.add(offset) as *const u32)
    };
    ((bgr & 0x0000_00FF) << 16) | (bgr & 0x0000_FF00) | ((bgr & 0x00FF_0000) >> 16)
}

/// The 8x16 glyph for `c`, MSB-first per row.
fn glyph(c: u8) -> &'static [u8; 16] {
    unsafe { &*((FONT8X16_ADDR + c as usize * 16) as *const [u8; 16]) }
}

pub const CHAR_W: i32 = 8;
pub const CHAR_H: i32 = 16;

/// Draw one glyph at pixel coordinates `(x, y)` (not cell coordinates).
pub fn draw_char(x: i32, y: i32, c: u8, fg: u32, bg: u32) {
    let g = glyph(c);
    for dy in 0..16i32 {
        let bits = g[dy as usize];
        for dx in 0..8i32 {
            let color = if bits & (0x80 >> dx) != 0 { fg } else { bg };
            put_pixel(x + dx, y + dy, color);
        }
    }
}

/// Copy up to `w * h` packed-RGB pixels from `pixels` into the framebuffer
/// starting at (0, 0), row-major, clipped to whichever of the caller's
/// buffer or the active mode is smaller. Grounded by analogy to
/// `gfx_putpixel`/`gfx_clear` - the original firmware has no bulk-blit
/// syscall, but the primitive backing it (`put32` per pixel) is the same
/// one those use.
pub fn blit(pixels: &[u32]) {
    let Some(info) = INFO.get().copied() else { return };
    let total = (info.w as usize) * (info.h as usize);
    let count = pixels.len().min(total);
    let w = info.w as usize;
    for (i, &px) in pixels.iter().take(count).enumerate() {
        let x = (i % w) as i32;
        let y = (i / w) as i32;
        put_pixel(x, y, px);
    }
}
