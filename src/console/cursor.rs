//! Mouse cursor painter.
//!
//! Runs from the PIT tick handler, not from IRQ12: the mouse driver only
//! tracks position and button state, and knows nothing about the
//! framebuffer. This module owns the saved-pixels-under-the-cursor state
//! and does the actual erase/redraw, throttled so a stationary cursor
//! doesn't repaint every single tick.

use crate::arch::x86::mouse;
use crate::graphics;
use spin::Mutex;

const CUR_W: usize = 16;
const CUR_H: usize = 16;

/// Hand-drawn arrow sprite: 1 = draw white, 0 = leave the saved pixel
/// underneath untouched.
const MASK: [[u8; CUR_W]; CUR_H] = [
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [1, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0],
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0],
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0],
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0],
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0],
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0],
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0],
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0],
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
];

struct State {
    saved: [u32; CUR_W * CUR_H],
    last_x: i32,
    last_y: i32,
    have_saved: bool,
    ticks_since_redraw: u32,
}

static STATE: Mutex<State> = Mutex::new(State {
    saved: [0; CUR_W * CUR_H],
    last_x: -10_000,
    last_y: -10_000,
    have_saved: false,
    ticks_since_redraw: 0,
});

static ENABLED: core::sync::atomic::AtomicBool = core::sync::atomic::AtomicBool::new(false);

/// Arm the painter; only meaningful once a graphics mode is active.
pub fn set_enabled(enabled: bool) {
    ENABLED.store(enabled, core::sync::atomic::Ordering::Relaxed);
}

fn erase(state: &mut State, w: i32, h: i32) {
    if !state.have_saved {
        return;
    }
    let width = if state.last_x + CUR_W as i32 > w { w - state.last_x } else { CUR_W as i32 };
    let height = if state.last_y + CUR_H as i32 > h { h - state.last_y } else { CUR_H as i32 };
    if width <= 0 || height <= 0 {
        return;
    }
    for j in 0..height {
        for i in 0..width {
            graphics::put_pixel(state.last_x + i, state.last_y + j, state.saved[(j * CUR_W as i32 + i) as usize]);
        }
    }
}

fn draw_at(state: &mut State, x: i32, y: i32, w: i32, h: i32) {
    let width = if x + CUR_W as i32 > w { w - x } else { CUR_W as i32 };
    let height = if y + CUR_H as i32 > h { h - y } else { CUR_H as i32 };
    if width <= 0 || height <= 0 {
        state.have_saved = false;
        return;
    }
    for j in 0..height {
        for i in 0..width {
            state.saved[(j * CUR_W as i32 + i) as usize] = graphics::get_pixel(x + i, y + j);
        }
    }
    for j in 0..height {
        for i in 0..width {
            if MASK[j as usize][i as usize] != 0 {
                graphics::put_pixel(x + i, y + j, 0x00FF_FFFF);
            }
        }
    }
    state.have_saved = true;
    state.last_x = x;
    state.last_y = y;
}

/// Called from the PIT timer handler on every tick.
pub fn on_timer_tick() {
    if !ENABLED.load(core::sync::atomic::Ordering::Relaxed) || !mouse::is_visible() {
        return;
    }
    let Some(info) = graphics::info() else { return };
    let (x, y, _buttons) = mouse::position();

    let mut state = STATE.lock();
    state.ticks_since_redraw += 1;
    let moved = x != state.last_x || y != state.last_y;
    if !moved && state.ticks_since_redraw < 9 {
        return;
    }
    state.ticks_since_redraw = 0;

    erase(&mut state, info.w as i32, info.h as i32);
    draw_at(&mut state, x, y, info.w as i32, info.h as i32);
}
