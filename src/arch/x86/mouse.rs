//! # PS/2 Mouse Driver
//!
//! IRQ12-driven, standard 3-byte packet protocol. Packet assembly
//! resynchronizes on the first byte of each packet (bit 3 must be set);
//! a byte that fails that check is discarded and the assembler waits for
//! the next one rather than risking a misaligned stream.
//!
//! Position reads (`position()`) are plain loads of the shared x/y/button
//! state with no sequence counter guarding them against a concurrent IRQ12
//! update - a caller can observe a torn (x, y) pair if the mouse moves
//! between the two loads. This matches the original firmware's behavior,
//! which never introduced one either; the single-threaded, single-core
//! execution model makes the torn read a cosmetic one-frame glitch rather
//! than a safety issue, so it is reproduced as-is rather than "fixed".

use spin::Mutex;

const PS2_DATA: u16 = 0x60;
const PS2_CMD: u16 = 0x64;
const PS2_STATUS: u16 = 0x64;

const STATUS_OUTPUT_FULL: u8 = 0x01;
const STATUS_INPUT_FULL: u8 = 0x02;

struct MouseState {
    x: i32,
    y: i32,
    buttons: u8,
    bound_w: i32,
    bound_h: i32,
    visible: bool,
    packet: [u8; 3],
    packet_index: usize,
}

static STATE: Mutex<MouseState> = Mutex::new(MouseState {
    x: 0, y: 0, buttons: 0, bound_w: 640, bound_h: 400, visible: true,
    packet: [0; 3], packet_index: 0,
});

fn wait_write_ready() {
    for _ in 0..100_000 {
        if unsafe { super::io::inb(PS2_STATUS) } & STATUS_INPUT_FULL == 0 {
            return;
        }
    }
}

fn wait_read_ready() {
    for _ in 0..100_000 {
        if unsafe { super::io::inb(PS2_STATUS) } & STATUS_OUTPUT_FULL != 0 {
            return;
        }
    }
}

unsafe fn mouse_write(value: u8) {
    wait_write_ready();
    super::io::outb(PS2_CMD, 0xD4);
    wait_write_ready();
    super::io::outb(PS2_DATA, value);
}

unsafe fn mouse_read() -> u8 {
    wait_read_ready();
    super::io::inb(PS2_DATA)
}

/// Bring up the aux (mouse) port and enable streaming reports.
///
/// `gfx_bounds` is `Some((w, h))` when a graphics framebuffer is active (the
/// cursor painter needs real bounds to clamp against); `None` falls back to
/// 640x400 with the painter disabled, matching the original behavior when
/// no graphics mode is available.
///
/// # Safety
/// Must run once during boot, after the 8042 controller is otherwise idle.
pub unsafe fn init(gfx_bounds: Option<(u32, u32)>) {
    wait_write_ready();
    super::io::outb(PS2_CMD, 0xA8);

    wait_write_ready();
    super::io::outb(PS2_CMD, 0x20);
    let mut config = mouse_read();
    config |= 0x02;
    config &= !0x20;

    wait_write_ready();
    super::io::outb(PS2_CMD, 0x60);
    wait_write_ready();
    super::io::outb(PS2_DATA, config);

    mouse_write(0xF6);
    let _ack = mouse_read();

    mouse_write(0xF4);
    let _ack = mouse_read();

    let mut state = STATE.lock();
    if let Some((w, h)) = gfx_bounds {
        state.bound_w = w as i32;
        state.bound_h = h as i32;
    } else {
        state.bound_w = 640;
        state.bound_h = 400;
        state.visible = false;
    }
}

fn clamp(v: i32, lo: i32, hi: i32) -> i32 {
    if v < lo { lo } else if v > hi { hi } else { v }
}

/// IRQ12 handler, registered into the fixed IRQ table during init.
pub fn irq_handler(_regs: &mut super::idt::Regs) {
    let byte = unsafe { super::io::inb(PS2_DATA) };
    let mut state = STATE.lock();

    if state.packet_index == 0 && byte & 0x08 == 0 {
        return;
    }

    state.packet[state.packet_index] = byte;
    state.packet_index += 1;

    if state.packet_index < 3 {
        return;
    }
    state.packet_index = 0;

    let packet = state.packet;
    let dx = packet[1] as i8 as i32;
    let dy = -(packet[2] as i8 as i32);
    let buttons = packet[0] & 0x07;

    let bw = state.bound_w;
    let bh = state.bound_h;
    state.x = clamp(state.x + dx, 0, bw.saturating_sub(1).max(0));
    state.y = clamp(state.y + dy, 0, bh.saturating_sub(1).max(0));
    state.buttons = buttons;
}

/// Current (x, y, buttons) snapshot. See the module doc for the tearing
/// caveat.
pub fn position() -> (i32, i32, u8) {
    let state = STATE.lock();
    (state.x, state.y, state.buttons)
}

/// Toggle whether the cursor painter draws the sprite at all.
pub fn set_visible(visible: bool) {
    STATE.lock().visible = visible;
}

pub fn is_visible() -> bool {
    STATE.lock().visible
}
