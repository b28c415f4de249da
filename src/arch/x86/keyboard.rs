//! # PS/2 Keyboard Driver
//!
//! Scancode Set 1, IRQ1-driven. Each interrupt reads one byte from the 8042
//! data port, decodes it against a small piece of one-byte lookahead state
//! (the E0 prefix flag and the live shift state), and pushes at most one
//! decoded key onto a 128-slot ring buffer. The buffer drops new keys
//! silently once full rather than overwriting older, unread ones - a
//! slower consumer loses the newest keystrokes, not the oldest.

use heapless::spsc::Queue;
use spin::Mutex;

const DATA_PORT: u16 = 0x60;

const LSHIFT_MAKE: u8 = 0x2A;
const RSHIFT_MAKE: u8 = 0x36;
const LSHIFT_BREAK: u8 = 0xAA;
const RSHIFT_BREAK: u8 = 0xB6;
const E0_PREFIX: u8 = 0xE0;

/// Synthetic codes for keys with no ASCII representation, matching the
/// firmware's scheme of mapping E0-prefixed scancodes into the printable
/// range above ASCII rather than inventing a separate enum.
pub const KEY_LEFT: u8 = 0x90;
pub const KEY_RIGHT: u8 = 0x91;
pub const KEY_UP: u8 = 0x92;
pub const KEY_DOWN: u8 = 0x93;

const SCANCODE_MAP: [u8; 128] = build_map(false);
const SCANCODE_MAP_SHIFT: [u8; 128] = build_map(true);

const fn build_map(shift: bool) -> [u8; 128] {
    let mut map = [0u8; 128];
    let pairs: [(u8, u8, u8); 48] = [
        (0x01, 0x1B, 0x1B), (0x02, b'1', b'!'), (0x03, b'2', b'@'), (0x04, b'3', b'#'),
        (0x05, b'4', b'$'), (0x06, b'5', b'%'), (0x07, b'6', b'^'), (0x08, b'7', b'&'),
        (0x09, b'8', b'*'), (0x0A, b'9', b'('), (0x0B, b'0', b')'), (0x0C, b'-', b'_'),
        (0x0D, b'=', b'+'), (0x0E, 0x08, 0x08), (0x0F, b'\t', b'\t'),
        (0x10, b'q', b'Q'), (0x11, b'w', b'W'), (0x12, b'e', b'E'), (0x13, b'r', b'R'),
        (0x14, b't', b'T'), (0x15, b'y', b'Y'), (0x16, b'u', b'U'), (0x17, b'i', b'I'),
        (0x18, b'o', b'O'), (0x19, b'p', b'P'), (0x1A, b'[', b'{'), (0x1B, b']', b'}'),
        (0x1C, b'\n', b'\n'),
        (0x1E, b'a', b'A'), (0x1F, b's', b'S'), (0x20, b'd', b'D'), (0x21, b'f', b'F'),
        (0x22, b'g', b'G'), (0x23, b'h', b'H'), (0x24, b'j', b'J'), (0x25, b'k', b'K'),
        (0x26, b'l', b'L'), (0x27, b';', b':'), (0x28, b'\'', b'"'), (0x29, b'`', b'~'),
        (0x2B, b'\\', b'|'),
        (0x2C, b'z', b'Z'), (0x2D, b'x', b'X'), (0x2E, b'c', b'C'), (0x2F, b'v', b'V'),
        (0x30, b'b', b'B'), (0x31, b'n', b'N'), (0x32, b'm', b'M'), (0x33, b',', b'<'),
        (0x34, b'.', b'>'), (0x35, b'/', b'?'),
    ];
    let mut i = 0;
    while i < pairs.len() {
        let (sc, normal, shifted) = pairs[i];
        map[sc as usize] = if shift { shifted } else { normal };
        i += 1;
    }
    map[0x39] = b' ';
    map
}

struct KeyboardState {
    shift: bool,
    e0_pending: bool,
}

static STATE: Mutex<KeyboardState> = Mutex::new(KeyboardState { shift: false, e0_pending: false });
static RING: Mutex<Queue<u8, 129>> = Mutex::new(Queue::new());

/// Decode one scancode byte from IRQ1 context, pushing at most one
/// character onto the ring buffer. Called from the registered IRQ1
/// handler, never directly.
pub fn on_scancode(scancode: u8) {
    let mut state = STATE.lock();

    if scancode == E0_PREFIX {
        state.e0_pending = true;
        return;
    }

    let e0 = state.e0_pending;
    state.e0_pending = false;

    match scancode {
        LSHIFT_MAKE | RSHIFT_MAKE => { state.shift = true; return; }
        LSHIFT_BREAK | RSHIFT_BREAK => { state.shift = false; return; }
        _ => {}
    }

    let is_break = scancode & 0x80 != 0;
    if is_break {
        return;
    }

    let key = if e0 {
        match scancode {
            0x4B => KEY_LEFT,
            0x4D => KEY_RIGHT,
            0x48 => KEY_UP,
            0x50 => KEY_DOWN,
            _ => return,
        }
    } else {
        let code = scancode & 0x7F;
        if code as usize >= 128 {
            return;
        }
        let mapped = if state.shift { SCANCODE_MAP_SHIFT[code as usize] } else { SCANCODE_MAP[code as usize] };
        if mapped == 0 {
            return;
        }
        mapped
    };

    drop(state);
    let _ = RING.lock().enqueue(key);
}

/// IRQ1 handler, registered into the fixed IRQ table during init.
pub fn irq_handler(_regs: &mut super::idt::Regs) {
    let scancode = unsafe { super::io::inb(DATA_PORT) };
    on_scancode(scancode);
}

/// True if a decoded key is waiting to be read.
pub fn available() -> bool {
    !RING.lock().is_empty()
}

/// Pop the next decoded key, if any (non-blocking).
pub fn try_read() -> Option<u8> {
    RING.lock().dequeue()
}

/// Block (parking the CPU with `hlt`) until a key is available, then
/// return it.
pub fn read_blocking() -> u8 {
    loop {
        if let Some(k) = try_read() {
            return k;
        }
        unsafe { core::arch::asm!("hlt") };
    }
}

/// Read a line into `buf`, blocking until Enter. Handles backspace.
/// Returns the number of bytes written (excluding the newline). Present
/// for parity with the original firmware's `kbd_readline`; nothing in the
/// shell loop currently calls it, but it is a reasonable building block for
/// an interactive app that wants line input instead of raw `getchar`.
pub fn read_line(buf: &mut [u8]) -> usize {
    let mut len = 0;
    loop {
        let c = read_blocking();
        match c {
            b'\n' => return len,
            0x08 => {
                if len > 0 {
                    len -= 1;
                }
            }
            _ if len < buf.len() => {
                buf[len] = c;
                len += 1;
            }
            _ => {}
        }
    }
}
