//! Text console: a grid of `{char, attribute}` cells shared by two back
//! ends - the legacy VGA text buffer, and an 8x16-glyph renderer over the
//! VBE framebuffer. Callers (the shell, the syscall layer) never know
//! which one is active; they only ever address cells by `(x, y)`.
//!
//! The graphics back end keeps a shadow copy of the grid so scrolling and
//! re-theming can repaint the whole screen from memory instead of reading
//! pixels back out of the framebuffer.

pub mod cursor;
pub mod vga;

use crate::graphics;
use spin::Mutex;

const MAX_COLS: usize = 200;
const MAX_ROWS: usize = 100;

const DEFAULT_PALETTE: [u32; 16] = [
    0x000000, 0x0000AA, 0x00AA00, 0x00AAAA,
    0xAA0000, 0xAA00AA, 0xAA5500, 0xAAAAAA,
    0x555555, 0x5555FF, 0x55FF55, 0x55FFFF,
    0xFF5555, 0xFF55FF, 0xFFFF55, 0xFFFFFF,
];

const DEFAULT_ATTR: u8 = 0x0F;

struct State {
    use_gfx: bool,
    cols: usize,
    rows: usize,
    cursor_x: usize,
    cursor_y: usize,
    text_attr: u8,
    fg_col: u32,
    bg_col: u32,
    palette: [u32; 16],
    screen: [[u8; MAX_COLS]; MAX_ROWS],
    attr: [[u8; MAX_COLS]; MAX_ROWS],
}

impl State {
    const fn new() -> Self {
        State {
            use_gfx: false,
            cols: 80,
            rows: 25,
            cursor_x: 0,
            cursor_y: 0,
            text_attr: DEFAULT_ATTR,
            fg_col: 0x00FF_FFFF,
            bg_col: 0x0000_0000,
            palette: DEFAULT_PALETTE,
            screen: [[b' '; MAX_COLS]; MAX_ROWS],
            attr: [[DEFAULT_ATTR; MAX_COLS]; MAX_ROWS],
        }
    }
}

static STATE: Mutex<State> = Mutex::new(State::new());

#[inline]
fn attr_fg(attr: u8) -> usize {
    (attr & 0x0F) as usize
}

#[inline]
fn attr_bg(attr: u8) -> usize {
    ((attr >> 4) & 0x0F) as usize
}

#[inline]
fn clamp(v: i32, lo: i32, hi: i32) -> i32 {
    if v < lo { lo } else if v > hi { hi } else { v }
}

fn redraw_all_gfx(state: &State) {
    for y in 0..state.rows {
        for x in 0..state.cols {
            let c = state.screen[y][x];
            let attr = state.attr[y][x];
            let fg = state.palette[attr_fg(attr)];
            let bg = state.palette[attr_bg(attr)];
            graphics::draw_char((x as i32) * graphics::CHAR_W, (y as i32) * graphics::CHAR_H, c, fg, bg);
        }
    }
}

fn clear_buffers(state: &mut State) {
    for y in 0..MAX_ROWS {
        for x in 0..MAX_COLS {
            state.screen[y][x] = b' ';
            state.attr[y][x] = state.text_attr;
        }
    }
    state.cursor_x = 0;
    state.cursor_y = 0;
}

/// Bring up the console in graphics or text mode. Computes the cell grid
/// from the active framebuffer resolution when `use_gfx` is true and a
/// mode was successfully probed; otherwise falls back to the fixed 80x25
/// VGA text grid.
pub fn init(use_gfx: bool) {
    let mut state = STATE.lock();
    state.use_gfx = use_gfx && graphics::info().is_some();

    if state.use_gfx {
        let info = graphics::info().expect("use_gfx implies graphics::info() is Some");
        state.cols = ((info.w as i32 / graphics::CHAR_W) as usize).min(MAX_COLS);
        state.rows = ((info.h as i32 / graphics::CHAR_H) as usize).min(MAX_ROWS);
        clear_buffers(&mut state);
        graphics::clear(state.bg_col);
        redraw_all_gfx(&state);
        cursor::set_enabled(true);
    } else {
        state.cols = vga::WIDTH;
        state.rows = vga::HEIGHT;
        clear_buffers(&mut state);
        vga::init();
        vga::clear(state.text_attr);
        cursor::set_enabled(false);
    }
}

pub fn clear() {
    let mut state = STATE.lock();
    clear_buffers(&mut state);
    if state.use_gfx {
        graphics::clear(state.bg_col);
        redraw_all_gfx(&state);
    } else {
        vga::clear(state.text_attr);
    }
}

pub fn get_size() -> (i32, i32) {
    let state = STATE.lock();
    (state.cols as i32, state.rows as i32)
}

pub fn set_cursor(x: i32, y: i32) {
    let mut state = STATE.lock();
    state.cursor_x = clamp(x, 0, state.cols as i32 - 1) as usize;
    state.cursor_y = clamp(y, 0, state.rows as i32 - 1) as usize;
}

fn scroll_up(state: &mut State) {
    for y in 0..state.rows - 1 {
        for x in 0..state.cols {
            state.screen[y][x] = state.screen[y + 1][x];
            state.attr[y][x] = state.attr[y + 1][x];
        }
    }
    let last = state.rows - 1;
    for x in 0..state.cols {
        state.screen[last][x] = b' ';
        state.attr[last][x] = state.text_attr;
    }

    if state.use_gfx {
        redraw_all_gfx(state);
    } else {
        vga::clear(state.text_attr);
        for y in 0..state.rows {
            for x in 0..state.cols {
                vga::putchar_at(x, y, state.screen[y][x], state.attr[y][x]);
            }
        }
    }
}

/// Write one character, honoring `\n` and `\b`, advancing the cursor and
/// scrolling when it runs off the bottom row.
pub fn putchar(c: u8) {
    let mut state = STATE.lock();

    match c {
        b'\n' => {
            state.cursor_x = 0;
            state.cursor_y += 1;
        }
        0x08 => {
            if state.cursor_x > 0 {
                state.cursor_x -= 1;
            } else if state.cursor_y > 0 {
                state.cursor_y -= 1;
                state.cursor_x = state.cols - 1;
            }
            let (x, y, attr) = (state.cursor_x, state.cursor_y, state.text_attr);
            state.screen[y][x] = b' ';
            state.attr[y][x] = attr;
            if state.use_gfx {
                graphics::draw_char((x as i32) * graphics::CHAR_W, (y as i32) * graphics::CHAR_H, b' ', state.fg_col, state.bg_col);
            } else {
                vga::putchar_at(x, y, b' ', attr);
            }
        }
        _ => {
            let (x, y, attr) = (state.cursor_x, state.cursor_y, state.text_attr);
            state.screen[y][x] = c;
            state.attr[y][x] = attr;
            if state.use_gfx {
                graphics::draw_char((x as i32) * graphics::CHAR_W, (y as i32) * graphics::CHAR_H, c, state.fg_col, state.bg_col);
            } else {
                vga::putchar_at(x, y, c, attr);
            }
            state.cursor_x += 1;
            if state.cursor_x >= state.cols {
                state.cursor_x = 0;
                state.cursor_y += 1;
            }
        }
    }

    if state.cursor_y >= state.rows {
        scroll_up(&mut state);
        state.cursor_y = state.rows - 1;
    }
}

pub fn write(s: &[u8]) {
    for &c in s {
        putchar(c);
    }
}

pub fn put_at(x: i32, y: i32, c: u8) {
    let attr = STATE.lock().text_attr;
    put_at_color(x, y, c, attr);
}

pub fn put_at_color(x: i32, y: i32, c: u8, attr: u8) {
    let mut state = STATE.lock();
    let x = clamp(x, 0, state.cols as i32 - 1) as usize;
    let y = clamp(y, 0, state.rows as i32 - 1) as usize;
    state.screen[y][x] = c;
    state.attr[y][x] = attr;

    if state.use_gfx {
        let fg = state.palette[attr_fg(attr)];
        let bg = state.palette[attr_bg(attr)];
        graphics::draw_char((x as i32) * graphics::CHAR_W, (y as i32) * graphics::CHAR_H, c, fg, bg);
    } else {
        vga::putchar_at(x, y, c, attr);
    }
}

/// Bulk write cells row-major from a packed `(char, attr)` byte stream,
/// clipped to the current grid size. Returns the number of cells written,
/// and parks the cursor in the bottom-right corner afterward so it does
/// not sit in the middle of whatever was just drawn.
pub fn blit(cells: &[u8]) -> usize {
    let (cols, rows) = get_size();
    let max = (cols as usize) * (rows as usize);
    let count = (cells.len() / 2).min(max);

    for i in 0..count {
        let x = (i % cols as usize) as i32;
        let y = (i / cols as usize) as i32;
        put_at_color(x, y, cells[i * 2], cells[i * 2 + 1]);
    }

    set_cursor(cols - 1, rows - 1);
    count
}

/// Repaint the whole visible grid from the shadow buffers, e.g. after a
/// palette change.
pub fn redraw() {
    let state = STATE.lock();
    if state.use_gfx {
        redraw_all_gfx(&state);
    } else {
        vga::clear(state.text_attr);
        for y in 0..state.rows {
            for x in 0..state.cols {
                vga::putchar_at(x, y, state.screen[y][x], state.attr[y][x]);
            }
        }
    }
}

/// Override one palette slot (index 0-15) with an RGB value. Used to
/// remap the 16-color palette consistently with the text-mode attribute
/// encoding; a zero RGB value is treated as "leave unset" the same way
/// the original firmware's theme hook did.
pub fn set_palette_entry(index: u8, rgb: u32) {
    if index < 16 && rgb != 0 {
        STATE.lock().palette[index as usize] = rgb;
    }
}
