//! ASOFS - a flat on-disk filesystem backed directly by the ATA PIO driver.
//!
//! One superblock at a fixed LBA holds a fixed-capacity file table; there
//! is no directory hierarchy and no block allocator beyond "the next free
//! LBA". Overwriting an existing file never revalidates that its new size
//! still fits the space originally allotted to it - the original firmware
//! never did either, so a write that grows a file past its first
//! allocation silently clobbers whatever file comes next on disk. This is
//! a known, documented hazard, not an oversight of the port.

use crate::arch::x86::ata::{self, SECTOR_SIZE};
use crate::lib::error::{Error, Result};
use spin::Mutex;

pub const SUPERBLOCK_LBA: u32 = 50;
pub const ASOFS_MAGIC: u32 = 0x4153_4F46;
pub const MAX_FILES: usize = 16;
pub const NAME_LEN: usize = 16;

/// Physical base address of the single application slot. Fixed and
/// position-dependent: loaded programs are linked to run from here.
pub const APP_BASE: usize = 0x0030_0000;

#[repr(C, packed)]
#[derive(Clone, Copy)]
struct FileEntry {
    name: [u8; NAME_LEN],
    start_lba: u32,
    size: u32,
}

#[repr(C, packed)]
#[derive(Clone, Copy)]
struct SuperblockRaw {
    magic: u32,
    file_count: u32,
    next_free_lba: u32,
    files: [FileEntry; MAX_FILES],
}

struct Fs {
    sb: SuperblockRaw,
}

static FS: Mutex<Fs> = Mutex::new(Fs {
    sb: SuperblockRaw {
        magic: 0,
        file_count: 0,
        next_free_lba: 0,
        files: [FileEntry { name: [0; NAME_LEN], start_lba: 0, size: 0 }; MAX_FILES],
    },
});

fn name_eq(stored: &[u8; NAME_LEN], query: &[u8]) -> bool {
    let stored_len = stored.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
    let query_len = query.iter().position(|&b| b == 0).unwrap_or(query.len());
    stored_len == query_len && stored[..stored_len] == query[..query_len]
}

fn make_name(query: &[u8]) -> [u8; NAME_LEN] {
    let mut name = [0u8; NAME_LEN];
    let len = query.iter().position(|&b| b == 0).unwrap_or(query.len()).min(NAME_LEN - 1);
    name[..len].copy_from_slice(&query[..len]);
    name
}

fn sectors_for(size: u32) -> u32 {
    (size + SECTOR_SIZE as u32 - 1) / SECTOR_SIZE as u32
}

/// Read `size` bytes starting at `start_lba`, one sector at a time; the
/// trailing partial sector is read whole into a scratch buffer and only
/// the requested tail copied out.
fn read_data(start_lba: u32, dest: &mut [u8], size: u32) -> Result<()> {
    let mut remaining = size as usize;
    let mut lba = start_lba;
    let mut offset = 0usize;
    let mut scratch = [0u8; SECTOR_SIZE];

    while remaining > 0 {
        ata::read_sectors(lba, 1, &mut scratch).map_err(Error::Disk)?;
        let to_copy = remaining.min(SECTOR_SIZE);
        dest[offset..offset + to_copy].copy_from_slice(&scratch[..to_copy]);
        remaining -= to_copy;
        offset += to_copy;
        lba += 1;
    }
    Ok(())
}

/// Write `data` starting at `start_lba`, zero-padding the trailing
/// sector's scratch buffer before writing it so no stale disk content
/// leaks past the end of the file.
fn write_data(start_lba: u32, data: &[u8]) -> Result<()> {
    let mut remaining = data.len();
    let mut lba = start_lba;
    let mut offset = 0usize;

    while remaining > 0 {
        let mut scratch = [0u8; SECTOR_SIZE];
        let to_copy = remaining.min(SECTOR_SIZE);
        scratch[..to_copy].copy_from_slice(&data[offset..offset + to_copy]);
        ata::write_sectors(lba, 1, &scratch).map_err(Error::Disk)?;
        remaining -= to_copy;
        offset += to_copy;
        lba += 1;
    }
    Ok(())
}

fn write_superblock(fs: &Fs) -> Result<()> {
    let mut buf = [0u8; SECTOR_SIZE];
    let raw = unsafe {
        core::slice::from_raw_parts(
            &fs.sb as *const SuperblockRaw as *const u8,
            core::mem::size_of::<SuperblockRaw>(),
        )
    };
    buf[..raw.len()].copy_from_slice(raw);
    ata::write_sectors(SUPERBLOCK_LBA, 1, &buf).map_err(Error::Disk)
}

/// Read the superblock, verify its magic, and populate the in-memory
/// copy. Disk I/O failure and a bad magic are reported as distinct
/// errors, matching the original firmware's two separate negative codes.
pub fn load_superblock() -> Result<()> {
    let mut buf = [0u8; SECTOR_SIZE];
    ata::read_sectors(SUPERBLOCK_LBA, 1, &mut buf).map_err(|code| {
        crate::serial_println!("[ASOFS] Error during superblock reading!");
        Error::Disk(code)
    })?;

    let raw: SuperblockRaw = unsafe { core::ptr::read_unaligned(buf.as_ptr() as *const SuperblockRaw) };

    if raw.magic != ASOFS_MAGIC {
        crate::serial_println!("[ASOFS] Wrong magic number, FS not valid!");
        return Err(Error::BadMagic);
    }

    FS.lock().sb = raw;
    crate::serial_println!("[ASOFS] Correctly read superblock!");
    Ok(())
}

fn write_decimal(mut value: u32) {
    if value == 0 {
        crate::console::write(b"0");
        return;
    }
    let mut digits = [0u8; 10];
    let mut n = 0;
    while value > 0 {
        digits[n] = b'0' + (value % 10) as u8;
        value /= 10;
        n += 1;
    }
    let mut rev = [0u8; 10];
    for i in 0..n {
        rev[i] = digits[n - 1 - i];
    }
    crate::console::write(&rev[..n]);
}

/// Print the file table to the console (syscall #7, `listfiles`).
pub fn list_files() {
    crate::console::write(b"[ASOFS] Disk files:\n");
    let fs = FS.lock();
    let count = fs.sb.file_count as usize;
    for entry in fs.sb.files.iter().take(count) {
        crate::console::write(b" - ");
        let len = entry.name.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
        crate::console::write(&entry.name[..len]);
        crate::console::write(b" (");
        write_decimal(entry.size);
        crate::console::write(b" bytes)\n");
    }
}

/// Copy the content of `name` into `dest`, returning the number of bytes
/// copied. `dest` bounds the copy: unlike the original firmware (which
/// always wrote the full file size into the caller's buffer regardless of
/// its stated capacity), this never writes past `dest.len()`.
pub fn load(name: &[u8], dest: &mut [u8]) -> Result<usize> {
    let entry = {
        let fs = FS.lock();
        let count = fs.sb.file_count as usize;
        fs.sb.files[..count].iter().find(|e| name_eq(&e.name, name)).copied().ok_or(Error::NotFound)?
    };

    if entry.size == 0 {
        return Ok(0);
    }

    let to_read = (entry.size as usize).min(dest.len());
    if to_read == entry.size as usize {
        read_data(entry.start_lba, &mut dest[..to_read], entry.size)?;
        return Ok(to_read);
    }

    // dest is smaller than the file: read sector-by-sector and stop once
    // dest is full, rather than materializing the whole file on the stack.
    let mut remaining = entry.size as usize;
    let mut lba = entry.start_lba;
    let mut offset = 0usize;
    let mut scratch = [0u8; SECTOR_SIZE];
    while offset < to_read && remaining > 0 {
        ata::read_sectors(lba, 1, &mut scratch).map_err(Error::Disk)?;
        let sector_bytes = remaining.min(SECTOR_SIZE);
        let copy_now = sector_bytes.min(to_read - offset);
        dest[offset..offset + copy_now].copy_from_slice(&scratch[..copy_now]);
        offset += copy_now;
        remaining -= sector_bytes;
        lba += 1;
    }
    Ok(offset)
}

/// Write `data` under `name`: overwrite in place if the name already
/// exists (no relocation, no capacity check - see the module-level hazard
/// note), otherwise append at `next_free_lba` and advance it. The
/// superblock is always persisted afterward.
pub fn write(name: &[u8], data: &[u8]) -> Result<()> {
    if data.is_empty() {
        return Err(Error::InvalidArgument);
    }

    let mut fs = FS.lock();
    let count = fs.sb.file_count as usize;
    let existing = fs.sb.files[..count].iter().position(|e| name_eq(&e.name, name));

    let (start_lba, is_new) = match existing {
        Some(idx) => (fs.sb.files[idx].start_lba, false),
        None => {
            if count >= MAX_FILES {
                crate::serial_println!("[ASOFS] File table full!");
                return Err(Error::TableFull);
            }
            (fs.sb.next_free_lba, true)
        }
    };

    write_data(start_lba, data)?;

    if is_new {
        let idx = count;
        fs.sb.files[idx] = FileEntry { name: make_name(name), start_lba, size: data.len() as u32 };
        fs.sb.file_count += 1;
        fs.sb.next_free_lba = start_lba + sectors_for(data.len() as u32);
        crate::serial_println!("[ASOFS] Created file");
    } else {
        let idx = existing.unwrap();
        fs.sb.files[idx].size = data.len() as u32;
        crate::serial_println!("[ASOFS] Updated file");
    }

    write_superblock(&fs)
}

/// Copy up to `max_entries` names (each NUL-terminated within `name_max`
/// bytes) into `out`, laid out as `max_entries` fixed-width slots.
/// Returns the number of entries written.
pub fn enumerate(out: &mut [u8], max_entries: usize, name_max: usize) -> Result<usize> {
    if max_entries == 0 || name_max <= 1 || out.len() < max_entries * name_max {
        return Err(Error::InvalidArgument);
    }

    let fs = FS.lock();
    let count = (fs.sb.file_count as usize).min(max_entries);
    let copy_len = NAME_LEN.min(name_max - 1);

    for (i, entry) in fs.sb.files[..count].iter().enumerate() {
        let slot = &mut out[i * name_max..i * name_max + name_max];
        slot[..copy_len].copy_from_slice(&entry.name[..copy_len]);
        for b in &mut slot[copy_len..] {
            *b = 0;
        }
    }

    Ok(count)
}

/// Find `name`, load it into the fixed application slot, clear the
/// console, and call the entry point (the slot's first byte) as an
/// ordinary function. Returns once the loaded program returns normally;
/// an `exit` syscall from inside it instead escapes straight back to the
/// shell loop without ever returning through this call chain.
pub fn run(name: &[u8]) {
    let entry = {
        let fs = FS.lock();
        let count = fs.sb.file_count as usize;
        fs.sb.files[..count].iter().find(|e| name_eq(&e.name, name)).copied()
    };

    let Some(entry) = entry else {
        crate::console::write(b"[ASOFS] App not found: ");
        crate::console::write(name);
        crate::console::write(b"\n");
        return;
    };

    // SAFETY: APP_BASE is a fixed, reserved physical region below 4MiB
    // that nothing else in this kernel writes to; no paging is active so
    // this is a plain identity-mapped memory window.
    let slot = unsafe { core::slice::from_raw_parts_mut(APP_BASE as *mut u8, entry.size as usize) };
    if entry.size > 0 && read_data(entry.start_lba, slot, entry.size).is_err() {
        crate::console::write(b"[ASOFS] Error during app loading!\n");
        return;
    }

    crate::console::write(b"[ASOFS] App loaded in memory. Starting...\n");
    crate::console::clear();

    // SAFETY: the loaded bytes are trusted to be a valid freestanding
    // program linked to run from APP_BASE with the C calling convention;
    // nothing here can verify that.
    let entry_fn: extern "C" fn() = unsafe { core::mem::transmute(APP_BASE as usize) };
    entry_fn();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_eq_matches_nul_terminated_prefix() {
        let mut stored = [0u8; NAME_LEN];
        stored[..5].copy_from_slice(b"hello");
        assert!(name_eq(&stored, b"hello"));
        assert!(!name_eq(&stored, b"hell"));
        assert!(!name_eq(&stored, b"hello2"));
    }

    #[test]
    fn make_name_truncates_and_nul_pads() {
        let name = make_name(b"this-name-is-too-long-for-the-field");
        assert_eq!(name.len(), NAME_LEN);
        assert_eq!(name[NAME_LEN - 1], 0);
    }

    #[test]
    fn sectors_for_rounds_up() {
        assert_eq!(sectors_for(0), 0);
        assert_eq!(sectors_for(1), 1);
        assert_eq!(sectors_for(SECTOR_SIZE as u32), 1);
        assert_eq!(sectors_for(SECTOR_SIZE as u32 + 1), 2);
    }
}
