//! # ATA PIO disk driver
//!
//! Polled (not interrupt-driven) PIO access to the primary ATA channel,
//! 28-bit LBA addressing, one drive. This is the sole storage primitive
//! ASOFS is built on; nothing here knows about filesystem structure.
//!
//! Every failure path returns a distinct negative code rather than a
//! single generic I/O error, mirroring the original driver's numbering so
//! that a diagnostic dump of a failing read/write is immediately
//! recognizable: -10 not-busy timeout before drive select, -11 DRQ wait
//! failure, -12/-13 write-completion status/timeout, -14 post-write DRQ
//! wait failure, -15 post-cache-flush BSY wait failure.

use super::io::{inb, inw, outb, outw};

pub const SECTOR_SIZE: usize = 512;

const DATA: u16 = 0x1F0;
const SECTOR_COUNT: u16 = 0x1F2;
const LBA0: u16 = 0x1F3;
const LBA1: u16 = 0x1F4;
const LBA2: u16 = 0x1F5;
const DRIVE_HEAD: u16 = 0x1F6;
const STATUS_CMD: u16 = 0x1F7;
const ALT_STATUS: u16 = 0x3F6;

const CMD_READ: u8 = 0x20;
const CMD_WRITE: u8 = 0x30;
const CMD_CACHE_FLUSH: u8 = 0xE7;

const STATUS_ERR: u8 = 0x01;
const STATUS_DRQ: u8 = 0x08;
const STATUS_DF: u8 = 0x20;
const STATUS_BSY: u8 = 0x80;

const TIMEOUT_ITERS: u32 = 1_000_000;

unsafe fn delay_400ns() {
    for _ in 0..4 {
        inb(ALT_STATUS);
    }
}

unsafe fn wait_not_busy() -> bool {
    for _ in 0..TIMEOUT_ITERS {
        if inb(STATUS_CMD) & STATUS_BSY == 0 {
            return true;
        }
    }
    false
}

unsafe fn wait_drq() -> Result<(), i32> {
    for _ in 0..TIMEOUT_ITERS {
        let status = inb(STATUS_CMD);
        if status & STATUS_ERR != 0 || status & STATUS_DF != 0 {
            return Err(-11);
        }
        if status & STATUS_DRQ != 0 {
            return Ok(());
        }
    }
    Err(-11)
}

unsafe fn select_drive(lba: u32) -> Result<(), i32> {
    if !wait_not_busy() {
        return Err(-10);
    }
    outb(DRIVE_HEAD, 0xE0 | (((lba >> 24) & 0x0F) as u8));
    delay_400ns();
    Ok(())
}

unsafe fn setup_lba(lba: u32, sector_count: u8) {
    outb(SECTOR_COUNT, sector_count);
    outb(LBA0, (lba & 0xFF) as u8);
    outb(LBA1, ((lba >> 8) & 0xFF) as u8);
    outb(LBA2, ((lba >> 16) & 0xFF) as u8);
}

/// Read `sectors` 512-byte sectors starting at `lba` into `buf`.
/// `buf.len()` must be at least `sectors * 512`.
pub fn read_sectors(lba: u32, sectors: u8, buf: &mut [u8]) -> Result<(), i32> {
    unsafe {
        select_drive(lba)?;
        setup_lba(lba, sectors);
        outb(STATUS_CMD, CMD_READ);

        for s in 0..sectors as usize {
            wait_drq()?;
            for w in 0..(SECTOR_SIZE / 2) {
                let word = inw(DATA);
                let off = s * SECTOR_SIZE + w * 2;
                buf[off] = (word & 0xFF) as u8;
                buf[off + 1] = (word >> 8) as u8;
            }
        }
    }
    Ok(())
}

/// Write `sectors` 512-byte sectors starting at `lba` from `buf`, followed
/// by a CACHE FLUSH so the write is durable before this function returns.
pub fn write_sectors(lba: u32, sectors: u8, buf: &[u8]) -> Result<(), i32> {
    unsafe {
        select_drive(lba)?;
        setup_lba(lba, sectors);
        outb(STATUS_CMD, CMD_WRITE);

        for s in 0..sectors as usize {
            let status = inb(STATUS_CMD);
            if status & STATUS_ERR != 0 || status & STATUS_DF != 0 {
                return Err(-12);
            }
            if !wait_not_busy() {
                return Err(-13);
            }

            for w in 0..(SECTOR_SIZE / 2) {
                let off = s * SECTOR_SIZE + w * 2;
                let word = buf[off] as u16 | ((buf[off + 1] as u16) << 8);
                outw(DATA, word);
            }
        }

        if wait_drq().is_err() {
            return Err(-14);
        }

        outb(STATUS_CMD, CMD_CACHE_FLUSH);
        if !wait_not_busy() {
            return Err(-15);
        }
    }
    Ok(())
}
