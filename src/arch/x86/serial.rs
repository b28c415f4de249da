//! # 16550 UART Serial Driver
//!
//! Driver for the 16550 UART used as the kernel's ambient logging transport.
//! COM1 (0x3F8) carries all boot, subsystem and panic output; it is
//! independent of the VGA/graphics console, which only ever shows what the
//! loaded application or the shell loop explicitly writes to it.
//!
//! ## Register Map (offset from base port)
//!
//! ```text
//! Offset  DLAB=0  DLAB=1   Read/Write  Description
//! ------  ------  -------  ----------  -----------
//! 0       RBR     DLL      R / W       Receiver Buffer / Divisor Latch Low
//! 1       IER     DLH      R / W       Interrupt Enable / Divisor Latch High
//! 2       IIR     -        R           Interrupt Identification
//! 2       -       FCR      W           FIFO Control
//! 3       LCR     LCR      R / W       Line Control
//! 4       MCR     MCR      R / W       Modem Control
//! 5       LSR     LSR      R           Line Status
//! 6       MSR     MSR      R           Modem Status
//! 7       SCR     SCR      R / W       Scratch Register
//! ```

use uart_16550::SerialPort;
use spin::Mutex;
use lazy_static::lazy_static;

/// COM1 base I/O port.
pub const COM1_PORT: u16 = 0x3F8;

lazy_static! {
    /// Global COM1 serial port instance, initialized exactly once.
    pub static ref SERIAL1: Mutex<SerialPort> = {
        let mut serial_port = unsafe { SerialPort::new(COM1_PORT) };
        serial_port.init();
        Mutex::new(serial_port)
    };
}

/// Initialize the serial console. Must be called during early boot before
/// any serial output is attempted.
pub fn init_serial() {
    let _ = &*SERIAL1;
}

/// Write a single byte to the serial port, blocking until ready.
pub fn serial_write_byte(byte: u8) {
    SERIAL1.lock().send(byte);
}

/// Write a byte slice to the serial port.
pub fn serial_write(s: &[u8]) {
    for &byte in s {
        serial_write_byte(byte);
    }
}

/// Write a formatted string to the serial port; used by the print macros.
pub fn _print(args: core::fmt::Arguments) {
    use core::fmt::Write;
    SERIAL1.lock().write_fmt(args).expect("failed to write to serial");
}

/// Print to the serial console.
#[macro_export]
macro_rules! serial_print {
    ($($arg:tt)*) => {
        $crate::arch::x86::serial::_print(format_args!($($arg)*))
    };
}

/// Print to the serial console with a trailing newline.
#[macro_export]
macro_rules! serial_println {
    () => ($crate::serial_print!("\n"));
    ($fmt:expr) => ($crate::serial_print!(concat!($fmt, "\n")));
    ($fmt:expr, $($arg:tt)*) => ($crate::serial_print!(
        concat!($fmt, "\n"), $($arg)*
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_write() {
        serial_write(b"test message\n");
    }

    #[test]
    fn test_serial_macros() {
        serial_print!("test ");
        serial_println!("message");
        serial_println!("formatted: {} {}", 42, "test");
    }
}
