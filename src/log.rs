//! Leveled logging over the serial console.
//!
//! Every subsystem logs through here instead of calling `serial_println!`
//! directly so the verbosity can be dialed down at runtime (e.g. once the
//! shell loop is stable and the boot trace is no longer useful) without
//! recompiling.

use core::sync::atomic::{AtomicU8, Ordering};

#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
            Self::Trace => "TRACE",
        }
    }
}

static LOG_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);

pub fn set_level(level: LogLevel) {
    LOG_LEVEL.store(level as u8, Ordering::Relaxed);
}

pub fn get_level() -> LogLevel {
    match LOG_LEVEL.load(Ordering::Relaxed) {
        0 => LogLevel::Error,
        1 => LogLevel::Warn,
        2 => LogLevel::Info,
        3 => LogLevel::Debug,
        _ => LogLevel::Trace,
    }
}

#[inline]
pub fn is_enabled(level: LogLevel) -> bool {
    level <= get_level()
}

/// Log a pre-formatted message at `level` under `module`. Prefer the
/// `log_*!` macros below, which build the `Arguments` in place.
pub fn log(level: LogLevel, module: &str, args: core::fmt::Arguments) {
    if !is_enabled(level) {
        return;
    }
    crate::serial_println!("[{}] {}: {}", level.as_str(), module, args);
}

#[macro_export]
macro_rules! log_error {
    ($module:expr, $($arg:tt)*) => {
        $crate::log::log($crate::log::LogLevel::Error, $module, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($module:expr, $($arg:tt)*) => {
        $crate::log::log($crate::log::LogLevel::Warn, $module, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_info {
    ($module:expr, $($arg:tt)*) => {
        $crate::log::log($crate::log::LogLevel::Info, $module, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_debug {
    ($module:expr, $($arg:tt)*) => {
        $crate::log::log($crate::log::LogLevel::Debug, $module, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_trace {
    ($module:expr, $($arg:tt)*) => {
        $crate::log::log($crate::log::LogLevel::Trace, $module, format_args!($($arg)*))
    };
}

/// Logging policies a boot sequence can select between; mirrors the
/// coarse "how chatty should the serial trace be" knob a deployed build
/// wants versus a development one.
pub mod policy {
    use super::*;

    pub const PRODUCTION_LEVEL: LogLevel = LogLevel::Warn;
    pub const DEVELOPMENT_LEVEL: LogLevel = LogLevel::Debug;
    pub const TESTING_LEVEL: LogLevel = LogLevel::Trace;

    pub fn set_production() {
        set_level(PRODUCTION_LEVEL);
        log_info!("LOG", "production logging policy active (WARN+)");
    }

    pub fn set_development() {
        set_level(DEVELOPMENT_LEVEL);
        log_info!("LOG", "development logging policy active (DEBUG+)");
    }

    pub fn set_testing() {
        set_level(TESTING_LEVEL);
        log_info!("LOG", "testing logging policy active (TRACE+)");
    }
}
