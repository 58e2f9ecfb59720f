//! Diagnostic output for the transpiler, controlled by `QSAPY_DEBUG`.
//!
//! `QSAPY_DEBUG=1` (or any value) prints dispatcher and serializer notes,
//! `QSAPY_DEBUG=trace` additionally prints every member rewrite.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Once;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum DebugLevel {
    Off = 0,
    Notes = 1,
    Trace = 2,
}

static DEBUG_LEVEL: AtomicU8 = AtomicU8::new(DebugLevel::Off as u8);

static INIT: Once = Once::new();

fn init_from_env() {
    INIT.call_once(|| {
        if let Ok(value) = std::env::var("QSAPY_DEBUG") {
            let level = if value.eq_ignore_ascii_case("trace") {
                DebugLevel::Trace
            } else {
                DebugLevel::Notes
            };
            raise_level(level);
        }
    });
}

fn raise_level(level: DebugLevel) {
    DEBUG_LEVEL.fetch_max(level as u8, Ordering::Relaxed);
}

/// Enable debug output (the CLI `--debug` flag)
pub fn enable_debug() {
    raise_level(DebugLevel::Notes);
}

pub fn enable_trace() {
    raise_level(DebugLevel::Trace);
}

pub fn level() -> DebugLevel {
    init_from_env();
    match DEBUG_LEVEL.load(Ordering::Relaxed) {
        0 => DebugLevel::Off,
        1 => DebugLevel::Notes,
        _ => DebugLevel::Trace,
    }
}

pub fn is_debug_enabled() -> bool {
    level() >= DebugLevel::Notes
}

pub fn is_trace_enabled() -> bool {
    level() >= DebugLevel::Trace
}

/// Print a note on stderr when debug output is enabled
#[macro_export]
macro_rules! debug_println {
    ($($arg:tt)*) => {
        if $crate::debug::is_debug_enabled() {
            eprintln!("[qsapy] {}", format_args!($($arg)*));
        }
    };
}

/// Print a trace line on stderr when `QSAPY_DEBUG=trace`
#[macro_export]
macro_rules! trace_println {
    ($($arg:tt)*) => {
        if $crate::debug::is_trace_enabled() {
            eprintln!("[qsapy:trace] {}", format_args!($($arg)*));
        }
    };
}
