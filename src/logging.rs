//! Kernel Logger
//!
//! Routes the `log` facade to a console sink.
//!
//! # Output Format
//! ```text
//! [INFO ] chardev::registrar: Omkar_Device: registered with major number 1
//! ```

use core::fmt::{self, Write};

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use spin::Mutex;

/// Byte sink the logger writes to (a UART, a ring buffer, ...).
pub trait Console: Sync {
    /// Write a string. Must not log.
    fn write_str(&self, s: &str);
}

/// `log` backend writing one line per record.
pub struct KernelLogger {
    console: Mutex<Option<&'static dyn Console>>,
}

static LOGGER: KernelLogger = KernelLogger {
    console: Mutex::new(None),
};

/// Install the kernel logger.
///
/// # Errors
/// Fails if any logger was already installed; the console is still
/// swapped so later records go to the new sink.
pub fn init(console: &'static dyn Console, level: LevelFilter) -> Result<(), SetLoggerError> {
    *LOGGER.console.lock() = Some(console);
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}

impl Log for KernelLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let console = *self.console.lock();
        if let Some(console) = console {
            let _ = write_record(&mut ConsoleWriter(console), record);
        }
    }

    fn flush(&self) {}
}

/// Format one record as a single line.
pub fn write_record<W: Write>(out: &mut W, record: &Record) -> fmt::Result {
    let level = match record.level() {
        Level::Error => "ERROR",
        Level::Warn => "WARN ",
        Level::Info => "INFO ",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    };
    writeln!(out, "[{}] {}: {}", level, record.target(), record.args())
}

struct ConsoleWriter(&'static dyn Console);

impl Write for ConsoleWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.write_str(s);
        Ok(())
    }
}
