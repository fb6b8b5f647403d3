//! Kernel logger
//!
//! Backend for the `log` facade. Records are formatted into a fixed buffer
//! and handed to a byte sink registered by the platform (serial, ring
//! buffer, ...). No sink means records are dropped; logging never blocks.

use log::{Level, LevelFilter, Metadata, Record};
use spin::Once;

/// Best-effort byte sink installed by the platform.
pub type LogSink = fn(&[u8]);

static SINK: Once<LogSink> = Once::new();

struct KernelLogger;

impl log::Log for KernelLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let Some(sink) = SINK.get() else {
            return;
        };

        // Format: [LEVEL] message
        let level_str = match record.level() {
            Level::Error => "ERROR",
            Level::Warn => "WARN ",
            Level::Info => "INFO ",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        };

        use core::fmt::Write;
        let mut buf = [0u8; 512];
        let pos = {
            let mut writer = BufferWriter {
                buffer: &mut buf,
                pos: 0,
            };
            let _ = core::write!(&mut writer, "[{}] {}\n", level_str, record.args());
            writer.pos
        };
        sink(&buf[..pos]);
    }

    fn flush(&self) {}
}

/// Buffer writer for formatting without alloc; truncates on overflow.
pub struct BufferWriter<'a> {
    pub buffer: &'a mut [u8],
    pub pos: usize,
}

impl<'a> core::fmt::Write for BufferWriter<'a> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let bytes = s.as_bytes();
        let remaining = self.buffer.len() - self.pos;
        let to_write = bytes.len().min(remaining);

        if to_write > 0 {
            self.buffer[self.pos..self.pos + to_write].copy_from_slice(&bytes[..to_write]);
            self.pos += to_write;
        }

        Ok(())
    }
}

/// Global logger instance
static LOGGER: KernelLogger = KernelLogger;

/// Register the platform byte sink. First call wins.
pub fn set_sink(sink: LogSink) {
    SINK.call_once(|| sink);
}

/// Initialize the logger at the default (Info) level.
pub fn init() {
    init_with_level(LevelFilter::Info);
}

/// Initialize with a specific log level. A second initialization is ignored.
pub fn init_with_level(level: LevelFilter) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

/// Print directly to the sink (bypasses the logger, for early boot)
pub fn early_print(s: &str) {
    if let Some(sink) = SINK.get() {
        sink(s.as_bytes());
    }
}

/// Log at DEBUG level
#[inline]
pub fn debug(msg: &str) {
    log::debug!("{}", msg);
}

/// Log at INFO level
#[inline]
pub fn info(msg: &str) {
    log::info!("{}", msg);
}

/// Log at WARN level
#[inline]
pub fn warn(msg: &str) {
    log::warn!("{}", msg);
}

/// Log at ERROR level
#[inline]
pub fn error(msg: &str) {
    log::error!("{}", msg);
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;

    #[test]
    fn buffer_writer_truncates() {
        let mut buf = [0u8; 8];
        let mut writer = BufferWriter {
            buffer: &mut buf,
            pos: 0,
        };
        writer.write_str("hello world").unwrap();
        assert_eq!(writer.pos, 8);
        assert_eq!(&buf, b"hello wo");
    }

    #[test]
    fn buffer_writer_appends() {
        let mut buf = [0u8; 16];
        let mut writer = BufferWriter {
            buffer: &mut buf,
            pos: 0,
        };
        writer.write_str("ab").unwrap();
        writer.write_str("cd").unwrap();
        assert_eq!(writer.pos, 4);
        assert_eq!(&buf[..4], b"abcd");
    }
}
