//! RT-safe logging for the transmitter.
//!
//! # Architecture
//!
//! ```text
//! Controller task         LogStream             Log drain thread
//! ───────────────         ─────────             ────────────────
//!
//! tx_info!() ──────────▶ [L0][L1][L2] ──────▶ UART TX
//! fixed buffer            lock-free ring         blocking ok
//! never blocks            drops when full
//! ```
//!
//! # Rules
//!
//! - The transmit path never calls a blocking logger (`println!`, `ESP_LOGx`)
//! - One producer task per stream, one drain task
//! - A full ring drops the new message and counts it

use core::sync::atomic::{AtomicU32, Ordering};

use crate::fifo::SpscRing;

/// Longest message kept; longer ones are cut.
pub const MAX_MSG_LEN: usize = 96;

/// Log ring size (number of entries).
pub const LOG_BUFFER_SIZE: usize = 64;

/// Severity, most severe first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub const fn label(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

/// One formatted log line, stored by value in the ring.
#[derive(Clone, Copy)]
pub struct LogEntry {
    /// Microseconds since boot.
    pub timestamp_us: i64,
    pub level: LogLevel,
    len: u8,
    text: [u8; MAX_MSG_LEN],
}

impl LogEntry {
    /// Build an entry, truncating `msg` to [`MAX_MSG_LEN`] bytes.
    pub fn new(timestamp_us: i64, level: LogLevel, msg: &[u8]) -> Self {
        let len = msg.len().min(MAX_MSG_LEN);
        let mut text = [0u8; MAX_MSG_LEN];
        text[..len].copy_from_slice(&msg[..len]);
        Self {
            timestamp_us,
            level,
            len: len as u8,
            text,
        }
    }

    /// Stored message bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.text[..self.len as usize]
    }

    /// Message text, or a placeholder if truncation split a UTF-8 sequence.
    pub fn text(&self) -> &str {
        core::str::from_utf8(self.bytes()).unwrap_or("<invalid utf8>")
    }
}

/// Non-blocking log ring: one producer task, one drain task.
///
/// A full ring drops the new entry and counts it.
pub struct LogStream<const N: usize = LOG_BUFFER_SIZE> {
    ring: SpscRing<LogEntry, N>,
    dropped: AtomicU32,
}

impl<const N: usize> LogStream<N> {
    pub const fn new() -> Self {
        Self {
            ring: SpscRing::new(),
            dropped: AtomicU32::new(0),
        }
    }

    /// Queue a message. Returns `false` if it was dropped.
    #[inline]
    pub fn push(&self, timestamp_us: i64, level: LogLevel, msg: &[u8]) -> bool {
        if self.ring.is_full() || self.ring.try_push(LogEntry::new(timestamp_us, level, msg)).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }
        true
    }

    /// Take the oldest entry, if any.
    #[inline]
    pub fn drain(&self) -> Option<LogEntry> {
        self.ring.pop()
    }

    /// Messages dropped since the last [`take_dropped`](Self::take_dropped).
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Read and reset the dropped counter.
    #[inline]
    pub fn take_dropped(&self) -> u32 {
        self.dropped.swap(0, Ordering::Relaxed)
    }

    /// Entries waiting to be drained.
    #[inline]
    pub fn pending(&self) -> usize {
        self.ring.len()
    }
}

impl<const N: usize> Default for LogStream<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Format into a fixed buffer, truncating at its end.
///
/// Returns the number of bytes written.
#[inline]
pub fn format_to_buffer(buf: &mut [u8], args: core::fmt::Arguments<'_>) -> usize {
    let mut writer = FixedWriter::new(buf);
    let _ = core::fmt::write(&mut writer, args);
    writer.written()
}

/// `core::fmt::Write` into a byte slice. Output past the end is discarded.
pub struct FixedWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> FixedWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes written so far.
    pub fn written(&self) -> usize {
        self.pos
    }
}

impl core::fmt::Write for FixedWriter<'_> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let room = &mut self.buf[self.pos..];
        let n = s.len().min(room.len());
        room[..n].copy_from_slice(&s.as_bytes()[..n]);
        self.pos += n;
        Ok(())
    }
}

/// Non-blocking log macro.
///
/// ```ignore
/// tx_log!(LogLevel::Info, TX_LOG_STREAM, now_us, "burst {} done", n);
/// ```
#[macro_export]
macro_rules! tx_log {
    ($level:expr, $stream:expr, $timestamp:expr, $($arg:tt)*) => {{
        let mut buf = [0u8; $crate::logging::MAX_MSG_LEN];
        let len = $crate::logging::format_to_buffer(&mut buf, format_args!($($arg)*));
        $stream.push($timestamp, $level, &buf[..len]);
    }};
}

#[macro_export]
macro_rules! tx_info {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::tx_log!($crate::logging::LogLevel::Info, $stream, $timestamp, $($arg)*)
    };
}

#[macro_export]
macro_rules! tx_warn {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::tx_log!($crate::logging::LogLevel::Warn, $stream, $timestamp, $($arg)*)
    };
}

#[macro_export]
macro_rules! tx_error {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::tx_log!($crate::logging::LogLevel::Error, $stream, $timestamp, $($arg)*)
    };
}

#[macro_export]
macro_rules! tx_debug {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::tx_log!($crate::logging::LogLevel::Debug, $stream, $timestamp, $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_then_drain() {
        let stream = LogStream::<8>::new();

        assert!(stream.push(2_500, LogLevel::Info, b"burst 1 start"));
        assert!(stream.push(3_000, LogLevel::Debug, b"pass 1"));
        assert_eq!(stream.pending(), 2);

        let first = stream.drain().unwrap();
        assert_eq!((first.timestamp_us, first.level), (2_500, LogLevel::Info));
        assert_eq!(first.text(), "burst 1 start");
        assert_eq!(stream.drain().unwrap().text(), "pass 1");
        assert!(stream.drain().is_none());
    }

    #[test]
    fn test_full_ring_drops_newest() {
        let stream = LogStream::<2>::new();

        assert!(stream.push(1, LogLevel::Info, b"first"));
        assert!(stream.push(2, LogLevel::Info, b"second"));
        assert!(!stream.push(3, LogLevel::Warn, b"lost"));
        assert!(!stream.push(4, LogLevel::Warn, b"lost too"));
        assert_eq!(stream.dropped(), 2);
        assert_eq!(stream.take_dropped(), 2);
        assert_eq!(stream.dropped(), 0);

        assert_eq!(stream.drain().unwrap().text(), "first");
        assert!(stream.push(5, LogLevel::Info, b"third"));
        assert_eq!(stream.drain().unwrap().text(), "second");
        assert_eq!(stream.drain().unwrap().text(), "third");
    }

    #[test]
    fn test_entry_truncates() {
        let long = [b'w'; MAX_MSG_LEN + 20];
        let entry = LogEntry::new(0, LogLevel::Warn, &long);
        assert_eq!(entry.bytes().len(), MAX_MSG_LEN);

        // Cut inside a multi-byte character
        let mut msg = [b'a'; MAX_MSG_LEN + 1];
        msg[MAX_MSG_LEN - 1..].copy_from_slice("µ".as_bytes());
        assert_eq!(LogEntry::new(0, LogLevel::Info, &msg).text(), "<invalid utf8>");
    }

    #[test]
    fn test_fixed_writer_truncates() {
        let mut buf = [0u8; 8];
        let len = format_to_buffer(&mut buf, format_args!("GPIO{} {} Hz", 4, 2500));
        assert_eq!(&buf[..len], b"GPIO4 25");
    }

    #[test]
    fn test_level_macros() {
        let stream = LogStream::<4>::new();
        tx_warn!(stream, 42, "indicator {} failed", "pass");
        tx_error!(stream, 43, "startup failed: {}", "C01");

        let warn = stream.drain().unwrap();
        assert_eq!(warn.level, LogLevel::Warn);
        assert_eq!(warn.text(), "indicator pass failed");
        assert_eq!(stream.drain().unwrap().level.label(), "ERROR");
    }
}
