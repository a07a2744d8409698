//! Kernel logger.
//!
//! Every line goes into a fixed-size ring buffer so late failures keep
//! their history; a byte sink installed by the outer kernel (serial,
//! framebuffer, ...) receives the same lines as they are produced. The
//! console itself is not our concern. Timestamps come from a pluggable
//! source because the timer subsystem starts well after the first log
//! line is written.

use core::fmt::{self, Write};
use core::sync::atomic::{AtomicU8, Ordering};

use spin::Mutex;

/// Kernel log ring buffer size.
const RINGBUF_SIZE: usize = 65536;

static LOG_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info.priority());
static RINGBUF: Mutex<RingBuffer> = Mutex::new(RingBuffer::new());
static SINK: Mutex<Option<fn(&[u8])>> = Mutex::new(None);
static TIME_SOURCE: Mutex<Option<fn() -> i64>> = Mutex::new(None);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Fatal,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            LogLevel::Fatal => "FATAL",
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }

    const fn priority(self) -> u8 {
        match self {
            LogLevel::Fatal => 0,
            LogLevel::Error => 1,
            LogLevel::Warn => 2,
            LogLevel::Info => 3,
            LogLevel::Debug => 4,
            LogLevel::Trace => 5,
        }
    }

    fn from_priority(value: u8) -> Self {
        match value {
            0 => LogLevel::Fatal,
            1 => LogLevel::Error,
            2 => LogLevel::Warn,
            3 => LogLevel::Info,
            4 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("fatal") {
            Some(LogLevel::Fatal)
        } else if value.eq_ignore_ascii_case("error") {
            Some(LogLevel::Error)
        } else if value.eq_ignore_ascii_case("warn") || value.eq_ignore_ascii_case("warning") {
            Some(LogLevel::Warn)
        } else if value.eq_ignore_ascii_case("info") {
            Some(LogLevel::Info)
        } else if value.eq_ignore_ascii_case("debug") {
            Some(LogLevel::Debug)
        } else if value.eq_ignore_ascii_case("trace") {
            Some(LogLevel::Trace)
        } else {
            None
        }
    }
}

pub fn set_max_level(level: LogLevel) {
    LOG_LEVEL.store(level.priority(), Ordering::Relaxed);
}

pub fn max_level() -> LogLevel {
    LogLevel::from_priority(LOG_LEVEL.load(Ordering::Relaxed))
}

/// Install the console byte sink. Called once by the outer kernel.
pub fn set_sink(sink: fn(&[u8])) {
    *SINK.lock() = Some(sink);
}

/// Install the timestamp source (tick count since boot).
pub fn set_time_source(source: fn() -> i64) {
    *TIME_SOURCE.lock() = Some(source);
}

/// Write one log line. Use the `kinfo!`-family macros instead of calling
/// this directly.
pub fn log(level: LogLevel, args: fmt::Arguments<'_>) {
    if level.priority() > LOG_LEVEL.load(Ordering::Relaxed) {
        return;
    }

    let ticks = TIME_SOURCE.lock().map(|f| f()).unwrap_or(0);

    {
        let mut ringbuf = RINGBUF.lock();
        let _ = write!(ringbuf, "[{:>6}] [{:<5}] {}\n", ticks, level.as_str(), args.clone());
    }

    if let Some(sink) = *SINK.lock() {
        let mut writer = SinkWriter(sink);
        let _ = write!(writer, "[{:>6}] [{:<5}] {}\n", ticks, level.as_str(), args);
    }
}

/// Copy of the ring buffer contents plus the current write position.
pub fn read_ringbuffer() -> ([u8; RINGBUF_SIZE], usize) {
    let ringbuf = RINGBUF.lock();
    (ringbuf.buf, ringbuf.write_pos)
}

struct SinkWriter(fn(&[u8]));

impl fmt::Write for SinkWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        (self.0)(s.as_bytes());
        Ok(())
    }
}

/// Wrapping byte buffer holding the most recent log output.
struct RingBuffer {
    buf: [u8; RINGBUF_SIZE],
    write_pos: usize,
}

impl RingBuffer {
    const fn new() -> Self {
        Self {
            buf: [0; RINGBUF_SIZE],
            write_pos: 0,
        }
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.buf[self.write_pos] = byte;
            self.write_pos += 1;
            if self.write_pos >= RINGBUF_SIZE {
                self.write_pos = 0;
            }
        }
    }
}

impl fmt::Write for RingBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write_bytes(s.as_bytes());
        Ok(())
    }
}
