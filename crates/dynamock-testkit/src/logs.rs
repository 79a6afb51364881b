//! Capture what the engine logs while a closure runs.

use std::io;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// Log lines written by a [`capture_logs`] run, without ANSI colouring.
#[derive(Debug, Clone, Default)]
pub struct CapturedLogs(String);

impl CapturedLogs {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.0.contains(needle)
    }

    /// Lines logged at `level` (`"WARN"`, `"TRACE"`, ...).
    pub fn at_level<'a>(&'a self, level: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0.lines().filter(move |line| {
            line.split_whitespace().any(|word| word == level)
        })
    }

    #[track_caller]
    pub fn assert_contains(&self, needle: &str) {
        assert!(self.contains(needle), "expected {needle:?} in logs:\n{}", self.0);
    }

    #[track_caller]
    pub fn assert_absent(&self, needle: &str) {
        assert!(!self.contains(needle), "unexpected {needle:?} in logs:\n{}", self.0);
    }
}

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for SharedBuffer {
    type Writer = SharedBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run `body` with a TRACE-level subscriber as this thread's default.
///
/// The subscriber takes precedence over a global one for the duration of the
/// call, so captures work in test binaries that also call `logging::init`.
pub fn capture_logs<R>(body: impl FnOnce() -> R) -> (R, CapturedLogs) {
    let buffer = SharedBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::TRACE)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, body);
    let bytes = buffer
        .0
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone();
    (result, CapturedLogs(String::from_utf8_lossy(&bytes).into_owned()))
}
