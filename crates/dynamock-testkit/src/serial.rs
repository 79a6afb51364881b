//! Serialization fixture for tests that share one mock slot.
//!
//! A [`SharedMockContext`](dynamock::SharedMockContext) is last-writer-wins:
//! two tests activating substitutes on it at the same time corrupt each other.
//! Tests that use one hold a [`SerialGuard`] for their whole body.

use std::sync::{Mutex, MutexGuard, PoisonError};

static SERIAL: Mutex<()> = Mutex::new(());
static SERIAL_ASYNC: tokio::sync::Mutex<()> = tokio::sync::Mutex::const_new(());

/// Held for the duration of a test that mutates a shared context.
pub struct SerialGuard {
    _guard: MutexGuard<'static, ()>,
}

/// Async counterpart of [`SerialGuard`], safe to hold across `.await`.
pub struct AsyncSerialGuard {
    _guard: tokio::sync::MutexGuard<'static, ()>,
}

/// Block until no other serialized test is running.
///
/// A test that panicked while holding the guard does not poison later ones.
pub fn serial() -> SerialGuard {
    let guard = SERIAL.lock().unwrap_or_else(PoisonError::into_inner);
    tracing::trace!("Acquired serial test fixture");
    SerialGuard { _guard: guard }
}

pub async fn serial_async() -> AsyncSerialGuard {
    let guard = SERIAL_ASYNC.lock().await;
    tracing::trace!("Acquired async serial test fixture");
    AsyncSerialGuard { _guard: guard }
}
