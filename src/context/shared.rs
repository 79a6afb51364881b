use super::{MockContext, MockSlot};
use crate::contract::Contract;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Mock context with one slot shared by every clone.
///
/// Every flow sees the last write, so tests using it must not run
/// concurrently; hold a serialization fixture around them.
pub struct SharedMockContext<T: ?Sized> {
    slot: Arc<RwLock<MockSlot<T>>>,
}

impl<T: ?Sized> SharedMockContext<T> {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(RwLock::new(MockSlot::empty())),
        }
    }
}

impl<T: ?Sized> Default for SharedMockContext<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> Clone for SharedMockContext<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> MockContext<T> for SharedMockContext<T>
where
    T: ?Sized + Contract + Send + Sync,
{
    fn slot(&self) -> MockSlot<T> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn replace_slot(&self, slot: MockSlot<T>) -> MockSlot<T> {
        let mut guard = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, slot)
    }
}

impl<T: ?Sized> fmt::Debug for SharedMockContext<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("SharedMockContext")
            .field("state", &slot.state())
            .finish()
    }
}
