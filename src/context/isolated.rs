use super::flow::FlowLocal;
use super::{MockContext, MockSlot};
use crate::configuration::MockConfiguration;
use crate::contract::Contract;
use crate::{logging, Result};
use std::fmt;
use std::sync::Arc;

/// Mock context whose slot is private to the current flow.
///
/// Writes are seen by later reads in the same flow and by flows started from
/// it afterwards (see [`flow`](super::flow)), never by concurrently running
/// siblings. One instance can therefore back a singleton wrapper shared by
/// tests running in parallel.
///
/// Under tokio, run each test body inside [`flow::scope`](super::flow::scope)
/// or start its tasks with [`flow::spawn`](super::flow::spawn). A task started
/// with plain `tokio::spawn` has no flow: it sees no substitute, and activating
/// one from it logs a warning and is ignored (debug builds panic). Outside any
/// runtime each OS thread is its own flow.
pub struct IsolatedMockContext<T: ?Sized> {
    cell: FlowLocal<MockSlot<T>>,
}

impl<T> IsolatedMockContext<T>
where
    T: ?Sized + Contract + Send + Sync,
{
    pub fn new() -> Self {
        Self {
            cell: FlowLocal::new(),
        }
    }

    /// Activate a full mock until the returned guard is dropped.
    pub fn set_scoped_mock(&self, mock: Arc<T>) -> MockScope<'_, T> {
        let previous = self.replace_slot(MockSlot::full(mock));
        logging::log_scope_entered(T::NAME);
        MockScope {
            context: self,
            previous: Some(previous),
        }
    }

    /// Activate a configured mock until the returned guard is dropped.
    ///
    /// The slot that was active before is restored when the guard drops, also
    /// when the scope is left by a panic.
    pub fn set_scoped_configured_mock<F>(
        &self,
        mock: Arc<T>,
        configure: F,
    ) -> Result<MockScope<'_, T>>
    where
        F: FnOnce(&mut MockConfiguration<T>) -> Result<()>,
    {
        let configuration = MockConfiguration::build(configure)?;
        let previous = self.replace_slot(MockSlot::configured(mock, configuration));
        logging::log_scope_entered(T::NAME);
        Ok(MockScope {
            context: self,
            previous: Some(previous),
        })
    }
}

impl<T> Default for IsolatedMockContext<T>
where
    T: ?Sized + Contract + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> MockContext<T> for IsolatedMockContext<T>
where
    T: ?Sized + Contract + Send + Sync,
{
    fn slot(&self) -> MockSlot<T> {
        self.cell.get().unwrap_or_default()
    }

    fn replace_slot(&self, slot: MockSlot<T>) -> MockSlot<T> {
        let previous = if slot.mock().is_some() {
            self.cell.replace(Some(slot))
        } else {
            self.cell.replace(None)
        };
        previous.unwrap_or_default()
    }
}

impl<T: ?Sized> fmt::Debug for IsolatedMockContext<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IsolatedMockContext")
            .field("cell", &self.cell)
            .finish()
    }
}

/// Guard restoring the slot that was active before a scoped activation.
#[must_use = "the previous mock is restored as soon as the scope guard is dropped"]
pub struct MockScope<'a, T>
where
    T: ?Sized + Contract + Send + Sync,
{
    context: &'a IsolatedMockContext<T>,
    previous: Option<MockSlot<T>>,
}

impl<T> MockScope<'_, T>
where
    T: ?Sized + Contract + Send + Sync,
{
    /// Slot that will be restored on drop.
    pub fn previous(&self) -> Option<&MockSlot<T>> {
        self.previous.as_ref()
    }
}

impl<T> Drop for MockScope<'_, T>
where
    T: ?Sized + Contract + Send + Sync,
{
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            let state = previous.state();
            self.context.replace_slot(previous);
            logging::log_scope_restored(T::NAME, state);
        }
    }
}
