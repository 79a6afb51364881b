//! Storage for the active substitute of a contract.
//!
//! A context holds one [`MockSlot`]: the substitute currently standing in for
//! the real implementation, plus the configuration saying which members it
//! answers. Two variants exist:
//!
//! - [`SharedMockContext`]: one slot shared by every clone. Writers must be
//!   serialized by the caller.
//! - [`IsolatedMockContext`]: the slot lives in a [`flow::FlowLocal`], so
//!   concurrently running tests each see only their own substitute.

pub mod flow;
mod isolated;
mod shared;

pub use isolated::{IsolatedMockContext, MockScope};
pub use shared::SharedMockContext;

use crate::configuration::MockConfiguration;
use crate::contract::Contract;
use crate::{logging, Result};
use std::fmt;
use std::sync::Arc;

/// Routing state derived from a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockState {
    /// Every call goes to the real implementation.
    NoMockActive,
    /// Every call goes to the substitute.
    MockActiveUnconfigured,
    /// Each call is routed according to the active configuration.
    MockActiveConfigured,
}

impl fmt::Display for MockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMockActive => write!(f, "no_mock"),
            Self::MockActiveUnconfigured => write!(f, "full_mock"),
            Self::MockActiveConfigured => write!(f, "partial_mock"),
        }
    }
}

/// The active (substitute, configuration) pair.
///
/// A configuration without a substitute is never stored.
pub struct MockSlot<T: ?Sized> {
    mock: Option<Arc<T>>,
    configuration: Option<Arc<MockConfiguration<T>>>,
}

impl<T: ?Sized> MockSlot<T> {
    pub fn empty() -> Self {
        Self {
            mock: None,
            configuration: None,
        }
    }

    /// Full-mock slot: every member is routed to `mock`.
    pub fn full(mock: Arc<T>) -> Self {
        Self {
            mock: Some(mock),
            configuration: None,
        }
    }

    pub fn configured(mock: Arc<T>, configuration: MockConfiguration<T>) -> Self {
        Self {
            mock: Some(mock),
            configuration: Some(Arc::new(configuration)),
        }
    }

    pub fn mock(&self) -> Option<&Arc<T>> {
        self.mock.as_ref()
    }

    pub fn configuration(&self) -> Option<&Arc<MockConfiguration<T>>> {
        self.configuration.as_ref()
    }

    #[allow(clippy::type_complexity)]
    pub fn into_parts(self) -> (Option<Arc<T>>, Option<Arc<MockConfiguration<T>>>) {
        (self.mock, self.configuration)
    }

    pub fn state(&self) -> MockState {
        match (&self.mock, &self.configuration) {
            (None, _) => MockState::NoMockActive,
            (Some(_), None) => MockState::MockActiveUnconfigured,
            (Some(_), Some(_)) => MockState::MockActiveConfigured,
        }
    }

    /// Whether both slots hold the same substitute and the same configuration instance.
    pub fn same_as(&self, other: &Self) -> bool {
        fn same<X: ?Sized>(a: &Option<Arc<X>>, b: &Option<Arc<X>>) -> bool {
            match (a, b) {
                (None, None) => true,
                (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                _ => false,
            }
        }
        same(&self.mock, &other.mock) && same(&self.configuration, &other.configuration)
    }
}

impl<T: ?Sized> Clone for MockSlot<T> {
    fn clone(&self) -> Self {
        Self {
            mock: self.mock.clone(),
            configuration: self.configuration.clone(),
        }
    }
}

impl<T: ?Sized> Default for MockSlot<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: ?Sized> fmt::Debug for MockSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockSlot")
            .field("state", &self.state())
            .field("configuration", &self.configuration)
            .finish()
    }
}

/// Holder of the active substitute for contract `T`.
///
/// Implementors only provide atomic slot access; activation and removal are
/// built on top of it.
pub trait MockContext<T: ?Sized + Contract>: Send + Sync {
    /// Consistent snapshot of the active slot.
    fn slot(&self) -> MockSlot<T>;

    /// Install `slot`, returning the one it replaced.
    fn replace_slot(&self, slot: MockSlot<T>) -> MockSlot<T>;

    fn current(&self) -> Option<Arc<T>> {
        self.slot().mock
    }

    fn active_configuration(&self) -> Option<Arc<MockConfiguration<T>>> {
        self.slot().configuration
    }

    fn state(&self) -> MockState {
        self.slot().state()
    }

    /// Route every member to `mock`.
    fn set_mock(&self, mock: Arc<T>) {
        self.replace_slot(MockSlot::full(mock));
        logging::log_mock_activated(T::NAME, MockState::MockActiveUnconfigured);
    }

    /// Route the members selected by `configure` to `mock`.
    ///
    /// If `configure` fails, the error is returned and the active slot is left as it was.
    fn set_configured_mock<F>(&self, mock: Arc<T>, configure: F) -> Result<()>
    where
        F: FnOnce(&mut MockConfiguration<T>) -> Result<()>,
        Self: Sized,
    {
        let configuration = MockConfiguration::build(configure)?;
        self.replace_slot(MockSlot::configured(mock, configuration));
        logging::log_mock_activated(T::NAME, MockState::MockActiveConfigured);
        Ok(())
    }

    /// Clear the slot. Removing when nothing is active is a no-op.
    fn remove_mock(&self) {
        let previous = self.replace_slot(MockSlot::empty());
        if previous.state() != MockState::NoMockActive {
            logging::log_mock_removed(T::NAME);
        }
    }
}
