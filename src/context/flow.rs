//! Flow-local cells.
//!
//! A *flow* is one logical line of execution: a task started through
//! [`scope`] or [`spawn`], or a plain OS thread outside any tokio runtime. A
//! value written to a [`FlowLocal`] is visible to later reads in the same flow
//! and to flows started from it afterwards, never to the parent or to siblings.
//!
//! Inside a scope the values travel with the task in a `tokio::task_local!`
//! map, so they survive `.await` points even when the runtime moves the task to
//! another worker thread. A thread outside any runtime keeps its values in a
//! `thread_local!` map.
//!
//! Code running on a tokio runtime but outside [`scope`] (a task started with
//! plain `tokio::spawn`, or the body of `Runtime::block_on`) has no flow. It
//! reads nothing, and its writes are dropped with a warning. Debug builds
//! panic on such a write.
//!
//! ## Thread Safety
//!
//! - Each flow owns its own map; nothing is shared between flows
//! - Starting a flow copies the parent's map (values are `Arc`s, so the copy is shallow)

use crate::logging;
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

type FlowValue = Arc<dyn Any + Send + Sync>;
type FlowMap = HashMap<u64, FlowValue>;

static NEXT_CELL_ID: AtomicU64 = AtomicU64::new(1);

tokio::task_local! {
    static TASK_FLOW: RefCell<FlowMap>;
}

thread_local! {
    static THREAD_FLOW: RefCell<FlowMap> = RefCell::new(HashMap::new());
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Task,
    Thread,
    /// On a tokio runtime without a task-local scope. Worker threads are
    /// shared by unrelated tasks, so their thread map is never used.
    Unscoped,
}

fn current_flow() -> Flow {
    if TASK_FLOW.try_with(|_| ()).is_ok() {
        Flow::Task
    } else if tokio::runtime::Handle::try_current().is_ok() {
        Flow::Unscoped
    } else {
        Flow::Thread
    }
}

/// Run `f` against the current flow's map. `None` when there is no flow.
fn with_flow<R>(f: impl FnOnce(&RefCell<FlowMap>) -> R) -> Option<R> {
    match current_flow() {
        Flow::Task => TASK_FLOW.try_with(f).ok(),
        Flow::Thread => THREAD_FLOW.try_with(f).ok(),
        Flow::Unscoped => None,
    }
}

fn snapshot() -> FlowMap {
    with_flow(|map| map.borrow().clone()).unwrap_or_default()
}

/// Run `future` as a child flow of the caller.
///
/// The child starts with the values visible to the caller at the time this
/// function is called. Its own writes stay inside it.
pub fn scope<F: Future>(future: F) -> impl Future<Output = F::Output> {
    TASK_FLOW.scope(RefCell::new(snapshot()), future)
}

/// Spawn `future` on the tokio runtime as a child flow of the caller.
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(scope(future))
}

/// Run `f` synchronously as a child flow: writes made inside are discarded when it returns.
pub fn isolate<R>(f: impl FnOnce() -> R) -> R {
    TASK_FLOW.sync_scope(RefCell::new(snapshot()), f)
}

/// Start an OS thread that inherits the caller's flow values.
pub fn spawn_thread<F, R>(f: F) -> std::thread::JoinHandle<R>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    let inherited = snapshot();
    std::thread::spawn(move || {
        THREAD_FLOW.with(|map| *map.borrow_mut() = inherited);
        f()
    })
}

/// A value slot whose contents are private to the current flow.
///
/// Dropping the cell removes its entry from the dropping flow. Copies held by
/// other flows are released when those flows end.
pub struct FlowLocal<V> {
    id: u64,
    _marker: PhantomData<fn() -> V>,
}

impl<V> FlowLocal<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            id: NEXT_CELL_ID.fetch_add(1, Ordering::Relaxed),
            _marker: PhantomData,
        }
    }

    /// Value written in this flow or inherited from its ancestors.
    pub fn get(&self) -> Option<V> {
        let value = with_flow(|map| map.borrow().get(&self.id).cloned()).flatten()?;
        value.downcast_ref::<V>().cloned()
    }

    /// Store `value` for this flow, returning what was visible before.
    ///
    /// # Panics
    ///
    /// In debug builds, when storing a value from a tokio task that was not
    /// started through [`spawn`] or [`scope`].
    pub fn replace(&self, value: Option<V>) -> Option<V> {
        let writes = value.is_some();
        // The displaced value is dropped after the borrow ends; its Drop may
        // touch flow-local cells itself.
        let previous = with_flow(|map| {
            let mut map = map.borrow_mut();
            match value {
                Some(value) => map.insert(self.id, Arc::new(value)),
                None => map.remove(&self.id),
            }
        });
        match previous {
            Some(previous) => previous.and_then(|value| value.downcast_ref::<V>().cloned()),
            None => {
                if writes {
                    logging::log_unscoped_flow_write(std::any::type_name::<V>());
                }
                debug_assert!(
                    !writes,
                    "flow-local write from a tokio task outside any flow; \
                     start it with dynamock::context::flow::spawn or wrap it in flow::scope"
                );
                None
            }
        }
    }

    pub fn set(&self, value: V) {
        self.replace(Some(value));
    }

    pub fn clear(&self) {
        self.replace(None);
    }
}

impl<V> Drop for FlowLocal<V> {
    fn drop(&mut self) {
        let removed = with_flow(|map| {
            map.try_borrow_mut()
                .ok()
                .and_then(|mut map| map.remove(&self.id))
        });
        drop(removed);
    }
}

impl<V> Default for FlowLocal<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> std::fmt::Debug for FlowLocal<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowLocal").field("id", &self.id).finish()
    }
}
