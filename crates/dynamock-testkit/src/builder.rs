use dynamock::context::MockScope;
use dynamock::{
    CallShape, Contract, IsolatedMockContext, MockConfiguration, MockContext, Result,
};
use std::any::Any;
use std::sync::Arc;

type Step<T> = Box<dyn FnOnce(&mut MockConfiguration<T>) -> Result<()>>;

/// Fluent builder collecting the members a substitute should answer.
///
/// ```ignore
/// MockActivation::new(substitute)
///     .method("add")
///     .property("precision")
///     .activate(&context)?;
/// ```
///
/// With no members selected the substitute is activated in full-mock mode.
pub struct MockActivation<T: ?Sized + Contract> {
    mock: Arc<T>,
    steps: Vec<Step<T>>,
}

impl<T> MockActivation<T>
where
    T: ?Sized + Contract + Send + Sync,
{
    pub fn new(mock: Arc<T>) -> Self {
        Self {
            mock,
            steps: Vec::new(),
        }
    }

    pub fn method(mut self, name: &'static str) -> Self {
        self.steps.push(Box::new(move |c| c.mock_method(name).map(drop)));
        self
    }

    pub fn method_when(mut self, name: &'static str, shape: CallShape) -> Self {
        self.steps
            .push(Box::new(move |c| c.mock_method_when(name, shape).map(drop)));
        self
    }

    pub fn method_via(mut self, name: &'static str, alternate: Arc<T>) -> Self {
        self.steps
            .push(Box::new(move |c| c.mock_method_via(name, None, alternate).map(drop)));
        self
    }

    pub fn property(mut self, name: &'static str) -> Self {
        self.steps.push(Box::new(move |c| c.mock_property(name).map(drop)));
        self
    }

    pub fn event(mut self, name: &'static str) -> Self {
        self.steps.push(Box::new(move |c| c.mock_event(name).map(drop)));
        self
    }

    pub fn event_when<S, E, F>(mut self, name: &'static str, predicate: F) -> Self
    where
        S: Any,
        E: Any,
        F: Fn(&S, &E) -> bool + Send + Sync + 'static,
    {
        self.steps
            .push(Box::new(move |c| c.mock_event_when(name, predicate).map(drop)));
        self
    }

    fn configure(steps: Vec<Step<T>>) -> impl FnOnce(&mut MockConfiguration<T>) -> Result<()> {
        move |config| steps.into_iter().try_for_each(|step| step(config))
    }

    /// Install the substitute on `context`.
    pub fn activate<C: MockContext<T>>(self, context: &C) -> Result<()> {
        if self.steps.is_empty() {
            context.set_mock(self.mock);
            return Ok(());
        }
        context.set_configured_mock(self.mock, Self::configure(self.steps))
    }

    /// Install the substitute on `context` until the returned scope is dropped.
    pub fn activate_scoped(self, context: &IsolatedMockContext<T>) -> Result<MockScope<'_, T>> {
        if self.steps.is_empty() {
            return Ok(context.set_scoped_mock(self.mock));
        }
        context.set_scoped_configured_mock(self.mock, Self::configure(self.steps))
    }
}
