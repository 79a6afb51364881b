//! Declarative description of which members a substitute answers.
//!
//! A [`MockConfiguration`] is built once per activation through its fluent
//! builder, then frozen behind an `Arc` and only queried. Every builder call
//! checks the member name against the contract's catalog, so a typo fails when
//! the test configures the mock instead of silently routing to the real object.

mod event;

pub use event::EventPattern;

use crate::contract::{Contract, MemberKind};
use crate::matching::{ArgumentMatcher, CallShape, MatchFailure, MatchOutcome};
use crate::{logging, Result};
use std::any::Any;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Callback invoked for every pattern evaluation failure swallowed during matching.
pub type MatchFailureHook = Arc<dyn Fn(&str, &MatchFailure) + Send + Sync>;

struct MethodMock<T: ?Sized> {
    shapes: Vec<CallShape>,
    alternate: Option<Arc<T>>,
}

impl<T: ?Sized> Default for MethodMock<T> {
    fn default() -> Self {
        Self {
            shapes: Vec::new(),
            alternate: None,
        }
    }
}

/// Result of checking one method call against the configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodMatch {
    pub mocked: bool,
    /// Evaluation failures swallowed while checking registered call shapes.
    pub failures: Vec<MatchFailure>,
}

/// Which members of `T` are routed to the substitute, and under what arguments.
pub struct MockConfiguration<T: ?Sized> {
    methods: HashMap<&'static str, MethodMock<T>>,
    properties: HashSet<&'static str>,
    events: HashMap<&'static str, Vec<EventPattern>>,
    on_match_failure: Option<MatchFailureHook>,
    matcher: ArgumentMatcher,
}

impl<T: ?Sized> Default for MockConfiguration<T> {
    fn default() -> Self {
        Self {
            methods: HashMap::new(),
            properties: HashSet::new(),
            events: HashMap::new(),
            on_match_failure: None,
            matcher: ArgumentMatcher::new(),
        }
    }
}

impl<T: ?Sized + Contract> MockConfiguration<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `configure` against a fresh configuration.
    pub fn build<F>(configure: F) -> Result<Self>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let mut config = Self::new();
        configure(&mut config)?;
        Ok(config)
    }

    /// Route every call of `name` to the substitute, unless call shapes are
    /// registered for it as well.
    pub fn mock_method(&mut self, name: &str) -> Result<&mut Self> {
        let member = T::require(name, MemberKind::Method)?;
        self.methods.entry(member.name).or_default();
        Ok(self)
    }

    /// Route calls of `name` whose arguments match `shape` to the substitute.
    ///
    /// Several shapes may be registered for one method; a call is mocked when
    /// any of them matches.
    pub fn mock_method_when(&mut self, name: &str, shape: CallShape) -> Result<&mut Self> {
        let member = T::require(name, MemberKind::Method)?;
        if shape.len() != member.arity {
            tracing::warn!(
                contract = T::NAME,
                method = member.name,
                patterns = shape.len(),
                parameters = member.arity,
                "Call shape arity differs from the method signature; it will never match"
            );
        }
        self.methods
            .entry(member.name)
            .or_default()
            .shapes
            .push(shape);
        Ok(self)
    }

    /// Route mocked calls of `name` to `alternate` instead of the active substitute.
    ///
    /// Without a shape every call of `name` is mocked; with one, only matching calls.
    pub fn mock_method_via(
        &mut self,
        name: &str,
        shape: Option<CallShape>,
        alternate: Arc<T>,
    ) -> Result<&mut Self> {
        match shape {
            Some(shape) => self.mock_method_when(name, shape)?,
            None => self.mock_method(name)?,
        };
        let member = T::require(name, MemberKind::Method)?;
        if let Some(entry) = self.methods.get_mut(member.name) {
            if entry.alternate.replace(alternate).is_some() {
                tracing::debug!(
                    contract = T::NAME,
                    method = member.name,
                    "Replacing previously registered alternate target"
                );
            }
        }
        Ok(self)
    }

    pub fn mock_property(&mut self, name: &str) -> Result<&mut Self> {
        let member = T::require(name, MemberKind::Property)?;
        self.properties.insert(member.name);
        Ok(self)
    }

    pub fn mock_event(&mut self, name: &str) -> Result<&mut Self> {
        let member = T::require(name, MemberKind::Event)?;
        self.events.entry(member.name).or_default();
        Ok(self)
    }

    /// Mock `name` only for raises whose sender and arguments satisfy `predicate`.
    pub fn mock_event_when<S, E, F>(&mut self, name: &str, predicate: F) -> Result<&mut Self>
    where
        S: Any,
        E: Any,
        F: Fn(&S, &E) -> bool + Send + Sync + 'static,
    {
        let member = T::require(name, MemberKind::Event)?;
        self.events
            .entry(member.name)
            .or_default()
            .push(EventPattern::new(predicate));
        Ok(self)
    }

    /// Observe argument patterns whose evaluation failed during matching.
    pub fn on_match_failure<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&str, &MatchFailure) + Send + Sync + 'static,
    {
        self.on_match_failure = Some(Arc::new(hook));
        self
    }
}

impl<T: ?Sized> MockConfiguration<T> {
    pub fn is_method_mocked(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// True when `name` is mocked and either has no call shapes or one of them
    /// matches `args`.
    pub fn is_method_mocked_with_args(&self, name: &str, args: &[&dyn Any]) -> bool {
        self.evaluate_method_call(name, args).mocked
    }

    /// Like [`is_method_mocked_with_args`](Self::is_method_mocked_with_args),
    /// also returning the evaluation failures that were treated as non-matches.
    pub fn evaluate_method_call(&self, name: &str, args: &[&dyn Any]) -> MethodMatch {
        let Some(entry) = self.methods.get(name) else {
            return MethodMatch::default();
        };
        if entry.shapes.is_empty() {
            return MethodMatch {
                mocked: true,
                failures: Vec::new(),
            };
        }

        let mut failures = Vec::new();
        for shape in &entry.shapes {
            match self.matcher.matches_call_detailed(shape, args) {
                MatchOutcome::Matched => {
                    return MethodMatch {
                        mocked: true,
                        failures,
                    }
                }
                MatchOutcome::Failed(failure) => {
                    logging::log_match_failure(name, &failure);
                    if let Some(hook) = &self.on_match_failure {
                        hook(name, &failure);
                    }
                    failures.push(failure);
                }
                MatchOutcome::ArityMismatch { .. } | MatchOutcome::Mismatch { .. } => {}
            }
        }
        MethodMatch {
            mocked: false,
            failures,
        }
    }

    pub fn is_property_mocked(&self, name: &str) -> bool {
        self.properties.contains(name)
    }

    pub fn is_event_mocked(&self, name: &str) -> bool {
        self.events.contains_key(name)
    }

    /// True when `name` is mocked and either has no argument predicates or one
    /// of them accepts `sender` and `event_args`. Predicates declared for other
    /// types are skipped.
    pub fn is_event_mocked_with_args(
        &self,
        name: &str,
        sender: &dyn Any,
        event_args: &dyn Any,
    ) -> bool {
        match self.events.get(name) {
            None => false,
            Some(patterns) if patterns.is_empty() => true,
            Some(patterns) => patterns.iter().any(|p| p.matches(sender, event_args)),
        }
    }

    pub fn try_get_alternate_target(&self, name: &str) -> Option<Arc<T>> {
        self.methods
            .get(name)
            .and_then(|entry| entry.alternate.clone())
    }

    pub fn mocked_methods(&self) -> BTreeSet<&'static str> {
        self.methods.keys().copied().collect()
    }

    pub fn mocked_properties(&self) -> BTreeSet<&'static str> {
        self.properties.iter().copied().collect()
    }

    pub fn mocked_events(&self) -> BTreeSet<&'static str> {
        self.events.keys().copied().collect()
    }

    /// Call shapes registered for `name`, in registration order.
    pub fn call_shapes(&self, name: &str) -> &[CallShape] {
        self.methods
            .get(name)
            .map(|entry| entry.shapes.as_slice())
            .unwrap_or_default()
    }
}

impl<T: ?Sized> fmt::Debug for MockConfiguration<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shapes: BTreeSet<_> = self
            .methods
            .iter()
            .filter(|(_, entry)| !entry.shapes.is_empty())
            .map(|(name, entry)| (*name, entry.shapes.len()))
            .collect();
        f.debug_struct("MockConfiguration")
            .field("methods", &self.mocked_methods())
            .field("call_shapes", &shapes)
            .field("properties", &self.mocked_properties())
            .field("events", &self.mocked_events())
            .finish()
    }
}
