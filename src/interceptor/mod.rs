//! Mock-or-real routing for intercepted calls.
//!
//! A generated wrapper owns one [`CallInterceptor`] and forwards every member
//! through it. Each call reads the active slot once, decides where the call
//! goes, and runs exactly one of the closures it was handed:
//!
//! | Slot state | Route |
//! |---|---|
//! | no substitute | real |
//! | substitute, no configuration | substitute |
//! | substitute + configuration, member not selected | real |
//! | substitute + configuration, member selected | substitute, or the alternate target registered for the method |
//!
//! The interceptor never reports errors of its own. Whatever the chosen
//! target returns or panics with reaches the caller unchanged.

use crate::config::DiagnosticsConfig;
use crate::configuration::MockConfiguration;
use crate::context::{MockContext, MockSlot};
use crate::contract::{Contract, MemberKind};
use crate::logging;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Where a call was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Real,
    Substitute,
    /// Alternate target registered for the method in the active configuration.
    Alternate,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Real => write!(f, "real"),
            Self::Substitute => write!(f, "substitute"),
            Self::Alternate => write!(f, "alternate"),
        }
    }
}

enum Target<T: ?Sized> {
    Real,
    Substitute(Arc<T>),
    Alternate(Arc<T>),
}

impl<T: ?Sized> Target<T> {
    fn route(&self) -> Route {
        match self {
            Self::Real => Route::Real,
            Self::Substitute(_) => Route::Substitute,
            Self::Alternate(_) => Route::Alternate,
        }
    }
}

/// Routes calls on contract `T` to the active substitute or the real implementation.
pub struct CallInterceptor<T: ?Sized + Contract> {
    context: Arc<dyn MockContext<T>>,
    real: Arc<T>,
    diagnostics: DiagnosticsConfig,
}

impl<T> CallInterceptor<T>
where
    T: ?Sized + Contract + Send + Sync,
{
    pub fn new(context: Arc<dyn MockContext<T>>, real: Arc<T>) -> Self {
        Self {
            context,
            real,
            diagnostics: DiagnosticsConfig::default(),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: DiagnosticsConfig) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn real(&self) -> &Arc<T> {
        &self.real
    }

    pub fn context(&self) -> &Arc<dyn MockContext<T>> {
        &self.context
    }

    /// Decide where a method call with `args` would go, without dispatching it.
    pub fn route_method(&self, name: &str, args: &[&dyn Any]) -> Route {
        self.resolve_method(name, args).route()
    }

    pub fn route_property(&self, name: &str) -> Route {
        self.resolve(name, MemberKind::Property, |config| {
            config.is_property_mocked(name)
        })
        .route()
    }

    pub fn route_event(&self, name: &str) -> Route {
        self.resolve(name, MemberKind::Event, |config| config.is_event_mocked(name))
            .route()
    }

    /// Decide where raising event `name` with `sender` and `event_args` would
    /// go, honoring argument predicates registered for the event.
    pub fn route_event_raise(&self, name: &str, sender: &dyn Any, event_args: &dyn Any) -> Route {
        self.resolve(name, MemberKind::Event, |config| {
            config.is_event_mocked_with_args(name, sender, event_args)
        })
        .route()
    }

    /// Intercept a value-returning method.
    ///
    /// `mock_call` runs against the substitute (or the alternate target),
    /// `real_call` against the real implementation. Only one of them runs.
    pub fn intercept_method<R>(
        &self,
        name: &str,
        args: &[&dyn Any],
        mock_call: impl FnOnce(Arc<T>) -> R,
        real_call: impl FnOnce(Arc<T>) -> R,
    ) -> R {
        match self.resolve_method(name, args) {
            Target::Real => real_call(Arc::clone(&self.real)),
            Target::Substitute(target) | Target::Alternate(target) => mock_call(target),
        }
    }

    /// Intercept a method without a return value.
    pub fn intercept_void_method(
        &self,
        name: &str,
        args: &[&dyn Any],
        mock_call: impl FnOnce(Arc<T>),
        real_call: impl FnOnce(Arc<T>),
    ) {
        self.intercept_method(name, args, mock_call, real_call)
    }

    pub fn intercept_property_get<P>(
        &self,
        name: &str,
        mock_get: impl FnOnce(Arc<T>) -> P,
        real_get: impl FnOnce(Arc<T>) -> P,
    ) -> P {
        let target = self.resolve(name, MemberKind::Property, |config| {
            config.is_property_mocked(name)
        });
        match target {
            Target::Real => real_get(Arc::clone(&self.real)),
            Target::Substitute(target) | Target::Alternate(target) => mock_get(target),
        }
    }

    /// Intercept a property setter. `set` stores `value` on whichever target is chosen.
    pub fn intercept_property_set<P>(&self, name: &str, value: P, set: impl FnOnce(Arc<T>, P)) {
        let target = self.resolve(name, MemberKind::Property, |config| {
            config.is_property_mocked(name)
        });
        set(self.target_or_real(target), value)
    }

    /// Intercept an event subscription.
    pub fn intercept_event_add(&self, name: &str, subscribe: impl FnOnce(Arc<T>)) {
        let target = self.resolve(name, MemberKind::Event, |config| config.is_event_mocked(name));
        subscribe(self.target_or_real(target))
    }

    /// Intercept an event unsubscription.
    pub fn intercept_event_remove(&self, name: &str, unsubscribe: impl FnOnce(Arc<T>)) {
        let target = self.resolve(name, MemberKind::Event, |config| config.is_event_mocked(name));
        unsubscribe(self.target_or_real(target))
    }

    fn target_or_real(&self, target: Target<T>) -> Arc<T> {
        match target {
            Target::Real => Arc::clone(&self.real),
            Target::Substitute(target) | Target::Alternate(target) => target,
        }
    }

    fn resolve_method(&self, name: &str, args: &[&dyn Any]) -> Target<T> {
        let slot = self.context.slot();
        let target = match Self::split(slot) {
            Err(target) => target,
            Ok((mock, configuration)) => {
                let matched = configuration.evaluate_method_call(name, args);
                if self.diagnostics.report_match_failures && !matched.mocked {
                    for failure in &matched.failures {
                        logging::log_match_failure_reported(T::NAME, name, failure);
                    }
                }
                if !matched.mocked {
                    Target::Real
                } else if let Some(alternate) = configuration.try_get_alternate_target(name) {
                    Target::Alternate(alternate)
                } else {
                    Target::Substitute(mock)
                }
            }
        };
        self.trace(name, MemberKind::Method, &target);
        target
    }

    fn resolve(
        &self,
        name: &str,
        kind: MemberKind,
        is_mocked: impl FnOnce(&MockConfiguration<T>) -> bool,
    ) -> Target<T> {
        let slot = self.context.slot();
        let target = match Self::split(slot) {
            Err(target) => target,
            Ok((mock, configuration)) => {
                if is_mocked(&configuration) {
                    Target::Substitute(mock)
                } else {
                    Target::Real
                }
            }
        };
        self.trace(name, kind, &target);
        target
    }

    /// Settle the unconfigured states, or hand back the substitute and its configuration.
    #[allow(clippy::type_complexity)]
    fn split(slot: MockSlot<T>) -> Result<(Arc<T>, Arc<MockConfiguration<T>>), Target<T>> {
        match slot.into_parts() {
            (None, _) => Err(Target::Real),
            (Some(mock), None) => Err(Target::Substitute(mock)),
            (Some(mock), Some(configuration)) => Ok((mock, configuration)),
        }
    }

    fn trace(&self, name: &str, kind: MemberKind, target: &Target<T>) {
        if self.diagnostics.trace_routing {
            logging::log_route(T::NAME, name, kind, target.route());
        }
    }
}

impl<T> Clone for CallInterceptor<T>
where
    T: ?Sized + Contract,
{
    fn clone(&self) -> Self {
        Self {
            context: Arc::clone(&self.context),
            real: Arc::clone(&self.real),
            diagnostics: self.diagnostics,
        }
    }
}

impl<T> fmt::Debug for CallInterceptor<T>
where
    T: ?Sized + Contract,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallInterceptor")
            .field("contract", &T::NAME)
            .field("state", &self.context.state())
            .field("diagnostics", &self.diagnostics)
            .finish()
    }
}
