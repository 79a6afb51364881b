use dynamock::{CallInterceptor, Contract, MockContext, MockState, Route};
use std::any::Any;

pub struct RouteAssertions<'a, T: ?Sized + Contract> {
    interceptor: &'a CallInterceptor<T>,
}

impl<'a, T> RouteAssertions<'a, T>
where
    T: ?Sized + Contract + Send + Sync,
{
    pub fn new(interceptor: &'a CallInterceptor<T>) -> Self {
        Self { interceptor }
    }

    #[track_caller]
    pub fn assert_method_routes(&self, name: &str, args: &[&dyn Any], expected: Route) {
        let actual = self.interceptor.route_method(name, args);
        assert_eq!(
            actual,
            expected,
            "{}::{} routed to {} (slot: {})",
            T::NAME,
            name,
            actual,
            self.interceptor.context().state()
        );
    }

    #[track_caller]
    pub fn assert_property_routes(&self, name: &str, expected: Route) {
        let actual = self.interceptor.route_property(name);
        assert_eq!(actual, expected, "{}::{} routed to {}", T::NAME, name, actual);
    }

    #[track_caller]
    pub fn assert_event_routes(&self, name: &str, expected: Route) {
        let actual = self.interceptor.route_event(name);
        assert_eq!(actual, expected, "{}::{} routed to {}", T::NAME, name, actual);
    }

    /// Every listed member goes to the real implementation.
    #[track_caller]
    pub fn assert_all_real(&self, methods: &[&str], properties: &[&str], events: &[&str]) {
        let context = self.interceptor.context();
        for name in methods {
            let selected = match (context.current(), context.active_configuration()) {
                (None, _) => false,
                (Some(_), None) => true,
                (Some(_), Some(config)) => config.is_method_mocked(name),
            };
            assert!(!selected, "{}::{} is selected for mocking", T::NAME, name);
        }
        for name in properties {
            self.assert_property_routes(name, Route::Real);
        }
        for name in events {
            self.assert_event_routes(name, Route::Real);
        }
    }

    #[track_caller]
    pub fn assert_state(&self, expected: MockState) {
        assert_eq!(self.interceptor.context().state(), expected);
    }

    #[track_caller]
    pub fn assert_no_mock(&self) {
        self.assert_state(MockState::NoMockActive);
    }
}

/// Assert that `context` holds the same slot it held before `body` ran.
#[track_caller]
pub fn assert_slot_restored<T, C, F>(context: &C, body: F)
where
    T: ?Sized + Contract,
    C: MockContext<T> + ?Sized,
    F: FnOnce(),
{
    let before = context.slot();
    body();
    let after = context.slot();
    assert!(
        before.same_as(&after),
        "{} slot was not restored: {} before, {} after",
        T::NAME,
        before.state(),
        after.state()
    );
}
