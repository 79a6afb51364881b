use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

type EventCheck = Arc<dyn Fn(&dyn Any, &dyn Any) -> bool + Send + Sync>;

/// Typed predicate over an event's sender and arguments.
#[derive(Clone)]
pub struct EventPattern {
    signature: String,
    check: EventCheck,
}

impl EventPattern {
    pub fn new<S, E, F>(predicate: F) -> Self
    where
        S: Any,
        E: Any,
        F: Fn(&S, &E) -> bool + Send + Sync + 'static,
    {
        Self {
            signature: format!("({}, {})", type_name::<S>(), type_name::<E>()),
            check: Arc::new(move |sender, args| {
                match (sender.downcast_ref::<S>(), args.downcast_ref::<E>()) {
                    (Some(sender), Some(args)) => predicate(sender, args),
                    _ => false,
                }
            }),
        }
    }

    /// Whether the raise matches. Sender or arguments of another type never match.
    pub fn matches(&self, sender: &dyn Any, event_args: &dyn Any) -> bool {
        (self.check)(sender, event_args)
    }
}

impl fmt::Debug for EventPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventPattern{}", self.signature)
    }
}
