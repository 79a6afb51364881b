use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

type CheckFn = Arc<dyn Fn(&dyn Any) -> bool + Send + Sync>;
type EvalFn = Arc<dyn Fn(&dyn Any) -> Result<bool, String> + Send + Sync>;

/// Result of evaluating a single pattern against one argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternResult {
    Match,
    Mismatch,
    /// Evaluation itself failed. Callers treat this as a mismatch.
    Failed(String),
}

/// One positional matching rule of a call shape.
#[derive(Clone)]
pub enum ArgPattern {
    /// Matches every value, whatever its type.
    Any,
    /// Typed predicate. A value of another runtime type never matches.
    Predicate { description: String, check: CheckFn },
    /// Equality against a value captured when the shape was built.
    Literal { description: String, check: CheckFn },
    /// Equality against a value produced at match time. The producer may fail.
    Deferred { description: String, eval: EvalFn },
}

impl ArgPattern {
    pub(crate) fn predicate<A, F>(description: String, f: F) -> Self
    where
        A: Any,
        F: Fn(&A) -> bool + Send + Sync + 'static,
    {
        Self::Predicate {
            description,
            check: Arc::new(move |actual| actual.downcast_ref::<A>().is_some_and(&f)),
        }
    }

    pub(crate) fn literal<A>(expected: A) -> Self
    where
        A: PartialEq + fmt::Debug + Send + Sync + 'static,
    {
        Self::Literal {
            description: format!("{:?}", expected),
            check: Arc::new(move |actual| values_equal(&expected, actual)),
        }
    }

    pub(crate) fn deferred<A, E, F>(f: F) -> Self
    where
        A: PartialEq + 'static,
        E: fmt::Display,
        F: Fn() -> Result<A, E> + Send + Sync + 'static,
    {
        Self::Deferred {
            description: format!("<deferred {}>", type_name::<A>()),
            eval: Arc::new(move |actual| match f() {
                Ok(expected) => Ok(values_equal(&expected, actual)),
                Err(e) => Err(e.to_string()),
            }),
        }
    }

    /// Evaluate this pattern against one live argument.
    pub fn evaluate(&self, actual: &dyn Any) -> PatternResult {
        let matched = match self {
            Self::Any => true,
            Self::Predicate { check, .. } | Self::Literal { check, .. } => check(actual),
            Self::Deferred { eval, .. } => match eval(actual) {
                Ok(matched) => matched,
                Err(reason) => return PatternResult::Failed(reason),
            },
        };
        if matched {
            PatternResult::Match
        } else {
            PatternResult::Mismatch
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Self::Any => "_",
            Self::Predicate { description, .. }
            | Self::Literal { description, .. }
            | Self::Deferred { description, .. } => description,
        }
    }
}

impl fmt::Debug for ArgPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let variant = match self {
            Self::Any => "Any",
            Self::Predicate { .. } => "Predicate",
            Self::Literal { .. } => "Literal",
            Self::Deferred { .. } => "Deferred",
        };
        write!(f, "{}({})", variant, self.description())
    }
}

impl fmt::Display for ArgPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Compare `expected` with a type-erased argument.
///
/// Wrappers hand string parameters over as `String`, so `&'static str` and
/// `String` compare by content in either direction.
fn values_equal<A: PartialEq + 'static>(expected: &A, actual: &dyn Any) -> bool {
    if let Some(actual) = actual.downcast_ref::<A>() {
        return expected == actual;
    }
    let expected: &dyn Any = expected;
    if let Some(s) = expected.downcast_ref::<&'static str>() {
        return actual.downcast_ref::<String>().is_some_and(|a| a == s);
    }
    if let Some(s) = expected.downcast_ref::<String>() {
        return actual.downcast_ref::<&'static str>().is_some_and(|a| a == s);
    }
    false
}
