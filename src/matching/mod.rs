//! Argument patterns and the matcher that checks them against live calls.
//!
//! A [`CallShape`] is one registered invocation of a method: an ordered list of
//! [`ArgPattern`]s, one per parameter. Patterns are built with the helpers in
//! [`arg`]:
//!
//! ```ignore
//! use dynamock::{arg, CallShape};
//!
//! let shape = CallShape::new([arg::any_of::<String>(), arg::is(|i: &i32| *i > 10)]);
//! ```

pub mod matcher;
pub mod pattern;

pub use matcher::{ArgumentMatcher, MatchFailure, MatchOutcome};
pub use pattern::{ArgPattern, PatternResult};

use std::fmt;

/// Ordered argument patterns describing one registered call.
#[derive(Clone, Default)]
pub struct CallShape {
    patterns: Vec<ArgPattern>,
}

impl CallShape {
    pub fn new(patterns: impl IntoIterator<Item = ArgPattern>) -> Self {
        Self {
            patterns: patterns.into_iter().collect(),
        }
    }

    pub fn patterns(&self) -> &[ArgPattern] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl From<Vec<ArgPattern>> for CallShape {
    fn from(patterns: Vec<ArgPattern>) -> Self {
        Self { patterns }
    }
}

impl fmt::Debug for CallShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for CallShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, pattern) in self.patterns.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", pattern)?;
        }
        write!(f, ")")
    }
}

/// Constructors for argument patterns.
pub mod arg {
    use super::ArgPattern;
    use predicates::Predicate;
    use std::any::{type_name, Any};
    use std::fmt;

    /// Matches any value.
    pub fn any() -> ArgPattern {
        ArgPattern::Any
    }

    /// Matches any value of type `A`.
    pub fn any_of<A: Any>() -> ArgPattern {
        ArgPattern::predicate::<A, _>(format!("<any {}>", type_name::<A>()), |_| true)
    }

    /// Matches a value equal to `expected`.
    pub fn eq<A>(expected: A) -> ArgPattern
    where
        A: PartialEq + fmt::Debug + Send + Sync + 'static,
    {
        ArgPattern::literal(expected)
    }

    /// Matches values of type `A` accepted by `predicate`.
    ///
    /// Optional parameters arrive as `Option<_>`; declare the predicate over the
    /// option to see `None`.
    pub fn is<A, F>(predicate: F) -> ArgPattern
    where
        A: Any,
        F: Fn(&A) -> bool + Send + Sync + 'static,
    {
        ArgPattern::predicate(format!("<is {}>", type_name::<A>()), predicate)
    }

    /// Matches values of type `A` accepted by a [`predicates`] predicate.
    pub fn matches<A, P>(predicate: P) -> ArgPattern
    where
        A: Any,
        P: Predicate<A> + Send + Sync + 'static,
    {
        let description = predicate.to_string();
        ArgPattern::predicate(description, move |a: &A| predicate.eval(a))
    }

    /// Matches a value equal to whatever `producer` returns at call time.
    pub fn eq_with<A, F>(producer: F) -> ArgPattern
    where
        A: PartialEq + 'static,
        F: Fn() -> A + Send + Sync + 'static,
    {
        ArgPattern::deferred(move || Ok::<_, std::convert::Infallible>(producer()))
    }

    /// Like [`eq_with`], but the producer may fail. A failure is a non-match.
    pub fn try_eq_with<A, E, F>(producer: F) -> ArgPattern
    where
        A: PartialEq + 'static,
        E: fmt::Display,
        F: Fn() -> Result<A, E> + Send + Sync + 'static,
    {
        ArgPattern::deferred(producer)
    }
}
