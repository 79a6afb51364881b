use super::pattern::PatternResult;
use super::CallShape;
use std::any::Any;

/// A pattern whose evaluation failed while matching a live call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchFailure {
    pub position: usize,
    pub pattern: String,
    pub reason: String,
}

/// Detailed outcome of matching one call shape against actual arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    Matched,
    ArityMismatch { expected: usize, actual: usize },
    Mismatch { position: usize },
    Failed(MatchFailure),
}

impl MatchOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Matched)
    }
}

/// Positional matcher for registered call shapes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArgumentMatcher;

impl ArgumentMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Check whether `args` satisfy every pattern of `shape`, position by position.
    pub fn matches_call(&self, shape: &CallShape, args: &[&dyn Any]) -> bool {
        self.matches_call_detailed(shape, args).is_match()
    }

    /// Same as [`matches_call`](Self::matches_call), reporting why a call did not match.
    pub fn matches_call_detailed(&self, shape: &CallShape, args: &[&dyn Any]) -> MatchOutcome {
        if shape.len() != args.len() {
            return MatchOutcome::ArityMismatch {
                expected: shape.len(),
                actual: args.len(),
            };
        }

        for (position, (pattern, actual)) in shape.patterns().iter().zip(args).enumerate() {
            match pattern.evaluate(*actual) {
                PatternResult::Match => {}
                PatternResult::Mismatch => return MatchOutcome::Mismatch { position },
                PatternResult::Failed(reason) => {
                    return MatchOutcome::Failed(MatchFailure {
                        position,
                        pattern: pattern.to_string(),
                        reason,
                    })
                }
            }
        }

        MatchOutcome::Matched
    }
}
