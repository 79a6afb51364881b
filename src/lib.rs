pub mod config;
pub mod configuration;
pub mod context;
pub mod contract;
pub mod interceptor;
pub mod logging;
pub mod matching;
use miette::Diagnostic;

pub use configuration::MockConfiguration;
pub use context::{
    IsolatedMockContext, MockContext, MockScope, MockSlot, MockState, SharedMockContext,
};
pub use contract::{Contract, Member, MemberKind};
pub use interceptor::{CallInterceptor, Route};
pub use matching::{arg, ArgPattern, ArgumentMatcher, CallShape};

/// Build the positional argument list handed to the interceptor.
///
/// ```ignore
/// interceptor.intercept_method("add", args![a, b], |m| m.add(a, b), |r| r.add(a, b))
/// ```
#[macro_export]
macro_rules! args {
    () => {
        &[] as &[&dyn ::std::any::Any]
    };
    ($($arg:expr),+ $(,)?) => {
        &[$(&$arg as &dyn ::std::any::Any),+] as &[&dyn ::std::any::Any]
    };
}

/// Result type alias for the mocking engine
pub type Result<T, E = DynaMockError> = std::result::Result<T, E>;

/// Error types for the mocking engine
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum DynaMockError {
    #[error("`{member}` is not a {kind} of {contract}")]
    #[diagnostic(
        code(dynamock::unknown_member),
        help("Mock configuration can only name members declared on the contract being mocked. Check the spelling, or whether the call was meant for a different service.")
    )]
    UnknownMember {
        contract: &'static str,
        member: String,
        kind: MemberKind,
    },

    #[error("`{member}` on {contract} is a {actual}, not a {expected}")]
    #[diagnostic(
        code(dynamock::member_kind_mismatch),
        help("Use mock_method for methods, mock_property for properties and mock_event for events.")
    )]
    MemberKindMismatch {
        contract: &'static str,
        member: String,
        expected: MemberKind,
        actual: MemberKind,
    },

    #[error("Configuration file error: {0}")]
    #[diagnostic(
        code(dynamock::config_file),
        help("Make sure `.dynamock.toml` is valid TOML. Delete it to fall back to the defaults.")
    )]
    ConfigFile(String),
}
