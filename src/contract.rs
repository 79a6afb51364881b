//! Member catalogs for mockable contracts.
//!
//! A contract is the trait object type (`dyn Service`) a wrapper routes. The
//! wrapper generator implements [`Contract`] for it so configuration can be
//! checked against the members that actually exist.

use crate::{DynaMockError, Result};
use std::fmt;

/// Kind of a routable member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Method,
    Property,
    Event,
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Method => write!(f, "method"),
            Self::Property => write!(f, "property"),
            Self::Event => write!(f, "event"),
        }
    }
}

/// One routable member of a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Member {
    pub name: &'static str,
    pub kind: MemberKind,
    /// Parameter count, excluding the receiver. Zero for properties and events.
    pub arity: usize,
}

impl Member {
    pub const fn method(name: &'static str, arity: usize) -> Self {
        Self {
            name,
            kind: MemberKind::Method,
            arity,
        }
    }

    pub const fn property(name: &'static str) -> Self {
        Self {
            name,
            kind: MemberKind::Property,
            arity: 0,
        }
    }

    pub const fn event(name: &'static str) -> Self {
        Self {
            name,
            kind: MemberKind::Event,
            arity: 0,
        }
    }
}

/// Catalog of routable members, implemented for the contract's trait object type.
///
/// ```ignore
/// impl Contract for dyn Greeter {
///     const NAME: &'static str = "Greeter";
///     const MEMBERS: &'static [Member] =
///         &[Member::method("greet", 1), Member::property("locale")];
/// }
/// ```
pub trait Contract: 'static {
    const NAME: &'static str;

    const MEMBERS: &'static [Member];

    fn members() -> &'static [Member] {
        Self::MEMBERS
    }

    /// Look up a member by name.
    fn member(name: &str) -> Option<&'static Member> {
        Self::members().iter().find(|m| m.name == name)
    }

    /// Resolve `name` as a member of `kind`, failing with a descriptive error.
    fn require(name: &str, kind: MemberKind) -> Result<&'static Member> {
        let member = Self::member(name).ok_or_else(|| DynaMockError::UnknownMember {
            contract: Self::NAME,
            member: name.to_string(),
            kind,
        })?;
        if member.kind != kind {
            return Err(DynaMockError::MemberKindMismatch {
                contract: Self::NAME,
                member: name.to_string(),
                expected: kind,
                actual: member.kind,
            });
        }
        Ok(member)
    }
}
