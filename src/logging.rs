//! Structured logging utilities for the mocking engine.
//!
//! This module provides helper functions for consistent, structured logging
//! across the engine using the `tracing` crate, plus a subscriber setup for
//! test binaries that want to see the routing decisions.

use crate::config::LoggingConfig;
use crate::context::MockState;
use crate::contract::MemberKind;
use crate::interceptor::Route;
use crate::matching::MatchFailure;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable switching the subscriber to JSON output.
pub const JSON_ENV_VAR: &str = "DYNAMOCK_LOG_JSON";

/// Install a global subscriber writing to stderr.
///
/// `RUST_LOG` takes precedence over the configured level. Returns `false` when
/// a subscriber was already installed, which is common when several tests
/// initialize logging.
pub fn init(config: &LoggingConfig) -> bool {
    let fallback_filter = format!("dynamock={}", config.level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| fallback_filter.into());

    let use_json = config.json || std::env::var(JSON_ENV_VAR).is_ok();

    if use_json {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true);

        tracing_subscriber::registry()
            .with(filter)
            .with(json_layer)
            .try_init()
            .is_ok()
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
            .is_ok()
    }
}

/// Log a substitute becoming active.
pub fn log_mock_activated(contract: &str, state: MockState) {
    tracing::debug!(contract, %state, "Mock activated");
}

/// Log the active substitute being cleared.
pub fn log_mock_removed(contract: &str) {
    tracing::debug!(contract, "Mock removed");
}

pub fn log_scope_entered(contract: &str) {
    tracing::debug!(contract, "Scoped mock entered");
}

/// Log a scope guard restoring the previous slot.
pub fn log_scope_restored(contract: &str, restored: MockState) {
    tracing::debug!(contract, %restored, "Scoped mock restored");
}

/// Log a flow-local write dropped because the calling tokio task has no flow of its own.
pub fn log_unscoped_flow_write(value_type: &str) {
    tracing::warn!(
        value_type,
        "Flow-local write ignored: tokio task is outside any flow; start it with flow::spawn or wrap it in flow::scope"
    );
}

/// Log a routing decision.
pub fn log_route(contract: &str, member: &str, kind: MemberKind, route: Route) {
    tracing::trace!(contract, member, %kind, %route, "Call routed");
}

/// Log an argument pattern whose evaluation failed and was treated as a non-match.
pub fn log_match_failure(member: &str, failure: &MatchFailure) {
    tracing::debug!(
        member,
        position = failure.position,
        pattern = %failure.pattern,
        reason = %failure.reason,
        "Argument pattern evaluation failed; treating call shape as non-matching"
    );
}

/// Surface a swallowed evaluation failure at warn level.
pub fn log_match_failure_reported(contract: &str, member: &str, failure: &MatchFailure) {
    tracing::warn!(
        contract,
        member,
        position = failure.position,
        pattern = %failure.pattern,
        reason = %failure.reason,
        "Mocked call fell back to the real implementation because an argument pattern failed"
    );
}
