use crate::inventory::{Canned, Inventory, InventoryProxy, Warehouse};
use dynamock::config::{Config, DiagnosticsConfig};
use dynamock_testkit::capture_logs;
use dynamock::{
    arg, logging, CallShape, DynaMockError, MemberKind, MockConfiguration, MockContext,
    SharedMockContext,
};
use miette::Diagnostic;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

#[test]
fn test_unknown_member_is_rejected_with_diagnostic() {
    let error = MockConfiguration::<dyn Inventory>::build(|c| {
        c.mock_method("restock")?;
        Ok(())
    })
    .unwrap_err();

    assert!(matches!(
        &error,
        DynaMockError::UnknownMember { contract: "Inventory", member, kind: MemberKind::Method }
            if member == "restock"
    ));
    assert_eq!(error.to_string(), "`restock` is not a method of Inventory");
    assert_eq!(
        error.code().map(|code| code.to_string()).as_deref(),
        Some("dynamock::unknown_member")
    );
    assert!(error.help().is_some());
}

#[test]
fn test_member_kind_mismatch_names_both_kinds() {
    let error = MockConfiguration::<dyn Inventory>::build(|c| {
        c.mock_event("region")?;
        Ok(())
    })
    .unwrap_err();

    assert!(matches!(
        error,
        DynaMockError::MemberKindMismatch {
            expected: MemberKind::Event,
            actual: MemberKind::Property,
            ..
        }
    ));
    assert_eq!(
        error.code().map(|code| code.to_string()).as_deref(),
        Some("dynamock::member_kind_mismatch")
    );
}

#[test]
fn test_configuration_listing_reflects_builder_calls() -> anyhow::Result<()> {
    let config = MockConfiguration::<dyn Inventory>::build(|c| {
        c.mock_method("stock")?
            .mock_method_when("reserve", CallShape::new([arg::eq("widget"), arg::any()]))?
            .mock_method_when("reserve", CallShape::new([arg::any(), arg::eq(0u32)]))?
            .mock_property("region")?
            .mock_event("restocked")?;
        Ok(())
    })?;

    assert_eq!(
        config.mocked_methods().into_iter().collect::<Vec<_>>(),
        vec!["reserve", "stock"]
    );
    assert_eq!(config.call_shapes("reserve").len(), 2);
    assert!(config.is_method_mocked_with_args("reserve", dynamock::args!["gadget".to_string(), 0u32]));
    assert!(!config.is_method_mocked_with_args("reserve", dynamock::args!["gadget".to_string(), 1u32]));
    assert!(config.is_property_mocked("region"));
    assert!(config.is_event_mocked("restocked"));
    Ok(())
}

#[test]
fn test_config_file_drives_interceptor_diagnostics() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join(".dynamock.toml");
    fs::write(
        &path,
        r#"
[diagnostics]
report_match_failures = true
trace_routing = true

[logging]
level = "debug"
"#,
    )?;

    let config = Config::load_from(&path)?;
    assert_eq!(
        config.diagnostics,
        DiagnosticsConfig {
            report_match_failures: true,
            trace_routing: true,
        }
    );
    assert_eq!(config.logging.level, "debug");
    assert!(!config.logging.json);

    let context = Arc::new(SharedMockContext::<dyn Inventory>::new());
    let mut inventory = InventoryProxy::new(context.clone(), Arc::new(Warehouse::new(&[("widget", 5)])));
    inventory.interceptor = inventory.interceptor.clone().with_diagnostics(config.diagnostics);

    context.set_configured_mock(Arc::new(Canned::new(0)), |c| {
        c.mock_method_when(
            "stock",
            CallShape::new([arg::try_eq_with(|| "sku-?".parse::<u32>().map(|n| n.to_string()))]),
        )?;
        Ok(())
    })?;
    let (stock, logs) = capture_logs(|| inventory.stock("widget"));
    assert_eq!(stock, 5);
    logs.assert_contains("fell back to the real implementation");
    logs.assert_contains("contract=\"Inventory\"");
    assert_eq!(logs.at_level("WARN").count(), 1);
    logs.assert_contains("Call routed");
    assert!(logs.at_level("TRACE").any(|line| line.contains("member=\"stock\"")));
    Ok(())
}

#[test]
fn test_default_diagnostics_do_not_report_fallbacks() -> anyhow::Result<()> {
    let context = Arc::new(SharedMockContext::<dyn Inventory>::new());
    let inventory = InventoryProxy::new(context.clone(), Arc::new(Warehouse::new(&[("widget", 5)])));
    context.set_configured_mock(Arc::new(Canned::new(0)), |c| {
        c.mock_method_when(
            "stock",
            CallShape::new([arg::try_eq_with(|| "sku-?".parse::<u32>().map(|n| n.to_string()))]),
        )?;
        Ok(())
    })?;

    let (stock, logs) = capture_logs(|| inventory.stock("widget"));
    assert_eq!(stock, 5);
    assert_eq!(logs.at_level("WARN").count(), 0);
    logs.assert_absent("Call routed");
    Ok(())
}

#[test]
fn test_wrong_arity_shape_is_kept_but_never_matches() -> anyhow::Result<()> {
    let (config, logs) = capture_logs(|| {
        MockConfiguration::<dyn Inventory>::build(|c| {
            c.mock_method_when("reserve", CallShape::new([arg::eq("widget")]))?;
            Ok(())
        })
    });
    let config = config?;

    logs.assert_contains("arity differs from the method signature");
    assert_eq!(logs.at_level("WARN").count(), 1);
    assert!(config.is_method_mocked("reserve"));
    assert_eq!(config.call_shapes("reserve").len(), 1);
    assert!(!config.is_method_mocked_with_args(
        "reserve",
        dynamock::args!["widget".to_string(), 1u32]
    ));
    Ok(())
}

#[test]
fn test_malformed_config_file_is_an_error() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join(".dynamock.toml");
    fs::write(&path, "[diagnostics\nreport_match_failures = maybe")?;

    let error = Config::load_from(&path).unwrap_err();
    assert!(matches!(error, DynaMockError::ConfigFile(_)));
    Ok(())
}

#[test]
fn test_missing_config_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_logging_initializes_once() {
    let config = Config::default();
    logging::init(&config.logging);
    assert!(!logging::init(&config.logging));
}
