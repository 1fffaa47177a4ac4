//! Integration tests for the MessageBuilder API
//!
//! These tests drive the full pipeline through the public API only.

use std::{fs, sync::Arc};

use float_cmp::assert_approx_eq;
use tempfile::tempdir;

use kspk::{
    Dimension, KspkError, MessageBuilder, SymbolTable,
    config::AppConfig,
    layer::{SpatialShape, SymbolicExpr},
};
use kspk_parser::error::ErrorCode;

fn builder() -> MessageBuilder {
    MessageBuilder::builtin(AppConfig::default()).expect("built-in table is valid")
}

#[test]
fn test_valid_scenario() {
    let builder = builder();
    let message = builder.process("⬢♦⬢").expect("lenient builder");

    assert!(message.diagnostics().is_empty());
    assert!(!message.is_degraded());

    let emotional = message.emotional();
    assert_approx_eq!(f64, emotional.valence, 1.0);
    assert_approx_eq!(f64, emotional.arousal, 1.0);
    assert_approx_eq!(f64, emotional.dominance, 0.0);

    assert!(matches!(message.spatial(), SpatialShape::Union { .. }));
    assert!(message.semantic().is_empty());
    assert!(message.temporal().is_empty());
}

#[test]
fn test_recovered_scenario() {
    let builder = builder();
    let message = builder.process("⊕⧖♦⬢⟨analysis⟩").expect("lenient builder");

    let codes: Vec<_> = message.diagnostics().iter().map(|d| d.code()).collect();
    assert_eq!(codes, [ErrorCode::E100, ErrorCode::E100]);
    assert!(!message.has_unrecovered());
    assert!(message.is_degraded());

    // The semantic layer reflects the recovered subtree under the degraded ⊕.
    let SymbolicExpr::Apply { op, operands, .. } = message.semantic() else {
        panic!("expected ⊕ applied to the recovered operand");
    };
    assert_eq!(builder.table().key(*op), "⊕");
    assert_eq!(operands.len(), 1);
    assert_eq!(message.semantic().render(builder.table()), "⊕(\"analysis\")");

    assert_eq!(
        message.temporal().render(builder.table()),
        "[⧖@0+1]"
    );
    assert_eq!(message.spatial().render(builder.table()), "⬢");
}

#[test]
fn test_every_dimension_is_populated_for_mixed_expression() {
    let builder = builder();
    let message = builder
        .process("⧖⬢✧ → ⟨deliver report⟩ ⊗ ⬢")
        .expect("lenient builder");

    assert!(message.diagnostics().is_empty());
    assert!(!message.semantic().is_empty());
    assert!(!message.temporal().is_empty());
    assert!(!message.spatial().is_empty());
    assert!(!message.logical().is_empty());
    assert!(!message.emotional().is_zero());

    for dimension in Dimension::ALL {
        assert!(
            !message.provenance().contributors(dimension).is_empty(),
            "no contributors for {dimension}"
        );
    }
}

#[test]
fn test_compose_after_parse() {
    let builder = builder();
    let parsed = builder.parse("⬢ ⊕ ⬢").expect("lenient builder");
    assert!(parsed.is_clean());

    let message = builder.compose(parsed);
    assert_eq!(message.logical().render(builder.table()), "⊕");
}

#[test]
fn test_strict_config_rejects() {
    let config = AppConfig::from_toml_str("[parser]\nstrict = true").expect("valid config");
    let builder = MessageBuilder::builtin(config).expect("built-in table is valid");

    match builder.process("⬢♦⊕⬢") {
        Err(KspkError::Rejected { err, .. }) => {
            assert!(err.to_string().starts_with("error[E100]"));
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[test]
fn test_custom_table_from_file() {
    let dir = tempdir().expect("create temp dir");
    let path = dir.path().join("table.toml");
    fs::write(
        &path,
        r#"
        [symbols."○"]
        category = "atom"
        weights = { spatial = 2.0 }

        [symbols."+"]
        category = "binary_operator"
        precedence = 1
        associativity = "left"
        spatial = "sequence"
        "#,
    )
    .expect("write table");

    let builder =
        MessageBuilder::from_config(AppConfig::default().with_table(&path)).expect("valid table");
    let message = builder.process("○+○").expect("lenient builder");

    assert_eq!(builder.table().len(), 2);
    assert_approx_eq!(f64, message.spatial().extent(), 4.0);
}

#[test]
fn test_shared_table() {
    let table = Arc::new(SymbolTable::builtin().expect("built-in table is valid"));
    let lenient = MessageBuilder::new(AppConfig::default(), Arc::clone(&table));
    let strict = MessageBuilder::new(AppConfig::default().with_strict(true), table);

    assert!(lenient.process("⬢♦⊕⬢").is_ok());
    assert!(strict.process("⬢♦⊕⬢").is_err());
}
