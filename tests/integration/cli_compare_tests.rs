//! End-to-end runs of the compare and inspect commands

use crate::common::{sample_data, CliTestRunner};
use dbdiff::DbdiffError;
use std::fs;

#[test]
fn test_compare_writes_json_report() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let a = fixture.create_sqlite("a.db", sample_data::USERS_A_SQL).unwrap();
    let b = fixture.create_sqlite("b.db", sample_data::USERS_B_SQL).unwrap();
    let out = fixture.path_str("reports/users.json");

    runner.expect_success(&[
        "compare",
        a.to_str().unwrap(),
        b.to_str().unwrap(),
        "--format",
        "json",
        "--output",
        &out,
        "--quiet",
    ]);

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    let overall = json["report"]["overall_score"].as_f64().unwrap();
    assert!((overall - 0.2).abs() < 1e-9);
    assert!(json["report"]["tables"]["users"].is_object());
    assert!(json["report"]["run_id"].is_string());
}

#[test]
fn test_compare_pretty_to_file() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let a = fixture.create_sqlite("a.db", sample_data::SHOP_SQL).unwrap();
    let b = fixture.create_sqlite("b.db", sample_data::USERS_A_SQL).unwrap();
    let out = fixture.path_str("report.txt");

    runner.expect_success(&[
        "compare",
        a.to_str().unwrap(),
        b.to_str().unwrap(),
        "--output",
        &out,
        "--quiet",
    ]);

    let text = fs::read_to_string(&out).unwrap();
    assert!(text.contains("Only in A: customers, orders"));
    assert!(text.contains("Only in B: users"));
    assert!(text.contains("No common tables to compare"));
}

#[test]
fn test_compare_with_config_and_overrides() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let a = fixture.create_sqlite("a.db", sample_data::USERS_A_SQL).unwrap();
    let b = fixture.create_sqlite("b.db", sample_data::USERS_B_SQL).unwrap();
    let config = fixture.root().join("dbdiff.json");
    fs::write(&config, r#"{"weights": {"presence": 0.0, "structure": 0.0, "data": 1.0}}"#).unwrap();
    let out = fixture.path_str("weighted.json");

    runner.expect_success(&[
        "compare",
        a.to_str().unwrap(),
        b.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "--coercion",
        "strict",
        "--threads",
        "1",
        "--format",
        "json",
        "--output",
        &out,
        "--quiet",
    ]);

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    let overall = json["report"]["overall_score"].as_f64().unwrap();
    assert!((overall - 0.25).abs() < 1e-9);
}

#[test]
fn test_compare_table_filter() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let a = fixture.create_sqlite("a.db", sample_data::SHOP_SQL).unwrap();
    let b = fixture.create_sqlite("b.db", sample_data::SHOP_SQL).unwrap();
    let out = fixture.path_str("filtered.json");

    runner.expect_success(&[
        "compare",
        a.to_str().unwrap(),
        b.to_str().unwrap(),
        "--tables",
        "orders",
        "--format",
        "json",
        "--output",
        &out,
        "--quiet",
    ]);

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    let tables = json["report"]["tables"].as_object().unwrap();
    assert_eq!(tables.keys().collect::<Vec<_>>(), vec!["orders"]);
}

#[test]
fn test_compare_empty_table_filter_fails() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let a = fixture.create_sqlite("a.db", sample_data::SHOP_SQL).unwrap();

    let err = runner.expect_failure(&[
        "compare",
        a.to_str().unwrap(),
        a.to_str().unwrap(),
        "--tables",
        " , ",
        "--quiet",
    ]);
    assert!(matches!(err, DbdiffError::InvalidInput { .. }));
}

#[test]
fn test_compare_missing_source_fails() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let a = fixture.create_sqlite("a.db", sample_data::SHOP_SQL).unwrap();
    let missing = fixture.path_str("missing.db");

    let err = runner.expect_failure(&["compare", a.to_str().unwrap(), &missing, "--quiet"]);
    assert!(matches!(err, DbdiffError::Connection { .. }));
}

#[test]
fn test_compare_invalid_format_fails() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let a = fixture.create_sqlite("a.db", sample_data::SHOP_SQL).unwrap();

    let err = runner.expect_failure(&[
        "compare",
        a.to_str().unwrap(),
        a.to_str().unwrap(),
        "--format",
        "yaml",
    ]);
    assert!(matches!(err, DbdiffError::InvalidInput { .. }));
}

#[test]
fn test_inspect_command() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let db = fixture.create_sqlite("shop.db", sample_data::SHOP_SQL).unwrap();
    let duck = fixture.create_duckdb("shop.duckdb", sample_data::SHOP_SQL).unwrap();

    runner.expect_success(&["inspect", db.to_str().unwrap()]);
    runner.expect_success(&["inspect", db.to_str().unwrap(), "--format", "json"]);
    runner.expect_success(&["inspect", duck.to_str().unwrap(), "--backend", "duckdb"]);
}
