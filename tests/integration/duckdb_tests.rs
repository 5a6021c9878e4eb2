//! Comparisons over real DuckDB files, and across backends

use crate::common::{assert_close, sample_data, TestFixture};
use dbdiff::source::{DuckDbSource, SqliteSource};
use dbdiff::{compare, open_source, DataSource, SourceBackend};

#[test]
fn test_duckdb_users_example() {
    let fixture = TestFixture::new().unwrap();
    let a = fixture.create_duckdb("a.duckdb", sample_data::USERS_A_SQL).unwrap();
    let b = fixture.create_duckdb("b.duckdb", sample_data::USERS_B_SQL).unwrap();

    let a = DuckDbSource::open(&a).unwrap();
    let b = DuckDbSource::open(&b).unwrap();
    let report = compare(&a, &b, None).unwrap();

    assert_close(report.overall_score, 0.2);
}

#[test]
fn test_duckdb_introspection() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.create_duckdb("shop.duckdb", sample_data::SHOP_SQL).unwrap();
    let source = open_source(&path, SourceBackend::Auto).unwrap();

    let tables = source.list_tables().unwrap();
    assert!(tables.contains("customers"));
    assert!(tables.contains("orders"));

    let schema = source.get_columns("customers").unwrap();
    assert_eq!(schema.column_names(), vec!["id", "name", "city"]);
    assert_eq!(schema.columns["id"].declared_type, "INTEGER");
    assert_eq!(source.row_count("orders").unwrap(), 3);
}

#[test]
fn test_duckdb_identical_copy() {
    let fixture = TestFixture::new().unwrap();
    let a = fixture.create_duckdb("a.duckdb", sample_data::SHOP_SQL).unwrap();
    let b = fixture.create_duckdb("b.duckdb", sample_data::SHOP_SQL).unwrap();

    let a = DuckDbSource::open(&a).unwrap();
    let b = DuckDbSource::open(&b).unwrap();
    let report = compare(&a, &b, None).unwrap();

    assert!(report.is_identical());
    assert_eq!(report.similarity, 1.0);
}

#[test]
fn test_sqlite_against_duckdb_content() {
    let fixture = TestFixture::new().unwrap();
    let sqlite = fixture.create_sqlite("shop.db", sample_data::SHOP_SQL).unwrap();
    let duck = fixture.create_duckdb("shop.duckdb", sample_data::SHOP_SQL).unwrap();

    let a = SqliteSource::open(&sqlite).unwrap();
    let b = DuckDbSource::open(&duck).unwrap();
    let report = compare(&a, &b, None).unwrap();

    assert_eq!(report.presence.score, 0.0);
    for (name, table) in &report.tables {
        assert_eq!(table.content.score, 0.0, "table {} content differs", name);
        assert!(table.fault.is_none());
    }
}
