use anyhow::{Context, Result};

use crate::ErrorKind;

use super::{setup_english, setup_users};

#[test]
fn rows_are_exhausted_in_order() -> Result<()> {
    let db = setup_english(":memory:")?;
    let mut rows = db.execute("SELECT value FROM english ORDER BY value")?;

    let mut values = Vec::new();

    while let Some(row) = rows.row() {
        values.push(row.get("value")?.read::<String>());
        rows.advance()?;
    }

    assert_eq!(values.len(), 7);
    assert_eq!(values.first().map(String::as_str), Some("cerotype"));
    assert_eq!(values.last().map(String::as_str), Some("undertype"));
    assert!(rows.is_done());
    assert!(rows.row().is_none());
    Ok(())
}

#[test]
fn rows_next_yields_every_row_once() -> Result<()> {
    let db = setup_english(":memory:")?;
    let mut rows = db.execute("SELECT value FROM english WHERE value LIKE '%type'")?;

    let mut count = 0;

    while let Some(row) = rows.next()? {
        assert!(row.get(0)?.read::<String>().ends_with("type"));
        count += 1;
    }

    assert_eq!(count, 6);
    assert!(rows.next()?.is_none());
    Ok(())
}

#[test]
fn rows_empty_result() -> Result<()> {
    let db = setup_english(":memory:")?;
    let mut rows = db.execute("SELECT value FROM english WHERE value = 'missing'")?;

    assert!(rows.is_done());
    assert!(rows.row().is_none());
    assert!(rows.next()?.is_none());
    Ok(())
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "advanced a cursor which is done")]
fn rows_advance_past_end() {
    let db = setup_english(":memory:").unwrap();
    let mut rows = db.execute("SELECT value FROM english WHERE 0").unwrap();
    let _ = rows.advance();
}

#[test]
fn rows_outlive_statement() -> Result<()> {
    let db = setup_english(":memory:")?;
    let stmt = db.prepare("SELECT value FROM english ORDER BY value")?;
    let mut rows = db.execute_statement(&stmt)?;
    drop(stmt);

    let mut count = 0;

    while rows.next()?.is_some() {
        count += 1;
    }

    assert_eq!(count, 7);
    Ok(())
}

#[test]
fn rows_restart_on_execute() -> Result<()> {
    let db = setup_english(":memory:")?;
    let stmt = db.prepare("SELECT value FROM english ORDER BY value")?;

    let mut first = db.execute_statement(&stmt)?;
    first.advance()?;
    first.advance()?;
    assert_eq!(
        first.row().context("missing row")?.get(0)?.read::<String>(),
        "nonsence"
    );

    let second = db.execute_statement(&stmt)?;
    assert!(first.is_done());
    assert!(first.row().is_none());
    assert_eq!(
        second.row().context("missing row")?.get(0)?.read::<String>(),
        "cerotype"
    );
    Ok(())
}

#[test]
fn row_reads_null_after_execute() -> Result<()> {
    let db = setup_english(":memory:")?;
    let stmt = db.prepare("SELECT value FROM english ORDER BY value")?;

    let mut first = db.execute_statement(&stmt)?;
    first.advance()?;
    first.advance()?;

    let row = first.row().context("missing row")?;
    let field = row.get(0)?;
    assert_eq!(field.read::<String>(), "nonsence");

    let second = db.execute_statement(&stmt)?;

    assert!(field.is_null());
    assert_eq!(field.read::<String>(), "");
    assert!(row.get(0)?.is_null());
    assert!(format!("{row:?}").contains("NULL"));
    assert!(!format!("{row:?}").contains("cerotype"));

    assert_eq!(
        second.row().context("missing row")?.get(0)?.read::<String>(),
        "cerotype"
    );
    Ok(())
}

#[test]
fn row_reads_null_after_rebind() -> Result<()> {
    let db = setup_english(":memory:")?;
    let mut stmt = db.prepare("SELECT value FROM english WHERE value LIKE :pattern")?;
    stmt.bind(":pattern", "%nce")?;

    let rows = db.execute_statement(&stmt)?;
    let field = rows.row().context("missing row")?.get(0)?;
    assert_eq!(field.read::<String>(), "nonsence");

    stmt.bind(":pattern", "%type")?;
    assert!(field.is_null());
    assert_eq!(field.read::<i64>(), 0);
    Ok(())
}

#[test]
fn rows_are_done_after_rebind() -> Result<()> {
    let db = setup_english(":memory:")?;
    let mut stmt = db.prepare("SELECT value FROM english WHERE value LIKE :pattern")?;
    stmt.bind(":pattern", "%type")?;

    let rows = db.execute_statement(&stmt)?;
    assert!(!rows.is_done());

    stmt.bind(":pattern", "%nce")?;
    assert!(rows.is_done());
    Ok(())
}

#[test]
fn rows_same_position() -> Result<()> {
    let db = setup_english(":memory:")?;
    let stmt = db.prepare("SELECT value FROM english")?;

    let first = db.execute_statement(&stmt)?;
    let mut second = db.execute_statement(&stmt)?;
    assert!(!first.same_position(&second));

    while second.next()?.is_some() {}
    assert!(first.same_position(&second));

    let other = db.execute("SELECT value FROM english WHERE 0")?;
    assert!(!other.same_position(&second));
    Ok(())
}

#[test]
fn rows_modification_count() -> Result<()> {
    let db = setup_english(":memory:")?;

    let rows = db.execute("UPDATE english SET value = upper(value) WHERE value LIKE '%type'")?;
    assert_eq!(rows.row_modification_count(), 6);

    let rows = db.execute("DELETE FROM english WHERE value = 'nonsence'")?;
    assert_eq!(rows.row_modification_count(), 1);

    let rows = db.execute("SELECT * FROM english")?;
    assert_eq!(rows.row_modification_count(), 0);
    Ok(())
}

#[test]
fn rows_mapped() -> Result<()> {
    let db = setup_english(":memory:")?;

    let lengths = db
        .execute("SELECT value FROM english WHERE value LIKE 'p%' ORDER BY value")?
        .mapped(|row| Ok(row.get(0)?.read::<String>().len()))
        .collect::<crate::Result<Vec<_>>>()?;

    assert_eq!(lengths, [9, 10]);
    Ok(())
}

#[test]
fn rows_mapped_stops_at_error() -> Result<()> {
    let db = setup_english(":memory:")?;

    let mut iter = db
        .execute("SELECT value FROM english")?
        .mapped(|row| Ok(row.get("missing")?.read::<String>()));

    let e = iter.next().context("missing item")?.unwrap_err();
    assert_eq!(e.kind(), ErrorKind::UnknownColumn);
    Ok(())
}

#[test]
fn row_lookup_errors() -> Result<()> {
    let db = setup_users(":memory:")?;
    let rows = db.execute("SELECT id, name FROM users")?;
    let row = rows.row().context("missing row")?;

    assert_eq!(row.column_count(), 2);
    assert_eq!(row.column_names().collect::<Vec<_>>(), ["id", "name"]);

    let e = row.get("missing").unwrap_err();
    assert_eq!(e.kind(), ErrorKind::UnknownColumn);

    let e = row.get(2).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::IndexOutOfRange);
    assert_eq!(e.to_string(), "no column at index 2, row has 2 columns");
    Ok(())
}

#[test]
fn row_debug_lists_fields() -> Result<()> {
    let db = setup_users(":memory:")?;
    let rows = db.execute("SELECT id, name FROM users")?;
    let row = rows.row().context("missing row")?;

    let debug = format!("{row:?}");
    assert!(debug.contains("\"id\""));
    assert!(debug.contains("\"Alice\""));
    Ok(())
}
