use std::panic::{self, AssertUnwindSafe};

use anyhow::{Context, Result};

use crate::{AccessMode, Code, Database, Error, ErrorKind, as_transaction};

use super::data;

fn balance(db: &Database, id: i64) -> Result<i64> {
    let mut stmt = db.prepare("SELECT balance FROM accounts WHERE id = :id")?;
    stmt.bind(":id", id)?;
    let rows = db.execute_statement(&stmt)?;
    Ok(rows.row().context("missing account")?.get(0)?.read::<i64>())
}

#[test]
fn transaction_commits() -> Result<()> {
    let mut db = Database::open(":memory:", AccessMode::ReadWriteCreate)?;
    data::accounts(&db)?;

    let moved = as_transaction(&mut db, |db| {
        db.execute("UPDATE accounts SET balance = balance - 30 WHERE id = 1")?;
        db.execute("UPDATE accounts SET balance = balance + 30 WHERE id = 2")?;
        Ok::<_, Error>(30)
    })?;

    assert_eq!(moved, 30);
    assert!(!db.in_transaction());
    assert_eq!(balance(&db, 1)?, 70);
    assert_eq!(balance(&db, 2)?, 80);
    Ok(())
}

#[test]
fn transaction_rolls_back_on_error() -> Result<()> {
    let mut db = Database::open(":memory:", AccessMode::ReadWriteCreate)?;
    data::accounts(&db)?;

    let e = as_transaction(&mut db, |db| {
        db.execute("UPDATE accounts SET balance = 0 WHERE id = 1")?;
        assert!(db.in_transaction());
        db.execute("UPDATE missing SET balance = 0")?;
        Ok::<_, Error>(())
    })
    .unwrap_err();

    assert_eq!(e.kind(), ErrorKind::Prepare);
    assert!(!db.in_transaction());
    assert_eq!(balance(&db, 1)?, 100);
    Ok(())
}

#[test]
fn transaction_rolls_back_caller_error() -> Result<()> {
    let mut db = Database::open(":memory:", AccessMode::ReadWriteCreate)?;
    data::accounts(&db)?;

    let result = as_transaction(&mut db, |db| -> Result<()> {
        db.execute("DELETE FROM accounts")?;
        anyhow::bail!("insufficient funds")
    });

    let e = result.unwrap_err();
    assert_eq!(e.to_string(), "insufficient funds");
    assert_eq!(db.execute_scalar::<i64>("SELECT COUNT(*) FROM accounts")?, 2);
    Ok(())
}

#[test]
fn transaction_rolls_back_on_panic() -> Result<()> {
    let mut db = Database::open(":memory:", AccessMode::ReadWriteCreate)?;
    data::accounts(&db)?;

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        let _ = as_transaction(&mut db, |db| -> crate::Result<()> {
            db.execute("UPDATE accounts SET balance = 0")?;
            panic!("boom")
        });
    }));

    assert!(result.is_err());
    assert!(!db.in_transaction());
    assert_eq!(balance(&db, 1)?, 100);
    Ok(())
}

#[test]
fn transaction_nested_begin_fails() -> Result<()> {
    let mut db = Database::open(":memory:", AccessMode::ReadWriteCreate)?;
    data::accounts(&db)?;

    let e = as_transaction(&mut db, |db| as_transaction(db, |_| Ok::<_, Error>(()))).unwrap_err();

    assert_eq!(e.kind(), ErrorKind::Engine);
    assert!(e.sql().is_some_and(|sql| sql.starts_with("BEGIN")));
    assert!(!db.in_transaction());
    Ok(())
}

#[test]
fn transaction_busy_writer() -> Result<()> {
    let dir = tempfile::tempdir().context("tempdir")?;
    let path = dir.path().join("database.sqlite3");

    let mut db1 = Database::open(&path, AccessMode::ReadWriteCreate)?;
    data::accounts(&db1)?;

    let db2 = Database::open(&path, AccessMode::ReadWrite)?;
    let stmt = db2.prepare("UPDATE accounts SET balance = 0 WHERE id = 1")?;

    let e = as_transaction(&mut db1, |db1| {
        db1.execute("UPDATE accounts SET balance = 1 WHERE id = 1")?;
        db2.execute_statement(&stmt)?;
        Ok::<_, Error>(())
    })
    .unwrap_err();

    assert_eq!(e.kind(), ErrorKind::TransactionFailed);
    assert_eq!(e.code().primary(), Code::BUSY);
    assert!(e.is_retryable());
    assert_eq!(e.sql(), Some("UPDATE accounts SET balance = 0 WHERE id = 1"));

    assert!(!db1.in_transaction());
    assert_eq!(balance(&db1, 1)?, 100);
    assert_eq!(balance(&db2, 1)?, 100);
    Ok(())
}

#[test]
fn busy_reader_outside_transaction() -> Result<()> {
    let dir = tempfile::tempdir().context("tempdir")?;
    let path = dir.path().join("database.sqlite3");

    let db1 = Database::open(&path, AccessMode::ReadWriteCreate)?;
    data::accounts(&db1)?;
    let db2 = Database::open(&path, AccessMode::ReadWrite)?;
    let stmt = db2.prepare("SELECT * FROM accounts")?;

    db1.execute("BEGIN EXCLUSIVE")?;

    let e = db2.execute_statement(&stmt).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::TransactionFailed);

    db1.execute("COMMIT")?;
    assert_eq!(db2.execute_scalar::<i64>("SELECT COUNT(*) FROM accounts")?, 2);
    Ok(())
}
