use crate::database::Database;
use crate::error::Error;

/// Run `operations` inside a transaction.
///
/// `BEGIN` is issued before `operations` is called and `COMMIT` after it
/// returns successfully. If `operations` returns an error, or committing
/// fails, the transaction is rolled back and the original error is returned.
/// The transaction is also rolled back if `operations` panics.
///
/// A write conflicting with another connection is reported by the statement
/// which hit it as [`Error::TransactionFailed`]. Nothing is retried, that is
/// left to the caller.
///
/// # Examples
///
/// ```
/// use sqlhandle::{AccessMode, Database, Error, IN_MEMORY, as_transaction};
///
/// let mut db = Database::open(IN_MEMORY, AccessMode::ReadWriteCreate)?;
/// db.execute("CREATE TABLE accounts (id INTEGER PRIMARY KEY, balance INTEGER)")?;
/// db.execute("INSERT INTO accounts VALUES (1, 100), (2, 0)")?;
///
/// as_transaction(&mut db, |db| {
///     db.execute("UPDATE accounts SET balance = balance - 40 WHERE id = 1")?;
///     db.execute("UPDATE accounts SET balance = balance + 40 WHERE id = 2")?;
///     Ok::<_, Error>(())
/// })?;
///
/// let result = as_transaction(&mut db, |db| {
///     db.execute("UPDATE accounts SET balance = 0 WHERE id = 1")?;
///     db.execute("UPDATE missing SET balance = 0")?;
///     Ok::<_, Error>(())
/// });
///
/// assert!(result.is_err());
/// assert_eq!(db.execute_scalar::<i64>("SELECT balance FROM accounts WHERE id = 1")?, 60);
/// # Ok::<_, sqlhandle::Error>(())
/// ```
pub fn as_transaction<T, E, F>(db: &mut Database, operations: F) -> Result<T, E>
where
    F: FnOnce(&mut Database) -> Result<T, E>,
    E: From<Error>,
{
    db.execute("BEGIN;")?;
    tracing::debug!("began transaction");

    let mut guard = Rollback { db, armed: true };
    let output = operations(&mut *guard.db)?;

    guard.db.execute("COMMIT;")?;
    guard.armed = false;
    tracing::debug!("committed transaction");
    Ok(output)
}

/// Rolls back the open transaction when dropped while armed.
struct Rollback<'a> {
    db: &'a mut Database,
    armed: bool,
}

impl Drop for Rollback<'_> {
    fn drop(&mut self) {
        // The engine rolls back on its own after some failures.
        if !self.armed || !self.db.is_open() || !self.db.in_transaction() {
            return;
        }

        match self.db.execute("ROLLBACK;") {
            Ok(..) => tracing::debug!("rolled back transaction"),
            Err(error) => tracing::warn!(%error, "failed to roll back transaction"),
        }
    }
}
