use core::ffi::c_int;
use core::fmt;
use core::ptr::{self, NonNull};
use core::time::Duration;

use std::path::Path;

use crate::error::{Code, Error, Result, connection_message};
use crate::ffi::{self, sqlite3_try};
use crate::field::FromField;
use crate::handle::RawStatement;
use crate::open_options::{AccessMode, OpenOptions, Target};
use crate::rows::Rows;
use crate::statement::Statement;

/// Path which opens a private, temporary on-disk database that is deleted
/// when the connection is closed.
pub const TEMPORARY: &str = "";

/// Path which opens an in-memory database.
pub const IN_MEMORY: &str = ":memory:";

/// A SQLite database connection.
///
/// The connection is the only owner of its native handle. It is closed when
/// [`close`] is called or the value is dropped, whichever happens first.
///
/// All operations except [`close`], [`reopen`] and [`is_open`] require the
/// connection to be open. Calling them on a closed connection is a bug in the
/// caller and panics.
///
/// [`close`]: Self::close
/// [`reopen`]: Self::reopen
/// [`is_open`]: Self::is_open
///
/// # Examples
///
/// ```
/// use sqlhandle::{AccessMode, Database, IN_MEMORY};
///
/// let db = Database::open(IN_MEMORY, AccessMode::ReadWriteCreate)?;
///
/// db.execute_batch(r#"
///     CREATE TABLE users (name TEXT, age INTEGER);
///
///     INSERT INTO users VALUES ('Alice', 42);
///     INSERT INTO users VALUES ('Bob', 52);
/// "#)?;
///
/// let mut rows = db.execute("SELECT name, age FROM users ORDER BY age")?;
///
/// while let Some(row) = rows.next()? {
///     println!("{} is {}", row.get("name")?.read::<String>(), row.get(1)?.read::<i64>());
/// }
/// # Ok::<_, sqlhandle::Error>(())
/// ```
pub struct Database {
    raw: Option<NonNull<ffi::sqlite3>>,
    target: Target,
    options: OpenOptions,
}

// SAFETY: With the `threadsafe` feature the engine can be used from any thread
// as long as a connection is not used concurrently, which `&mut self` and the
// absence of `Sync` guarantees.
#[cfg(feature = "threadsafe")]
unsafe impl Send for Database {}

impl Database {
    /// Open a database with the given access mode and a private cache.
    ///
    /// `path` may be a filesystem path, [`IN_MEMORY`] or [`TEMPORARY`].
    pub fn open(path: impl AsRef<Path>, access: AccessMode) -> Result<Database> {
        OpenOptions::new().access(access).open(path)
    }

    pub(crate) fn open_target(target: Target, options: OpenOptions) -> Result<Database> {
        let raw = open_raw(&target)?;

        let mut db = Database {
            raw: Some(raw),
            target,
            options,
        };

        db.configure()?;
        Ok(db)
    }

    fn configure(&mut self) -> Result<()> {
        if let Some(timeout) = self.options.timeout() {
            self.set_busy_timeout(timeout)?;
        }

        Ok(())
    }

    /// Test if the connection is open.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.raw.is_some()
    }

    /// Open the connection again after it has been closed, with the path and
    /// options it was originally opened with.
    ///
    /// This does nothing if the connection is already open.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlhandle::{AccessMode, Database, IN_MEMORY};
    ///
    /// let mut db = Database::open(IN_MEMORY, AccessMode::ReadWriteCreate)?;
    /// db.reopen()?;
    /// assert!(db.is_open());
    ///
    /// db.close();
    /// db.close();
    /// assert!(!db.is_open());
    ///
    /// db.reopen()?;
    /// assert!(db.is_open());
    /// # Ok::<_, sqlhandle::Error>(())
    /// ```
    pub fn reopen(&mut self) -> Result<()> {
        if self.raw.is_some() {
            return Ok(());
        }

        self.raw = Some(open_raw(&self.target)?);
        self.configure()?;
        tracing::debug!(path = ?self.target.name, "reopened database");
        Ok(())
    }

    /// Close the connection.
    ///
    /// Closing an already closed connection does nothing. Closing a
    /// connection while statements prepared from it are still alive is a
    /// mistake which is logged, the native connection then stays alive until
    /// the last of them has been dropped.
    pub fn close(&mut self) {
        let Some(raw) = self.raw.take() else {
            return;
        };

        unsafe {
            if !ffi::sqlite3_next_stmt(raw.as_ptr(), ptr::null_mut()).is_null() {
                tracing::warn!(
                    path = ?self.target.name,
                    "database closed with active statements"
                );
            }

            let code = ffi::sqlite3_close_v2(raw.as_ptr());

            if code != ffi::SQLITE_OK {
                tracing::warn!(
                    path = ?self.target.name,
                    code = %Code::new(code),
                    "failed to close database"
                );
            } else {
                tracing::debug!(path = ?self.target.name, "closed database");
            }
        }
    }

    #[inline]
    fn handle(&self) -> NonNull<ffi::sqlite3> {
        match self.raw {
            Some(raw) => raw,
            None => panic!("attempt to use a closed database"),
        }
    }

    /// Change a run-time limit of the connection, returning the previous one.
    #[cfg(test)]
    pub(crate) fn set_limit(&self, id: c_int, value: c_int) -> c_int {
        unsafe { ffi::sqlite3_limit(self.handle().as_ptr(), id, value) }
    }

    /// Compile and execute a single statement.
    ///
    /// The statement is stepped once before this returns, so compilation
    /// errors and errors raised by the first row are reported here. Only the
    /// first statement in `sql` is executed, see [`execute_batch`] to run
    /// several.
    ///
    /// [`execute_batch`]: Self::execute_batch
    ///
    /// # Errors
    ///
    /// ```
    /// use sqlhandle::{AccessMode, Database, ErrorKind, IN_MEMORY};
    ///
    /// let db = Database::open(IN_MEMORY, AccessMode::ReadWriteCreate)?;
    /// let e = db.execute("INVALID SQL").unwrap_err();
    /// assert_eq!(e.kind(), ErrorKind::Prepare);
    /// assert_eq!(e.sql(), Some("INVALID SQL"));
    /// # Ok::<_, sqlhandle::Error>(())
    /// ```
    pub fn execute(&self, sql: &str) -> Result<Rows> {
        let stmt = self.compile(sql)?;
        Rows::new(stmt)
    }

    /// Execute a previously prepared statement.
    ///
    /// The statement is reset, which discards the position of any [`Rows`]
    /// still reading from it but keeps its bound parameters, then stepped
    /// once.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlhandle::{AccessMode, Database, IN_MEMORY};
    ///
    /// let db = Database::open(IN_MEMORY, AccessMode::ReadWriteCreate)?;
    /// db.execute("CREATE TABLE numbers (value INTEGER)")?;
    ///
    /// let mut insert = db.prepare("INSERT INTO numbers VALUES (:value)")?;
    ///
    /// for value in [1, 2, 3] {
    ///     insert.bind(":value", value)?;
    ///     db.execute_statement(&insert)?;
    /// }
    ///
    /// assert_eq!(db.execute_scalar::<i64>("SELECT SUM(value) FROM numbers")?, 6);
    /// # Ok::<_, sqlhandle::Error>(())
    /// ```
    pub fn execute_statement(&self, statement: &Statement) -> Result<Rows> {
        let handle = self.handle();

        debug_assert_eq!(
            statement.handle().db(),
            handle.as_ptr(),
            "statement belongs to another database"
        );

        Rows::new(statement.handle().clone())
    }

    /// Compile a statement without executing it.
    pub fn prepare(&self, sql: &str) -> Result<Statement> {
        let stmt = self.compile(sql)?;
        Ok(Statement::from_handle(stmt))
    }

    /// Execute every statement in `sql`, discarding any rows they produce.
    ///
    /// Execution stops at the first statement which fails, earlier
    /// statements stay applied.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        let handle = self.handle();
        let mut rest = sql;

        while !rest.trim().is_empty() {
            let (stmt, consumed) = RawStatement::prepare(handle, rest)?;

            if let Some(stmt) = stmt {
                let mut rows = Rows::new(stmt)?;

                while !rows.is_done() {
                    rows.advance()?;
                }
            }

            if consumed == 0 {
                break;
            }

            rest = rest.get(consumed..).unwrap_or_default();
        }

        Ok(())
    }

    /// Execute a query and read the first column of its first row.
    ///
    /// A query which produces no rows reads as the zero value of `T`.
    pub fn execute_scalar<T>(&self, sql: &str) -> Result<T>
    where
        T: FromField,
    {
        let rows = self.execute(sql)?;

        let Some(row) = rows.row() else {
            return Ok(T::default());
        };

        Ok(row.get(0)?.read::<T>())
    }

    /// The size of the main database in bytes, computed as its page count
    /// multiplied by its page size.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlhandle::{AccessMode, Database, IN_MEMORY};
    ///
    /// let db = Database::open(IN_MEMORY, AccessMode::ReadWriteCreate)?;
    /// db.execute("CREATE TABLE test (id INTEGER PRIMARY KEY)")?;
    ///
    /// let page_count = db.execute_scalar::<u64>("PRAGMA page_count")?;
    /// let page_size = db.execute_scalar::<u64>("PRAGMA page_size")?;
    /// assert_eq!(db.size()?, page_count * page_size);
    /// # Ok::<_, sqlhandle::Error>(())
    /// ```
    pub fn size(&self) -> Result<u64> {
        let page_count = self.execute_scalar::<u64>("PRAGMA page_count;")?;
        let page_size = self.execute_scalar::<u64>("PRAGMA page_size;")?;
        Ok(page_count * page_size)
    }

    /// Return the number of rows inserted, updated, or deleted by the most
    /// recently completed INSERT, UPDATE, or DELETE statement.
    #[inline]
    pub fn changes(&self) -> usize {
        unsafe { ffi::sqlite3_changes(self.handle().as_ptr()).max(0) as usize }
    }

    /// Return the total number of rows inserted, updated, and deleted by all
    /// INSERT, UPDATE, and DELETE statements since the connection was opened.
    #[inline]
    pub fn total_changes(&self) -> usize {
        unsafe { ffi::sqlite3_total_changes(self.handle().as_ptr()).max(0) as usize }
    }

    /// The rowid of the most recent successful INSERT.
    #[inline]
    pub fn last_insert_rowid(&self) -> i64 {
        unsafe { ffi::sqlite3_last_insert_rowid(self.handle().as_ptr()) }
    }

    /// Test if a transaction has been started on this connection and not yet
    /// committed or rolled back.
    #[inline]
    pub fn in_transaction(&self) -> bool {
        unsafe { ffi::sqlite3_get_autocommit(self.handle().as_ptr()) == 0 }
    }

    /// Retry operations rejected because of a busy database until `timeout`
    /// has passed. A zero timeout turns retrying off.
    pub fn set_busy_timeout(&mut self, timeout: Duration) -> Result<()> {
        let handle = self.handle();
        let ms = c_int::try_from(timeout.as_millis()).unwrap_or(c_int::MAX);

        unsafe {
            sqlite3_try! {
                handle.as_ptr(),
                ffi::sqlite3_busy_timeout(handle.as_ptr(), ms)
            };
        }

        Ok(())
    }

    fn compile(&self, sql: &str) -> Result<std::sync::Arc<RawStatement>> {
        let (stmt, _) = RawStatement::prepare(self.handle(), sql)?;

        match stmt {
            Some(stmt) => Ok(stmt),
            None => Err(Error::Prepare {
                sql: sql.to_owned(),
                code: Code::MISUSE,
                message: String::from("no statement to prepare"),
            }),
        }
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("path", &self.target.name)
            .field("open", &self.is_open())
            .finish_non_exhaustive()
    }
}

impl Drop for Database {
    #[inline]
    fn drop(&mut self) {
        self.close();
    }
}

/// Open a native connection, closing the partially opened handle if the open
/// call fails.
fn open_raw(target: &Target) -> Result<NonNull<ffi::sqlite3>> {
    unsafe {
        let mut raw: *mut ffi::sqlite3 = ptr::null_mut();

        let code = ffi::sqlite3_open_v2(
            target.name.as_ptr(),
            &mut raw,
            target.flags,
            ptr::null(),
        );

        if code != ffi::SQLITE_OK {
            let code = Code::new(code);

            let error = Error::Open {
                path: target.name.to_string_lossy().into_owned(),
                code,
                message: connection_message(raw, code),
            };

            ffi::sqlite3_close_v2(raw);
            return Err(error);
        }

        let Some(raw) = NonNull::new(raw) else {
            return Err(Error::from_code(Code::NOMEM));
        };

        tracing::debug!(path = ?target.name, flags = target.flags, "opened database");
        Ok(raw)
    }
}
