use core::fmt;

use std::sync::Arc;

use crate::error::Result;
use crate::handle::{RawStatement, State};
use crate::row::Row;

/// A forward-only cursor over the rows produced by an executed statement.
///
/// The statement is stepped once when the cursor is created, so execution
/// errors are reported by the call which produced the cursor rather than when
/// the first row is read. For statements which do not produce rows, such as
/// `INSERT`, that first step runs the statement to completion.
///
/// The cursor shares the compiled statement with the [`Statement`] it came
/// from. Re-executing or rebinding that statement starts a new execution, and
/// the cursor reading the old one reports that it [is done].
///
/// [`Statement`]: crate::Statement
/// [is done]: Self::is_done
///
/// # Examples
///
/// ```
/// use sqlhandle::{AccessMode, Database, IN_MEMORY};
///
/// let db = Database::open(IN_MEMORY, AccessMode::ReadWriteCreate)?;
/// db.execute_batch("CREATE TABLE t (n INTEGER); INSERT INTO t VALUES (1), (2), (3);")?;
///
/// let mut rows = db.execute("SELECT n FROM t ORDER BY n")?;
/// let mut seen = Vec::new();
///
/// while let Some(row) = rows.row() {
///     seen.push(row.get(0)?.read::<i64>());
///     rows.advance()?;
/// }
///
/// assert_eq!(seen, [1, 2, 3]);
/// assert!(rows.is_done());
/// # Ok::<_, sqlhandle::Error>(())
/// ```
pub struct Rows {
    handle: Arc<RawStatement>,
    generation: usize,
    done: bool,
    /// Set once the current row has been handed out by [`Rows::next`].
    yielded: bool,
}

impl Rows {
    /// Start a new execution of `handle` and step into the first row.
    pub(crate) fn new(handle: Arc<RawStatement>) -> Result<Self> {
        let generation = handle.rewind();

        let mut rows = Self {
            handle,
            generation,
            done: false,
            yielded: false,
        };

        rows.step()?;
        Ok(rows)
    }

    /// The current row, or `None` once every row has been read.
    ///
    /// The row borrows the cursor, so it cannot be used after the cursor has
    /// advanced.
    #[inline]
    pub fn row(&self) -> Option<Row<'_>> {
        if self.is_done() {
            return None;
        }

        Some(Row::new(&self.handle, self.generation))
    }

    /// Move to the next row.
    ///
    /// # Panics
    ///
    /// Advancing a cursor which [is done] is a bug in the caller. It panics
    /// in debug builds and does nothing in release builds.
    ///
    /// [is done]: Self::is_done
    pub fn advance(&mut self) -> Result<()> {
        debug_assert!(!self.is_done(), "advanced a cursor which is done");
        self.yielded = false;
        self.step()
    }

    /// Test if every row has been read.
    ///
    /// Also true if the statement was re-executed or rebound after this
    /// cursor was created.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.done || self.generation != self.handle.generation()
    }

    /// Read the next row.
    ///
    /// The first call returns the row the cursor is positioned on, every
    /// later call advances first. Returns `None` once every row has been
    /// read.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlhandle::{AccessMode, Database, IN_MEMORY};
    ///
    /// let db = Database::open(IN_MEMORY, AccessMode::ReadWriteCreate)?;
    /// db.execute_batch("CREATE TABLE t (name TEXT); INSERT INTO t VALUES ('a'), ('b');")?;
    ///
    /// let mut rows = db.execute("SELECT name FROM t ORDER BY name")?;
    /// let mut names = Vec::new();
    ///
    /// while let Some(row) = rows.next()? {
    ///     names.push(row.get("name")?.read::<String>());
    /// }
    ///
    /// assert_eq!(names, ["a", "b"]);
    /// assert!(rows.next()?.is_none());
    /// # Ok::<_, sqlhandle::Error>(())
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<Option<Row<'_>>> {
        if self.yielded && !self.is_done() {
            self.advance()?;
        }

        if self.is_done() {
            return Ok(None);
        }

        self.yielded = true;
        Ok(Some(Row::new(&self.handle, self.generation)))
    }

    /// The number of rows inserted, updated or deleted by the statement.
    ///
    /// Always zero for statements which do not write to the database.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlhandle::{AccessMode, Database, IN_MEMORY};
    ///
    /// let db = Database::open(IN_MEMORY, AccessMode::ReadWriteCreate)?;
    /// db.execute_batch("CREATE TABLE t (n INTEGER); INSERT INTO t VALUES (1), (2), (3);")?;
    ///
    /// let rows = db.execute("UPDATE t SET n = n * 10 WHERE n > 1")?;
    /// assert_eq!(rows.row_modification_count(), 2);
    ///
    /// let rows = db.execute("SELECT * FROM t")?;
    /// assert_eq!(rows.row_modification_count(), 0);
    /// # Ok::<_, sqlhandle::Error>(())
    /// ```
    pub fn row_modification_count(&self) -> usize {
        if self.handle.is_read_only() {
            return 0;
        }

        unsafe { crate::ffi::sqlite3_changes(self.handle.db()).max(0) as usize }
    }

    /// Test if two cursors read the same statement and agree on whether they
    /// are done.
    #[inline]
    pub fn same_position(&self, other: &Rows) -> bool {
        Arc::ptr_eq(&self.handle, &other.handle) && self.is_done() == other.is_done()
    }

    /// Convert the cursor into an [`Iterator`] which maps every row through
    /// `f`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlhandle::{AccessMode, Database, IN_MEMORY};
    ///
    /// let db = Database::open(IN_MEMORY, AccessMode::ReadWriteCreate)?;
    /// db.execute_batch("CREATE TABLE t (name TEXT, age INTEGER); INSERT INTO t VALUES ('a', 1), ('b', 2);")?;
    ///
    /// let people = db
    ///     .execute("SELECT name, age FROM t ORDER BY age")?
    ///     .mapped(|row| Ok((row.get("name")?.read::<String>(), row.get("age")?.read::<i64>())))
    ///     .collect::<Result<Vec<_>, _>>()?;
    ///
    /// assert_eq!(people, [(String::from("a"), 1), (String::from("b"), 2)]);
    /// # Ok::<_, sqlhandle::Error>(())
    /// ```
    #[inline]
    pub fn mapped<F, T>(self, f: F) -> Mapped<F>
    where
        F: FnMut(Row<'_>) -> Result<T>,
    {
        Mapped { rows: self, f }
    }

    fn step(&mut self) -> Result<()> {
        if self.is_done() {
            return Ok(());
        }

        match self.handle.step() {
            Ok(State::Row) => Ok(()),
            Ok(State::Done) => {
                self.done = true;
                Ok(())
            }
            Err(error) => {
                self.done = true;
                Err(error)
            }
        }
    }
}

impl fmt::Debug for Rows {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rows")
            .field("sql", &self.handle.sql())
            .field("done", &self.is_done())
            .finish()
    }
}

impl Drop for Rows {
    #[inline]
    fn drop(&mut self) {
        // Release the locks held by an unfinished read.
        if self.generation == self.handle.generation() {
            self.handle.reset();
        }
    }
}

/// Iterator returned by [`Rows::mapped`].
pub struct Mapped<F> {
    rows: Rows,
    f: F,
}

impl<F, T> Iterator for Mapped<F>
where
    F: FnMut(Row<'_>) -> Result<T>,
{
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.rows.next() {
            Ok(Some(row)) => Some((self.f)(row)),
            Ok(None) => None,
            Err(error) => Some(Err(error)),
        }
    }
}
