use core::ffi::c_int;
use core::fmt;

use std::ffi::CString;
use std::sync::Arc;

use crate::bind_value::BindValue;
use crate::error::{Code, Error, Result, connection_message};
use crate::ffi;
use crate::handle::RawStatement;

/// Prefixes tried, in order, for parameter names given without one.
const PREFIXES: [char; 3] = [':', '@', '$'];

/// A prepared statement.
///
/// Holds a compiled query and the values bound to its parameters. A statement
/// is executed through [`Database::execute_statement`], the [`Rows`] produced
/// share the compiled query with the statement and keep it alive after the
/// statement is dropped.
///
/// Binding resets the statement, which rewinds any [`Rows`] still reading
/// from it. Bindings are kept across executions until they are replaced or
/// [cleared].
///
/// [`Database::execute_statement`]: crate::Database::execute_statement
/// [`Rows`]: crate::Rows
/// [cleared]: Self::clear_bindings
pub struct Statement {
    handle: Arc<RawStatement>,
}

impl Statement {
    #[inline]
    pub(crate) fn from_handle(handle: Arc<RawStatement>) -> Self {
        Self { handle }
    }

    #[inline]
    pub(crate) fn handle(&self) -> &Arc<RawStatement> {
        &self.handle
    }

    /// The SQL text the statement was compiled from.
    #[inline]
    pub fn sql(&self) -> &str {
        self.handle.sql()
    }

    /// Bind a value to a named parameter.
    ///
    /// `name` is either the full parameter marker as written in the SQL, like
    /// `:id` or `@id`, or the bare name `id` in which case the `:`, `@` and
    /// `$` prefixes are tried in that order.
    ///
    /// # Errors
    ///
    /// Binding a name which does not appear in the SQL fails with
    /// [`Error::UnknownParameter`] without touching the statement. If the
    /// engine rejects the value the error is [`Error::Bind`].
    ///
    /// ```
    /// use sqlhandle::{AccessMode, Database, ErrorKind, IN_MEMORY};
    ///
    /// let db = Database::open(IN_MEMORY, AccessMode::ReadWriteCreate)?;
    /// db.execute("CREATE TABLE users (name TEXT)")?;
    ///
    /// let mut stmt = db.prepare("SELECT * FROM users")?;
    /// let e = stmt.bind(":name", "Bob").unwrap_err();
    /// assert_eq!(e.kind(), ErrorKind::UnknownParameter);
    /// assert_eq!(e.parameter(), Some(":name"));
    /// # Ok::<_, sqlhandle::Error>(())
    /// ```
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlhandle::{AccessMode, Database, IN_MEMORY};
    ///
    /// let db = Database::open(IN_MEMORY, AccessMode::ReadWriteCreate)?;
    /// db.execute("CREATE TABLE users (name TEXT, age INTEGER)")?;
    ///
    /// let mut stmt = db.prepare("INSERT INTO users VALUES (:name, @age)")?;
    /// stmt.bind(":name", "Alice")?;
    /// stmt.bind("age", 42)?;
    /// db.execute_statement(&stmt)?;
    ///
    /// let rows = db.execute("SELECT name, age FROM users")?;
    /// let row = rows.row().unwrap();
    /// assert_eq!(row.get("name")?.read::<String>(), "Alice");
    /// assert_eq!(row.get("age")?.read::<i32>(), 42);
    /// # Ok::<_, sqlhandle::Error>(())
    /// ```
    pub fn bind<T>(&mut self, name: &str, value: T) -> Result<()>
    where
        T: BindValue,
    {
        let index = self.parameter_index(name)?;
        self.handle.rewind();

        match unsafe { value.bind_raw(self.handle.as_ptr(), index) } {
            Ok(ffi::SQLITE_OK) => Ok(()),
            result => Err(self.bind_failure(name, result)),
        }
    }

    /// Build the error for a failed bind of `parameter`.
    ///
    /// An engine status carries the connection message, a status raised
    /// before the engine was reached carries the description of the code.
    pub(crate) fn bind_failure(&self, parameter: &str, result: Result<c_int, Code>) -> Error {
        let (code, message) = match result {
            Ok(code) => {
                let code = Code::new(code);
                (code, unsafe { connection_message(self.handle.db(), code) })
            }
            Err(code) => (code, code.message().to_owned()),
        };

        Error::Bind {
            parameter: parameter.to_owned(),
            sql: self.sql().to_owned(),
            code,
            message,
        }
    }

    /// Bind NULL to a named parameter.
    #[inline]
    pub fn bind_null(&mut self, name: &str) -> Result<()> {
        self.bind(name, crate::Null)
    }

    /// Reset every parameter to NULL.
    pub fn clear_bindings(&mut self) -> Result<()> {
        let code = unsafe { ffi::sqlite3_clear_bindings(self.handle.as_ptr()) };

        if code != ffi::SQLITE_OK {
            return Err(Error::from_connection(self.handle.db(), code));
        }

        Ok(())
    }

    /// The number of parameters in the statement.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlhandle::{AccessMode, Database, IN_MEMORY};
    ///
    /// let db = Database::open(IN_MEMORY, AccessMode::ReadWriteCreate)?;
    /// db.execute("CREATE TABLE test (id INTEGER, name TEXT)")?;
    ///
    /// let stmt = db.prepare("SELECT * FROM test WHERE id = :id AND name = :name")?;
    /// assert_eq!(stmt.parameter_count(), 2);
    /// # Ok::<_, sqlhandle::Error>(())
    /// ```
    #[inline]
    pub fn parameter_count(&self) -> usize {
        unsafe { ffi::sqlite3_bind_parameter_count(self.handle.as_ptr()).max(0) as usize }
    }

    /// The number of columns the statement produces.
    #[inline]
    pub fn column_count(&self) -> usize {
        self.handle.column_count().max(0) as usize
    }

    /// The names of the columns the statement produces.
    pub fn column_names(&self) -> impl Iterator<Item = &str> + '_ {
        (0..self.handle.column_count()).filter_map(|index| self.handle.column_name(index))
    }

    /// Resolve a parameter name to its 1-based index.
    fn parameter_index(&self, name: &str) -> Result<c_int> {
        let lookup = |name: &str| {
            let name = CString::new(name).ok()?;

            match unsafe { ffi::sqlite3_bind_parameter_index(self.handle.as_ptr(), name.as_ptr()) } {
                0 => None,
                index => Some(index),
            }
        };

        let index = if name.starts_with(PREFIXES) || name.starts_with('?') {
            lookup(name)
        } else {
            PREFIXES
                .iter()
                .find_map(|prefix| lookup(&format!("{prefix}{name}")))
        };

        match index {
            Some(index) => Ok(index),
            None => Err(Error::UnknownParameter {
                parameter: name.to_owned(),
                sql: self.sql().to_owned(),
            }),
        }
    }
}

impl fmt::Debug for Statement {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Statement")
            .field("sql", &self.sql())
            .finish_non_exhaustive()
    }
}
