use core::ffi::c_int;
use core::fmt;

use crate::error::{Error, Result};
use crate::field::Field;
use crate::handle::RawStatement;

mod sealed {
    pub trait Sealed {}
    impl Sealed for &str {}
    impl Sealed for usize {}
}

/// A view of the row a [`Rows`] cursor is positioned on.
///
/// Columns are looked up by name or by zero-based position through
/// [`Row::get`].
///
/// [`Rows`]: crate::Rows
#[derive(Clone, Copy)]
pub struct Row<'a> {
    stmt: &'a RawStatement,
    generation: usize,
}

impl<'a> Row<'a> {
    /// Construct a row view over the execution identified by `generation`.
    #[inline]
    pub(crate) fn new(stmt: &'a RawStatement, generation: usize) -> Self {
        Self { stmt, generation }
    }

    /// The number of columns in the row.
    #[inline]
    pub fn column_count(&self) -> usize {
        self.stmt.column_count().max(0) as usize
    }

    /// The names of the columns in the row.
    pub fn column_names(&self) -> impl Iterator<Item = &'a str> + 'a {
        let stmt = self.stmt;
        (0..stmt.column_count()).filter_map(move |index| stmt.column_name(index))
    }

    /// Access a column by name or by zero-based position.
    ///
    /// # Errors
    ///
    /// A name which is not one of the columns fails with
    /// [`Error::UnknownColumn`], a position past the last column with
    /// [`Error::IndexOutOfRange`].
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlhandle::{AccessMode, Database, ErrorKind, IN_MEMORY};
    ///
    /// let db = Database::open(IN_MEMORY, AccessMode::ReadWriteCreate)?;
    /// let rows = db.execute("SELECT 1 AS one, 'two' AS two")?;
    /// let row = rows.row().unwrap();
    ///
    /// assert_eq!(row.get("one")?.read::<i64>(), 1);
    /// assert_eq!(row.get(1)?.read::<String>(), "two");
    /// assert_eq!(row.get("three").unwrap_err().kind(), ErrorKind::UnknownColumn);
    /// assert_eq!(row.get(2).unwrap_err().kind(), ErrorKind::IndexOutOfRange);
    /// # Ok::<_, sqlhandle::Error>(())
    /// ```
    #[inline]
    pub fn get<I>(&self, index: I) -> Result<Field<'a>>
    where
        I: ColumnIndex,
    {
        let index = index.resolve(self)?;
        Ok(Field::new(self.stmt, self.generation, index))
    }
}

impl fmt::Debug for Row<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = (0..self.stmt.column_count())
            .map(|index| Field::new(self.stmt, self.generation, index));

        f.debug_list().entries(fields).finish()
    }
}

/// A way of addressing a column in a [`Row`].
///
/// Implemented for column names (`&str`) and zero-based positions (`usize`).
pub trait ColumnIndex: self::sealed::Sealed {
    #[doc(hidden)]
    fn resolve(self, row: &Row<'_>) -> Result<c_int>;
}

impl ColumnIndex for &str {
    fn resolve(self, row: &Row<'_>) -> Result<c_int> {
        let stmt = row.stmt;

        for index in 0..stmt.column_count() {
            if stmt.column_name(index) == Some(self) {
                return Ok(index);
            }
        }

        Err(Error::UnknownColumn {
            column: self.to_owned(),
        })
    }
}

impl ColumnIndex for usize {
    fn resolve(self, row: &Row<'_>) -> Result<c_int> {
        let count = row.column_count();

        match c_int::try_from(self) {
            Ok(index) if self < count => Ok(index),
            _ => Err(Error::IndexOutOfRange { index: self, count }),
        }
    }
}
