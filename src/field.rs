use core::ffi::c_int;
use core::fmt;
use core::slice;

use crate::ffi;
use crate::handle::RawStatement;
use crate::value::Type;

mod sealed {
    pub trait Sealed {}
    impl Sealed for bool {}
    impl Sealed for i32 {}
    impl Sealed for i64 {}
    impl Sealed for u64 {}
    impl Sealed for usize {}
    impl Sealed for f64 {}
    impl Sealed for char {}
    impl Sealed for String {}
}

/// One column of the row a [`Rows`] cursor is positioned on.
///
/// The value is read from the engine every time it is requested, nothing is
/// cached. Once the statement has been executed again or rebound the field
/// reads as NULL.
///
/// [`Rows`]: crate::Rows
#[derive(Clone, Copy)]
pub struct Field<'a> {
    stmt: &'a RawStatement,
    generation: usize,
    index: c_int,
}

impl<'a> Field<'a> {
    #[inline]
    pub(crate) fn new(stmt: &'a RawStatement, generation: usize, index: c_int) -> Self {
        Self {
            stmt,
            generation,
            index,
        }
    }

    /// The zero-based position of the column.
    #[inline]
    pub fn index(&self) -> usize {
        self.index.max(0) as usize
    }

    /// The name of the column, or an empty string if the engine reports none.
    #[inline]
    pub fn column_name(&self) -> &'a str {
        self.stmt.column_name(self.index).unwrap_or_default()
    }

    /// The storage class of the value.
    #[inline]
    pub fn column_type(&self) -> Type {
        if !self.is_current() {
            return Type::Null;
        }

        Type::from_raw(unsafe { ffi::sqlite3_column_type(self.stmt.as_ptr(), self.index) })
    }

    /// Test if the value is NULL.
    #[inline]
    pub fn is_null(&self) -> bool {
        self.column_type() == Type::Null
    }

    /// Test if the value is not NULL.
    #[inline]
    pub fn is_present(&self) -> bool {
        !self.is_null()
    }

    /// Read the value as `T`.
    ///
    /// The engine converts between storage classes as needed. NULL reads as
    /// the zero value of `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlhandle::{AccessMode, Database, IN_MEMORY};
    ///
    /// let db = Database::open(IN_MEMORY, AccessMode::ReadWriteCreate)?;
    /// let rows = db.execute("SELECT 42, 'hello', 2.5, NULL")?;
    /// let row = rows.row().unwrap();
    ///
    /// assert_eq!(row.get(0)?.read::<i64>(), 42);
    /// assert_eq!(row.get(0)?.read::<String>(), "42");
    /// assert_eq!(row.get(1)?.read::<char>(), 'h');
    /// assert_eq!(row.get(2)?.read::<f64>(), 2.5);
    /// assert_eq!(row.get(3)?.read::<i32>(), 0);
    /// assert_eq!(row.get(3)?.read::<String>(), "");
    /// # Ok::<_, sqlhandle::Error>(())
    /// ```
    #[inline]
    pub fn read<T>(&self) -> T
    where
        T: FromField,
    {
        if self.is_null() {
            return T::default();
        }

        T::from_field(self)
    }

    /// Test if the field still belongs to the execution it was taken from.
    #[inline]
    fn is_current(&self) -> bool {
        self.generation == self.stmt.generation()
    }

    #[inline]
    fn int64(&self) -> i64 {
        unsafe { ffi::sqlite3_column_int64(self.stmt.as_ptr(), self.index) }
    }

    #[inline]
    fn double(&self) -> f64 {
        unsafe { ffi::sqlite3_column_double(self.stmt.as_ptr(), self.index) }
    }

    /// The value as text, borrowed from the engine.
    fn text(&self) -> &[u8] {
        unsafe {
            // The length must be requested after the text conversion.
            let ptr = ffi::sqlite3_column_text(self.stmt.as_ptr(), self.index);
            let len = ffi::sqlite3_column_bytes(self.stmt.as_ptr(), self.index);

            if ptr.is_null() || len <= 0 {
                return &[];
            }

            slice::from_raw_parts(ptr.cast::<u8>(), len as usize)
        }
    }
}

impl fmt::Debug for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut f = f.debug_struct("Field");
        f.field("name", &self.column_name());

        match self.column_type() {
            Type::Integer => f.field("value", &self.int64()),
            Type::Float => f.field("value", &self.double()),
            Type::Text => f.field("value", &String::from_utf8_lossy(self.text())),
            Type::Blob => f.field("value", &"<blob>"),
            Type::Null => f.field("value", &"NULL"),
        };

        f.finish()
    }
}

/// A type which can be read out of a [`Field`].
///
/// NULL reads as [`Default::default`] for every implementation.
///
/// * Integers are read as 64-bit values. `i32` keeps the low 32 bits, the
///   unsigned types read negative values as zero.
/// * `bool` is true for any non-zero integer.
/// * `char` is the first byte of the text, or `'\0'` for empty text.
/// * `String` replaces invalid UTF-8 with the replacement character.
pub trait FromField: Sized + Default + self::sealed::Sealed {
    #[doc(hidden)]
    fn from_field(field: &Field<'_>) -> Self;
}

impl FromField for i64 {
    #[inline]
    fn from_field(field: &Field<'_>) -> Self {
        field.int64()
    }
}

impl FromField for i32 {
    #[inline]
    fn from_field(field: &Field<'_>) -> Self {
        field.int64() as i32
    }
}

impl FromField for u64 {
    #[inline]
    fn from_field(field: &Field<'_>) -> Self {
        u64::try_from(field.int64()).unwrap_or(0)
    }
}

impl FromField for usize {
    #[inline]
    fn from_field(field: &Field<'_>) -> Self {
        usize::try_from(field.int64()).unwrap_or(0)
    }
}

impl FromField for bool {
    #[inline]
    fn from_field(field: &Field<'_>) -> Self {
        field.int64() != 0
    }
}

impl FromField for f64 {
    #[inline]
    fn from_field(field: &Field<'_>) -> Self {
        field.double()
    }
}

impl FromField for char {
    #[inline]
    fn from_field(field: &Field<'_>) -> Self {
        field.text().first().map_or('\0', |&b| char::from(b))
    }
}

impl FromField for String {
    #[inline]
    fn from_field(field: &Field<'_>) -> Self {
        String::from_utf8_lossy(field.text()).into_owned()
    }
}
