use core::ffi::c_int;
use core::fmt;

use crate::ffi;

/// The storage class of a value, as reported by [`Field::column_type`].
///
/// [`Field::column_type`]: crate::Field::column_type
///
/// # Examples
///
/// ```
/// use sqlhandle::{AccessMode, Database, Type, IN_MEMORY};
///
/// let db = Database::open(IN_MEMORY, AccessMode::ReadWriteCreate)?;
/// let rows = db.execute("SELECT 1, 1.5, 'text', x'00', NULL")?;
/// let row = rows.row().unwrap();
///
/// let types = (0..5)
///     .map(|i| Ok(row.get(i)?.column_type()))
///     .collect::<Result<Vec<_>, sqlhandle::Error>>()?;
///
/// assert_eq!(types, [Type::Integer, Type::Float, Type::Text, Type::Blob, Type::Null]);
/// # Ok::<_, sqlhandle::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Type {
    /// A signed 64-bit integer.
    Integer,
    /// A 64-bit floating point number.
    Float,
    /// A text string.
    Text,
    /// A blob of bytes.
    Blob,
    /// The NULL value.
    Null,
}

impl Type {
    pub(crate) fn from_raw(raw: c_int) -> Self {
        match raw {
            ffi::SQLITE_INTEGER => Type::Integer,
            ffi::SQLITE_FLOAT => Type::Float,
            ffi::SQLITE_TEXT => Type::Text,
            ffi::SQLITE_BLOB => Type::Blob,
            _ => Type::Null,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Integer => write!(f, "INTEGER"),
            Type::Float => write!(f, "FLOAT"),
            Type::Text => write!(f, "TEXT"),
            Type::Blob => write!(f, "BLOB"),
            Type::Null => write!(f, "NULL"),
        }
    }
}
