use core::ffi::c_int;

use crate::bytes;
use crate::error::Code;
use crate::ffi;

mod sealed {
    use crate::Null;

    pub trait Sealed {}
    impl Sealed for i32 {}
    impl Sealed for i64 {}
    impl Sealed for f64 {}
    impl Sealed for bool {}
    impl Sealed for str {}
    impl Sealed for String {}
    impl Sealed for Null {}
    impl<T> Sealed for Option<T> where T: Sealed {}
    impl<T> Sealed for &T where T: ?Sized + Sealed {}
}

/// A marker type representing a NULL value.
///
/// # Examples
///
/// ```
/// use sqlhandle::{AccessMode, Database, Null, IN_MEMORY};
///
/// let db = Database::open(IN_MEMORY, AccessMode::ReadWriteCreate)?;
/// db.execute("CREATE TABLE users (name TEXT)")?;
///
/// let mut stmt = db.prepare("INSERT INTO users VALUES (:name)")?;
/// stmt.bind(":name", Null)?;
/// db.execute_statement(&stmt)?;
///
/// let rows = db.execute("SELECT name FROM users")?;
/// assert!(rows.row().unwrap().get("name")?.is_null());
/// # Ok::<_, sqlhandle::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Null;

/// A type suitable for binding to a named parameter of a [`Statement`].
///
/// Implemented for integers, reals, booleans, text, [`Null`] and [`Option`]
/// of any of them, where `None` binds NULL.
///
/// [`Statement`]: crate::Statement
pub trait BindValue: self::sealed::Sealed {
    /// Bind the value to the parameter at `index`, returning the status code
    /// reported by the engine.
    ///
    /// An error is returned if the value could not be handed to the engine at
    /// all, in which case the connection holds no message for it.
    ///
    /// # Safety
    ///
    /// `stmt` must be a live statement.
    #[doc(hidden)]
    unsafe fn bind_raw(&self, stmt: *mut ffi::sqlite3_stmt, index: c_int) -> Result<c_int, Code>;
}

impl<T> BindValue for &T
where
    T: ?Sized + BindValue,
{
    #[inline]
    unsafe fn bind_raw(&self, stmt: *mut ffi::sqlite3_stmt, index: c_int) -> Result<c_int, Code> {
        unsafe { (**self).bind_raw(stmt, index) }
    }
}

impl BindValue for Null {
    #[inline]
    unsafe fn bind_raw(&self, stmt: *mut ffi::sqlite3_stmt, index: c_int) -> Result<c_int, Code> {
        Ok(unsafe { ffi::sqlite3_bind_null(stmt, index) })
    }
}

impl BindValue for i64 {
    #[inline]
    unsafe fn bind_raw(&self, stmt: *mut ffi::sqlite3_stmt, index: c_int) -> Result<c_int, Code> {
        Ok(unsafe { ffi::sqlite3_bind_int64(stmt, index, *self as ffi::sqlite3_int64) })
    }
}

impl BindValue for i32 {
    #[inline]
    unsafe fn bind_raw(&self, stmt: *mut ffi::sqlite3_stmt, index: c_int) -> Result<c_int, Code> {
        unsafe { i64::from(*self).bind_raw(stmt, index) }
    }
}

/// Booleans are stored as the integers `0` and `1`.
impl BindValue for bool {
    #[inline]
    unsafe fn bind_raw(&self, stmt: *mut ffi::sqlite3_stmt, index: c_int) -> Result<c_int, Code> {
        unsafe { i64::from(*self).bind_raw(stmt, index) }
    }
}

impl BindValue for f64 {
    #[inline]
    unsafe fn bind_raw(&self, stmt: *mut ffi::sqlite3_stmt, index: c_int) -> Result<c_int, Code> {
        Ok(unsafe { ffi::sqlite3_bind_double(stmt, index, *self) })
    }
}

/// Text is copied, so the value does not have to outlive the statement.
impl BindValue for str {
    unsafe fn bind_raw(&self, stmt: *mut ffi::sqlite3_stmt, index: c_int) -> Result<c_int, Code> {
        let (data, len, dealloc) = match bytes::alloc(self.as_bytes()) {
            Ok(buf) => buf,
            Err(error) => return Err(error.code()),
        };

        Ok(unsafe { ffi::sqlite3_bind_text(stmt, index, data.cast(), len, dealloc) })
    }
}

impl BindValue for String {
    #[inline]
    unsafe fn bind_raw(&self, stmt: *mut ffi::sqlite3_stmt, index: c_int) -> Result<c_int, Code> {
        unsafe { self.as_str().bind_raw(stmt, index) }
    }
}

impl<T> BindValue for Option<T>
where
    T: BindValue,
{
    #[inline]
    unsafe fn bind_raw(&self, stmt: *mut ffi::sqlite3_stmt, index: c_int) -> Result<c_int, Code> {
        unsafe {
            match self {
                Some(value) => value.bind_raw(stmt, index),
                None => Null.bind_raw(stmt, index),
            }
        }
    }
}
