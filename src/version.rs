use core::ffi::{CStr, c_int};

use crate::ffi;

/// Return the version string of the SQLite library in use, like `"3.51.1"`.
///
/// # Examples
///
/// ```
/// assert!(sqlhandle::lib_version().starts_with("3."));
/// ```
#[inline]
pub fn lib_version() -> &'static str {
    unsafe {
        CStr::from_ptr(ffi::sqlite3_libversion())
            .to_str()
            .unwrap_or_default()
    }
}

/// Return the version number of the SQLite library in use.
///
/// The version `3.51.1` as returned by [`lib_version`] corresponds to the
/// integer `3051001`.
///
/// # Examples
///
/// ```
/// assert!(matches!(sqlhandle::lib_version_number(), 3000000..4000000));
/// ```
#[inline]
pub fn lib_version_number() -> c_int {
    unsafe { ffi::sqlite3_libversion_number() }
}
