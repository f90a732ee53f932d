use core::ffi::c_int;

pub(crate) use sqll_sys::*;

// Entry points which are not re-exported by `sqll-sys`, resolved against the
// sqlite3 library it links.
unsafe extern "C" {
    pub(crate) fn sqlite3_bind_parameter_count(stmt: *mut sqlite3_stmt) -> c_int;
    pub(crate) fn sqlite3_stmt_readonly(stmt: *mut sqlite3_stmt) -> c_int;
    pub(crate) fn sqlite3_next_stmt(db: *mut sqlite3, stmt: *mut sqlite3_stmt) -> *mut sqlite3_stmt;
    pub(crate) fn sqlite3_get_autocommit(db: *mut sqlite3) -> c_int;
    pub(crate) fn sqlite3_db_handle(stmt: *mut sqlite3_stmt) -> *mut sqlite3;
    #[cfg(test)]
    pub(crate) fn sqlite3_limit(db: *mut sqlite3, id: c_int, new_val: c_int) -> c_int;
}

/// Helper to evaluate sqlite3 calls made against a connection, returning an
/// engine error carrying the connection message if they fail.
macro_rules! __sqlite3_try {
    ($db:expr, $expr:expr) => {{
        let code = $expr;

        if code != $crate::ffi::SQLITE_OK {
            return Err($crate::error::Error::from_connection($db, code));
        }
    }};
}

pub(crate) use __sqlite3_try as sqlite3_try;
