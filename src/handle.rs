use core::ffi::{CStr, c_int};
use core::ptr::{self, NonNull};

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Code, Error, Result, connection_message};
use crate::ffi;

/// The outcome of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum State {
    /// There is a row available for reading.
    Row,
    /// The statement has been entirely evaluated.
    Done,
}

/// A compiled statement shared between a [`Statement`] and every [`Rows`]
/// produced from it.
///
/// The native handle is finalized once the last [`Arc`] referencing it is
/// dropped.
///
/// [`Statement`]: crate::Statement
/// [`Rows`]: crate::Rows
pub(crate) struct RawStatement {
    raw: NonNull<ffi::sqlite3_stmt>,
    sql: Box<str>,
    /// Bumped every time the statement is rewound.
    generation: AtomicUsize,
}

// SAFETY: With the `threadsafe` feature the engine serializes every call made
// against a connection, including calls made through its statements.
#[cfg(feature = "threadsafe")]
unsafe impl Send for RawStatement {}
#[cfg(feature = "threadsafe")]
unsafe impl Sync for RawStatement {}

impl RawStatement {
    /// Compile the first statement in `sql`.
    ///
    /// Returns the compiled statement, or `None` if `sql` only contains
    /// whitespace or comments, together with the number of bytes of `sql`
    /// which were consumed.
    pub(crate) fn prepare(
        db: NonNull<ffi::sqlite3>,
        sql: &str,
    ) -> Result<(Option<Arc<Self>>, usize)> {
        let Ok(len) = c_int::try_from(sql.len()) else {
            return Err(Error::Prepare {
                sql: sql.to_owned(),
                code: Code::TOOBIG,
                message: Code::TOOBIG.message().to_owned(),
            });
        };

        unsafe {
            let mut raw: *mut ffi::sqlite3_stmt = ptr::null_mut();
            let mut tail: *const core::ffi::c_char = ptr::null();

            let code = ffi::sqlite3_prepare_v3(
                db.as_ptr(),
                sql.as_ptr().cast(),
                len,
                0,
                &mut raw,
                &mut tail,
            );

            if code != ffi::SQLITE_OK {
                // No statement is allocated on failure.
                let code = Code::new(code);

                return Err(Error::Prepare {
                    sql: sql.to_owned(),
                    code,
                    message: connection_message(db.as_ptr(), code),
                });
            }

            let consumed = if tail.is_null() {
                sql.len()
            } else {
                tail.cast::<u8>().offset_from(sql.as_ptr()) as usize
            };

            let Some(raw) = NonNull::new(raw) else {
                return Ok((None, consumed));
            };

            let text = sql.get(..consumed).unwrap_or(sql).trim();
            tracing::trace!(sql = text, "prepared statement");

            let stmt = Arc::new(Self {
                raw,
                sql: text.into(),
                generation: AtomicUsize::new(0),
            });

            Ok((Some(stmt), consumed))
        }
    }

    #[inline]
    pub(crate) fn as_ptr(&self) -> *mut ffi::sqlite3_stmt {
        self.raw.as_ptr()
    }

    /// The SQL text this statement was compiled from.
    #[inline]
    pub(crate) fn sql(&self) -> &str {
        &self.sql
    }

    /// The connection this statement belongs to.
    #[inline]
    pub(crate) fn db(&self) -> *mut ffi::sqlite3 {
        unsafe { ffi::sqlite3_db_handle(self.as_ptr()) }
    }

    /// Advance the statement by one row.
    ///
    /// A busy or locked status is translated into
    /// [`Error::TransactionFailed`], every other failure into
    /// [`Error::Engine`].
    pub(crate) fn step(&self) -> Result<State> {
        let code = unsafe { ffi::sqlite3_step(self.as_ptr()) };

        match code {
            ffi::SQLITE_ROW => Ok(State::Row),
            ffi::SQLITE_DONE => Ok(State::Done),
            code => {
                let code = Code::new(code);
                let message = unsafe { connection_message(self.db(), code) };
                tracing::trace!(sql = self.sql(), %code, "step failed");

                if code.is_busy_or_locked() {
                    return Err(Error::TransactionFailed {
                        sql: self.sql.to_string(),
                        code,
                        message,
                    });
                }

                Err(Error::Engine {
                    code,
                    message: format!("{message} while executing sql statement `{}`", self.sql),
                    sql: Some(self.sql.to_string()),
                })
            }
        }
    }

    /// Reset the statement to its initial state, keeping its bindings.
    ///
    /// The status returned by the engine repeats the status of the most
    /// recent step, which has already been reported, so it is ignored.
    #[inline]
    pub(crate) fn reset(&self) {
        unsafe {
            ffi::sqlite3_reset(self.as_ptr());
        }
    }

    /// Reset the statement and start a new execution, returning its
    /// generation.
    #[inline]
    pub(crate) fn rewind(&self) -> usize {
        self.reset();
        self.generation.fetch_add(1, Ordering::AcqRel).wrapping_add(1)
    }

    /// The generation of the current execution.
    #[inline]
    pub(crate) fn generation(&self) -> usize {
        self.generation.load(Ordering::Acquire)
    }

    #[inline]
    pub(crate) fn column_count(&self) -> c_int {
        unsafe { ffi::sqlite3_column_count(self.as_ptr()) }
    }

    /// Return the name of a column, or `None` if the index is out of range.
    pub(crate) fn column_name(&self, index: c_int) -> Option<&str> {
        unsafe {
            let ptr = ffi::sqlite3_column_name(self.as_ptr(), index);

            if ptr.is_null() {
                return None;
            }

            CStr::from_ptr(ptr).to_str().ok()
        }
    }

    /// Test if the statement leaves the database untouched.
    #[inline]
    pub(crate) fn is_read_only(&self) -> bool {
        unsafe { ffi::sqlite3_stmt_readonly(self.as_ptr()) != 0 }
    }
}

impl Drop for RawStatement {
    #[inline]
    fn drop(&mut self) {
        unsafe {
            ffi::sqlite3_finalize(self.raw.as_ptr());
        }
    }
}
