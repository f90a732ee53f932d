use core::ffi::{CStr, c_int};
use core::fmt;

use crate::ffi;

/// A result type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Native status code.
///
/// Connections are opened with extended result codes enabled by default, so
/// a code might carry more detail than its primary code. Use [`Code::primary`]
/// to compare against the primary codes.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Code {
    raw: c_int,
}

impl Code {
    /// Construct a new code from the specified raw code.
    #[inline]
    pub(crate) const fn new(raw: c_int) -> Self {
        Self { raw }
    }
}

macro_rules! define_codes {
    ($(
        $vis:vis const $name:ident = $value:expr;
    )*) => {
        impl Code {
            $(
                $vis const $name: Code = Code::new($value);
            )*
        }

        impl fmt::Display for Code {
            #[inline]
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match *self {
                    $(Code::$name => write!(f, stringify!($name)),)*
                    Code { raw } => write!(f, "UNKNOWN({raw})"),
                }
            }
        }

        impl fmt::Debug for Code {
            #[inline]
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(self, f)
            }
        }
    };
}

define_codes! {
    pub const OK = 0;
    pub const ERROR = 1;
    pub const INTERNAL = 2;
    pub const PERM = 3;
    pub const ABORT = 4;
    pub const BUSY = 5;
    pub const LOCKED = 6;
    pub const NOMEM = 7;
    pub const READONLY = 8;
    pub const INTERRUPT = 9;
    pub const IOERR = 10;
    pub const CORRUPT = 11;
    pub const NOTFOUND = 12;
    pub const FULL = 13;
    pub const CANTOPEN = 14;
    pub const PROTOCOL = 15;
    pub const EMPTY = 16;
    pub const SCHEMA = 17;
    pub const TOOBIG = 18;
    pub const CONSTRAINT = 19;
    pub const MISMATCH = 20;
    pub const MISUSE = 21;
    pub const NOLFS = 22;
    pub const AUTH = 23;
    pub const FORMAT = 24;
    pub const RANGE = 25;
    pub const NOTADB = 26;
    pub const NOTICE = 27;
    pub const WARNING = 28;
    pub const LOCKED_SHAREDCACHE = 6 | (1 << 8);
    pub const BUSY_RECOVERY = 5 | (1 << 8);
    pub const BUSY_SNAPSHOT = 5 | (2 << 8);
    pub const BUSY_TIMEOUT = 5 | (3 << 8);
    pub const CANTOPEN_ISDIR = 14 | (2 << 8);
    pub const CONSTRAINT_CHECK = 19 | (1 << 8);
    pub const CONSTRAINT_NOTNULL = 19 | (5 << 8);
    pub const CONSTRAINT_PRIMARYKEY = 19 | (6 << 8);
    pub const CONSTRAINT_UNIQUE = 19 | (8 << 8);
}

impl Code {
    /// Return the numeric representation of the code.
    #[inline]
    pub fn as_raw(self) -> c_int {
        self.raw
    }

    /// Strip extended information, returning the primary code.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlhandle::Code;
    ///
    /// assert_eq!(Code::LOCKED_SHAREDCACHE.primary(), Code::LOCKED);
    /// assert_eq!(Code::BUSY.primary(), Code::BUSY);
    /// ```
    #[inline]
    pub fn primary(self) -> Code {
        Code::new(self.raw & 0xff)
    }

    /// Test if the code signals that a resource was held by a concurrent
    /// writer, which is what [`Error::TransactionFailed`] is raised for.
    #[inline]
    pub fn is_busy_or_locked(self) -> bool {
        matches!(self.primary(), Code::BUSY | Code::LOCKED)
    }

    /// The engine description of the code.
    pub fn message(self) -> &'static str {
        unsafe {
            let ptr = ffi::sqlite3_errstr(self.raw);

            if ptr.is_null() {
                return "unknown error";
            }

            CStr::from_ptr(ptr).to_str().unwrap_or("unknown error")
        }
    }
}

/// The classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The connection could not be opened.
    Open,
    /// SQL text failed to compile.
    Prepare,
    /// A bind target does not appear in the compiled SQL.
    UnknownParameter,
    /// The engine rejected a value for a resolved parameter.
    Bind,
    /// No column in the row has the requested name.
    UnknownColumn,
    /// A column index past the end of the row.
    IndexOutOfRange,
    /// Stepping hit a busy or locked condition held by a concurrent writer.
    TransactionFailed,
    /// Any other non-success status reported by the engine.
    Engine,
}

/// An error raised by this crate.
///
/// Misuse such as operating on a closed [`Database`] or advancing an
/// exhausted [`Rows`] is not reported through this type, it is a panic.
///
/// [`Database`]: crate::Database
/// [`Rows`]: crate::Rows
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The connection could not be opened.
    #[error("failed to open database `{path}`: {message}")]
    Open {
        path: String,
        code: Code,
        message: String,
    },
    /// SQL text failed to compile.
    #[error("{message} while preparing sql statement `{sql}`")]
    Prepare {
        sql: String,
        code: Code,
        message: String,
    },
    /// A bind target does not appear in the compiled SQL.
    #[error("no parameter named `{parameter}` in sql statement `{sql}`")]
    UnknownParameter { parameter: String, sql: String },
    /// The engine rejected a value for a resolved parameter.
    #[error("{message} while binding parameter `{parameter}` in sql statement `{sql}`")]
    Bind {
        parameter: String,
        sql: String,
        code: Code,
        message: String,
    },
    /// No column in the row has the requested name.
    #[error("no column named `{column}`")]
    UnknownColumn { column: String },
    /// A column index past the end of the row.
    #[error("no column at index {index}, row has {count} columns")]
    IndexOutOfRange { index: usize, count: usize },
    /// Stepping hit a busy or locked condition held by a concurrent writer.
    ///
    /// The statement has not been retried, doing so is up to the caller.
    #[error("{message} while executing sql statement `{sql}`")]
    TransactionFailed {
        sql: String,
        code: Code,
        message: String,
    },
    /// Any other non-success status reported by the engine.
    ///
    /// Failures while executing a statement carry its SQL text.
    #[error("sqlite3 error {code}: {message}")]
    Engine {
        code: Code,
        message: String,
        sql: Option<String>,
    },
}

impl Error {
    /// Construct an engine error from a code, using the generic description
    /// of the code as its message.
    #[inline]
    pub(crate) fn from_code(code: Code) -> Self {
        Self::Engine {
            code,
            message: code.message().to_owned(),
            sql: None,
        }
    }

    /// Construct an engine error from a status reported by a connection.
    pub(crate) fn from_connection(db: *mut ffi::sqlite3, code: c_int) -> Self {
        Self::Engine {
            code: Code::new(code),
            message: unsafe { connection_message(db, Code::new(code)) },
            sql: None,
        }
    }

    /// The classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Open { .. } => ErrorKind::Open,
            Error::Prepare { .. } => ErrorKind::Prepare,
            Error::UnknownParameter { .. } => ErrorKind::UnknownParameter,
            Error::Bind { .. } => ErrorKind::Bind,
            Error::UnknownColumn { .. } => ErrorKind::UnknownColumn,
            Error::IndexOutOfRange { .. } => ErrorKind::IndexOutOfRange,
            Error::TransactionFailed { .. } => ErrorKind::TransactionFailed,
            Error::Engine { .. } => ErrorKind::Engine,
        }
    }

    /// The native status code behind this error.
    ///
    /// Errors raised by this crate without consulting the engine report
    /// [`Code::MISUSE`], or [`Code::RANGE`] for a bad column index.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlhandle::{AccessMode, Code, Database, IN_MEMORY};
    ///
    /// let db = Database::open(IN_MEMORY, AccessMode::ReadWriteCreate)?;
    /// let e = db.execute(":)").unwrap_err();
    /// assert_eq!(e.code(), Code::ERROR);
    /// # Ok::<_, sqlhandle::Error>(())
    /// ```
    pub fn code(&self) -> Code {
        match self {
            Error::Open { code, .. }
            | Error::Prepare { code, .. }
            | Error::Bind { code, .. }
            | Error::TransactionFailed { code, .. }
            | Error::Engine { code, .. } => *code,
            Error::UnknownParameter { .. } | Error::UnknownColumn { .. } => Code::MISUSE,
            Error::IndexOutOfRange { .. } => Code::RANGE,
        }
    }

    /// The SQL text the error was raised for, if any.
    pub fn sql(&self) -> Option<&str> {
        match self {
            Error::Prepare { sql, .. }
            | Error::UnknownParameter { sql, .. }
            | Error::Bind { sql, .. }
            | Error::TransactionFailed { sql, .. } => Some(sql),
            Error::Engine { sql, .. } => sql.as_deref(),
            _ => None,
        }
    }

    /// The parameter name the error was raised for, if any.
    pub fn parameter(&self) -> Option<&str> {
        match self {
            Error::UnknownParameter { parameter, .. } | Error::Bind { parameter, .. } => {
                Some(parameter)
            }
            _ => None,
        }
    }

    /// Test if the caller might succeed by retrying the operation.
    #[inline]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::TransactionFailed { .. })
    }
}

/// Read the most recent message of a connection, falling back to the generic
/// description of `code`.
///
/// # Safety
///
/// `db` must be null or a live connection.
pub(crate) unsafe fn connection_message(db: *mut ffi::sqlite3, code: Code) -> String {
    if db.is_null() {
        return code.message().to_owned();
    }

    unsafe {
        let ptr = ffi::sqlite3_errmsg(db);

        if ptr.is_null() {
            return code.message().to_owned();
        }

        CStr::from_ptr(ptr).to_string_lossy().into_owned()
    }
}
