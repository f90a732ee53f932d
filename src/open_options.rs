use core::ffi::c_int;
use core::fmt;
use core::time::Duration;

use std::ffi::CString;
use std::path::Path;

use crate::database::{Database, IN_MEMORY};
use crate::error::{Error, Result};
use crate::ffi;

#[cfg(test)]
mod tests;

/// How a database is allowed to be accessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessMode {
    /// The database is opened for reading only, and must already exist.
    ReadOnly,
    /// The database is opened for reading and writing, and must already
    /// exist.
    ReadWrite,
    /// The database is opened for reading and writing, and is created if it
    /// does not exist.
    ReadWriteCreate,
}

impl AccessMode {
    /// The native open flags of this mode.
    #[inline]
    pub fn flags(self) -> c_int {
        match self {
            AccessMode::ReadOnly => ffi::SQLITE_OPEN_READONLY,
            AccessMode::ReadWrite => ffi::SQLITE_OPEN_READWRITE,
            AccessMode::ReadWriteCreate => ffi::SQLITE_OPEN_READWRITE | ffi::SQLITE_OPEN_CREATE,
        }
    }
}

/// Renders the `mode` URI query parameter.
impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessMode::ReadOnly => write!(f, "mode=ro"),
            AccessMode::ReadWrite => write!(f, "mode=rw"),
            AccessMode::ReadWriteCreate => write!(f, "mode=rwc"),
        }
    }
}

/// Whether the page cache of a connection is shared with other connections to
/// the same database in this process.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheVisibility {
    /// The connection has its own cache.
    #[default]
    Private,
    /// The cache is shared, and conflicting writers are reported as locked
    /// instead of busy.
    Shared,
}

impl CacheVisibility {
    /// The native open flags of this visibility.
    #[inline]
    pub fn flags(self) -> c_int {
        match self {
            CacheVisibility::Private => ffi::SQLITE_OPEN_PRIVATECACHE,
            CacheVisibility::Shared => ffi::SQLITE_OPEN_SHAREDCACHE,
        }
    }
}

/// Renders the `cache` URI query parameter.
impl fmt::Display for CacheVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheVisibility::Private => write!(f, "cache=private"),
            CacheVisibility::Shared => write!(f, "cache=shared"),
        }
    }
}

/// Format the URI used to open an in-memory database with the given access
/// mode and cache visibility.
///
/// # Examples
///
/// ```
/// use sqlhandle::{AccessMode, CacheVisibility, memory_uri};
///
/// assert_eq!(
///     memory_uri(AccessMode::ReadWriteCreate, CacheVisibility::Shared),
///     "file::memory:?mode=rwc&cache=shared"
/// );
/// ```
pub fn memory_uri(mode: AccessMode, cache: CacheVisibility) -> String {
    format!("file::memory:?{mode}&{cache}")
}

/// Options that can be used to customize the opening of a [`Database`].
///
/// When using [`new`] the database is opened with [`extended_result_codes`]
/// set, read-write-create access and a private cache.
///
/// [`new`]: Self::new
/// [`extended_result_codes`]: Self::extended_result_codes
///
/// # Examples
///
/// ```
/// use sqlhandle::{AccessMode, CacheVisibility, OpenOptions, IN_MEMORY};
///
/// let db = OpenOptions::new()
///     .access(AccessMode::ReadWriteCreate)
///     .cache(CacheVisibility::Private)
///     .open(IN_MEMORY)?;
///
/// assert!(db.is_open());
/// # Ok::<_, sqlhandle::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenOptions {
    access: AccessMode,
    cache: CacheVisibility,
    extra: c_int,
    busy_timeout: Option<Duration>,
}

impl OpenOptions {
    /// Create options for opening a database connection with default safe
    /// options.
    #[inline]
    pub fn new() -> Self {
        Self {
            access: AccessMode::ReadWriteCreate,
            cache: CacheVisibility::Private,
            extra: ffi::SQLITE_OPEN_EXRESCODE,
            busy_timeout: None,
        }
    }

    /// Set how the database may be accessed.
    #[inline]
    pub fn access(&mut self, access: AccessMode) -> &mut Self {
        self.access = access;
        self
    }

    /// Set whether the page cache is shared with other connections.
    #[inline]
    pub fn cache(&mut self, cache: CacheVisibility) -> &mut Self {
        self.cache = cache;
        self
    }

    /// The filename can be interpreted as a URI if this flag is set.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlhandle::OpenOptions;
    ///
    /// let db = OpenOptions::new()
    ///     .uri()
    ///     .open("file:memorydb?mode=memory")?;
    /// # Ok::<_, sqlhandle::Error>(())
    /// ```
    #[inline]
    pub fn uri(&mut self) -> &mut Self {
        self.extra |= ffi::SQLITE_OPEN_URI;
        self
    }

    /// The connection comes up in "extended result code mode", so errors carry
    /// codes such as [`Code::LOCKED_SHAREDCACHE`] instead of only their
    /// primary code.
    ///
    /// [`Code::LOCKED_SHAREDCACHE`]: crate::Code::LOCKED_SHAREDCACHE
    #[inline]
    pub fn extended_result_codes(&mut self) -> &mut Self {
        self.extra |= ffi::SQLITE_OPEN_EXRESCODE;
        self
    }

    /// The new database connection will use the "serialized" [threading mode].
    ///
    /// [threading mode]: https://sqlite.org/threadsafe.html
    #[inline]
    pub fn full_mutex(&mut self) -> &mut Self {
        self.extra |= ffi::SQLITE_OPEN_FULLMUTEX;
        self
    }

    /// The database filename is not allowed to contain a symbolic link.
    #[inline]
    pub fn no_follow(&mut self) -> &mut Self {
        self.extra |= ffi::SQLITE_OPEN_NOFOLLOW;
        self
    }

    /// Retry operations rejected because of a busy database until `timeout`
    /// has passed.
    ///
    /// Without a timeout a busy database is reported immediately, which is
    /// what [`as_transaction`] relies on to detect conflicting writers.
    ///
    /// [`as_transaction`]: crate::as_transaction
    #[inline]
    pub fn busy_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.busy_timeout = Some(timeout);
        self
    }

    /// The configured access mode.
    #[inline]
    pub fn access_mode(&self) -> AccessMode {
        self.access
    }

    /// The configured cache visibility.
    #[inline]
    pub fn cache_visibility(&self) -> CacheVisibility {
        self.cache
    }

    /// The configured busy timeout.
    #[inline]
    pub(crate) fn timeout(&self) -> Option<Duration> {
        self.busy_timeout
    }

    /// The combined native flags used when opening a database by path.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlhandle::{AccessMode, CacheVisibility, OpenOptions};
    ///
    /// let flags = OpenOptions::new()
    ///     .access(AccessMode::ReadOnly)
    ///     .cache(CacheVisibility::Shared)
    ///     .flags();
    ///
    /// assert_ne!(flags & AccessMode::ReadOnly.flags(), 0);
    /// assert_ne!(flags & CacheVisibility::Shared.flags(), 0);
    /// ```
    #[inline]
    pub fn flags(&self) -> c_int {
        self.access.flags() | self.cache.flags() | self.extra
    }

    /// Open a database at the given path.
    ///
    /// `path` may be a filesystem path, [`IN_MEMORY`] or [`TEMPORARY`]. An
    /// in-memory database with a shared cache is opened through the URI
    /// produced by [`memory_uri`].
    ///
    /// [`TEMPORARY`]: crate::TEMPORARY
    pub fn open(&self, path: impl AsRef<Path>) -> Result<Database> {
        let target = self.target(path.as_ref())?;
        Database::open_target(target, *self)
    }

    /// Resolve the name and flags passed to the engine for `path`.
    pub(crate) fn target(&self, path: &Path) -> Result<Target> {
        if path == Path::new(IN_MEMORY) && self.cache == CacheVisibility::Shared {
            let uri = memory_uri(self.access, self.cache);

            return Ok(Target {
                name: string_to_cstring(&uri)?,
                flags: self.access.flags() | self.extra | ffi::SQLITE_OPEN_URI,
            });
        }

        Ok(Target {
            name: path_to_cstring(path)?,
            flags: self.flags(),
        })
    }
}

impl Default for OpenOptions {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

/// The resolved arguments to the native open call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Target {
    pub(crate) name: CString,
    pub(crate) flags: c_int,
}

/// Convert a filesystem path to a c-string.
pub(crate) fn path_to_cstring(p: &Path) -> Result<CString> {
    let Some(s) = p.to_str() else {
        return Err(Error::Open {
            path: p.to_string_lossy().into_owned(),
            code: crate::Code::MISUSE,
            message: String::from("path is not valid utf-8"),
        });
    };

    string_to_cstring(s)
}

fn string_to_cstring(s: &str) -> Result<CString> {
    match CString::new(s) {
        Ok(string) => Ok(string),
        Err(..) => Err(Error::Open {
            path: s.to_owned(),
            code: crate::Code::MISUSE,
            message: String::from("path contains an internal null"),
        }),
    }
}
