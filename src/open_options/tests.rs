use std::path::Path;

use crate::ffi;
use crate::{AccessMode, CacheVisibility, OpenOptions, IN_MEMORY, TEMPORARY};

use super::memory_uri;

#[test]
fn memory_uri_lists_mode_then_cache() {
    assert_eq!(
        memory_uri(AccessMode::ReadOnly, CacheVisibility::Private),
        "file::memory:?mode=ro&cache=private"
    );
    assert_eq!(
        memory_uri(AccessMode::ReadWrite, CacheVisibility::Shared),
        "file::memory:?mode=rw&cache=shared"
    );
    assert_eq!(
        memory_uri(AccessMode::ReadWriteCreate, CacheVisibility::Shared),
        "file::memory:?mode=rwc&cache=shared"
    );
}

#[test]
fn flags_combine_access_and_cache() {
    let flags = OpenOptions::new()
        .access(AccessMode::ReadWriteCreate)
        .cache(CacheVisibility::Shared)
        .flags();

    assert_ne!(flags & ffi::SQLITE_OPEN_READWRITE, 0);
    assert_ne!(flags & ffi::SQLITE_OPEN_CREATE, 0);
    assert_ne!(flags & ffi::SQLITE_OPEN_SHAREDCACHE, 0);
    assert_eq!(flags & ffi::SQLITE_OPEN_PRIVATECACHE, 0);
    assert_ne!(flags & ffi::SQLITE_OPEN_EXRESCODE, 0);
}

#[test]
fn default_options_match_new() {
    assert_eq!(OpenOptions::default(), OpenOptions::new());
    assert_eq!(OpenOptions::default().flags(), OpenOptions::new().flags());
}

#[test]
fn shared_memory_target_uses_uri() {
    let mut options = OpenOptions::new();
    options.cache(CacheVisibility::Shared);

    let target = options.target(Path::new(IN_MEMORY)).unwrap();
    assert_eq!(
        target.name.to_str().unwrap(),
        "file::memory:?mode=rwc&cache=shared"
    );
    assert_ne!(target.flags & ffi::SQLITE_OPEN_URI, 0);
    assert_eq!(target.flags & ffi::SQLITE_OPEN_SHAREDCACHE, 0);
}

#[test]
fn private_memory_and_temporary_targets_are_passed_through() {
    let options = OpenOptions::new();

    let target = options.target(Path::new(IN_MEMORY)).unwrap();
    assert_eq!(target.name.to_str().unwrap(), ":memory:");
    assert_eq!(target.flags & ffi::SQLITE_OPEN_URI, 0);

    let target = options.target(Path::new(TEMPORARY)).unwrap();
    assert_eq!(target.name.to_str().unwrap(), "");
}
