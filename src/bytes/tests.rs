use super::alloc;

#[test]
fn alloc_copies_text() {
    let data = b"hello, world!";
    let (ptr, len, dealloc) = alloc(data).unwrap();
    assert_eq!(len, 13);

    let copied = unsafe { core::slice::from_raw_parts(ptr.cast::<u8>(), len as usize) };
    assert_eq!(copied, data);

    let dealloc = dealloc.unwrap();

    unsafe {
        dealloc(ptr);
    }
}

#[test]
fn alloc_empty_is_not_allocated() {
    let (ptr, len, dealloc) = alloc(b"").unwrap();
    assert_eq!(len, 0);
    assert!(dealloc.is_none());
    assert!(!ptr.is_null());
}
