use core::alloc::Layout;
use core::ffi::{c_int, c_void};
use core::mem::{align_of, size_of};
use core::ptr::dangling_mut;

use crate::error::{Code, Error, Result};

#[cfg(test)]
mod tests;

pub(crate) type DeallocFn = unsafe extern "C" fn(*mut c_void);

/// Release a buffer handed to the engine by [`alloc`].
pub(crate) unsafe extern "C" fn dealloc(p: *mut c_void) {
    if p == dangling_mut::<c_void>() {
        return;
    }

    // SAFETY: The buffer was allocated by `alloc`, which stores its length in
    // the word preceding the data.
    unsafe {
        let p = p.cast::<u8>().wrapping_sub(size_of::<usize>());
        let len = p.cast::<usize>().read();
        let layout =
            Layout::from_size_align_unchecked(size_of::<usize>() + len, align_of::<usize>());
        std::alloc::dealloc(p, layout);
    }
}

/// Copy `bytes` into a buffer owned by the engine once bound, which releases
/// it through the returned destructor.
///
/// Empty input is not allocated, a dangling pointer without a destructor is
/// returned instead.
pub(crate) fn alloc(bytes: &[u8]) -> Result<(*mut c_void, c_int, Option<DeallocFn>)> {
    if bytes.is_empty() {
        return Ok((dangling_mut(), 0, None));
    }

    let Ok(len) = c_int::try_from(bytes.len()) else {
        return Err(Error::from_code(Code::TOOBIG));
    };

    let Ok(layout) = Layout::from_size_align(size_of::<usize>() + bytes.len(), align_of::<usize>())
    else {
        return Err(Error::from_code(Code::NOMEM));
    };

    // SAFETY: The layout has a non-zero size.
    unsafe {
        let ptr = std::alloc::alloc(layout);

        if ptr.is_null() {
            return Err(Error::from_code(Code::NOMEM));
        }

        ptr.cast::<usize>().write(bytes.len());
        let data = ptr.add(size_of::<usize>());
        data.copy_from_nonoverlapping(bytes.as_ptr(), bytes.len());
        Ok((data.cast(), len, Some(dealloc as DeallocFn)))
    }
}
