//! Drop-in replacements for the libc allocation functions.
//!
//! Each function carries `#[track_caller]`, so swapping `libc::malloc` for
//! `memtrack::malloc` at a call site is all it takes to attribute the block to
//! that line.
//!
//! ```rust
//! let buf = memtrack::malloc(64);
//! assert!(!buf.is_null());
//! unsafe { memtrack::free(buf) };
//! ```

use libc::{c_void, size_t};

use super::state::{self, is_suspended, with_ledger};
use super::warn;
use crate::site::Site;

/// `libc::malloc` recorded at the caller's site.
///
/// A null return is counted as a failed allocation.
#[track_caller]
pub fn malloc(size: size_t) -> *mut c_void {
    let site = Site::caller();
    // SAFETY: malloc has no preconditions
    let ptr = unsafe { libc::malloc(size) };
    if !is_suspended() {
        let _ = warn::check(state::record(ptr as usize, size, site));
    }
    ptr
}

/// `libc::calloc` recorded as `count * size` bytes at the caller's site.
#[track_caller]
pub fn calloc(count: size_t, size: size_t) -> *mut c_void {
    let site = Site::caller();
    let Some(total) = count.checked_mul(size) else {
        if !is_suspended() {
            let _ = warn::check(state::record(0, 0, site));
        }
        return std::ptr::null_mut();
    };
    // SAFETY: calloc has no preconditions
    let ptr = unsafe { libc::calloc(count, size) };
    if !is_suspended() {
        let _ = warn::check(state::record(ptr as usize, total, site));
    }
    ptr
}

/// `libc::realloc` that moves the record of `ptr` to the new block.
///
/// A null `ptr` behaves like [`malloc`]. A `ptr` the ledger does not know is
/// reported as an unknown release and left alone; null is returned. When the
/// underlying realloc fails the old block stays allocated and tracked.
///
/// # Safety
///
/// `ptr` must be null or a block obtained from this module that has not been
/// freed yet.
#[track_caller]
pub unsafe fn realloc(ptr: *mut c_void, size: size_t) -> *mut c_void {
    let site = Site::caller();
    if ptr.is_null() {
        // SAFETY: realloc(NULL, n) is malloc(n)
        let new = unsafe { libc::realloc(ptr, size) };
        if !is_suspended() {
            let _ = warn::check(state::record(new as usize, size, site));
        }
        return new;
    }

    if is_suspended() {
        // SAFETY: forwarded caller contract
        return unsafe { libc::realloc(ptr, size) };
    }

    let outcome = with_ledger(|ledger| {
        if !ledger.contains(ptr as usize) {
            return ledger
                .release(ptr as usize, site)
                .map(|_| std::ptr::null_mut());
        }
        // SAFETY: the ledger holds a live record for `ptr`
        let new = unsafe { libc::realloc(ptr, size) };
        if new.is_null() {
            ledger.record(0, size, site)?;
            return Ok(new);
        }
        // releasing first frees the slot the new record goes into
        ledger.release(ptr as usize, site)?;
        ledger.record(new as usize, size, site)?;
        Ok(new)
    });

    warn::check(outcome).unwrap_or(std::ptr::null_mut())
}

/// `libc::free` guarded by the ledger.
///
/// The block is only handed back to libc when the ledger had a live record for
/// it. Null pointers and unknown pointers are reported and otherwise ignored.
///
/// # Safety
///
/// `ptr` must be null or a block obtained from this module.
#[track_caller]
pub unsafe fn free(ptr: *mut c_void) {
    let site = Site::caller();
    if is_suspended() {
        // SAFETY: forwarded caller contract
        unsafe { libc::free(ptr) };
        return;
    }
    if warn::check(state::release(ptr as usize, site)).is_ok() {
        // SAFETY: the ledger confirmed `ptr` is a live block
        unsafe { libc::free(ptr) };
    }
}
