use std::alloc::{GlobalAlloc, Layout, System};

use super::state::{self, is_suspended};
use super::warn;
use crate::site::Site;

/// Global allocator that records every Rust heap allocation in the
/// process-wide ledger before deferring to [`System`].
///
/// `GlobalAlloc` gives no access to the caller, so all blocks are recorded at
/// [`Site::UNKNOWN`]. A block whose release the ledger rejects is not handed
/// back to `System`.
///
/// ```rust,no_run
/// #[global_allocator]
/// static GLOBAL: memtrack::TrackingAllocator = memtrack::TrackingAllocator;
/// ```
pub struct TrackingAllocator;

unsafe impl GlobalAlloc for TrackingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc(layout) };
        if !is_suspended() {
            let _ = warn::check(state::record(ptr as usize, layout.size(), Site::UNKNOWN));
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc_zeroed(layout) };
        if !is_suspended() {
            let _ = warn::check(state::record(ptr as usize, layout.size(), Site::UNKNOWN));
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        if is_suspended() {
            unsafe { System.dealloc(ptr, layout) };
            return;
        }
        if warn::check(state::release(ptr as usize, Site::UNKNOWN)).is_ok() {
            unsafe { System.dealloc(ptr, layout) };
        }
    }
}
