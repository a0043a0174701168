//! Pass-through surface compiled with the `memtrack-off` feature. Same API,
//! nothing is recorded and no report is ever printed.

use std::alloc::{GlobalAlloc, Layout, System};

use libc::{c_void, size_t};

use crate::ledger::Stats;
use crate::output::{Format, Reporter};
use crate::report::Report;

pub use memtrack_macros::main;

pub fn malloc(size: size_t) -> *mut c_void {
    unsafe { libc::malloc(size) }
}

pub fn calloc(count: size_t, size: size_t) -> *mut c_void {
    unsafe { libc::calloc(count, size) }
}

/// # Safety
///
/// Same contract as `libc::realloc`.
pub unsafe fn realloc(ptr: *mut c_void, size: size_t) -> *mut c_void {
    unsafe { libc::realloc(ptr, size) }
}

/// # Safety
///
/// Same contract as `libc::free`.
pub unsafe fn free(ptr: *mut c_void) {
    unsafe { libc::free(ptr) }
}

pub struct TrackingAllocator;

unsafe impl GlobalAlloc for TrackingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        unsafe { System.alloc(layout) }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { System.dealloc(ptr, layout) }
    }
}

pub fn stats() -> Stats {
    Stats::ZERO
}

pub fn report(label: &str) -> Report {
    Report {
        label: label.to_string(),
        stats: Stats::ZERO,
        leaks: Vec::new(),
    }
}

pub fn generate_report() -> String {
    report(crate::DEFAULT_LABEL).to_string()
}

pub fn register_exit_report() -> bool {
    true
}

pub fn final_report_emitted() -> bool {
    false
}

pub struct GuardBuilder {}

impl GuardBuilder {
    pub fn new(_label: &'static str) -> Self {
        Self {}
    }

    pub fn format(self, _format: Format) -> Self {
        self
    }

    pub fn reporter(self, _reporter: Box<dyn Reporter>) -> Self {
        self
    }

    pub fn build(self) -> ReportGuard {
        ReportGuard {}
    }
}

pub struct ReportGuard {}
