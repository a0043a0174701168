//! Heap allocation ledger that reports leaks at process exit.
//!
//! Allocations are recorded with their address, size, and call site in a
//! fixed-capacity table. Anomalies (failed allocations, a full table, null or
//! unknown frees) are counted and reported on stderr as they happen; they never
//! interrupt the program. When the program ends a summary is printed, followed
//! by every allocation still live.
//!
//! ## Setup & Usage
//!
//! Replace libc allocation calls with the [`malloc`], [`calloc`],
//! [`realloc`], and [`free`] shims, which pick up their caller's file and line,
//! or install [`TrackingAllocator`] as the global allocator (the
//! `memtrack-alloc` feature does this for you). Then register a report hook,
//! either [`register_exit_report`], a [`GuardBuilder`] guard, or the
//! [`main`] attribute:
//!
//! ```rust,no_run
//! #[memtrack::main]
//! fn main() {
//!     let leaked = memtrack::malloc(128);
//!     let freed = memtrack::malloc(64);
//!     unsafe { memtrack::free(freed) };
//!     let _ = leaked;
//! }
//! ```

mod anomaly;
mod ledger;
mod report;
mod site;
mod slots;

pub use anomaly::Anomaly;
pub use ledger::{Ledger, Stats, DEFAULT_CAPACITY};
pub use report::{LeakEntry, Report};
pub use site::Site;
pub use slots::{AllocationRecord, SlotTable, EMPTY_ADDRESS};

pub(crate) mod output;
pub use output::{format_bytes, Format, ParseFormatError, Reporter};

/// Label of reports produced without a guard.
pub const DEFAULT_LABEL: &str = "memtrack";

#[cfg(not(feature = "memtrack-off"))]
pub(crate) mod output_on;

#[cfg(not(feature = "memtrack-off"))]
#[doc(inline)]
pub use lib_on::*;
#[cfg(not(feature = "memtrack-off"))]
mod lib_on;

// With memtrack-off every entry point is a plain pass-through from lib_off
#[cfg(feature = "memtrack-off")]
#[doc(inline)]
pub use lib_off::*;
#[cfg(feature = "memtrack-off")]
mod lib_off;
