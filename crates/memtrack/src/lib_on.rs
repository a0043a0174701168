use std::sync::atomic::{AtomicBool, Ordering};

use crate::output::{Format, Reporter};
use crate::output_on::reporter_for;

pub use memtrack_macros::main;

mod allocator;
mod exit;
mod shim;
mod state;
mod warn;

pub use allocator::TrackingAllocator;
pub use exit::register_exit_report;
pub use shim::{calloc, free, malloc, realloc};
pub use state::{generate_report, report, stats};

cfg_if::cfg_if! {
    if #[cfg(feature = "memtrack-alloc")] {
        // Every Rust heap allocation in the process goes through the ledger
        #[global_allocator]
        static GLOBAL: TrackingAllocator = TrackingAllocator;
    }
}

/// Whether the final report was already emitted by a guard or the exit hook.
pub fn final_report_emitted() -> bool {
    exit::final_report_emitted()
}

static GUARD_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Builder for a [`ReportGuard`] that prints the final report when dropped.
///
/// # Examples
///
/// Basic usage with default settings:
///
/// ```rust
/// use memtrack::GuardBuilder;
///
/// let _guard = GuardBuilder::new("my_program").build();
/// let block = memtrack::malloc(32);
/// unsafe { memtrack::free(block) };
/// // Report is printed when _guard goes out of scope
/// ```
///
/// JSON output:
///
/// ```rust
/// use memtrack::{Format, GuardBuilder};
///
/// let _guard = GuardBuilder::new("main")
///     .format(Format::JsonPretty)
///     .build();
/// ```
///
/// # Limitations
///
/// Only one guard can be alive at a time. Building a second one (either via
/// `GuardBuilder` or via the [`main`] macro) panics.
pub struct GuardBuilder {
    label: &'static str,
    reporter: ReporterConfig,
}

enum ReporterConfig {
    Format(Format),
    Custom(Box<dyn Reporter>),
    None, // Will default to Format::Text
}

impl GuardBuilder {
    /// Creates a new `GuardBuilder`. The label identifies the session in
    /// table and JSON output.
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            reporter: ReporterConfig::None,
        }
    }

    /// Sets the output format. `MEMTRACK_FORMAT` takes precedence over it.
    pub fn format(mut self, format: Format) -> Self {
        self.reporter = ReporterConfig::Format(format);
        self
    }

    /// Sets a custom reporter, overriding any format setting.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use memtrack::{GuardBuilder, Report, Reporter};
    ///
    /// struct LeakGate;
    ///
    /// impl Reporter for LeakGate {
    ///     fn report(&self, report: &Report) -> Result<(), Box<dyn std::error::Error>> {
    ///         if report.has_leaks() {
    ///             return Err(format!("{} bytes leaked", report.leaked()).into());
    ///         }
    ///         Ok(())
    ///     }
    /// }
    ///
    /// let _guard = GuardBuilder::new("ci").reporter(Box::new(LeakGate)).build();
    /// ```
    pub fn reporter(mut self, reporter: Box<dyn Reporter>) -> Self {
        self.reporter = ReporterConfig::Custom(reporter);
        self
    }

    /// Builds the guard.
    ///
    /// # Panics
    ///
    /// Panics if another guard is already alive.
    pub fn build(self) -> ReportGuard {
        if GUARD_ACTIVE.swap(true, Ordering::AcqRel) {
            panic!("More than one memtrack report guard cannot be alive at the same time.");
        }

        let reporter: Box<dyn Reporter> = match self.reporter {
            ReporterConfig::Custom(reporter) => reporter,
            ReporterConfig::Format(format) => reporter_for(Format::from_env().unwrap_or(format)),
            ReporterConfig::None => reporter_for(Format::from_env().unwrap_or_default()),
        };

        tracing::debug!(target: "memtrack", label = self.label, "report guard built");

        ReportGuard {
            label: self.label,
            reporter,
        }
    }
}

/// Prints the final report of the process-wide ledger on drop.
///
/// Created by [`GuardBuilder::build`] or the [`main`] attribute macro.
pub struct ReportGuard {
    label: &'static str,
    reporter: Box<dyn Reporter>,
}

impl Drop for ReportGuard {
    fn drop(&mut self) {
        exit::emit_final_report(self.label, self.reporter.as_ref());
        GUARD_ACTIVE.store(false, Ordering::Release);
    }
}
