use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Once;

use super::state::{self, Suspend};
use crate::output::{Format, Reporter};
use crate::output_on::reporter_for;

static FINAL_REPORT_DONE: AtomicBool = AtomicBool::new(false);
static EXIT_HOOK: Once = Once::new();
static EXIT_HOOK_REGISTERED: AtomicBool = AtomicBool::new(false);

/// Emit the final report through `reporter`, unless a final report was
/// already emitted by another hook. Returns whether this call produced it.
pub(crate) fn emit_final_report(label: &str, reporter: &dyn Reporter) -> bool {
    if FINAL_REPORT_DONE.swap(true, Ordering::AcqRel) {
        tracing::debug!(target: "memtrack", label, "final report already emitted");
        return false;
    }

    // Nothing allocated while suspended may outlive this scope
    let emitted = {
        let _suspend = Suspend::new();
        let report = state::report(label);
        match reporter.report(&report) {
            Ok(()) => Some((report.leaks.len(), report.leaked())),
            Err(e) => {
                tracing::error!(target: "memtrack", label, error = %e, "failed to emit report");
                eprintln!("Failed to report memtrack results: {}", e);
                None
            }
        }
    };

    if let Some((leaks, leaked)) = emitted {
        tracing::debug!(
            target: "memtrack",
            label,
            leaks,
            leaked,
            "final report emitted"
        );
    }
    true
}

pub(crate) fn final_report_emitted() -> bool {
    FINAL_REPORT_DONE.load(Ordering::Acquire)
}

extern "C" fn report_at_exit() {
    // unwinding out of an extern "C" fn aborts the process
    let _ = panic::catch_unwind(|| {
        let format = Format::from_env().unwrap_or_default();
        let reporter = reporter_for(format);
        emit_final_report(crate::DEFAULT_LABEL, reporter.as_ref());
    });
}

/// Print the final report when the process terminates normally.
///
/// The report is rendered from an `atexit` handler, in the format named by
/// `MEMTRACK_FORMAT` (plain text by default). Registration happens at most
/// once; calling this again is a no-op. If a [`ReportGuard`](crate::ReportGuard)
/// already emitted the final report, the exit hook stays silent.
///
/// Returns `false` if the C runtime refused the registration.
pub fn register_exit_report() -> bool {
    EXIT_HOOK.call_once(|| {
        // SAFETY: `report_at_exit` is an `extern "C" fn()` that catches its own panics
        let registered = unsafe { libc::atexit(report_at_exit) } == 0;
        EXIT_HOOK_REGISTERED.store(registered, Ordering::Release);
        if registered {
            tracing::debug!(target: "memtrack", "exit report registered");
        } else {
            tracing::error!(target: "memtrack", "atexit registration failed");
        }
    });
    EXIT_HOOK_REGISTERED.load(Ordering::Acquire)
}
