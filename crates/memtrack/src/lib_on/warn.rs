use std::io::{self, Write};

use super::state::Suspend;
use crate::anomaly::Anomaly;

/// Write an anomaly to stderr as `warning: <message> at <file>:<line>`.
///
/// Can run inside the global allocator, so it writes straight to the
/// unbuffered stderr handle without building any intermediate string.
pub(crate) fn emit(anomaly: &Anomaly) {
    let _suspend = Suspend::new();
    let site = anomaly.site();
    let _ = writeln!(
        io::stderr().lock(),
        "warning: {} at {}:{}",
        anomaly,
        site.file,
        site.line
    );
}

/// Emit the anomaly carried by `result`, if any, and pass the result through.
#[inline]
pub(crate) fn check<T>(result: Result<T, Anomaly>) -> Result<T, Anomaly> {
    if let Err(anomaly) = &result {
        emit(anomaly);
    }
    result
}
