use memtrack::{Report, Reporter};
use tracing::{info, info_span, warn};

struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, report: &Report) -> Result<(), Box<dyn std::error::Error>> {
        let stats = &report.stats;
        info!(
            "memtrack report for: {}, allocations: {}, frees: {}, leaked: {} bytes",
            report.label,
            stats.allocation_count,
            stats.free_count,
            report.leaked()
        );

        for leak in &report.leaks {
            let leak_span = info_span!("leak", site = %format!("{}:{}", leak.file, leak.line));
            let _enter = leak_span.enter();
            warn!("{} bytes at {:#x}", leak.size, leak.address);
        }

        Ok(())
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    let _guard = memtrack::GuardBuilder::new("tracing_reporter::main")
        .reporter(Box::new(TracingReporter))
        .build();

    let buffers: Vec<_> = (0..3).map(|_| memtrack::malloc(128)).collect();
    for buffer in buffers.into_iter().skip(1) {
        unsafe { memtrack::free(buffer) };
    }
}
