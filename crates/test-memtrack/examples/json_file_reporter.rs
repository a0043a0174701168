use std::path::PathBuf;

use eyre::{Result, WrapErr};
use memtrack::{Report, Reporter};

struct JsonFileReporter {
    path: PathBuf,
}

impl Reporter for JsonFileReporter {
    fn report(&self, report: &Report) -> Result<(), Box<dyn std::error::Error>> {
        let json_string = serde_json::to_string_pretty(report)?;
        std::fs::write(&self.path, json_string)?;
        println!("Report saved to {}", self.path.display());
        Ok(())
    }
}

fn leak_some(count: usize) -> Result<()> {
    for i in 0..count {
        let block = memtrack::malloc(16 * (i + 1));
        if block.is_null() {
            eyre::bail!("allocation {i} failed");
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("memtrack_report.json"));

    let _guard = memtrack::GuardBuilder::new("json_file_reporter::main")
        .reporter(Box::new(JsonFileReporter { path }))
        .build();

    leak_some(3).wrap_err("leaking blocks")?;
    Ok(())
}
