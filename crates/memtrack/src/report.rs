use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ledger::Stats;
use crate::slots::AllocationRecord;

/// A live allocation at the time the report was taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeakEntry {
    pub file: String,
    pub line: u32,
    pub address: usize,
    pub size: usize,
}

impl From<&AllocationRecord> for LeakEntry {
    fn from(record: &AllocationRecord) -> Self {
        Self {
            file: record.site.file.to_string(),
            line: record.site.line,
            address: record.address,
            size: record.size,
        }
    }
}

/// Read-only snapshot of a ledger: summary counters plus the leak listing.
///
/// Leaks are listed in slot order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub label: String,
    #[serde(flatten)]
    pub stats: Stats,
    pub leaks: Vec<LeakEntry>,
}

impl Report {
    /// Build a report from counters and the live records, in the order given.
    pub fn new<'a>(
        label: &str,
        stats: Stats,
        live: impl IntoIterator<Item = &'a AllocationRecord>,
    ) -> Self {
        Self {
            label: label.to_string(),
            stats,
            leaks: live.into_iter().map(LeakEntry::from).collect(),
        }
    }

    pub fn leaked(&self) -> u64 {
        self.stats.leaked()
    }

    /// The detailed listing is only shown while bytes are still live.
    pub fn has_leaks(&self) -> bool {
        self.stats.current_allocated_size != 0
    }

    pub fn write_summary(&self, f: &mut impl fmt::Write) -> fmt::Result {
        let stats = &self.stats;
        writeln!(f)?;
        writeln!(f, "======= memory report =======")?;
        writeln!(f, "total allocations       : {}", stats.allocation_count)?;
        writeln!(f, "total frees             : {}", stats.free_count)?;
        writeln!(f, "failed allocations      : {}", stats.failed_allocations)?;
        writeln!(f, "double/invalid frees    : {}", stats.invalid_releases())?;
        writeln!(
            f,
            "total memory allocated  : {} bytes",
            stats.total_allocated_size
        )?;
        writeln!(f, "total memory freed      : {} bytes", stats.total_free_size)?;
        writeln!(
            f,
            "current allocated memory: {} bytes",
            stats.current_allocated_size
        )?;
        writeln!(
            f,
            "max allocated memory    : {} bytes",
            stats.max_allocated_size
        )?;
        writeln!(f, "memory leaked           : {} bytes", stats.leaked())?;
        writeln!(f, "=============================")?;
        writeln!(f)
    }

    pub fn write_leaks(&self, f: &mut impl fmt::Write) -> fmt::Result {
        if !self.has_leaks() {
            return Ok(());
        }
        writeln!(f, "======= detailed leaks =======")?;
        for leak in &self.leaks {
            writeln!(
                f,
                "leak at {}:{} - address: {:#x}, size: {} bytes",
                leak.file, leak.line, leak.address, leak.size
            )?;
        }
        writeln!(f, "=============================")?;
        writeln!(f)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_summary(f)?;
        self.write_leaks(f)
    }
}

#[cfg(test)]
mod tests {
    use crate::ledger::Ledger;
    use crate::site::Site;

    use super::*;

    fn scenario_report() -> Report {
        let mut ledger = Ledger::<8>::new();
        ledger.record(0x1, 10, Site::new("a.c", 1)).unwrap();
        ledger.record(0x2, 20, Site::new("a.c", 2)).unwrap();
        ledger.record(0x3, 30, Site::new("a.c", 3)).unwrap();
        ledger.release(0x2, Site::new("a.c", 4)).unwrap();
        ledger.report("scenario")
    }

    #[test]
    fn test_text_report_lists_each_leak() {
        let text = scenario_report().to_string();

        assert!(text.contains("total allocations       : 3\n"), "{text}");
        assert!(text.contains("total frees             : 1\n"), "{text}");
        assert!(text.contains("current allocated memory: 40 bytes\n"), "{text}");
        assert!(text.contains("memory leaked           : 40 bytes\n"), "{text}");
        assert!(text.contains("======= detailed leaks ======="), "{text}");
        assert!(text.contains("leak at a.c:1 - address: 0x1, size: 10 bytes\n"));
        assert!(text.contains("leak at a.c:3 - address: 0x3, size: 30 bytes\n"));
        assert!(!text.contains("address: 0x2"));
    }

    #[test]
    fn test_leak_listing_matches_leaked_total() {
        let report = scenario_report();
        let listed: u64 = report.leaks.iter().map(|l| l.size as u64).sum();
        assert_eq!(listed, report.leaked());
    }

    #[test]
    fn test_clean_report_has_no_leak_section() {
        let mut ledger = Ledger::<4>::new();
        ledger.record(0x8, 4, Site::new("x.rs", 1)).unwrap();
        ledger.release(0x8, Site::new("x.rs", 2)).unwrap();
        let text = ledger.report("clean").to_string();

        assert!(text.starts_with("\n======= memory report =======\n"));
        assert!(text.contains("memory leaked           : 0 bytes"));
        assert!(!text.contains("detailed leaks"));
    }

    #[test]
    fn test_anomalies_are_combined_in_summary() {
        let mut ledger = Ledger::<4>::new();
        let _ = ledger.release(0, Site::new("b.c", 1));
        let _ = ledger.release(0x9, Site::new("b.c", 2));
        let text = ledger.report("anomalies").to_string();
        assert!(text.contains("double/invalid frees    : 2\n"), "{text}");
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(scenario_report()).unwrap();
        assert_eq!(json["label"], "scenario");
        assert_eq!(json["allocation_count"], 3);
        assert_eq!(json["current_allocated_size"], 40);
        assert_eq!(json["leaks"].as_array().map(Vec::len), Some(2));
        assert_eq!(json["leaks"][1]["size"], 30);

        let parsed: Report = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, scenario_report());
    }
}
