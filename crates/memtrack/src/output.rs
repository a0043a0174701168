use std::fmt;
use std::str::FromStr;

use crate::report::Report;

/// Output format of the final report.
///
/// # Variants
///
/// * `Text` - Plain summary followed by the detailed leak listing (default)
/// * `Table` - Colored tables, one for the summary and one for the leaks
/// * `Json` - Compact JSON (single line)
/// * `JsonPretty` - Pretty-printed JSON
///
/// The `MEMTRACK_FORMAT` environment variable overrides whatever format was
/// configured in code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    Text,
    Table,
    Json,
    JsonPretty,
}

impl Format {
    pub const ENV_VAR: &'static str = "MEMTRACK_FORMAT";

    /// Format from `MEMTRACK_FORMAT`, if set to a known value.
    pub fn from_env() -> Option<Self> {
        std::env::var(Self::ENV_VAR)
            .ok()
            .and_then(|value| value.parse().ok())
    }
}

/// Returned when parsing an unknown format name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown format {0:?}, expected one of: \"text\", \"table\", \"json\", \"json-pretty\"")]
pub struct ParseFormatError(String);

impl FromStr for Format {
    type Err = ParseFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Format::Text),
            "table" => Ok(Format::Table),
            "json" => Ok(Format::Json),
            "json-pretty" | "json_pretty" => Ok(Format::JsonPretty),
            other => Err(ParseFormatError(other.to_string())),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Text => write!(f, "text"),
            Format::Table => write!(f, "table"),
            Format::Json => write!(f, "json"),
            Format::JsonPretty => write!(f, "json-pretty"),
        }
    }
}

/// Trait for implementing custom report output.
///
/// Implement this trait to control where the final report goes, e.g. a log
/// pipeline or a file consumed by CI.
///
/// # Examples
///
/// ```rust
/// use memtrack::{Report, Reporter};
/// use std::error::Error;
///
/// struct LeakCountReporter;
///
/// impl Reporter for LeakCountReporter {
///     fn report(&self, report: &Report) -> Result<(), Box<dyn Error>> {
///         println!("{}: {} live allocations", report.label, report.leaks.len());
///         Ok(())
///     }
/// }
/// ```
pub trait Reporter: Send + Sync {
    fn report(&self, report: &Report) -> Result<(), Box<dyn std::error::Error>>;
}

pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let bytes_f = bytes as f64;
    let unit_index = (bytes_f.log(THRESHOLD).floor() as usize).min(UNITS.len() - 1);
    let unit_value = bytes_f / THRESHOLD.powi(unit_index as i32);

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", unit_value, UNITS[unit_index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format() {
        assert_eq!("text".parse(), Ok(Format::Text));
        assert_eq!("TABLE".parse(), Ok(Format::Table));
        assert_eq!(" json ".parse(), Ok(Format::Json));
        assert_eq!("json-pretty".parse(), Ok(Format::JsonPretty));
        assert!("yaml".parse::<Format>().is_err());
    }

    #[test]
    fn test_format_display_roundtrips() {
        for format in [Format::Text, Format::Table, Format::Json, Format::JsonPretty] {
            assert_eq!(format.to_string().parse(), Ok(format));
        }
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(40), "40 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024 + 512 * 1024), "5.5 MB");
    }
}
