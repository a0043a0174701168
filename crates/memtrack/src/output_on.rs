use crate::output::{format_bytes, Format, Reporter};
use crate::report::Report;
use colored::*;
use prettytable::{color, Attr, Cell, Row, Table};
use std::io::{self, Write};

pub(crate) fn reporter_for(format: Format) -> Box<dyn Reporter> {
    match format {
        Format::Text => Box::new(TextReporter),
        Format::Table => Box::new(TableReporter),
        Format::Json => Box::new(JsonReporter),
        Format::JsonPretty => Box::new(JsonPrettyReporter),
    }
}

fn header_row(headers: &[&str], use_colors: bool) -> Row {
    let cells = headers
        .iter()
        .map(|header| {
            if use_colors {
                Cell::new(header)
                    .with_style(Attr::Bold)
                    .with_style(Attr::ForegroundColor(color::CYAN))
            } else {
                Cell::new(header).with_style(Attr::Bold)
            }
        })
        .collect();
    Row::new(cells)
}

pub(crate) fn summary_table(report: &Report, use_colors: bool) -> Table {
    let stats = &report.stats;
    let mut table = Table::new();
    table.add_row(header_row(&["Metric", "Value"], use_colors));

    let rows = [
        ("Allocations", stats.allocation_count.to_string()),
        ("Frees", stats.free_count.to_string()),
        ("Failed allocations", stats.failed_allocations.to_string()),
        ("Double/invalid frees", stats.invalid_releases().to_string()),
        ("Total allocated", format_bytes(stats.total_allocated_size)),
        ("Total freed", format_bytes(stats.total_free_size)),
        ("Current allocated", format_bytes(stats.current_allocated_size)),
        ("Max allocated", format_bytes(stats.max_allocated_size)),
        ("Leaked", format_bytes(stats.leaked())),
    ];
    for (name, value) in rows {
        table.add_row(Row::new(vec![Cell::new(name), Cell::new(&value)]));
    }
    table
}

pub(crate) fn leaks_table(report: &Report, use_colors: bool) -> Table {
    let mut table = Table::new();
    table.add_row(header_row(&["Site", "Address", "Size"], use_colors));
    for leak in &report.leaks {
        table.add_row(Row::new(vec![
            Cell::new(&format!("{}:{}", leak.file, leak.line)),
            Cell::new(&format!("{:#x}", leak.address)),
            Cell::new(&format_bytes(leak.size as u64)),
        ]));
    }
    table
}

/// Summary and leak listing in the classic plain-text layout.
pub(crate) struct TextReporter;

impl Reporter for TextReporter {
    fn report(&self, report: &Report) -> Result<(), Box<dyn std::error::Error>> {
        let mut out = io::stdout().lock();
        write!(out, "{report}")?;
        out.flush()?;
        Ok(())
    }
}

pub(crate) struct TableReporter;

impl Reporter for TableReporter {
    fn report(&self, report: &Report) -> Result<(), Box<dyn std::error::Error>> {
        let use_colors = std::env::var("NO_COLOR").is_err();

        println!(
            "{} {} - {}",
            "[memtrack]".blue().bold(),
            report.label.yellow().bold(),
            "heap allocations tracked until exit."
        );
        summary_table(report, use_colors).printstd();

        if report.has_leaks() {
            println!();
            println!(
                "{} {} live allocation(s), {} leaked:",
                "[memtrack]".blue().bold(),
                report.leaks.len(),
                format_bytes(report.leaked()).red().bold()
            );
            leaks_table(report, use_colors).printstd();
        }
        Ok(())
    }
}

pub(crate) struct JsonReporter;

impl Reporter for JsonReporter {
    fn report(&self, report: &Report) -> Result<(), Box<dyn std::error::Error>> {
        let mut out = io::stdout().lock();
        writeln!(out, "{}", serde_json::to_string(report)?)?;
        Ok(())
    }
}

pub(crate) struct JsonPrettyReporter;

impl Reporter for JsonPrettyReporter {
    fn report(&self, report: &Report) -> Result<(), Box<dyn std::error::Error>> {
        let mut out = io::stdout().lock();
        writeln!(out, "{}", serde_json::to_string_pretty(report)?)?;
        Ok(())
    }
}
