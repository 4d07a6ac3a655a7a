use std::io::{self, Write};

use colored::Colorize;
use log::debug;
use serde::Serialize;

use crate::types::{CouplingStats, Metrics, Violation};

#[derive(Serialize)]
struct MetricsRecord<'a> {
    package: &'a str,
    inward: &'a CouplingStats,
    outward: &'a CouplingStats,
    inward_coupling: usize,
    outward_coupling: usize,
    instability: f64,
}

impl<'a> From<&'a Metrics> for MetricsRecord<'a> {
    fn from(m: &'a Metrics) -> Self {
        Self {
            package: m.package.as_str(),
            inward: &m.inward,
            outward: &m.outward,
            inward_coupling: m.inward_coupling(),
            outward_coupling: m.outward_coupling(),
            instability: m.instability(),
        }
    }
}

pub fn print_metrics_table<W: Write>(writer: &mut W, metrics: &[Metrics]) -> io::Result<()> {
    debug!("Printing metrics table for {} packages", metrics.len());

    if metrics.is_empty() {
        writeln!(writer, "{} No packages found", "⚠".yellow().bold())?;
        writer.flush()?;
        return Ok(());
    }

    let width = metrics.iter().map(|m| m.package.as_str().len()).max().unwrap_or(0).max(7);

    writeln!(
        writer,
        "{}",
        format!("{:<width$}  {:>5}  {:>5}  {:>6}", "Package", "Ca", "Ce", "I").bold()
    )?;
    writeln!(writer, "{}", "─".repeat(width + 22).dimmed())?;

    for m in metrics {
        let instability = format!("{:>6.3}", m.instability());
        let instability = if m.instability() >= 0.8 {
            instability.red()
        } else if m.instability() <= 0.2 {
            instability.green()
        } else {
            instability.yellow()
        };
        writeln!(
            writer,
            "{:<width$}  {:>5}  {:>5}  {}",
            m.package.as_str(),
            m.inward_coupling(),
            m.outward_coupling(),
            instability
        )?;
    }

    writeln!(writer)?;
    print_summary(writer, metrics)?;

    writer.flush()?;
    Ok(())
}

fn print_summary<W: Write>(writer: &mut W, metrics: &[Metrics]) -> io::Result<()> {
    let mean = metrics.iter().map(|m| m.instability()).sum::<f64>() / metrics.len() as f64;
    let most_unstable = metrics.iter().max_by(|a, b| a.instability().total_cmp(&b.instability()));

    writeln!(writer, "{}", "─".repeat(60).dimmed())?;
    writeln!(writer, "{}", "Summary".bold())?;
    writeln!(writer, "  Packages: {}", metrics.len().to_string().cyan())?;
    writeln!(writer, "  Mean instability: {}", format!("{:.3}", mean).cyan())?;
    if let Some(m) = most_unstable {
        writeln!(
            writer,
            "  Most unstable: {} ({})",
            m.package.as_str().blue(),
            format!("{:.3}", m.instability()).red()
        )?;
    }

    Ok(())
}

pub fn print_violations<W: Write>(writer: &mut W, violations: &[Violation]) -> io::Result<()> {
    if violations.is_empty() {
        return Ok(());
    }

    writeln!(
        writer,
        "\n{} {} packages above max instability {:.3}",
        "⚠".yellow().bold(),
        violations.len().to_string().yellow().bold(),
        violations[0].max_instability
    )?;
    for (idx, v) in violations.iter().enumerate() {
        let is_last = idx == violations.len() - 1;
        let prefix = if is_last { "└──" } else { "├──" };
        writeln!(
            writer,
            "{}  {} ({})",
            prefix.dimmed(),
            v.package.as_str(),
            format!("{:.3}", v.instability).red()
        )?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes one JSON record per package with its stats and the three scalars.
pub fn print_metrics_json<W: Write>(writer: &mut W, metrics: &[Metrics]) -> io::Result<()> {
    let records: Vec<MetricsRecord> = metrics.iter().map(MetricsRecord::from).collect();
    serde_json::to_writer_pretty(&mut *writer, &records)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
