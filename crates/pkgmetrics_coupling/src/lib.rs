//! Coupling metrics over a package import graph.
//!
//! For every package this crate derives inward coupling (Ca, who depends on
//! it), outward coupling (Ce, what it depends on) and instability
//! `Ce / (Ca + Ce)`, and can flag packages above an instability limit.
//!
//! # Examples
//!
//! ```no_run
//! use pkgmetrics_import_graph::analyze;
//! use pkgmetrics_coupling::{compute_metrics, print_metrics_table};
//! use std::io::{BufWriter, Write};
//!
//! # fn main() -> anyhow::Result<()> {
//! let graph = analyze(std::path::Path::new("/path/to/project"))?;
//! let metrics = compute_metrics(&graph);
//!
//! let mut stdout = BufWriter::new(std::io::stdout());
//! print_metrics_table(&mut stdout, &metrics)?;
//! stdout.flush()?;
//! # Ok(())
//! # }
//! ```

mod checker;
mod config;
mod metrics;
mod reporter;
mod types;

// Re-export public API
pub use checker::{check_instability, run_coupling_check};
pub use config::MetricsConfig;
pub use metrics::compute_metrics;
pub use reporter::{print_metrics_json, print_metrics_table, print_violations};
pub use types::{CheckResult, CouplingStats, Metrics, Violation};
