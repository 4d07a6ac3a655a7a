//! Package import graph extraction.
//!
//! This crate resolves module boundaries from descriptor files (`go.mod`,
//! `Cargo.toml`, `pyproject.toml`, `package.json`), extracts each source
//! file's package and imports, and merges them into one [`ImportGraph`].
//!
//! # Examples
//!
//! ```no_run
//! use pkgmetrics_core::ParserRegistry;
//! use pkgmetrics_import_graph::{AnalyzeOptions, Analyzer, print_graph};
//! use std::io::{BufWriter, Write};
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let root = Path::new("/path/to/project");
//! let registry = ParserRegistry::new();
//! let analysis = Analyzer::new(&registry, AnalyzeOptions::default()).run(root)?;
//!
//! let mut stdout = BufWriter::new(std::io::stdout());
//! print_graph(&mut stdout, &analysis, root)?;
//! stdout.flush()?;
//! # Ok(())
//! # }
//! ```

mod analyzer;
mod config;
mod extractor;
mod graph;
mod modules;
mod reporter;

// Re-export public API
pub use analyzer::{Analysis, AnalyzeOptions, Analyzer, analyze};
pub use config::{Config, OutputFormat};
pub use extractor::{FileImports, canonical_package, extract_file, package_path_prefix, unquote};
pub use graph::{GraphAssembler, ImportGraph};
pub use modules::{Module, ModuleMap, module_identifier, resolve_modules};
pub use reporter::{print_diagnostics, print_graph, print_graph_json, relativize_to_cwd};
