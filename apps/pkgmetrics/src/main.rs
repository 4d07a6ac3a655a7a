use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use log::{debug, info};
use pkgmetrics_core::ParserRegistry;
use pkgmetrics_import_graph::{Analyzer, OutputFormat};
use std::io::{BufWriter, Write};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "pkgmetrics")]
#[command(about = "Package dependency graphs and coupling metrics for source trees", long_about = None)]
struct Cli {
    /// Number of worker threads (defaults to one per CPU)
    #[arg(long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the package import graph
    Graph(pkgmetrics_import_graph::Config),
    /// Print coupling and instability per package
    Metrics(pkgmetrics_coupling::MetricsConfig),
}

fn print_finished<W: Write>(writer: &mut W, start: Instant, files: usize) -> Result<()> {
    writeln!(
        writer,
        "\n{} Finished in {}ms on {} files (using {} threads).",
        "●".bright_blue(),
        start.elapsed().as_millis().to_string().cyan(),
        files.to_string().cyan(),
        rayon::current_num_threads().to_string().cyan()
    )?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    // stdio is blocked by LineWriter, use a BufWriter to reduce syscalls.
    // See https://github.com/rust-lang/rust/issues/60673
    let mut stdout = BufWriter::new(std::io::stdout());

    let cli = Cli::parse();
    debug!("Parsed CLI arguments: {:?}", cli.command);

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new().num_threads(threads).build_global()?;
    }

    let start = Instant::now();

    match cli.command {
        Commands::Graph(mut cfg) => {
            info!("Building import graph (using {} threads)", rayon::current_num_threads());
            cfg.initialize()?;

            let registry = ParserRegistry::new();
            let analysis = Analyzer::new(&registry, cfg.analyze_options())
                .with_cancellation(cfg.cancellation())
                .run(&cfg.root)?;

            match cfg.format {
                OutputFormat::Json => {
                    pkgmetrics_import_graph::print_graph_json(&mut stdout, &analysis)?;
                }
                OutputFormat::Text => {
                    pkgmetrics_import_graph::print_graph(&mut stdout, &analysis, &cfg.root)?;
                    print_finished(&mut stdout, start, analysis.files_analyzed)?;
                }
            }
            stdout.flush()?;

            Ok(())
        }
        Commands::Metrics(cfg) => {
            info!(
                "Running coupling check with max instability: {:?} (using {} threads)",
                cfg.max_instability,
                rayon::current_num_threads()
            );
            let format = cfg.graph.format;

            let result = pkgmetrics_coupling::run_coupling_check(cfg.clone())?;
            debug!("Found {} violations", result.violations.len());

            match format {
                OutputFormat::Json => {
                    pkgmetrics_coupling::print_metrics_json(&mut stdout, &result.metrics)?;
                }
                OutputFormat::Text => {
                    pkgmetrics_coupling::print_metrics_table(&mut stdout, &result.metrics)?;
                    pkgmetrics_coupling::print_violations(&mut stdout, &result.violations)?;
                    if !result.diagnostics.is_empty() {
                        let root = cfg.graph.root.canonicalize().unwrap_or(cfg.graph.root);
                        writeln!(stdout)?;
                        pkgmetrics_import_graph::print_diagnostics(
                            &mut stdout,
                            &result.diagnostics,
                            &root,
                        )?;
                    }
                    print_finished(&mut stdout, start, result.files_analyzed)?;
                }
            }
            stdout.flush()?;

            if !result.violations.is_empty() {
                // Non-zero exit to fail CI
                std::process::exit(1);
            }

            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_metrics_subcommand_parses() {
        let cli = Cli::parse_from(["pkgmetrics", "metrics", "--root", "src", "--max-instability", "0.5"]);
        match cli.command {
            Commands::Metrics(cfg) => {
                assert_eq!(cfg.graph.root, std::path::PathBuf::from("src"));
                assert_eq!(cfg.max_instability, Some(0.5));
            }
            Commands::Graph(_) => panic!("expected metrics subcommand"),
        }
    }
}
