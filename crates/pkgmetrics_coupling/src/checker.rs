use anyhow::Result;
use log::{debug, info, warn};

use pkgmetrics_core::ParserRegistry;
use pkgmetrics_import_graph::Analyzer;

use crate::{
    config::MetricsConfig,
    metrics::compute_metrics,
    types::{CheckResult, Metrics, Violation},
};

pub fn run_coupling_check(mut cfg: MetricsConfig) -> Result<CheckResult> {
    info!("Starting coupling check");

    cfg.graph.initialize()?;

    let registry = ParserRegistry::new();
    let analysis = Analyzer::new(&registry, cfg.graph.analyze_options())
        .with_cancellation(cfg.graph.cancellation())
        .run(&cfg.graph.root)?;
    debug!("Loaded {} parsers", registry.loaded());

    let metrics = compute_metrics(&analysis.graph);
    let violations = match cfg.max_instability {
        Some(max) => check_instability(&metrics, max),
        None => Vec::new(),
    };

    info!("Coupling check complete. Found {} violations", violations.len());

    Ok(CheckResult {
        metrics,
        violations,
        diagnostics: analysis.diagnostics,
        files_analyzed: analysis.files_analyzed,
    })
}

/// Packages whose instability is strictly above `max_instability`.
pub fn check_instability(metrics: &[Metrics], max_instability: f64) -> Vec<Violation> {
    metrics
        .iter()
        .filter(|m| m.instability() > max_instability)
        .map(|m| {
            warn!(
                "Package {} has instability {:.3} (max {:.3})",
                m.package,
                m.instability(),
                max_instability
            );
            Violation {
                package: m.package.clone(),
                instability: m.instability(),
                max_instability,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::{
        fs,
        path::{Path, PathBuf},
    };
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, path: &str, content: &str) -> PathBuf {
        let file_path = dir.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    #[test]
    fn test_run_coupling_check_end_to_end() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "go.mod", "module example.com/cowsay\n");
        create_test_file(
            root,
            "main.go",
            "package main\n\nimport (\n\t\"example.com/cowsay/moo\"\n\t\"example.com/cowsay/cmd\"\n)\n",
        );
        create_test_file(
            root,
            "cmd/cmd.go",
            "package cmd\n\nimport (\n\t\"fmt\"\n\t\"example.com/cowsay/moo\"\n)\n",
        );
        create_test_file(root, "moo/moo.go", "package moo\n\nimport \"fmt\"\n");

        let cfg = MetricsConfig::parse_from([
            "metrics",
            "--root",
            root.to_str().unwrap(),
            "--max-instability",
            "0.9",
        ]);
        let result = run_coupling_check(cfg).unwrap();

        assert_eq!(result.files_analyzed, 3);
        assert!(result.diagnostics.is_empty());

        let moo = result
            .metrics
            .iter()
            .find(|m| m.package.as_str() == "example.com/cowsay/moo")
            .unwrap();
        assert_eq!(moo.inward_coupling(), 2);
        assert_eq!(moo.outward_coupling(), 1);
        assert!((moo.instability() - 1.0 / 3.0).abs() < 1e-12);

        let packages: Vec<&str> = result.violations.iter().map(|v| v.package.as_str()).collect();
        assert_eq!(packages, vec!["example.com/cowsay/main"]);
    }

    #[test]
    fn test_check_instability_is_strict() {
        let metrics = vec![Metrics {
            package: "p".into(),
            inward: [("a", 1)].into_iter().collect(),
            outward: [("b", 1)].into_iter().collect(),
        }];
        assert!(check_instability(&metrics, 0.5).is_empty());
        assert_eq!(check_instability(&metrics, 0.4).len(), 1);
    }
}
