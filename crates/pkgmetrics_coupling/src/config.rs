use clap::Parser;

use pkgmetrics_import_graph::Config as GraphConfig;

#[derive(Debug, Clone, Parser)]
#[command(name = "metrics")]
#[command(about = "Compute coupling and instability for every package of a source tree")]
pub struct MetricsConfig {
    #[command(flatten)]
    pub graph: GraphConfig,

    /// Fail when a package's instability exceeds this ratio (0.0 to 1.0)
    #[arg(long, value_parser = parse_ratio)]
    pub max_instability: Option<f64>,
}

fn parse_ratio(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("invalid ratio '{s}': {e}"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("ratio must be between 0 and 1, got {value}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pkgmetrics_import_graph::OutputFormat;

    #[test]
    fn test_command_definition_is_valid() {
        MetricsConfig::command().debug_assert();
    }

    #[test]
    fn test_flattens_graph_options() {
        let cfg = MetricsConfig::parse_from([
            "metrics",
            "--root",
            "src",
            "--format",
            "json",
            "--max-instability",
            "0.8",
        ]);
        assert_eq!(cfg.graph.root, std::path::PathBuf::from("src"));
        assert_eq!(cfg.graph.format, OutputFormat::Json);
        assert_eq!(cfg.max_instability, Some(0.8));
    }

    #[test]
    fn test_ratio_out_of_range_is_rejected() {
        assert!(MetricsConfig::try_parse_from(["metrics", "--max-instability", "1.5"]).is_err());
        assert!(MetricsConfig::try_parse_from(["metrics", "--max-instability", "high"]).is_err());
    }
}
