use anyhow::{Result, bail};
use clap::{Parser, ValueEnum};
use log::{debug, info};
use std::{path::PathBuf, time::Duration};

use pkgmetrics_core::{CancellationToken, Language};

use crate::analyzer::AnalyzeOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "graph")]
#[command(about = "Build the package import graph of a source tree")]
pub struct Config {
    /// Root directory of the source tree
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Languages to analyze, comma separated (defaults to all supported)
    #[arg(long, value_delimiter = ',')]
    pub languages: Vec<Language>,

    /// Directory name to skip, may be repeated (e.g. node_modules)
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Also analyze files matched by .gitignore
    #[arg(long)]
    pub no_gitignore: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Abort the run after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

impl Config {
    /// Resolve the root directory; it must exist and be a directory.
    pub fn initialize(&mut self) -> Result<()> {
        debug!("Using provided root directory: {:?}", self.root);
        let root = self.root.canonicalize().unwrap_or_else(|_| self.root.clone());
        if !root.is_dir() {
            bail!("Root {} is not a directory", root.display());
        }
        info!("Using root directory: {}", root.display());
        self.root = root;
        Ok(())
    }

    pub fn analyze_options(&self) -> AnalyzeOptions {
        let languages =
            if self.languages.is_empty() { Language::ALL.to_vec() } else { self.languages.clone() };
        AnalyzeOptions {
            languages,
            exclude: self.exclude.clone(),
            respect_gitignore: !self.no_gitignore,
        }
    }

    pub fn cancellation(&self) -> CancellationToken {
        match self.timeout {
            Some(secs) => CancellationToken::with_timeout(Duration::from_secs(secs)),
            None => CancellationToken::new(),
        }
    }
}
