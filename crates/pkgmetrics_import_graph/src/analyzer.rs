use log::{debug, info, trace, warn};
use rayon::prelude::*;
use serde::Serialize;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use pkgmetrics_core::{
    AnalyzeError, CancellationToken, DETECT_PREFIX_BYTES, DescriptorKind, Diagnostic, Language,
    ListOptions, ParserRegistry, detect, list_files, paths, read_head, skip_dirs, skip_hidden,
};

use crate::{
    extractor::extract_file,
    graph::{GraphAssembler, ImportGraph},
    modules::{ModuleMap, resolve_modules},
};

/// Which files a run looks at.
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    pub languages: Vec<Language>,
    /// Directory names skipped wherever they appear, on top of hidden entries.
    pub exclude: Vec<String>,
    pub respect_gitignore: bool,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self { languages: Language::ALL.to_vec(), exclude: Vec::new(), respect_gitignore: true }
    }
}

/// Outcome of one run: the graph plus every file that was left out of it.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub graph: ImportGraph,
    pub diagnostics: Vec<Diagnostic>,
    #[serde(skip)]
    pub files_analyzed: usize,
}

enum Classified {
    Source(PathBuf, Language),
    Skipped(Diagnostic),
    Ignored,
}

pub struct Analyzer<'a> {
    registry: &'a ParserRegistry,
    options: AnalyzeOptions,
    cancel: CancellationToken,
}

impl<'a> Analyzer<'a> {
    pub fn new(registry: &'a ParserRegistry, options: AnalyzeOptions) -> Self {
        Self { registry, options, cancel: CancellationToken::new() }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Builds the import graph for everything under `root`.
    ///
    /// Module descriptors are resolved before any source file is parsed.
    /// Per-file failures end up in [`Analysis::diagnostics`]; only discovery
    /// failure and cancellation abort the run.
    pub fn run(&self, root: &Path) -> Result<Analysis, AnalyzeError> {
        info!("Starting import graph analysis");
        info!("Using root directory: {}", root.display());

        let list_opts = ListOptions::new()
            .respect_gitignore(self.options.respect_gitignore)
            .filter(skip_hidden())
            .filter(skip_dirs(self.options.exclude.clone()));
        let files = list_files(root, &list_opts)?;
        info!("Found {} files", files.len());
        self.cancel.check()?;

        let (descriptors, sources): (Vec<PathBuf>, Vec<PathBuf>) =
            files.into_iter().partition(|path| descriptor_kind(path).is_some());

        let mut diagnostics = Vec::new();
        let module_maps = self.resolve_module_maps(root, &descriptors, &mut diagnostics);
        self.cancel.check()?;

        debug!("Detecting languages for {} files", sources.len());
        let classified: Vec<Classified> =
            sources.par_iter().map(|rel| self.classify(root, rel)).collect();

        let mut work = Vec::new();
        for item in classified {
            match item {
                Classified::Source(rel, language) => work.push((rel, language)),
                Classified::Skipped(diag) => diagnostics.push(diag),
                Classified::Ignored => {}
            }
        }
        info!("Extracting packages from {} source files in parallel", work.len());

        let empty = ModuleMap::new();
        let assembler = GraphAssembler::new();
        let failures: Vec<Option<Diagnostic>> = work
            .par_iter()
            .map(|(rel, language)| -> Result<Option<Diagnostic>, AnalyzeError> {
                self.cancel.check()?;
                let modules = module_maps.get(&language.spec().descriptor).unwrap_or(&empty);
                match extract_file(root, rel, *language, modules, self.registry, &self.cancel) {
                    Ok(file) => {
                        assembler.merge(file);
                        Ok(None)
                    }
                    Err(e) if e.is_fatal() => Err(e),
                    Err(e) => {
                        let path = paths::to_slash(rel);
                        warn!("Skipping {} ({}): {}", path, language, e);
                        Ok(Some(Diagnostic::new(path, Some(language.to_string()), &e)))
                    }
                }
            })
            .collect::<Result<_, AnalyzeError>>()?;

        diagnostics.extend(failures.into_iter().flatten());
        diagnostics.sort_by(|a, b| a.path.cmp(&b.path));

        let graph = assembler.finish();
        info!(
            "Import graph analysis complete. {} packages, {} files skipped",
            graph.len(),
            diagnostics.len()
        );

        Ok(Analysis { graph, diagnostics, files_analyzed: work.len() })
    }

    fn resolve_module_maps(
        &self,
        root: &Path,
        descriptors: &[PathBuf],
        diagnostics: &mut Vec<Diagnostic>,
    ) -> HashMap<DescriptorKind, ModuleMap> {
        let mut maps = HashMap::new();
        for language in &self.options.languages {
            let kind = language.spec().descriptor;
            if maps.contains_key(&kind) {
                continue;
            }
            let of_kind: Vec<PathBuf> = descriptors
                .iter()
                .filter(|path| descriptor_kind(path) == Some(kind))
                .cloned()
                .collect();
            let (modules, skipped) = resolve_modules(root, &of_kind, kind);
            diagnostics.extend(skipped);
            maps.insert(kind, modules);
        }
        maps
    }

    fn classify(&self, root: &Path, rel: &Path) -> Classified {
        let path = paths::to_slash(rel);

        let head = match read_head(&root.join(rel), DETECT_PREFIX_BYTES) {
            Ok(head) => head,
            Err(source) => {
                let e = AnalyzeError::ReadFailure { path: rel.to_path_buf(), source };
                warn!("Skipping {}: {}", path, e);
                return Classified::Skipped(Diagnostic::new(path, None, &e));
            }
        };

        let name = match detect(rel, &head) {
            Ok(name) => name,
            Err(e) => {
                trace!("Ignoring {}: {}", path, e);
                return Classified::Ignored;
            }
        };

        match Language::ALL.into_iter().find(|lang| lang.name() == name) {
            Some(language) if self.options.languages.contains(&language) => {
                Classified::Source(rel.to_path_buf(), language)
            }
            Some(language) => {
                trace!("Ignoring {}: {} not selected", path, language);
                Classified::Ignored
            }
            None => {
                let e = AnalyzeError::UnsupportedLanguage {
                    path: rel.to_path_buf(),
                    language: name.clone(),
                };
                debug!("Skipping {}: {}", path, e);
                Classified::Skipped(Diagnostic::new(path, Some(name), &e))
            }
        }
    }
}

fn descriptor_kind(path: &Path) -> Option<DescriptorKind> {
    path.file_name().and_then(|n| n.to_str()).and_then(DescriptorKind::from_file_name)
}

/// One-shot analysis of `root` with default options.
pub fn analyze(root: &Path) -> Result<ImportGraph, AnalyzeError> {
    let registry = ParserRegistry::new();
    Analyzer::new(&registry, AnalyzeOptions::default()).run(root).map(|analysis| analysis.graph)
}
