use ignore::WalkBuilder;
use log::{debug, trace};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::error::AnalyzeError;

/// Returns true when the entry should be skipped. Receives the path relative
/// to the walk root and whether the entry is a directory. A skipped directory
/// is not descended into.
pub type FileFilter = Arc<dyn Fn(&Path, bool) -> bool + Send + Sync>;

#[derive(Clone)]
pub struct ListOptions {
    pub respect_gitignore: bool,
    pub filters: Vec<FileFilter>,
}

impl ListOptions {
    pub fn new() -> Self {
        Self { respect_gitignore: true, filters: Vec::new() }
    }

    pub fn respect_gitignore(mut self, yes: bool) -> Self {
        self.respect_gitignore = yes;
        self
    }

    pub fn filter(mut self, filter: FileFilter) -> Self {
        self.filters.push(filter);
        self
    }
}

impl Default for ListOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Lists the files under `root`, as paths relative to it, in file-name order.
pub fn list_files(root: &Path, opts: &ListOptions) -> Result<Vec<PathBuf>, AnalyzeError> {
    debug!("Walking directory tree from root: {}", root.display());
    let filters: Arc<[FileFilter]> = opts.filters.clone().into();
    let walk_root = root.to_path_buf();

    let walker = WalkBuilder::new(root)
        .hidden(false)
        .ignore(opts.respect_gitignore)
        .git_ignore(opts.respect_gitignore)
        .parents(opts.respect_gitignore)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |dent| {
            let rel = dent.path().strip_prefix(&walk_root).unwrap_or(dent.path());
            let is_dir = dent.file_type().is_some_and(|ft| ft.is_dir());
            let skip = filters.iter().any(|f| f(rel, is_dir));
            if skip {
                trace!("Skipping {}: {}", if is_dir { "directory" } else { "file" }, rel.display());
            }
            !skip
        })
        .build();

    let mut files = Vec::new();
    for res in walker {
        let dent = res
            .map_err(|source| AnalyzeError::Discovery { root: root.to_path_buf(), source })?;
        if !dent.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let rel = dent.path().strip_prefix(root).unwrap_or(dent.path());
        files.push(rel.to_path_buf());
    }

    debug!("Collected {} files under {}", files.len(), root.display());
    Ok(files)
}

fn is_hidden(name: &str) -> bool {
    name.len() > 1 && name.starts_with('.')
}

/// Skips dot-files and dot-directories.
pub fn skip_hidden() -> FileFilter {
    Arc::new(|path: &Path, _: bool| {
        path.file_name().and_then(|n| n.to_str()).is_some_and(is_hidden)
    })
}

/// Skips directories with one of the given names, e.g. `node_modules`.
pub fn skip_dirs(names: Vec<String>) -> FileFilter {
    Arc::new(move |path: &Path, is_dir: bool| {
        is_dir
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| names.iter().any(|name| name == n))
    })
}

/// Keeps only files whose extension is listed. Directories pass through.
pub fn only_extensions(exts: &'static [&'static str]) -> FileFilter {
    Arc::new(move |path: &Path, is_dir: bool| {
        !is_dir && !path.extension().and_then(|e| e.to_str()).is_some_and(|e| exts.contains(&e))
    })
}

/// Keeps only files with the given base name. Directories pass through.
pub fn only_basename(name: &'static str) -> FileFilter {
    Arc::new(move |path: &Path, is_dir: bool| {
        !is_dir && path.file_name().and_then(|n| n.to_str()) != Some(name)
    })
}
