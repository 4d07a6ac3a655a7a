use log::{debug, trace};
use std::{collections::BTreeSet, fs, path::Path};

use pkgmetrics_core::{
    AnalyzeError, CancellationToken, IMPORT_CAPTURE, Import, Language, PACKAGE_CAPTURE, Package,
    PackageNaming, ParserRegistry, paths,
};

use crate::modules::ModuleMap;

/// What one source file contributes to the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileImports {
    pub path: String,
    pub language: Language,
    pub package: Package,
    pub imports: Vec<Import>,
}

/// Module-path prefix for a file: the deepest enclosing module identifier
/// joined with the file's directory relative to that module. Falls back to
/// the bare directory when no module encloses the file.
pub fn package_path_prefix(file: &str, modules: &ModuleMap) -> String {
    let dir = paths::parent(file);

    let mut current = dir.as_str();
    while current != "." {
        if let Some(id) = modules.get(current) {
            let rel = relative_to(&dir, current);
            return paths::join(id, rel);
        }
        current = match current.rfind('/') {
            Some(idx) => &current[..idx],
            None => ".",
        };
    }

    match modules.get(".") {
        Some(id) => paths::join(id, &dir),
        None => dir,
    }
}

fn relative_to<'a>(dir: &'a str, ancestor: &str) -> &'a str {
    if dir == ancestor {
        "."
    } else {
        dir.strip_prefix(ancestor).map(|r| r.trim_start_matches('/')).unwrap_or(dir)
    }
}

/// Canonical package path from the declared name `name` and prefix `prefix`.
/// A name equal to the leaf directory is not repeated.
pub fn canonical_package(name: &str, prefix: &str) -> Package {
    if name == paths::base_name(prefix) {
        Package::new(paths::join(&paths::parent(prefix), name))
    } else {
        Package::new(paths::join(prefix, name))
    }
}

/// Strips one pair of matching string delimiters.
pub fn unquote(text: &str) -> &str {
    let text = text.trim();
    for quote in ['"', '\'', '`'] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            return &text[1..text.len() - 1];
        }
    }
    text
}

/// Parses one file and returns its package and imports.
///
/// Every failure is reported as an error for this file alone except
/// `Canceled`, which the caller must treat as run-fatal.
pub fn extract_file(
    root: &Path,
    rel: &Path,
    language: Language,
    modules: &ModuleMap,
    registry: &ParserRegistry,
    cancel: &CancellationToken,
) -> Result<FileImports, AnalyzeError> {
    let rel_slash = paths::to_slash(rel);
    let source = fs::read(root.join(rel))
        .map_err(|source| AnalyzeError::ReadFailure { path: rel.to_path_buf(), source })?;

    let handle = registry.acquire(language)?;
    let capture_sets = {
        let mut syntax =
            handle.lock().map_err(|_| AnalyzeError::HandlePoisoned { language })?;
        let tree = syntax
            .parse(&source, cancel)?
            .ok_or_else(|| AnalyzeError::ParseFailure { path: rel.to_path_buf(), language })?;
        syntax.captures(&tree, &source)
    };

    let prefix = package_path_prefix(&rel_slash, modules);
    trace!("Prefix for {}: {}", rel_slash, prefix);

    let name = match language.spec().naming {
        PackageNaming::Declared => capture_sets
            .iter()
            .find_map(|set| set.get(PACKAGE_CAPTURE))
            .map(|n| n.trim().to_string())
            .ok_or_else(|| AnalyzeError::MissingPackage { path: rel.to_path_buf(), language })?,
        PackageNaming::Directory => paths::base_name(&prefix).to_string(),
    };
    let package = canonical_package(&name, &prefix);

    let mut seen = BTreeSet::new();
    let imports: Vec<Import> = capture_sets
        .iter()
        .filter_map(|set| set.get(IMPORT_CAPTURE))
        .map(|text| unquote(text))
        .filter(|text| !text.is_empty() && seen.insert(text.to_string()))
        .map(Import::from)
        .collect();

    debug!("{} ({}): package {}, {} imports", rel_slash, language, package, imports.len());
    Ok(FileImports { path: rel_slash, language, package, imports })
}
