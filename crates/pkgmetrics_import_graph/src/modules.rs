use log::{debug, trace, warn};
use regex::Regex;
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use pkgmetrics_core::{AnalyzeError, DescriptorKind, Diagnostic, paths};

static GO_MODULE_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*module[ \t]+(?:"([^"]+)"|([^\s/]\S*))"#)
        .unwrap_or_else(|e| panic!("invalid go.mod pattern: {e}"))
});

/// A module boundary: every file at or below `directory` belongs to
/// `identifier` unless a deeper module claims it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub directory: String,
    pub identifier: String,
}

/// Module directory (slash path relative to the root, `.` for the root
/// itself) to module identifier. Built once per run, read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleMap {
    by_dir: BTreeMap<String, String>,
}

impl ModuleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, module: Module) {
        if let Some(previous) = self.by_dir.insert(module.directory.clone(), module.identifier) {
            debug!("Replaced module '{}' at {}", previous, module.directory);
        }
    }

    pub fn get(&self, directory: &str) -> Option<&str> {
        self.by_dir.get(directory).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_dir.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_dir.is_empty()
    }
}

impl<D: Into<String>, I: Into<String>> FromIterator<(D, I)> for ModuleMap {
    fn from_iter<T: IntoIterator<Item = (D, I)>>(iter: T) -> Self {
        let mut map = ModuleMap::new();
        for (directory, identifier) in iter {
            map.insert(Module { directory: directory.into(), identifier: identifier.into() });
        }
        map
    }
}

/// Builds the module map from descriptor files of one kind. A descriptor that
/// cannot be read, parsed, or that does not declare exactly one identifier is
/// skipped and reported; the others still contribute.
pub fn resolve_modules(
    root: &Path,
    descriptors: &[PathBuf],
    kind: DescriptorKind,
) -> (ModuleMap, Vec<Diagnostic>) {
    debug!("Resolving {} {} files", descriptors.len(), kind.file_name());
    let mut modules = ModuleMap::new();
    let mut diagnostics = Vec::new();

    for rel in descriptors {
        let rel_slash = paths::to_slash(rel);
        match read_descriptor(root, rel, kind) {
            Ok(identifier) => {
                let directory = paths::parent(&rel_slash);
                trace!("Module '{}' rooted at {}", identifier, directory);
                modules.insert(Module { directory, identifier });
            }
            Err(e) => {
                warn!("Skipping module descriptor {}: {}", rel_slash, e);
                diagnostics.push(Diagnostic::new(rel_slash, None, &e));
            }
        }
    }

    debug!("Identified {} {} modules", modules.len(), kind.file_name());
    (modules, diagnostics)
}

fn read_descriptor(root: &Path, rel: &Path, kind: DescriptorKind) -> Result<String, AnalyzeError> {
    let content = fs::read_to_string(root.join(rel))
        .map_err(|source| AnalyzeError::ReadFailure { path: rel.to_path_buf(), source })?;
    module_identifier(kind, rel, &content)
}

/// Extracts the single module identifier declared by a descriptor.
pub fn module_identifier(
    kind: DescriptorKind,
    path: &Path,
    content: &str,
) -> Result<String, AnalyzeError> {
    let parse_err =
        |message: String| AnalyzeError::DescriptorParse { path: path.to_path_buf(), message };

    let mut found = match kind {
        DescriptorKind::GoMod => go_mod_identifiers(content),
        DescriptorKind::CargoManifest => {
            let table: toml::Table = toml::from_str(content).map_err(|e| parse_err(e.to_string()))?;
            toml_names(&table, &[&["package", "name"]])
        }
        DescriptorKind::PyProject => {
            let table: toml::Table = toml::from_str(content).map_err(|e| parse_err(e.to_string()))?;
            toml_names(&table, &[&["project", "name"], &["tool", "poetry", "name"]])
        }
        DescriptorKind::PackageJson => {
            let json: serde_json::Value =
                serde_json::from_str(content).map_err(|e| parse_err(e.to_string()))?;
            json.get("name").and_then(|n| n.as_str()).map(str::to_string).into_iter().collect()
        }
    };

    match found.len() {
        1 => Ok(found.remove(0)),
        matches => Err(AnalyzeError::ModuleResolutionAmbiguous { path: path.to_path_buf(), matches }),
    }
}

fn go_mod_identifiers(content: &str) -> Vec<String> {
    GO_MODULE_DIRECTIVE
        .captures_iter(content)
        .filter_map(|c| c.get(1).or_else(|| c.get(2)))
        .map(|m| m.as_str().to_string())
        .collect()
}

fn toml_names(table: &toml::Table, keys: &[&[&str]]) -> Vec<String> {
    let mut names: Vec<String> = keys
        .iter()
        .filter_map(|path| {
            let (last, parents) = path.split_last()?;
            let mut current = table;
            for key in parents {
                current = current.get(*key)?.as_table()?;
            }
            current.get(*last)?.as_str().map(str::to_string)
        })
        .collect();
    // `[project]` and `[tool.poetry]` may both name the same package.
    names.sort();
    names.dedup();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
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
    fn test_go_mod_identifier() {
        let content = "// comment mentioning module other\nmodule example.com/project\n\ngo 1.22\n\nrequire github.com/x/y v1.0.0\n";
        let id = module_identifier(DescriptorKind::GoMod, Path::new("go.mod"), content).unwrap();
        assert_eq!(id, "example.com/project");
    }

    #[test]
    fn test_go_mod_quoted_identifier_with_comment() {
        let content = "module \"example.com/quoted\" // legacy\n";
        let id = module_identifier(DescriptorKind::GoMod, Path::new("go.mod"), content).unwrap();
        assert_eq!(id, "example.com/quoted");
    }

    #[test]
    fn test_go_mod_without_module_is_ambiguous() {
        let err = module_identifier(DescriptorKind::GoMod, Path::new("go.mod"), "go 1.22\n")
            .unwrap_err();
        assert!(matches!(err, AnalyzeError::ModuleResolutionAmbiguous { matches: 0, .. }));
    }

    #[test]
    fn test_go_mod_with_two_modules_is_ambiguous() {
        let content = "module example.com/a\nmodule example.com/b\n";
        let err =
            module_identifier(DescriptorKind::GoMod, Path::new("go.mod"), content).unwrap_err();
        assert!(matches!(err, AnalyzeError::ModuleResolutionAmbiguous { matches: 2, .. }));
    }

    #[test]
    fn test_go_mod_with_repeated_module_is_ambiguous() {
        let content = "module example.com/a\n\nmodule example.com/a\n";
        let err =
            module_identifier(DescriptorKind::GoMod, Path::new("go.mod"), content).unwrap_err();
        assert!(matches!(err, AnalyzeError::ModuleResolutionAmbiguous { matches: 2, .. }));
    }

    #[test]
    fn test_cargo_manifest_identifier() {
        let content = "[package]\nname = \"my_crate\"\nversion = \"0.1.0\"\n";
        let id = module_identifier(DescriptorKind::CargoManifest, Path::new("Cargo.toml"), content)
            .unwrap();
        assert_eq!(id, "my_crate");
    }

    #[test]
    fn test_cargo_workspace_manifest_is_skipped() {
        let content = "[workspace]\nmembers = [\"crates/*\"]\n";
        let err = module_identifier(DescriptorKind::CargoManifest, Path::new("Cargo.toml"), content)
            .unwrap_err();
        assert!(matches!(err, AnalyzeError::ModuleResolutionAmbiguous { matches: 0, .. }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let err =
            module_identifier(DescriptorKind::PyProject, Path::new("pyproject.toml"), "[project")
                .unwrap_err();
        assert!(matches!(err, AnalyzeError::DescriptorParse { .. }));
    }

    #[test]
    fn test_pyproject_identifier() {
        let content = "[project]\nname = \"tool\"\n\n[tool.poetry]\nname = \"tool\"\n";
        let id =
            module_identifier(DescriptorKind::PyProject, Path::new("pyproject.toml"), content)
                .unwrap();
        assert_eq!(id, "tool");

        let poetry = "[tool.poetry]\nname = \"legacy\"\n";
        let id = module_identifier(DescriptorKind::PyProject, Path::new("pyproject.toml"), poetry)
            .unwrap();
        assert_eq!(id, "legacy");
    }

    #[test]
    fn test_package_json_identifier() {
        let content = r#"{ "name": "@scope/web", "version": "1.0.0" }"#;
        let id = module_identifier(DescriptorKind::PackageJson, Path::new("package.json"), content)
            .unwrap();
        assert_eq!(id, "@scope/web");
    }

    #[test]
    fn test_resolve_modules_keys_by_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "go.mod", "module example.com/root\n");
        create_test_file(root, "tools/go.mod", "module example.com/tools\n");
        create_test_file(root, "broken/go.mod", "go 1.22\n");

        let descriptors = vec![
            PathBuf::from("go.mod"),
            PathBuf::from("tools/go.mod"),
            PathBuf::from("broken/go.mod"),
        ];
        let (modules, diagnostics) = resolve_modules(root, &descriptors, DescriptorKind::GoMod);

        assert_eq!(modules.len(), 2);
        assert_eq!(modules.get("."), Some("example.com/root"));
        assert_eq!(modules.get("tools"), Some("example.com/tools"));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].path, "broken/go.mod");
    }

    #[test]
    fn test_resolve_modules_reports_unreadable_descriptor() {
        let temp_dir = TempDir::new().unwrap();
        let descriptors = vec![PathBuf::from("missing/go.mod")];
        let (modules, diagnostics) =
            resolve_modules(temp_dir.path(), &descriptors, DescriptorKind::GoMod);
        assert!(modules.is_empty());
        assert_eq!(diagnostics.len(), 1);
    }
}
