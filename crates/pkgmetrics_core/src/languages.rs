//! Per-language capability table.
//!
//! Adding a language means adding a [`Language`] variant, its grammar, and one
//! [`LanguageSpec`] entry with the query that captures `@package` and
//! `@import`. Nothing else in the pipeline branches on the language.

use serde::Serialize;
use std::{fmt, str::FromStr};

/// Capture holding the declared package name.
pub const PACKAGE_CAPTURE: &str = "package";
/// Capture holding one import specifier.
pub const IMPORT_CAPTURE: &str = "import";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Go,
    Rust,
    Python,
    JavaScript,
    TypeScript,
    Tsx,
}

impl Language {
    pub const ALL: [Language; 6] = [
        Language::Go,
        Language::Rust,
        Language::Python,
        Language::JavaScript,
        Language::TypeScript,
        Language::Tsx,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Language::Go => "Go",
            Language::Rust => "Rust",
            Language::Python => "Python",
            Language::JavaScript => "JavaScript",
            Language::TypeScript => "TypeScript",
            Language::Tsx => "TSX",
        }
    }

    pub fn grammar(&self) -> tree_sitter::Language {
        match self {
            Language::Go => tree_sitter_go::LANGUAGE.into(),
            Language::Rust => tree_sitter_rust::LANGUAGE.into(),
            Language::Python => tree_sitter_python::LANGUAGE.into(),
            Language::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Language::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Language::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }

    pub fn spec(&self) -> &'static LanguageSpec {
        match self {
            Language::Go => &GO,
            Language::Rust => &RUST,
            Language::Python => &PYTHON,
            Language::JavaScript => &JAVASCRIPT,
            Language::TypeScript => &TYPESCRIPT,
            Language::Tsx => &TSX,
        }
    }

    pub fn from_extension(ext: &str) -> Option<Language> {
        Language::ALL.into_iter().find(|lang| lang.spec().extensions.contains(&ext))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "go" | "golang" => Ok(Language::Go),
            "rust" | "rs" => Ok(Language::Rust),
            "python" | "py" => Ok(Language::Python),
            "javascript" | "js" | "jsx" => Ok(Language::JavaScript),
            "typescript" | "ts" => Ok(Language::TypeScript),
            "tsx" => Ok(Language::Tsx),
            other => Err(format!("language not supported: {other}")),
        }
    }
}

/// File that declares a module boundary for a language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorKind {
    GoMod,
    CargoManifest,
    PyProject,
    PackageJson,
}

impl DescriptorKind {
    pub const ALL: [DescriptorKind; 4] = [
        DescriptorKind::GoMod,
        DescriptorKind::CargoManifest,
        DescriptorKind::PyProject,
        DescriptorKind::PackageJson,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            DescriptorKind::GoMod => "go.mod",
            DescriptorKind::CargoManifest => "Cargo.toml",
            DescriptorKind::PyProject => "pyproject.toml",
            DescriptorKind::PackageJson => "package.json",
        }
    }

    pub fn from_file_name(name: &str) -> Option<DescriptorKind> {
        DescriptorKind::ALL.into_iter().find(|kind| kind.file_name() == name)
    }
}

/// Where the package name `N` of a file comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageNaming {
    /// Captured from a package declaration; a file without one is skipped.
    Declared,
    /// The leaf directory name, which makes the package path the prefix itself.
    Directory,
}

#[derive(Debug)]
pub struct LanguageSpec {
    pub language: Language,
    pub extensions: &'static [&'static str],
    pub descriptor: DescriptorKind,
    pub naming: PackageNaming,
    pub query: &'static str,
}

static GO: LanguageSpec = LanguageSpec {
    language: Language::Go,
    extensions: &["go"],
    descriptor: DescriptorKind::GoMod,
    naming: PackageNaming::Declared,
    query: GO_QUERY,
};

static RUST: LanguageSpec = LanguageSpec {
    language: Language::Rust,
    extensions: &["rs"],
    descriptor: DescriptorKind::CargoManifest,
    naming: PackageNaming::Directory,
    query: RUST_QUERY,
};

static PYTHON: LanguageSpec = LanguageSpec {
    language: Language::Python,
    extensions: &["py", "pyi"],
    descriptor: DescriptorKind::PyProject,
    naming: PackageNaming::Directory,
    query: PYTHON_QUERY,
};

static JAVASCRIPT: LanguageSpec = LanguageSpec {
    language: Language::JavaScript,
    extensions: &["js", "jsx", "mjs", "cjs"],
    descriptor: DescriptorKind::PackageJson,
    naming: PackageNaming::Directory,
    query: JS_TS_QUERY,
};

static TYPESCRIPT: LanguageSpec = LanguageSpec {
    language: Language::TypeScript,
    extensions: &["ts", "mts", "cts"],
    descriptor: DescriptorKind::PackageJson,
    naming: PackageNaming::Directory,
    query: JS_TS_QUERY,
};

static TSX: LanguageSpec = LanguageSpec {
    language: Language::Tsx,
    extensions: &["tsx"],
    descriptor: DescriptorKind::PackageJson,
    naming: PackageNaming::Directory,
    query: JS_TS_QUERY,
};

const GO_QUERY: &str = r#"
(package_clause (package_identifier) @package)

(import_spec path: (_) @import)
"#;

const RUST_QUERY: &str = r#"
(use_declaration argument: (_) @import)

(extern_crate_declaration name: (identifier) @import)
"#;

const PYTHON_QUERY: &str = r#"
(import_statement name: (dotted_name) @import)

(import_statement name: (aliased_import name: (dotted_name) @import))

(import_from_statement module_name: (_) @import)
"#;

const JS_TS_QUERY: &str = r#"
(import_statement source: (string) @import)

(export_statement source: (string) @import)

(call_expression
  function: (identifier) @_callee
  arguments: (arguments . (string) @import)
  (#eq? @_callee "require"))

(call_expression
  function: (import)
  arguments: (arguments . (string) @import))
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_table_matches_language() {
        for lang in Language::ALL {
            assert_eq!(lang.spec().language, lang);
            assert!(!lang.spec().extensions.is_empty());
        }
    }

    #[test]
    fn test_extensions_are_unique() {
        let mut seen = Vec::new();
        for lang in Language::ALL {
            for ext in lang.spec().extensions {
                assert!(!seen.contains(ext), "extension '{}' registered twice", ext);
                seen.push(*ext);
            }
        }
    }

    #[test]
    fn test_from_extension() {
        assert_eq!(Language::from_extension("go"), Some(Language::Go));
        assert_eq!(Language::from_extension("jsx"), Some(Language::JavaScript));
        assert_eq!(Language::from_extension("tsx"), Some(Language::Tsx));
        assert_eq!(Language::from_extension("pyi"), Some(Language::Python));
        assert_eq!(Language::from_extension("java"), None);
    }

    #[test]
    fn test_from_str_accepts_detected_names() {
        for lang in Language::ALL {
            assert_eq!(lang.name().parse::<Language>(), Ok(lang));
        }
        assert_eq!("golang".parse::<Language>(), Ok(Language::Go));
        assert!("Java".parse::<Language>().is_err());
    }

    #[test]
    fn test_queries_compile_against_grammars() {
        for lang in Language::ALL {
            let query = match tree_sitter::Query::new(&lang.grammar(), lang.spec().query) {
                Ok(query) => query,
                Err(e) => panic!("{} query failed: {}", lang, e),
            };
            assert!(query.capture_names().contains(&IMPORT_CAPTURE));
            if lang.spec().naming == PackageNaming::Declared {
                assert!(query.capture_names().contains(&PACKAGE_CAPTURE));
            }
        }
    }

    #[test]
    fn test_descriptor_file_names() {
        assert_eq!(DescriptorKind::from_file_name("go.mod"), Some(DescriptorKind::GoMod));
        assert_eq!(
            DescriptorKind::from_file_name("Cargo.toml"),
            Some(DescriptorKind::CargoManifest)
        );
        assert_eq!(DescriptorKind::from_file_name("go.sum"), None);
    }
}
