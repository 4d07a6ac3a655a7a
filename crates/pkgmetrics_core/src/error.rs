use serde::Serialize;
use std::{io, path::PathBuf};
use thiserror::Error;

use crate::languages::Language;

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("failed to walk {}: {source}", root.display())]
    Discovery {
        root: PathBuf,
        #[source]
        source: ignore::Error,
    },

    #[error("no language detected for {}", path.display())]
    NoLanguageDetected { path: PathBuf },

    #[error("language not supported: {language} ({})", path.display())]
    UnsupportedLanguage { path: PathBuf, language: String },

    #[error("failed to read {}: {source}", path.display())]
    ReadFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to load the {language} grammar: {source}")]
    LanguageSetup {
        language: Language,
        #[source]
        source: tree_sitter::LanguageError,
    },

    #[error("failed to parse {} as {language}", path.display())]
    ParseFailure { path: PathBuf, language: Language },

    #[error("invalid {language} query: {source}")]
    QueryFailure {
        language: Language,
        #[source]
        source: tree_sitter::QueryError,
    },

    #[error("no package declaration found in {} ({language})", path.display())]
    MissingPackage { path: PathBuf, language: Language },

    #[error("{} declares {matches} module identifiers, expected exactly one", path.display())]
    ModuleResolutionAmbiguous { path: PathBuf, matches: usize },

    #[error("failed to parse module descriptor {}: {message}", path.display())]
    DescriptorParse { path: PathBuf, message: String },

    #[error("{language} parser handle is poisoned")]
    HandlePoisoned { language: Language },

    #[error("analysis canceled")]
    Canceled,
}

impl AnalyzeError {
    /// Only discovery failures and cancellation abort a run; everything else
    /// is isolated to the file or descriptor that produced it.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AnalyzeError::Discovery { .. } | AnalyzeError::Canceled)
    }

    pub fn skip_kind(&self) -> SkipKind {
        match self {
            AnalyzeError::Discovery { .. } | AnalyzeError::Canceled => SkipKind::Fatal,
            AnalyzeError::NoLanguageDetected { .. } | AnalyzeError::UnsupportedLanguage { .. } => {
                SkipKind::UnsupportedLanguage
            }
            AnalyzeError::ReadFailure { .. } => SkipKind::ReadFailure,
            AnalyzeError::LanguageSetup { .. }
            | AnalyzeError::ParseFailure { .. }
            | AnalyzeError::DescriptorParse { .. }
            | AnalyzeError::HandlePoisoned { .. } => SkipKind::ParseFailure,
            AnalyzeError::QueryFailure { .. } => SkipKind::QueryFailure,
            AnalyzeError::MissingPackage { .. } => SkipKind::MissingPackage,
            AnalyzeError::ModuleResolutionAmbiguous { .. } => SkipKind::ModuleResolutionAmbiguous,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipKind {
    UnsupportedLanguage,
    ReadFailure,
    ParseFailure,
    QueryFailure,
    MissingPackage,
    ModuleResolutionAmbiguous,
    Fatal,
}

/// A file or descriptor that was left out of the graph, and why.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub path: String,
    pub language: Option<String>,
    pub kind: SkipKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(path: impl Into<String>, language: Option<String>, err: &AnalyzeError) -> Self {
        Self { path: path.into(), language, kind: err.skip_kind(), message: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_discovery_and_cancel_are_fatal() {
        assert!(AnalyzeError::Canceled.is_fatal());
        assert!(
            !AnalyzeError::MissingPackage { path: "a.go".into(), language: Language::Go }
                .is_fatal()
        );
        assert!(
            !AnalyzeError::ModuleResolutionAmbiguous { path: "go.mod".into(), matches: 2 }
                .is_fatal()
        );
    }

    #[test]
    fn test_diagnostic_carries_kind_and_message() {
        let err = AnalyzeError::UnsupportedLanguage {
            path: "src/Main.java".into(),
            language: "Java".to_string(),
        };
        let diag = Diagnostic::new("src/Main.java", Some("Java".to_string()), &err);
        assert_eq!(diag.kind, SkipKind::UnsupportedLanguage);
        assert!(diag.message.contains("Java"));
        assert!(diag.message.contains("src/Main.java"));
    }
}
