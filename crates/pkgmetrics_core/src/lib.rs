//! Core capabilities shared by the pkgmetrics tools.
//!
//! This crate provides the pieces every analysis builds on:
//! - Package and import identities
//! - The analysis error taxonomy and per-file diagnostics
//! - File discovery with skip predicates (hidden entries, extensions, names)
//! - Language detection from a bounded content prefix
//! - The per-language capability table (grammar, query, descriptor kind)
//! - A registry of lazily created tree-sitter handles and run cancellation

mod cancel;
mod detect;
mod error;
mod files;
mod languages;
pub mod paths;
mod syntax;
mod types;

// Re-export public API
pub use cancel::CancellationToken;
pub use detect::{DETECT_PREFIX_BYTES, detect, read_head};
pub use error::{AnalyzeError, Diagnostic, SkipKind};
pub use files::{
    FileFilter, ListOptions, list_files, only_basename, only_extensions, skip_dirs, skip_hidden,
};
pub use languages::{
    DescriptorKind, IMPORT_CAPTURE, Language, LanguageSpec, PACKAGE_CAPTURE, PackageNaming,
};
pub use syntax::{CaptureSet, ParserRegistry, SyntaxHandle};
pub use types::{Import, Package};
