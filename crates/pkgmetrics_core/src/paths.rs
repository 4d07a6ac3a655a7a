//! Slash-separated relative paths.
//!
//! Package paths and module directories are compared as strings, so every
//! relative path is rendered with `/` separators and `.` for the root,
//! independent of the host platform.

use path_clean::clean;
use std::path::{Component, Path};

/// Renders a relative path with `/` separators; the empty path becomes `.`.
pub fn to_slash(path: &Path) -> String {
    let parts: Vec<String> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(p) => Some(p.to_string_lossy().to_string()),
            Component::ParentDir => Some("..".to_string()),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => None,
        })
        .collect();

    if parts.is_empty() { ".".to_string() } else { parts.join("/") }
}

/// Joins `rel` onto `base` and cleans the result, so `join(".", "cmd")` is
/// `cmd` and `join("a/b", ".")` is `a/b`.
pub fn join(base: &str, rel: &str) -> String {
    to_slash(&clean(Path::new(base).join(rel)))
}

/// The containing directory, `.` at the top.
pub fn parent(path: &str) -> String {
    Path::new(path).parent().map(to_slash).unwrap_or_else(|| ".".to_string())
}

/// The last `/` segment.
pub fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
