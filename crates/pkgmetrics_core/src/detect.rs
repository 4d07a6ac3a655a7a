use log::trace;
use std::{
    fs::File,
    io::{self, Read},
    path::Path,
};

use crate::error::AnalyzeError;

/// Detection only ever looks at this many leading bytes of a file.
pub const DETECT_PREFIX_BYTES: u64 = 8192;

/// Languages recognised by extension but without an extractor. Detecting
/// them lets the run report the file as unsupported instead of ignoring it.
const OTHER_LANGUAGES: &[(&str, &[&str])] = &[
    ("Java", &["java"]),
    ("C", &["c", "h"]),
    ("C++", &["cpp", "cc", "cxx", "hpp", "hxx", "hh"]),
    ("C#", &["cs"]),
    ("Ruby", &["rb", "rake"]),
    ("PHP", &["php"]),
    ("Kotlin", &["kt", "kts"]),
    ("Swift", &["swift"]),
    ("Scala", &["scala"]),
    ("Shell", &["sh", "bash", "zsh"]),
];

/// Reads at most `max_bytes` from the start of a file.
pub fn read_head(path: &Path, max_bytes: u64) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    File::open(path)?.take(max_bytes).read_to_end(&mut buf)?;
    Ok(buf)
}

/// Names the language of `path` from its extension, falling back to the
/// shebang line in `content_prefix` for extension-less scripts.
pub fn detect(path: &Path, content_prefix: &[u8]) -> Result<String, AnalyzeError> {
    let ext = path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase());

    if let Some(ext) = ext.as_deref() {
        if let Some(lang) = crate::Language::from_extension(ext) {
            return Ok(lang.name().to_string());
        }
        if let Some((name, _)) = OTHER_LANGUAGES.iter().find(|(_, exts)| exts.contains(&ext)) {
            return Ok(name.to_string());
        }
    }

    if let Some(name) = shebang_language(content_prefix) {
        trace!("Detected {} from shebang: {}", name, path.display());
        return Ok(name.to_string());
    }

    Err(AnalyzeError::NoLanguageDetected { path: path.to_path_buf() })
}

fn shebang_language(content: &[u8]) -> Option<&'static str> {
    let first_line = content.split(|b| *b == b'\n').next()?;
    let line = std::str::from_utf8(first_line).ok()?;
    if !line.starts_with("#!") {
        return None;
    }

    if line.contains("python") {
        Some("Python")
    } else if line.contains("node") || line.contains("deno") || line.contains("bun") {
        Some("JavaScript")
    } else if line.contains("sh") {
        Some("Shell")
    } else {
        None
    }
}
