use std::{
    env,
    io::{self, Write},
    path::{Component, Path, PathBuf},
};

use colored::Colorize;
use log::{debug, trace};

use pkgmetrics_core::Diagnostic;

use crate::analyzer::Analysis;

/// Relativize a path under `root` to the current working directory for clickable links
pub fn relativize_to_cwd(root: &Path, relative_to_root: &str) -> String {
    let cwd = match env::current_dir() {
        Ok(cwd) => cwd,
        Err(_) => {
            debug!("Failed to get current directory");
            return relative_to_root.to_string();
        }
    };

    match make_relative(&root.join(relative_to_root), &cwd) {
        Some(rel_path) => rel_path.to_string_lossy().to_string(),
        None => {
            trace!("Could not relativize '{}', using original", relative_to_root);
            relative_to_root.to_string()
        }
    }
}

/// Create a relative path from `base` to `target`
fn make_relative(target: &Path, base: &Path) -> Option<PathBuf> {
    let target_parts: Vec<Component> = target.components().collect();
    let base_parts: Vec<Component> = base.components().collect();

    if target_parts.first() != base_parts.first() {
        return None;
    }

    let common = target_parts.iter().zip(&base_parts).take_while(|(t, b)| t == b).count();

    let mut result = PathBuf::new();
    for _ in common..base_parts.len() {
        result.push("..");
    }
    for component in &target_parts[common..] {
        match component {
            Component::Normal(p) => result.push(p),
            Component::ParentDir => result.push(".."),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }

    if result.as_os_str().is_empty() { Some(PathBuf::from(".")) } else { Some(result) }
}

/// Prints each package followed by its imports as a tree. Imports that name
/// a package of the graph are highlighted.
pub fn print_graph<W: Write>(writer: &mut W, analysis: &Analysis, root: &Path) -> io::Result<()> {
    let graph = &analysis.graph;
    debug!("Printing import graph with {} packages", graph.len());

    if graph.is_empty() {
        writeln!(writer, "{} No packages found", "⚠".yellow().bold())?;
    } else {
        writeln!(
            writer,
            "{} Import graph ({} packages)\n",
            "✓".green().bold(),
            graph.len().to_string().cyan()
        )?;
    }

    for (package, imports) in graph.iter() {
        writeln!(writer, "{}", package.as_str().bright_white().bold())?;

        for (idx, (import, count)) in imports.iter().enumerate() {
            let is_last = idx == imports.len() - 1;
            let prefix = if is_last { "└──" } else { "├──" };
            let name = if graph.contains(import.as_str()) {
                import.as_str().blue().to_string()
            } else {
                import.to_string()
            };

            if *count > 1 {
                writeln!(writer, "{}  {} ({} files)", prefix.dimmed(), name, count)?;
            } else {
                writeln!(writer, "{}  {}", prefix.dimmed(), name)?;
            }
        }

        writeln!(writer)?;
    }

    print_diagnostics(writer, &analysis.diagnostics, root)?;

    writer.flush()?;
    Ok(())
}

/// Lists every file that was left out of the graph.
pub fn print_diagnostics<W: Write>(
    writer: &mut W,
    diagnostics: &[Diagnostic],
    root: &Path,
) -> io::Result<()> {
    if diagnostics.is_empty() {
        return Ok(());
    }

    writeln!(writer, "{}", "─".repeat(60).dimmed())?;
    writeln!(
        writer,
        "{} Skipped {} files",
        "⚠".yellow().bold(),
        diagnostics.len().to_string().yellow()
    )?;

    for diag in diagnostics {
        let path = relativize_to_cwd(root, &diag.path);
        match &diag.language {
            Some(language) => {
                writeln!(writer, "  {} ({}): {}", path.blue(), language, diag.message.dimmed())?
            }
            None => writeln!(writer, "  {}: {}", path.blue(), diag.message.dimmed())?,
        }
    }

    Ok(())
}

/// Writes `{ "graph": ..., "diagnostics": [...] }`.
pub fn print_graph_json<W: Write>(writer: &mut W, analysis: &Analysis) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, analysis)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
