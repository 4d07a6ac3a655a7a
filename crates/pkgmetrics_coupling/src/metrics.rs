use log::{debug, trace};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};

use pkgmetrics_import_graph::ImportGraph;

use crate::types::{CouplingStats, Metrics};

/// One [`Metrics`] record per package of `graph`, sorted by package.
///
/// Outward coupling counts every import of the package, external ones
/// included. Inward coupling counts the packages of the graph that import it,
/// weighted by how many of their files do. A package importing itself counts
/// as outward coupling only.
///
/// An import adds inward coupling only when it is spelled exactly like a
/// package key. Go and quoted JS/TS module imports can match. Rust `use`
/// paths, Python dotted names and relative JS specifiers never do, so those
/// graphs report Ca = 0 throughout and instability reflects outward
/// coupling alone.
pub fn compute_metrics(graph: &ImportGraph) -> Vec<Metrics> {
    debug!("Computing coupling metrics for {} packages", graph.len());

    // importee -> importer -> count, internal edges between distinct packages
    let mut reverse: HashMap<&str, BTreeMap<&str, usize>> = HashMap::new();
    for (package, imports) in graph.iter() {
        for (import, count) in imports {
            if import.as_str() != package.as_str() && graph.contains(import.as_str()) {
                trace!("Internal edge {} -> {}", package, import);
                let importers = reverse.entry(import.as_str()).or_default();
                *importers.entry(package.as_str()).or_insert(0) += count;
            }
        }
    }

    let packages: Vec<_> = graph.iter().collect();
    let metrics: Vec<Metrics> = packages
        .par_iter()
        .map(|(package, imports)| {
            let outward: CouplingStats =
                imports.iter().map(|(import, count)| (import.as_str(), *count)).collect();
            let inward: CouplingStats = reverse
                .get(package.as_str())
                .map(|importers| importers.iter().map(|(p, c)| (*p, *c)).collect())
                .unwrap_or_default();
            Metrics { package: (*package).clone(), inward, outward }
        })
        .collect();

    debug!("Computed metrics for {} packages", metrics.len());
    metrics
}
