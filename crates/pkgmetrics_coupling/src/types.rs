use serde::Serialize;
use std::collections::BTreeMap;

use pkgmetrics_core::{Diagnostic, Package};

/// Dependency identifier (a package or an import) to occurrence count.
///
/// Counts are per import identifier today. The key is a plain string so a
/// qualified symbol such as `example.com/p/moo.Say` fits without a new type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CouplingStats(BTreeMap<String, usize>);

impl CouplingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, identifier: impl Into<String>, count: usize) {
        *self.0.entry(identifier.into()).or_insert(0) += count;
    }

    pub fn get(&self, identifier: &str) -> usize {
        self.0.get(identifier).copied().unwrap_or(0)
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, usize)> for CouplingStats {
    fn from_iter<T: IntoIterator<Item = (S, usize)>>(iter: T) -> Self {
        let mut stats = CouplingStats::new();
        for (identifier, count) in iter {
            stats.record(identifier, count);
        }
        stats
    }
}

/// Coupling of one package: who depends on it and what it depends on.
#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub package: Package,
    pub inward: CouplingStats,
    pub outward: CouplingStats,
}

impl Metrics {
    /// Afferent coupling (Ca).
    pub fn inward_coupling(&self) -> usize {
        self.inward.total()
    }

    /// Efferent coupling (Ce).
    pub fn outward_coupling(&self) -> usize {
        self.outward.total()
    }

    /// `Ce / (Ca + Ce)`, in `[0, 1]`. A package with no coupling at all is
    /// defined as stable (0).
    pub fn instability(&self) -> f64 {
        let outward = self.outward_coupling();
        let total = self.inward_coupling() + outward;
        if total == 0 { 0.0 } else { outward as f64 / total as f64 }
    }
}

/// A package above the configured instability limit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub package: Package,
    pub instability: f64,
    pub max_instability: f64,
}

#[derive(Debug, Clone)]
pub struct CheckResult {
    pub metrics: Vec<Metrics>,
    pub violations: Vec<Violation>,
    pub diagnostics: Vec<Diagnostic>,
    pub files_analyzed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coupling_stats_accumulate() {
        let mut stats = CouplingStats::new();
        stats.record("fmt", 1);
        stats.record("fmt", 2);
        stats.record("os", 1);
        assert_eq!(stats.get("fmt"), 3);
        assert_eq!(stats.get("missing"), 0);
        assert_eq!(stats.total(), 4);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats.iter().collect::<Vec<_>>(), vec![("fmt", 3), ("os", 1)]);
    }

    #[test]
    fn test_instability_of_isolated_package_is_zero() {
        let metrics = Metrics {
            package: Package::from("lonely"),
            inward: CouplingStats::new(),
            outward: CouplingStats::new(),
        };
        assert_eq!(metrics.instability(), 0.0);
    }

    #[test]
    fn test_instability_ratio() {
        let metrics = Metrics {
            package: Package::from("p"),
            inward: [("a", 1), ("b", 1)].into_iter().collect(),
            outward: [("fmt", 1)].into_iter().collect(),
        };
        assert_eq!(metrics.inward_coupling(), 2);
        assert_eq!(metrics.outward_coupling(), 1);
        assert!((metrics.instability() - 1.0 / 3.0).abs() < f64::EPSILON);
    }
}
