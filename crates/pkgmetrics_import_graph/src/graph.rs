use dashmap::DashMap;
use log::{debug, trace};
use serde::{Serialize, Serializer, ser::SerializeMap};
use std::collections::BTreeMap;

use pkgmetrics_core::{Import, Package};

use crate::extractor::FileImports;

/// Package to its deduplicated imports.
///
/// Each import keeps the number of files that contributed it, so a package
/// split over several files still reports how often a dependency is used.
/// Keys and imports are kept sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportGraph {
    packages: BTreeMap<Package, BTreeMap<Import, usize>>,
}

impl ImportGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unions `imports` into `package`, creating the package if needed.
    pub fn add<I>(&mut self, package: Package, imports: I)
    where
        I: IntoIterator<Item = Import>,
    {
        let entry = self.packages.entry(package).or_default();
        for import in imports {
            *entry.entry(import).or_insert(0) += 1;
        }
    }

    pub fn add_file(&mut self, file: FileImports) {
        self.add(file.package, file.imports);
    }

    pub fn contains(&self, package: &str) -> bool {
        self.packages.contains_key(package)
    }

    /// Deduplicated imports of `package`, sorted.
    pub fn imports(&self, package: &str) -> impl Iterator<Item = &Import> {
        self.packages.get(package).into_iter().flat_map(|imports| imports.keys())
    }

    /// How many files of `package` import `import`.
    pub fn count(&self, package: &str, import: &str) -> usize {
        self.packages.get(package).and_then(|imports| imports.get(import)).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Package, &BTreeMap<Import, usize>)> {
        self.packages.iter()
    }

    pub fn packages(&self) -> impl Iterator<Item = &Package> {
        self.packages.keys()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Plain `package -> imports` view, dropping the counts.
    pub fn to_map(&self) -> BTreeMap<String, Vec<String>> {
        self.packages
            .iter()
            .map(|(pkg, imports)| {
                (pkg.to_string(), imports.keys().map(|i| i.to_string()).collect())
            })
            .collect()
    }
}

impl Serialize for ImportGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.packages.len()))?;
        for (package, imports) in &self.packages {
            let imports: Vec<&Import> = imports.keys().collect();
            map.serialize_entry(package, &imports)?;
        }
        map.end()
    }
}

/// Collects per-file results from many workers into one graph.
#[derive(Debug, Default)]
pub struct GraphAssembler {
    packages: DashMap<Package, BTreeMap<Import, usize>>,
}

impl GraphAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges one file's contribution. Safe to call concurrently; files of the
    /// same package are unioned, never overwritten.
    pub fn merge(&self, file: FileImports) {
        trace!("Merging {} into {}", file.path, file.package);
        let mut entry = self.packages.entry(file.package).or_default();
        for import in file.imports {
            *entry.entry(import).or_insert(0) += 1;
        }
    }

    pub fn finish(self) -> ImportGraph {
        let packages: BTreeMap<_, _> = self.packages.into_iter().collect();
        debug!("Assembled graph with {} packages", packages.len());
        ImportGraph { packages }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkgmetrics_core::Language;
    use rayon::prelude::*;
    use std::collections::BTreeSet;

    fn file(path: &str, package: &str, imports: &[&str]) -> FileImports {
        FileImports {
            path: path.to_string(),
            language: Language::Go,
            package: Package::from(package),
            imports: imports.iter().map(|i| Import::from(*i)).collect(),
        }
    }

    #[test]
    fn test_files_of_one_package_are_unioned() {
        let assembler = GraphAssembler::new();
        assembler.merge(file("cmd/a.go", "example.com/p/cmd", &["fmt", "os"]));
        assembler.merge(file("cmd/b.go", "example.com/p/cmd", &["fmt", "example.com/p/moo"]));
        let graph = assembler.finish();

        let imports: Vec<&str> = graph.imports("example.com/p/cmd").map(|i| i.as_str()).collect();
        assert_eq!(imports, vec!["example.com/p/moo", "fmt", "os"]);
        assert_eq!(graph.count("example.com/p/cmd", "fmt"), 2);
        assert_eq!(graph.count("example.com/p/cmd", "os"), 1);
    }

    #[test]
    fn test_merge_is_order_independent() {
        let files = vec![
            file("a/x.go", "a", &["fmt", "b"]),
            file("a/y.go", "a", &["os"]),
            file("a/z.go", "a", &["b", "c"]),
            file("b/b.go", "b", &["c"]),
            file("c/c.go", "c", &[]),
        ];

        let forward = GraphAssembler::new();
        files.iter().cloned().for_each(|f| forward.merge(f));
        let backward = GraphAssembler::new();
        files.iter().rev().cloned().for_each(|f| backward.merge(f));
        let parallel = GraphAssembler::new();
        files.par_iter().cloned().for_each(|f| parallel.merge(f));

        let forward = forward.finish();
        assert_eq!(forward, backward.finish());
        assert_eq!(forward, parallel.finish());

        let union: BTreeSet<&str> = files
            .iter()
            .filter(|f| f.package.as_str() == "a")
            .flat_map(|f| f.imports.iter().map(|i| i.as_str()))
            .collect();
        let merged: BTreeSet<&str> = forward.imports("a").map(|i| i.as_str()).collect();
        assert_eq!(merged, union);
    }

    #[test]
    fn test_package_without_imports_is_kept() {
        let mut graph = ImportGraph::new();
        graph.add_file(file("c/c.go", "c", &[]));
        assert!(graph.contains("c"));
        assert_eq!(graph.imports("c").count(), 0);
        assert!(!graph.contains("missing"));
    }

    #[test]
    fn test_serializes_as_package_to_imports() {
        let mut graph = ImportGraph::new();
        graph.add(Package::from("example.com/p/main"), vec![Import::from("example.com/p/cmd")]);
        graph.add(Package::from("example.com/p/cmd"), vec![Import::from("fmt")]);

        let json = serde_json::to_string(&graph).unwrap();
        assert_eq!(
            json,
            r#"{"example.com/p/cmd":["fmt"],"example.com/p/main":["example.com/p/cmd"]}"#
        );
        assert_eq!(graph.to_map().len(), 2);
    }
}
