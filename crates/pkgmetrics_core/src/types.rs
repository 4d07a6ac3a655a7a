use serde::Serialize;
use std::{borrow::Borrow, fmt};

/// Canonical package path, e.g. `example.com/project/internal/foo`.
///
/// Packages are plain string keys; several files may resolve to the same one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Package(String);

/// An import specifier as written in source, unresolved.
///
/// Kept distinct from [`Package`] even though internal imports usually
/// spell a package path: an import may equally name an external dependency.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Import(String);

macro_rules! string_key {
    ($ty:ident) => {
        impl $ty {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl Borrow<str> for $ty {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $ty {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $ty {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_key!(Package);
string_key!(Import);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_package_lookup_by_str() {
        let mut map = BTreeMap::new();
        map.insert(Package::new("example.com/project/cmd"), 1);
        assert_eq!(map.get("example.com/project/cmd"), Some(&1));
        assert_eq!(map.get("example.com/project"), None);
    }

    #[test]
    fn test_import_display_and_json() {
        let import = Import::from("fmt");
        assert_eq!(import.to_string(), "fmt");
        assert_eq!(serde_json::to_string(&import).unwrap(), "\"fmt\"");
    }
}
