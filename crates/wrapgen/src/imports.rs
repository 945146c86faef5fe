//! Import bookkeeping for the generated file.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};

/// A Go import, optionally aliased.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Import {
    pub alias: Option<String>,
    pub path: String,
}

impl Import {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            alias: None,
            path: path.into(),
        }
    }

    pub fn aliased(alias: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            alias: Some(alias.into()),
            path: path.into(),
        }
    }

    /// Paths with a `.` (a host name) are external; the rest ship with Go.
    pub fn is_external(&self) -> bool {
        self.path.contains('.')
    }

    /// Identifier the import binds in the file scope. Blank and dot imports bind none.
    pub fn identifier(&self) -> Option<&str> {
        match self.alias.as_deref() {
            Some("_" | ".") => None,
            Some(alias) => Some(alias),
            None => self.path.rsplit('/').next(),
        }
    }

    fn to_go(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{alias} {:?}", self.path),
            None => format!("{:?}", self.path),
        }
    }
}

/// Imports keyed by path, so iteration is sorted by path.
#[derive(Debug, Clone, Default)]
pub struct ImportSet {
    imports: BTreeMap<String, Import>,
}

impl ImportSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an import. Re-adding an identical import is a no-op; re-adding a
    /// path under a different alias fails. Empty paths are ignored.
    pub fn add(&mut self, import: Import) -> Result<()> {
        if import.path.is_empty() {
            return Ok(());
        }
        match self.imports.get(&import.path) {
            Some(existing) if existing.alias != import.alias => Err(Error::ImportConflict {
                path: import.path,
                existing: existing.alias.clone(),
                requested: import.alias,
            }),
            Some(_) => Ok(()),
            None => {
                self.imports.insert(import.path.clone(), import);
                Ok(())
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
    }

    /// Package identifiers bound by the imports.
    pub fn identifiers(&self) -> BTreeSet<String> {
        self.imports
            .values()
            .filter_map(Import::identifier)
            .map(str::to_string)
            .collect()
    }

    /// Standard-library imports, sorted by path.
    pub fn runtime_provided(&self) -> impl Iterator<Item = &Import> {
        self.imports.values().filter(|i| !i.is_external())
    }

    /// Third-party imports, sorted by path.
    pub fn external(&self) -> impl Iterator<Item = &Import> {
        self.imports.values().filter(|i| i.is_external())
    }

    /// Render the `import (...)` block, standard-library group first.
    pub fn to_go(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        let groups: Vec<Vec<String>> = [
            self.runtime_provided().map(Import::to_go).collect(),
            self.external().map(Import::to_go).collect(),
        ]
        .into_iter()
        .filter(|g: &Vec<String>| !g.is_empty())
        .collect();

        let mut output = String::from("import (\n");
        for (i, group) in groups.iter().enumerate() {
            if i > 0 {
                output.push('\n');
            }
            for line in group {
                output.push('\t');
                output.push_str(line);
                output.push('\n');
            }
        }
        output.push(')');
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_same_import_twice_is_noop() {
        let mut set = ImportSet::new();
        set.add(Import::aliased("t", "time")).unwrap();
        set.add(Import::aliased("t", "time")).unwrap();
        assert_eq!(set.runtime_provided().count(), 1);
    }

    #[test]
    fn test_conflicting_alias_fails() {
        let mut set = ImportSet::new();
        set.add(Import::new("time")).unwrap();
        let err = set.add(Import::aliased("t", "time")).unwrap_err();
        assert!(matches!(err, Error::ImportConflict { .. }));
    }

    #[test]
    fn test_empty_path_ignored() {
        let mut set = ImportSet::new();
        set.add(Import::new("")).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_paths_are_case_sensitive() {
        let mut set = ImportSet::new();
        set.add(Import::new("github.com/A/x")).unwrap();
        set.add(Import::aliased("y", "github.com/a/x")).unwrap();
        assert_eq!(set.external().count(), 2);
    }

    #[test]
    fn test_render_groups_sorted() {
        let mut set = ImportSet::new();
        set.add(Import::new("github.com/ozanh/ugo")).unwrap();
        set.add(Import::new("time")).unwrap();
        set.add(Import::aliased("ugotime", "github.com/ozanh/ugo/stdlib/time"))
            .unwrap();
        set.add(Import::new("strconv")).unwrap();
        assert_eq!(
            set.to_go(),
            "import (\n\
             \t\"strconv\"\n\
             \t\"time\"\n\
             \n\
             \t\"github.com/ozanh/ugo\"\n\
             \tugotime \"github.com/ozanh/ugo/stdlib/time\"\n\
             )"
        );
    }

    #[test]
    fn test_identifiers() {
        let mut set = ImportSet::new();
        set.add(Import::new("strconv")).unwrap();
        set.add(Import::new("github.com/ozanh/ugo")).unwrap();
        set.add(Import::aliased("ugotime", "github.com/ozanh/ugo/stdlib/time")).unwrap();
        set.add(Import::aliased("_", "embed")).unwrap();
        set.add(Import::aliased(".", "math")).unwrap();
        let ids: Vec<_> = set.identifiers().into_iter().collect();
        assert_eq!(ids, ["strconv", "ugo", "ugotime"]);
    }
}
