//! Load the YAML method registry for one module.
//!
//! The registry file maps method names to numeric ids and is the source of
//! truth for ordering and for distinguishing reserved methods from
//! user-defined ones:
//!
//! ```yaml
//! kCreate: 0
//! kDestroy: 1
//! kPut: 10
//! ```

use anyhow::{Context, Result, bail};
use std::collections::BTreeMap;
use std::path::Path;

/// Highest id of the mandatory lifecycle methods. Mandatory methods are
/// assumed always hand-implemented and are never spliced.
pub const MANDATORY_ID_MAX: i32 = 2;

/// First id available to user-defined methods. Ids below this are built-in
/// and excluded from the public id enumeration, though still dispatched.
pub const FIRST_USER_ID: i32 = 10;

/// One method declaration: registry name plus numeric id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDef {
    pub name: String,
    pub id: i32,
}

impl MethodDef {
    /// Disabled methods are excluded from all generation.
    pub fn is_disabled(&self) -> bool {
        self.id < 0
    }

    /// Mandatory methods are always considered compiled.
    pub fn is_mandatory(&self) -> bool {
        (0..=MANDATORY_ID_MAX).contains(&self.id)
    }

    /// Built-in methods sit below the user id range.
    pub fn is_builtin(&self) -> bool {
        self.id >= 0 && self.id < FIRST_USER_ID
    }
}

/// The method registry of one module, sorted ascending by id.
#[derive(Debug, Clone, Default)]
pub struct MethodRegistry {
    methods: Vec<MethodDef>,
}

impl MethodRegistry {
    /// Build a registry from (name, id) pairs, sorting by id and rejecting
    /// duplicate non-negative ids.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, i32)>) -> Result<Self> {
        let mut methods: Vec<MethodDef> = pairs
            .into_iter()
            .map(|(name, id)| MethodDef { name, id })
            .collect();
        methods.sort_by(|a, b| (a.id, a.name.as_str()).cmp(&(b.id, b.name.as_str())));

        // Duplicate non-negative ids would produce a corrupt dispatch table,
        // so they are rejected here rather than inherited silently.
        for pair in methods.windows(2) {
            if pair[0].id >= 0 && pair[0].id == pair[1].id {
                bail!(
                    "duplicate method id {} ({} and {})",
                    pair[0].id,
                    pair[0].name,
                    pair[1].name
                );
            }
        }

        Ok(Self { methods })
    }

    /// Load the registry from a YAML file. An empty file yields an empty
    /// registry; a missing file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read method registry {}", path.display()))?;
        let mapping: Option<BTreeMap<String, i32>> = serde_yaml::from_str(&text)
            .with_context(|| format!("failed to parse method registry {}", path.display()))?;
        Self::from_pairs(mapping.unwrap_or_default())
            .with_context(|| format!("invalid method registry {}", path.display()))
    }

    /// All methods, ascending by id (disabled methods first).
    pub fn methods(&self) -> &[MethodDef] {
        &self.methods
    }

    /// All non-disabled methods, ascending by id.
    pub fn enabled(&self) -> impl Iterator<Item = &MethodDef> {
        self.methods.iter().filter(|m| !m.is_disabled())
    }

    /// Look up a method by registry name.
    pub fn get(&self, name: &str) -> Option<&MethodDef> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, i32)]) -> Vec<(String, i32)> {
        items.iter().map(|(n, i)| (n.to_string(), *i)).collect()
    }

    #[test]
    fn test_load_sorted_by_id() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("methods.yaml");
        std::fs::write(&path, "kPut: 11\nkCreate: 0\nkGet: 10\n").unwrap();

        let registry = MethodRegistry::load(&path).unwrap();
        let ids: Vec<i32> = registry.methods().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![0, 10, 11]);
        assert_eq!(registry.methods()[1].name, "kGet");
    }

    #[test]
    fn test_empty_file_is_empty_registry() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("methods.yaml");
        std::fs::write(&path, "").unwrap();
        assert!(MethodRegistry::load(&path).unwrap().is_empty());
    }

    #[test]
    fn test_missing_file_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(MethodRegistry::load(&tmp.path().join("absent.yaml")).is_err());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let err = MethodRegistry::from_pairs(pairs(&[("kGet", 10), ("kPut", 10)])).unwrap_err();
        assert!(err.to_string().contains("duplicate method id 10"));
    }

    #[test]
    fn test_disabled_ids_may_collide() {
        let registry =
            MethodRegistry::from_pairs(pairs(&[("kOld", -1), ("kOlder", -1), ("kGet", 10)]))
                .unwrap();
        assert_eq!(registry.enabled().count(), 1);
    }

    #[test]
    fn test_classification() {
        let m = |id| MethodDef {
            name: "kX".to_string(),
            id,
        };
        assert!(m(-1).is_disabled());
        assert!(m(0).is_mandatory());
        assert!(m(2).is_mandatory());
        assert!(!m(3).is_mandatory());
        assert!(m(9).is_builtin());
        assert!(!m(10).is_builtin());
    }
}
