//! The persisted compile-status ledger.
//!
//! The ledger records, per method, whether its hand-written code is already
//! present in the module's source. It is the single persisted source of truth
//! for that question: the splicer only inserts stubs for methods the ledger
//! marks uncompiled, and flips the flag once a stub lands. The ledger is
//! read, reconciled against the current registry, and written back on every
//! generation pass, so repeated runs are idempotent.

use crate::naming;
use crate::registry::MethodRegistry;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Compile status of one method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodStatus {
    pub id: i32,
    #[serde(default)]
    pub compiled: bool,
}

/// Mapping of method name to compile status for one module.
#[derive(Debug, Clone, Default)]
pub struct CompileLedger {
    entries: BTreeMap<String, MethodStatus>,
}

impl CompileLedger {
    /// Load the ledger from disk, or bootstrap it by scanning the hand-edited
    /// task-declaration file if no (readable) ledger exists yet.
    ///
    /// A missing or malformed ledger file is treated as absent, never fatal.
    /// A missing declarations file yields an empty bootstrap set.
    pub fn load_or_bootstrap(
        ledger_path: &Path,
        tasks_header_path: &Path,
        registry: &MethodRegistry,
    ) -> Self {
        if let Ok(text) = std::fs::read_to_string(ledger_path)
            && let Ok(Some(entries)) =
                serde_yaml::from_str::<Option<BTreeMap<String, MethodStatus>>>(&text)
        {
            return Self { entries };
        }

        let declarations = std::fs::read_to_string(tasks_header_path).unwrap_or_default();
        Self {
            entries: scan_compiled_tasks(&declarations, registry),
        }
    }

    /// Reconcile the ledger against the current registry:
    /// disabled methods are skipped, mandatory methods are forced compiled,
    /// built-in methods outside the mandatory range are skipped, known
    /// methods are left untouched, and newly declared methods enter as
    /// uncompiled.
    pub fn reconcile(&mut self, registry: &MethodRegistry) {
        for method in registry.methods() {
            if method.is_disabled() {
                continue;
            }
            if method.is_mandatory() {
                self.entries.insert(
                    method.name.clone(),
                    MethodStatus {
                        id: method.id,
                        compiled: true,
                    },
                );
                continue;
            }
            if method.is_builtin() {
                continue;
            }
            self.entries
                .entry(method.name.clone())
                .or_insert(MethodStatus {
                    id: method.id,
                    compiled: false,
                });
        }
    }

    /// Persist the ledger as a human-readable YAML mapping.
    pub fn save(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(&self.entries)
            .context("failed to serialize compile ledger")?;
        std::fs::write(path, yaml)
            .with_context(|| format!("failed to write compile ledger {}", path.display()))?;
        Ok(())
    }

    /// Whether the named method is marked compiled.
    pub fn is_compiled(&self, name: &str) -> bool {
        self.entries.get(name).is_some_and(|s| s.compiled)
    }

    /// Flip a method to compiled (called by the splicer after a stub lands).
    pub fn mark_compiled(&mut self, name: &str) {
        if let Some(status) = self.entries.get_mut(name) {
            status.compiled = true;
        }
    }

    pub fn get(&self, name: &str) -> Option<&MethodStatus> {
        self.entries.get(name)
    }

    /// Entries ascending by id, for downstream consumers.
    pub fn sorted(&self) -> Vec<(&str, &MethodStatus)> {
        let mut entries: Vec<(&str, &MethodStatus)> = self
            .entries
            .iter()
            .map(|(name, status)| (name.as_str(), status))
            .collect();
        entries.sort_by_key(|(name, status)| (status.id, *name));
        entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Scan hand-edited declaration text for `struct <Name>Task` declarations and
/// return compiled entries for every match known to the registry.
pub fn scan_compiled_tasks(
    declarations: &str,
    registry: &MethodRegistry,
) -> BTreeMap<String, MethodStatus> {
    let mut entries = BTreeMap::new();
    for line in declarations.lines() {
        let Some(rest) = line.trim_start().strip_prefix("struct ") else {
            continue;
        };
        let type_name: &str = rest
            .split(|c: char| !c.is_alphanumeric() && c != '_')
            .next()
            .unwrap_or("");
        let Some(method_name) = naming::method_for_task_type(type_name) else {
            continue;
        };
        if let Some(def) = registry.get(&method_name) {
            entries.insert(
                method_name,
                MethodStatus {
                    id: def.id,
                    compiled: true,
                },
            );
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(items: &[(&str, i32)]) -> MethodRegistry {
        MethodRegistry::from_pairs(items.iter().map(|(n, i)| (n.to_string(), *i))).unwrap()
    }

    #[test]
    fn test_bootstrap_scan_matches_registry() {
        let registry = registry(&[("kCreate", 0), ("kPut", 10), ("kGet", 11)]);
        let declarations = "\
/** The PutTask task */
struct PutTask : public Task {
};
struct Unrelated {
};
struct HelperTask : public Task {
};
";
        let entries = scan_compiled_tasks(declarations, &registry);
        assert_eq!(entries.len(), 1);
        assert!(entries["kPut"].compiled);
        assert_eq!(entries["kPut"].id, 10);
    }

    #[test]
    fn test_missing_files_bootstrap_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let registry = registry(&[("kPut", 10)]);
        let ledger = CompileLedger::load_or_bootstrap(
            &tmp.path().join("absent_ledger.yaml"),
            &tmp.path().join("absent_tasks.h"),
            &registry,
        );
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_malformed_ledger_triggers_bootstrap() {
        let tmp = tempfile::tempdir().unwrap();
        let ledger_path = tmp.path().join("ledger.yaml");
        std::fs::write(&ledger_path, ": not valid yaml [").unwrap();
        let tasks_path = tmp.path().join("tasks.h");
        std::fs::write(&tasks_path, "struct PutTask : public Task {\n};\n").unwrap();

        let registry = registry(&[("kPut", 10)]);
        let ledger = CompileLedger::load_or_bootstrap(&ledger_path, &tasks_path, &registry);
        assert!(ledger.is_compiled("kPut"));
    }

    #[test]
    fn test_reconcile_rules() {
        let registry = registry(&[
            ("kOld", -1),
            ("kCreate", 0),
            ("kDestroy", 1),
            ("kUpgrade", 2),
            ("kFlush", 5),
            ("kPut", 10),
        ]);
        let mut ledger = CompileLedger::default();
        ledger.reconcile(&registry);

        // Disabled: no entry at all.
        assert!(ledger.get("kOld").is_none());
        // Mandatory: always compiled.
        assert!(ledger.is_compiled("kCreate"));
        assert!(ledger.is_compiled("kDestroy"));
        assert!(ledger.is_compiled("kUpgrade"));
        // Built-in outside the mandatory range: skipped.
        assert!(ledger.get("kFlush").is_none());
        // Newly declared: present, uncompiled.
        assert_eq!(ledger.get("kPut"), Some(&MethodStatus { id: 10, compiled: false }));
    }

    #[test]
    fn test_reconcile_leaves_known_entries_untouched() {
        let registry = registry(&[("kPut", 10)]);
        let mut ledger = CompileLedger::default();
        ledger.reconcile(&registry);
        ledger.mark_compiled("kPut");

        ledger.reconcile(&registry);
        assert!(ledger.is_compiled("kPut"));
    }

    #[test]
    fn test_mandatory_forced_compiled_over_prior_state() {
        let registry = registry(&[("kCreate", 0)]);
        let mut ledger = CompileLedger {
            entries: [(
                "kCreate".to_string(),
                MethodStatus {
                    id: 0,
                    compiled: false,
                },
            )]
            .into(),
        };
        ledger.reconcile(&registry);
        assert!(ledger.is_compiled("kCreate"));
    }

    #[test]
    fn test_roundtrip_and_sorted() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("ledger.yaml");
        let registry = registry(&[("kCreate", 0), ("kPut", 10), ("kGet", 11)]);
        let mut ledger = CompileLedger::default();
        ledger.reconcile(&registry);
        ledger.save(&path).unwrap();

        let reloaded = CompileLedger::load_or_bootstrap(&path, &tmp.path().join("none"), &registry);
        assert_eq!(reloaded.len(), 3);
        let names: Vec<&str> = reloaded.sorted().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["kCreate", "kPut", "kGet"]);
    }
}
