//! Module-repository configuration and discovery.
//!
//! A module repository is a directory holding one module per subdirectory
//! plus a `kiln_repo.yaml` with repo-wide settings.

use crate::module::ModuleContext;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Repo configuration file name.
pub const REPO_FILE: &str = "kiln_repo.yaml";

/// Repo-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoConfig {
    /// CMake namespace the repo's modules are exported under.
    pub namespace: String,
}

impl RepoConfig {
    pub fn load(repo_dir: &Path) -> Result<Self> {
        let path = repo_dir.join(REPO_FILE);
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read repo config {}", path.display()))?;
        serde_yaml::from_str(&text)
            .with_context(|| format!("failed to parse repo config {}", path.display()))
    }

    pub fn save(&self, repo_dir: &Path) -> Result<()> {
        let path = repo_dir.join(REPO_FILE);
        let yaml = serde_yaml::to_string(self).context("failed to serialize repo config")?;
        std::fs::write(&path, yaml)
            .with_context(|| format!("failed to write repo config {}", path.display()))?;
        Ok(())
    }
}

/// List module directories under `repo_dir`, sorted by name.
pub fn list_modules(repo_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(repo_dir)
        .with_context(|| format!("failed to list repo directory {}", repo_dir.display()))?;
    let mut modules: Vec<PathBuf> = entries
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir() && ModuleContext::is_module_dir(path))
        .collect();
    modules.sort();
    Ok(modules)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        let config = RepoConfig {
            namespace: "acme_mods".to_string(),
        };
        config.save(tmp.path()).unwrap();
        let loaded = RepoConfig::load(tmp.path()).unwrap();
        assert_eq!(loaded.namespace, "acme_mods");
    }

    #[test]
    fn test_list_modules_filters_and_sorts() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["zeta", "alpha", "not_a_mod"] {
            std::fs::create_dir(tmp.path().join(name)).unwrap();
        }
        for name in ["zeta", "alpha"] {
            std::fs::write(tmp.path().join(name).join(crate::module::MOD_FILE), "").unwrap();
        }
        std::fs::write(tmp.path().join("stray_file.txt"), "").unwrap();

        let modules = list_modules(tmp.path()).unwrap();
        let names: Vec<String> = modules
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }
}
