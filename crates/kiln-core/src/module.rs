//! Per-module path context.
//!
//! One [`ModuleContext`] is built per generator invocation and threaded
//! through every operation, so file locations are derived in exactly one
//! place. A directory is a module iff it contains `kiln_mod.yaml`.

use anyhow::{Result, bail};
use std::path::{Path, PathBuf};

/// Marker file identifying a module directory.
pub const MOD_FILE: &str = "kiln_mod.yaml";

/// Identity and file layout of one module.
#[derive(Debug, Clone)]
pub struct ModuleContext {
    name: String,
    root: PathBuf,
}

impl ModuleContext {
    /// Build a context for the module rooted at `root`. The module name is
    /// the directory's base name.
    pub fn new(root: &Path) -> Result<Self> {
        let Some(name) = root.file_name().and_then(|n| n.to_str()) else {
            bail!("module root {} has no usable base name", root.display());
        };
        Ok(Self {
            name: name.to_string(),
            root: root.to_path_buf(),
        })
    }

    /// Whether `dir` looks like a module (contains the marker file).
    pub fn is_module_dir(dir: &Path) -> bool {
        dir.join(MOD_FILE).exists()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn include(&self, file: String) -> PathBuf {
        self.root.join("include").join(&self.name).join(file)
    }

    /// The YAML method registry (hand-edited).
    pub fn registry_path(&self) -> PathBuf {
        self.include(format!("{}_methods.yaml", self.name))
    }

    /// The compile-status ledger, co-located with the registry.
    pub fn ledger_path(&self) -> PathBuf {
        self.include(format!("{}_methods_compiled.yaml", self.name))
    }

    /// The generated method-id header.
    pub fn methods_header_path(&self) -> PathBuf {
        self.include(format!("{}_methods.h", self.name))
    }

    /// The generated dispatch-table header.
    pub fn dispatch_header_path(&self) -> PathBuf {
        self.include(format!("{}_dispatch.h", self.name))
    }

    /// The hand-edited task declarations header.
    pub fn tasks_header_path(&self) -> PathBuf {
        self.include(format!("{}_tasks.h", self.name))
    }

    /// The hand-edited client stubs header.
    pub fn client_header_path(&self) -> PathBuf {
        self.include(format!("{}_client.h", self.name))
    }

    /// The hand-edited runtime handlers source.
    pub fn runtime_source_path(&self) -> PathBuf {
        self.root.join("src").join(format!("{}_runtime.cc", self.name))
    }

    /// Scratch file emitted when the tasks header offers no splice point.
    pub fn tasks_scratch_path(&self) -> PathBuf {
        self.include(format!("{}_tasks.temp_h", self.name))
    }

    /// Scratch file emitted when the client header offers no splice point.
    pub fn client_scratch_path(&self) -> PathBuf {
        self.include(format!("{}_client.temp_h", self.name))
    }

    /// Scratch file emitted when the runtime source offers no splice point.
    pub fn runtime_scratch_path(&self) -> PathBuf {
        self.root
            .join("src")
            .join(format!("{}_runtime.temp_cc", self.name))
    }
}
