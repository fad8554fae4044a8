//! Generate the module repository's top-level CMakeLists.

use anyhow::{Context, Result};
use kiln_core::naming;
use kiln_core::repo::{self, RepoConfig};
use std::path::Path;

const REPO_CMAKE: &str = r"cmake_minimum_required(VERSION 3.25)
project(@NAMESPACE@)
set(MOD_NAMESPACE @NAMESPACE@)

# Find the Kiln runtime
if (NOT KILN_IS_MAIN_PROJECT)
  find_package(Kiln CONFIG REQUIRED)
endif()

# Install locations
if (NOT KILN_INSTALL_BIN_DIR)
  set(KILN_INSTALL_BIN_DIR ${CMAKE_INSTALL_PREFIX}/bin)
endif()

if (NOT KILN_INSTALL_LIB_DIR)
  set(KILN_INSTALL_LIB_DIR ${CMAKE_INSTALL_PREFIX}/lib)
endif()

if (NOT KILN_INSTALL_INCLUDE_DIR)
  set(KILN_INSTALL_INCLUDE_DIR ${CMAKE_INSTALL_PREFIX}/include)
endif()

if (NOT KILN_INSTALL_DATA_DIR)
  set(KILN_INSTALL_DATA_DIR ${CMAKE_INSTALL_PREFIX}/share)
endif()

if (NOT KILN_EXPORTED_TARGETS)
  set(KILN_EXPORTED_TARGETS @CAMEL_NS@)
endif()

# Module subdirectories
@SUBDIRS@

# Export targets
if (NOT KILN_IS_MAIN_PROJECT)
  install(EXPORT ${KILN_EXPORTED_TARGETS}
          FILE ${KILN_EXPORTED_TARGETS}Config.cmake
          NAMESPACE @NAMESPACE@::
          DESTINATION cmake)
endif()
";

/// Render the repo CMakeLists for a namespace and sorted module names.
pub fn render_repo_cmake(namespace: &str, module_names: &[String]) -> String {
    let subdirs = module_names
        .iter()
        .map(|name| format!("add_subdirectory({name})"))
        .collect::<Vec<_>>()
        .join("\n");
    REPO_CMAKE
        .replace("@NAMESPACE@", namespace)
        .replace("@CAMEL_NS@", &naming::to_camel_case(namespace))
        .replace("@SUBDIRS@", &subdirs)
}

/// Rewrite the repo's CMakeLists from its module directories. The namespace
/// comes from `kiln_repo.yaml` unless given explicitly.
pub fn refresh_repo_cmake(repo_dir: &Path, namespace: Option<&str>) -> Result<()> {
    let namespace = match namespace {
        Some(ns) => ns.to_string(),
        None => RepoConfig::load(repo_dir)?.namespace,
    };
    let module_names: Vec<String> = repo::list_modules(repo_dir)?
        .iter()
        .filter_map(|path| path.file_name().and_then(|n| n.to_str()).map(String::from))
        .collect();
    let path = repo_dir.join("CMakeLists.txt");
    std::fs::write(&path, render_repo_cmake(&namespace, &module_names))
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
