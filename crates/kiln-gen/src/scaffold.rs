//! Repo and module bootstrap from embedded templates.
//!
//! `make_repo` lays down a module-repository directory with its config and
//! top-level CMakeLists. `make_mod` instantiates the embedded module template
//! tree with the module name substituted, seeding the registry with the
//! mandatory lifecycle methods and the hand-edited files with their
//! implementations plus the autogen sentinel.

use crate::cmake;
use crate::stubs;
use anyhow::{Context, Result, bail};
use kiln_core::module::ModuleContext;
use kiln_core::registry::MethodDef;
use kiln_core::repo::RepoConfig;
use std::path::Path;

const MOD_CMAKE: &str = include_str!("templates/module/CMakeLists.txt.in");
const MOD_SRC_CMAKE: &str = include_str!("templates/module/src_CMakeLists.txt.in");
const MOD_MANIFEST: &str = include_str!("templates/module/kiln_mod.yaml.in");
const MOD_METHODS: &str = include_str!("templates/module/methods.yaml.in");
const MOD_TASKS: &str = include_str!("templates/module/tasks.h.in");
const MOD_CLIENT: &str = include_str!("templates/module/client.h.in");
const MOD_RUNTIME: &str = include_str!("templates/module/runtime.cc.in");

/// Create a module repository: directory, config, top-level CMakeLists.
pub fn make_repo(repo_dir: &Path, namespace: &str) -> Result<()> {
    std::fs::create_dir_all(repo_dir)
        .with_context(|| format!("failed to create {}", repo_dir.display()))?;
    RepoConfig {
        namespace: namespace.to_string(),
    }
    .save(repo_dir)?;
    cmake::refresh_repo_cmake(repo_dir, Some(namespace))?;
    Ok(())
}

/// The mandatory lifecycle methods every module starts with.
fn mandatory_methods() -> Vec<MethodDef> {
    [("kCreate", 0), ("kDestroy", 1), ("kUpgrade", 2)]
        .into_iter()
        .map(|(name, id)| MethodDef {
            name: name.to_string(),
            id,
        })
        .collect()
}

/// Bootstrap a module directory from the embedded template tree.
///
/// Refuses to overwrite an already-bootstrapped module (one with a `src/`
/// directory) unless `force` is set.
pub fn make_mod(root: &Path, force: bool) -> Result<()> {
    let ctx = ModuleContext::new(root)?;
    if root.join("src").exists() && !force {
        bail!(
            "module {} is already bootstrapped (pass --force to overwrite)",
            ctx.name()
        );
    }

    std::fs::create_dir_all(root.join("src"))
        .with_context(|| format!("failed to create {}", root.join("src").display()))?;
    let include_dir = root.join("include").join(ctx.name());
    std::fs::create_dir_all(&include_dir)
        .with_context(|| format!("failed to create {}", include_dir.display()))?;

    let mandatory = mandatory_methods();
    write_template(&root.join("CMakeLists.txt"), MOD_CMAKE, &ctx, &[])?;
    write_template(
        &root.join("src").join("CMakeLists.txt"),
        MOD_SRC_CMAKE,
        &ctx,
        &[],
    )?;
    write_template(
        &root.join(kiln_core::module::MOD_FILE),
        MOD_MANIFEST,
        &ctx,
        &[],
    )?;
    write_template(&ctx.registry_path(), MOD_METHODS, &ctx, &[])?;
    write_template(
        &ctx.tasks_header_path(),
        MOD_TASKS,
        &ctx,
        &render_all(&mandatory, stubs::render_task_decl),
    )?;
    write_template(
        &ctx.client_header_path(),
        MOD_CLIENT,
        &ctx,
        &render_all(&mandatory, stubs::render_client_method),
    )?;
    write_template(
        &ctx.runtime_source_path(),
        MOD_RUNTIME,
        &ctx,
        &render_all(&mandatory, stubs::render_runtime_method),
    )?;
    Ok(())
}

fn render_all(methods: &[MethodDef], render: fn(&MethodDef) -> String) -> Vec<String> {
    methods.iter().map(render).collect()
}

fn write_template(
    path: &Path,
    template: &str,
    ctx: &ModuleContext,
    mandatory_stubs: &[String],
) -> Result<()> {
    let text = template
        .replace("@MANDATORY@\n", &mandatory_stubs.concat())
        .replace("@MOD_UPPER@", &ctx.name().to_uppercase())
        .replace("@MOD@", ctx.name());
    std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
