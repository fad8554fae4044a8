//! One full synchronization pass for a module.
//!
//! Read registry -> reconcile ledger -> rewrite generated headers -> splice
//! stubs into the three hand-edited artifacts -> persist ledger. The ledger
//! is only written at the end of a fully successful pass, so a mid-run
//! failure cannot leave it half-updated.

use crate::headers;
use crate::splice::{self, SpliceMethod};
use crate::stubs;
use anyhow::{Context, Result};
use kiln_core::ledger::CompileLedger;
use kiln_core::module::ModuleContext;
use kiln_core::registry::{MethodDef, MethodRegistry};
use std::path::PathBuf;

/// What one refresh pass did.
#[derive(Debug, Default)]
pub struct RefreshSummary {
    /// Enabled methods seen in the registry.
    pub methods: usize,
    /// Stubs spliced into hand-edited files, across all three artifacts.
    pub stubs_spliced: usize,
    /// Scratch files written because an artifact offered no splice point.
    pub scratch_files: usize,
}

/// The three hand-edited artifacts stubs are spliced into.
#[derive(Debug, Clone, Copy)]
enum Artifact {
    Tasks,
    Client,
    Runtime,
}

impl Artifact {
    const ALL: [Artifact; 3] = [Artifact::Tasks, Artifact::Client, Artifact::Runtime];

    fn path(self, ctx: &ModuleContext) -> PathBuf {
        match self {
            Artifact::Tasks => ctx.tasks_header_path(),
            Artifact::Client => ctx.client_header_path(),
            Artifact::Runtime => ctx.runtime_source_path(),
        }
    }

    fn scratch_path(self, ctx: &ModuleContext) -> PathBuf {
        match self {
            Artifact::Tasks => ctx.tasks_scratch_path(),
            Artifact::Client => ctx.client_scratch_path(),
            Artifact::Runtime => ctx.runtime_scratch_path(),
        }
    }

    fn render(self) -> fn(&MethodDef) -> String {
        match self {
            Artifact::Tasks => stubs::render_task_decl,
            Artifact::Client => stubs::render_client_method,
            Artifact::Runtime => stubs::render_runtime_method,
        }
    }
}

/// Refresh one module's generated code.
pub fn refresh_module(ctx: &ModuleContext) -> Result<RefreshSummary> {
    let registry = MethodRegistry::load(&ctx.registry_path())?;
    let mut ledger =
        CompileLedger::load_or_bootstrap(&ctx.ledger_path(), &ctx.tasks_header_path(), &registry);
    ledger.reconcile(&registry);

    let methods_header = headers::render_methods_header(ctx.name(), registry.methods())?;
    let methods_header_path = ctx.methods_header_path();
    std::fs::write(&methods_header_path, methods_header)
        .with_context(|| format!("failed to write {}", methods_header_path.display()))?;

    let dispatch_header = headers::render_dispatch_header(ctx.name(), registry.methods());
    let dispatch_header_path = ctx.dispatch_header_path();
    std::fs::write(&dispatch_header_path, dispatch_header)
        .with_context(|| format!("failed to write {}", dispatch_header_path.display()))?;

    let mut summary = RefreshSummary {
        methods: registry.enabled().count(),
        ..RefreshSummary::default()
    };
    for artifact in Artifact::ALL {
        splice_artifact(ctx, &registry, &mut ledger, artifact, &mut summary)?;
    }

    ledger.save(&ctx.ledger_path())?;
    Ok(summary)
}

fn splice_artifact(
    ctx: &ModuleContext,
    registry: &MethodRegistry,
    ledger: &mut CompileLedger,
    artifact: Artifact,
    summary: &mut RefreshSummary,
) -> Result<()> {
    let path = artifact.path(ctx);
    let render = artifact.render();

    // Built-in methods are implemented inside the framework, never by module
    // code, so the splicer treats them like compiled anchors.
    let methods: Vec<SpliceMethod> = registry
        .enabled()
        .map(|m| SpliceMethod {
            name: m.name.clone(),
            compiled: m.is_builtin() || ledger.is_compiled(&m.name),
            stub: render(m),
        })
        .collect();

    // A missing hand-edited file scans as empty: no anchors, no sentinel.
    let content = std::fs::read_to_string(&path).unwrap_or_default();
    let outcome = splice::splice_stubs(&content, &methods)
        .with_context(|| format!("failed to splice {}", path.display()))?;

    if let Some(new_content) = outcome.content {
        std::fs::write(&path, new_content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        for name in &outcome.spliced {
            ledger.mark_compiled(name);
        }
        tracing::debug!(
            "spliced {} stub(s) into {}",
            outcome.spliced.len(),
            path.display()
        );
        summary.stubs_spliced += outcome.spliced.len();
    } else if !outcome.unresolved.is_empty() {
        // No splice point anywhere: leave the hand-edited file untouched and
        // emit a scratch file with stubs for every enabled method instead.
        let scratch_path = artifact.scratch_path(ctx);
        let mut scratch = String::new();
        for method in registry.enabled() {
            scratch.push_str(&render(method));
        }
        std::fs::write(&scratch_path, scratch)
            .with_context(|| format!("failed to write {}", scratch_path.display()))?;
        tracing::debug!(
            "no splice point in {}, wrote {}",
            path.display(),
            scratch_path.display()
        );
        summary.scratch_files += 1;
    }
    Ok(())
}

/// Remove a module's scratch files, if any.
pub fn clear_scratch(ctx: &ModuleContext) -> Result<usize> {
    let mut removed = 0;
    for artifact in Artifact::ALL {
        let path = artifact.scratch_path(ctx);
        match std::fs::remove_file(&path) {
            Ok(()) => removed += 1,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(e).with_context(|| format!("failed to remove {}", path.display()));
            }
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers;

    fn write_module(root: &std::path::Path, registry: &str) -> ModuleContext {
        let ctx = ModuleContext::new(root).unwrap();
        std::fs::create_dir_all(root.join("include").join(ctx.name())).unwrap();
        std::fs::create_dir_all(root.join("src")).unwrap();
        std::fs::write(root.join(kiln_core::module::MOD_FILE), "name: test\n").unwrap();
        std::fs::write(ctx.registry_path(), registry).unwrap();
        for path in [
            ctx.tasks_header_path(),
            ctx.client_header_path(),
            ctx.runtime_source_path(),
        ] {
            std::fs::write(path, format!("{}\n", markers::AUTOGEN)).unwrap();
        }
        ctx
    }

    #[test]
    fn test_refresh_splices_and_persists() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("kv");
        let ctx = write_module(&root, "kCreate: 0\nkPut: 10\n");

        let summary = refresh_module(&ctx).unwrap();
        assert_eq!(summary.methods, 2);
        assert_eq!(summary.stubs_spliced, 3);
        assert_eq!(summary.scratch_files, 0);

        let tasks = std::fs::read_to_string(ctx.tasks_header_path()).unwrap();
        assert!(tasks.contains("struct PutTask"));
        assert!(ctx.methods_header_path().exists());
        assert!(ctx.dispatch_header_path().exists());

        let ledger = CompileLedger::load_or_bootstrap(
            &ctx.ledger_path(),
            &ctx.tasks_header_path(),
            &MethodRegistry::load(&ctx.registry_path()).unwrap(),
        );
        assert!(ledger.is_compiled("kPut"));
    }

    #[test]
    fn test_refresh_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("kv");
        let ctx = write_module(&root, "kCreate: 0\nkPut: 10\n");

        refresh_module(&ctx).unwrap();
        let snapshot: Vec<String> = [
            ctx.tasks_header_path(),
            ctx.client_header_path(),
            ctx.runtime_source_path(),
            ctx.methods_header_path(),
            ctx.dispatch_header_path(),
            ctx.ledger_path(),
        ]
        .iter()
        .map(|p| std::fs::read_to_string(p).unwrap())
        .collect();

        let summary = refresh_module(&ctx).unwrap();
        assert_eq!(summary.stubs_spliced, 0);
        assert_eq!(summary.scratch_files, 0);
        let after: Vec<String> = [
            ctx.tasks_header_path(),
            ctx.client_header_path(),
            ctx.runtime_source_path(),
            ctx.methods_header_path(),
            ctx.dispatch_header_path(),
            ctx.ledger_path(),
        ]
        .iter()
        .map(|p| std::fs::read_to_string(p).unwrap())
        .collect();
        assert_eq!(snapshot, after);
    }

    #[test]
    fn test_refresh_scratch_fallback() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("kv");
        let ctx = write_module(&root, "kPut: 10\n");
        // Strip the sentinels: nowhere to splice in any artifact.
        for path in [
            ctx.tasks_header_path(),
            ctx.client_header_path(),
            ctx.runtime_source_path(),
        ] {
            std::fs::write(path, "// nothing generated here\n").unwrap();
        }

        let before = std::fs::read_to_string(ctx.tasks_header_path()).unwrap();
        let summary = refresh_module(&ctx).unwrap();
        assert_eq!(summary.stubs_spliced, 0);
        assert_eq!(summary.scratch_files, 3);

        let after = std::fs::read_to_string(ctx.tasks_header_path()).unwrap();
        assert_eq!(before, after);
        let scratch = std::fs::read_to_string(ctx.tasks_scratch_path()).unwrap();
        assert!(scratch.contains("struct PutTask"));

        // The unplaced method stays uncompiled so the next pass retries.
        let ledger = CompileLedger::load_or_bootstrap(
            &ctx.ledger_path(),
            &ctx.tasks_header_path(),
            &MethodRegistry::load(&ctx.registry_path()).unwrap(),
        );
        assert!(!ledger.is_compiled("kPut"));

        assert_eq!(clear_scratch(&ctx).unwrap(), 3);
        assert!(!ctx.tasks_scratch_path().exists());
    }

    #[test]
    fn test_refresh_empty_registry_is_loud() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("kv");
        let ctx = write_module(&root, "");
        assert!(refresh_module(&ctx).is_err());
    }
}
