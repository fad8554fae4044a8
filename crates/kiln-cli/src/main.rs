//! CLI binary for kiln-modgen: scaffold module repositories and keep their
//! generated code synchronized with the method registries.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kiln_core::ledger::CompileLedger;
use kiln_core::module::ModuleContext;
use kiln_core::registry::MethodRegistry;
use kiln_core::repo;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "kiln-modgen", about = "Code generator for Kiln task modules")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a module repository
    MakeRepo {
        /// Repository directory to create
        dir: PathBuf,

        /// CMake namespace for the repository's modules
        #[arg(short, long)]
        namespace: String,
    },

    /// Bootstrap a module directory from the embedded template tree
    MakeMod {
        /// Module root directory (base name becomes the module name)
        root: PathBuf,

        /// Overwrite an already-bootstrapped module
        #[arg(long)]
        force: bool,
    },

    /// Regenerate headers and splice new method stubs for one module
    Refresh {
        /// Module root directory
        root: PathBuf,
    },

    /// Refresh every module in a repository, then its CMake lists
    RefreshRepo {
        /// Repository directory
        dir: PathBuf,
    },

    /// Rewrite the repository CMakeLists from its module directories
    RefreshCmake {
        /// Repository directory
        dir: PathBuf,

        /// Namespace override (defaults to the repo config)
        #[arg(short, long)]
        namespace: Option<String>,
    },

    /// Show a module's reconciled compile ledger
    Status {
        /// Module root directory
        root: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert a file into a C preprocessor macro on stdout
    MakeMacro {
        /// File to convert (basename becomes the macro name)
        path: PathBuf,
    },

    /// Embed the default client/server configs as C string headers
    MakeConfig {
        /// Kiln framework root (reads config/, writes include/kiln/config/)
        root: PathBuf,
    },

    /// Remove scratch files left by refreshes without a splice point
    ClearTemp {
        /// Repository directory
        dir: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::MakeRepo { dir, namespace } => cmd_make_repo(&dir, &namespace),
        Commands::MakeMod { root, force } => cmd_make_mod(&root, force),
        Commands::Refresh { root } => cmd_refresh(&root),
        Commands::RefreshRepo { dir } => cmd_refresh_repo(&dir),
        Commands::RefreshCmake { dir, namespace } => {
            kiln_gen::cmake::refresh_repo_cmake(&dir, namespace.as_deref())
        }
        Commands::Status { root, json } => cmd_status(&root, json),
        Commands::MakeMacro { path } => cmd_make_macro(&path),
        Commands::MakeConfig { root } => kiln_gen::embed::embed_default_configs(&root),
        Commands::ClearTemp { dir } => cmd_clear_temp(&dir),
    }
}

fn cmd_make_repo(dir: &Path, namespace: &str) -> Result<()> {
    kiln_gen::scaffold::make_repo(dir, namespace)?;
    eprintln!("Created module repository at {}", dir.display());
    Ok(())
}

fn cmd_make_mod(root: &Path, force: bool) -> Result<()> {
    kiln_gen::scaffold::make_mod(root, force)?;
    let ctx = ModuleContext::new(root)?;
    eprintln!("Bootstrapped module {} at {}", ctx.name(), root.display());
    Ok(())
}

fn cmd_refresh(root: &Path) -> Result<()> {
    let ctx = ModuleContext::new(root)?;
    let summary = kiln_gen::refresh_module(&ctx)
        .with_context(|| format!("failed to refresh module {}", ctx.name()))?;
    eprintln!(
        "{}: {} method(s), {} stub(s) spliced, {} scratch file(s)",
        ctx.name(),
        summary.methods,
        summary.stubs_spliced,
        summary.scratch_files
    );
    Ok(())
}

fn cmd_refresh_repo(dir: &Path) -> Result<()> {
    let modules = repo::list_modules(dir)?;
    eprintln!("Refreshing {} module(s) in {}", modules.len(), dir.display());

    // One broken module must not block the rest of the repository.
    for module_root in &modules {
        let result = ModuleContext::new(module_root).and_then(|ctx| {
            let summary = kiln_gen::refresh_module(&ctx)?;
            eprintln!(
                "  {}: {} stub(s) spliced, {} scratch file(s)",
                ctx.name(),
                summary.stubs_spliced,
                summary.scratch_files
            );
            Ok(())
        });
        if let Err(e) = result {
            tracing::warn!("skipping module {}: {:#}", module_root.display(), e);
        }
    }

    kiln_gen::cmake::refresh_repo_cmake(dir, None)
}

fn cmd_status(root: &Path, json: bool) -> Result<()> {
    let ctx = ModuleContext::new(root)?;
    let registry = MethodRegistry::load(&ctx.registry_path())?;
    let mut ledger =
        CompileLedger::load_or_bootstrap(&ctx.ledger_path(), &ctx.tasks_header_path(), &registry);
    ledger.reconcile(&registry);

    if json {
        let entries: BTreeMap<&str, _> = ledger.sorted().into_iter().collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        println!("{} ({} method(s))", ctx.name(), ledger.len());
        for (name, status) in ledger.sorted() {
            let state = if status.compiled { "compiled" } else { "pending" };
            println!("  {:>4}  {name}  {state}", status.id);
        }
    }
    Ok(())
}

fn cmd_make_macro(path: &Path) -> Result<()> {
    print!("{}", kiln_gen::embed::make_macro(path)?);
    Ok(())
}

fn cmd_clear_temp(dir: &Path) -> Result<()> {
    let mut removed = 0;
    for module_root in repo::list_modules(dir)? {
        let ctx = ModuleContext::new(&module_root)?;
        removed += kiln_gen::clear_scratch(&ctx)?;
    }
    eprintln!("Removed {removed} scratch file(s)");
    Ok(())
}
