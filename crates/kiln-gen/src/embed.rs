//! Embed file contents into C sources: preprocessor macros and default
//! configuration string headers.

use anyhow::{Context, Result, bail};
use std::fmt::Write;
use std::path::Path;

/// Derive a macro name from a file path: basename before the first dot,
/// uppercased.
pub fn macro_name_for(path: &Path) -> Result<String> {
    let Some(stem) = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.split('.').next())
        .filter(|s| !s.is_empty())
    else {
        bail!("cannot derive a macro name from {}", path.display());
    };
    Ok(stem.to_uppercase())
}

/// Render file contents as a multi-line C preprocessor macro.
pub fn render_macro(macro_name: &str, source: &str) -> String {
    let mut out = format!("#define {macro_name} \\\n");
    out.push_str(&source.lines().collect::<Vec<_>>().join(" \\\n"));
    out.push('\n');
    out
}

/// Convert the file at `path` into a C macro named after it.
pub fn make_macro(path: &Path) -> Result<String> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(render_macro(&macro_name_for(path)?, &source))
}

/// Render a YAML config as a `const inline char *` string header.
pub fn render_config_header(var_name: &str, guard: &str, yaml: &str) -> String {
    let mut out = String::new();
    writeln!(out, "#ifndef {guard}").unwrap();
    writeln!(out, "#define {guard}").unwrap();
    writeln!(out, "const inline char *{var_name} =").unwrap();
    let lines: Vec<&str> = yaml.lines().collect();
    if lines.is_empty() {
        writeln!(out, "  \"\";").unwrap();
    } else {
        for (index, line) in lines.iter().enumerate() {
            let escaped = line.replace('\\', "\\\\").replace('"', "\\\"");
            let terminator = if index + 1 == lines.len() { ";" } else { "" };
            writeln!(out, "  \"{escaped}\\n\"{terminator}").unwrap();
        }
    }
    writeln!(out, "#endif  // {guard}").unwrap();
    out
}

/// Embed the framework's default client and server configs as string headers
/// under `root`.
pub fn embed_default_configs(root: &Path) -> Result<()> {
    embed_config(
        root,
        "kiln_client_default.yaml",
        "client_default.h",
        "kKilnClientDefaultConfigStr",
        "KILN_CONFIG_CLIENT_DEFAULT_H_",
    )?;
    embed_config(
        root,
        "kiln_server_default.yaml",
        "server_default.h",
        "kKilnServerDefaultConfigStr",
        "KILN_CONFIG_SERVER_DEFAULT_H_",
    )?;
    Ok(())
}

fn embed_config(
    root: &Path,
    config_file: &str,
    header_file: &str,
    var_name: &str,
    guard: &str,
) -> Result<()> {
    let config_path = root.join("config").join(config_file);
    let yaml = std::fs::read_to_string(&config_path)
        .with_context(|| format!("failed to read {}", config_path.display()))?;

    let header_dir = root.join("include").join("kiln").join("config");
    std::fs::create_dir_all(&header_dir)
        .with_context(|| format!("failed to create {}", header_dir.display()))?;
    let header_path = header_dir.join(header_file);
    std::fs::write(&header_path, render_config_header(var_name, guard, &yaml))
        .with_context(|| format!("failed to write {}", header_path.display()))?;
    Ok(())
}
