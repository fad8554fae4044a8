//! Name derivations for generated code.
//!
//! Registry method names use the framework's enum constant convention
//! (`kCreate`). Everything else is derived mechanically: the display name
//! drops the `k` prefix, the task type appends `Task`.

/// Display name of a method: the registry name with the `k` prefix dropped.
///
/// A name without the prefix is returned unchanged.
pub fn display_name(method: &str) -> &str {
    method.strip_prefix('k').unwrap_or(method)
}

/// Concrete task type for a method (`kCreate` -> `CreateTask`).
pub fn task_type(method: &str) -> String {
    format!("{}Task", display_name(method))
}

/// Registry name for a task type scanned out of hand-edited source
/// (`CreateTask` -> `kCreate`). Returns `None` for non-task type names.
pub fn method_for_task_type(task_type: &str) -> Option<String> {
    let base = task_type.strip_suffix("Task")?;
    if base.is_empty() {
        return None;
    }
    Some(format!("k{base}"))
}

/// Convert a snake_case identifier to CamelCase (`mod_repo` -> `ModRepo`).
pub fn to_camel_case(name: &str) -> String {
    name.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}
