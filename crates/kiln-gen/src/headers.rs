//! Render the generated headers: the method-id enumeration and the
//! dispatch-table bodies.
//!
//! Both renderers are pure functions over the id-sorted method list. The
//! dispatch header is included inside the module's server class body and
//! overrides the framework's nine task operations with one switch case per
//! enabled method.

use kiln_core::naming;
use kiln_core::registry::{FIRST_USER_ID, MethodDef};
use std::fmt::Write;

/// Errors from header emission.
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("module {module} has no enabled methods to enumerate")]
    NoMethods { module: String },
}

fn include_guard(module: &str, kind: &str) -> String {
    format!("KILN_{}_{}_H_", module.to_uppercase(), kind)
}

/// Render the method-id header: one constant per user method (ids below the
/// user range are implicit), plus the trailing `kCount` sentinel.
pub fn render_methods_header(module: &str, methods: &[MethodDef]) -> Result<String, EmitError> {
    let enabled: Vec<&MethodDef> = methods.iter().filter(|m| !m.is_disabled()).collect();
    let Some(last) = enabled.last() else {
        return Err(EmitError::NoMethods {
            module: module.to_string(),
        });
    };

    let guard = include_guard(module, "METHODS");
    let mut out = String::new();
    writeln!(out, "#ifndef {guard}").unwrap();
    writeln!(out, "#define {guard}").unwrap();
    writeln!(out).unwrap();
    writeln!(out, "/** The set of methods in the {module} module */").unwrap();
    writeln!(out, "struct Method : public TaskMethod {{").unwrap();
    for method in &enabled {
        if method.id < FIRST_USER_ID {
            continue;
        }
        writeln!(out, "  TASK_METHOD_T {} = {};", method.name, method.id).unwrap();
    }
    writeln!(out, "  TASK_METHOD_T kCount = {};", last.id + 1).unwrap();
    writeln!(out, "}};").unwrap();
    writeln!(out).unwrap();
    writeln!(out, "#endif  // {guard}").unwrap();
    Ok(out)
}

/// Render the dispatch header: the nine task operations, each a switch with
/// one case per enabled method, casting the generic task handle to the
/// method's concrete task type.
pub fn render_dispatch_header(module: &str, methods: &[MethodDef]) -> String {
    let enabled: Vec<&MethodDef> = methods.iter().filter(|m| !m.is_disabled()).collect();

    let guard = include_guard(module, "DISPATCH");
    let mut out = String::new();
    writeln!(out, "#ifndef {guard}").unwrap();
    writeln!(out, "#define {guard}").unwrap();
    writeln!(out).unwrap();

    write_switch(
        &mut out,
        "/** Execute a task */",
        "void Run(u32 method, Task *task, RunContext &rctx) override {",
        &enabled,
        |out, display, task_type| {
            writeln!(
                out,
                "      Method{display}(reinterpret_cast<{task_type} *>(task), rctx);"
            )
            .unwrap();
        },
    );

    write_switch(
        &mut out,
        "/** Monitor a task */",
        "void Monitor(MonitorModeId mode, u32 method, Task *task, RunContext &rctx) override {",
        &enabled,
        |out, display, task_type| {
            writeln!(
                out,
                "      Monitor{display}(mode, reinterpret_cast<{task_type} *>(task), rctx);"
            )
            .unwrap();
        },
    );

    write_switch(
        &mut out,
        "/** Delete a task */",
        "void Del(u32 method, Task *task) override {",
        &enabled,
        |out, _display, task_type| {
            writeln!(
                out,
                "      KILN_CLIENT->DelTask<{task_type}>(reinterpret_cast<{task_type} *>(task));"
            )
            .unwrap();
        },
    );

    write_switch(
        &mut out,
        "/** Duplicate a task into an existing allocation */",
        "void CopyStart(u32 method, const Task *orig_task, Task *dup_task, bool deep) override {",
        &enabled,
        |out, _display, task_type| {
            writeln!(out, "      kiln::CALL_COPY_START(").unwrap();
            writeln!(
                out,
                "        reinterpret_cast<const {task_type} *>(orig_task),"
            )
            .unwrap();
            writeln!(
                out,
                "        reinterpret_cast<{task_type} *>(dup_task), deep);"
            )
            .unwrap();
        },
    );

    write_switch(
        &mut out,
        "/** Duplicate a task into a new allocation */",
        "void NewCopyStart(u32 method, const Task *orig_task, FullPtr<Task> &dup_task, bool deep) override {",
        &enabled,
        |out, _display, task_type| {
            writeln!(
                out,
                "      kiln::CALL_NEW_COPY_START(reinterpret_cast<const {task_type} *>(orig_task), dup_task, deep);"
            )
            .unwrap();
        },
    );

    write_switch(
        &mut out,
        "/** Serialize a task when pushing to a remote node */",
        "void SaveStart(u32 method, BinaryOutputArchive<true> &ar, Task *task) override {",
        &enabled,
        |out, _display, task_type| {
            writeln!(out, "      ar << *reinterpret_cast<{task_type} *>(task);").unwrap();
        },
    );

    // LoadStart also allocates the fresh task instance, so it carries a
    // prologue and a return value the generic switch helper cannot express.
    writeln!(out, "/** Deserialize a task when popping from a remote node */").unwrap();
    writeln!(
        out,
        "TaskPointer LoadStart(u32 method, BinaryInputArchive<true> &ar) override {{"
    )
    .unwrap();
    writeln!(out, "  TaskPointer task_ptr;").unwrap();
    writeln!(out, "  switch (method) {{").unwrap();
    for method in &enabled {
        let task_type = naming::task_type(&method.name);
        writeln!(out, "    case Method::{}: {{", method.name).unwrap();
        writeln!(
            out,
            "      task_ptr.ptr_ = KILN_CLIENT->NewEmptyTask<{task_type}>(task_ptr.shm_);"
        )
        .unwrap();
        writeln!(
            out,
            "      ar >> *reinterpret_cast<{task_type} *>(task_ptr.ptr_);"
        )
        .unwrap();
        writeln!(out, "      break;").unwrap();
        writeln!(out, "    }}").unwrap();
    }
    writeln!(out, "  }}").unwrap();
    writeln!(out, "  return task_ptr;").unwrap();
    writeln!(out, "}}").unwrap();

    write_switch(
        &mut out,
        "/** Serialize a task when returning to the caller */",
        "void SaveEnd(u32 method, BinaryOutputArchive<false> &ar, Task *task) override {",
        &enabled,
        |out, _display, task_type| {
            writeln!(out, "      ar << *reinterpret_cast<{task_type} *>(task);").unwrap();
        },
    );

    write_switch(
        &mut out,
        "/** Deserialize a task when returning to the caller */",
        "void LoadEnd(u32 method, BinaryInputArchive<false> &ar, Task *task) override {",
        &enabled,
        |out, _display, task_type| {
            writeln!(out, "      ar >> *reinterpret_cast<{task_type} *>(task);").unwrap();
        },
    );

    writeln!(out).unwrap();
    writeln!(out, "#endif  // {guard}").unwrap();
    out
}

/// Write one dispatch operation: doc line, signature, and a switch with one
/// case per method. The case body receives the display name and task type.
fn write_switch(
    out: &mut String,
    doc: &str,
    signature: &str,
    methods: &[&MethodDef],
    case_body: impl Fn(&mut String, &str, &str),
) {
    writeln!(out, "{doc}").unwrap();
    writeln!(out, "{signature}").unwrap();
    writeln!(out, "  switch (method) {{").unwrap();
    for method in methods {
        let task_type = naming::task_type(&method.name);
        writeln!(out, "    case Method::{}: {{", method.name).unwrap();
        case_body(out, naming::display_name(&method.name), &task_type);
        writeln!(out, "      break;").unwrap();
        writeln!(out, "    }}").unwrap();
    }
    writeln!(out, "  }}").unwrap();
    writeln!(out, "}}").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn methods(items: &[(&str, i32)]) -> Vec<MethodDef> {
        items
            .iter()
            .map(|(name, id)| MethodDef {
                name: (*name).to_string(),
                id: *id,
            })
            .collect()
    }

    #[test]
    fn test_methods_header_completeness() {
        let methods = methods(&[("kCreate", 10), ("kDestroy", 11), ("kRead", 12)]);
        let header = render_methods_header("kv_store", &methods).unwrap();
        assert!(header.contains("TASK_METHOD_T kCreate = 10;"));
        assert!(header.contains("TASK_METHOD_T kDestroy = 11;"));
        assert!(header.contains("TASK_METHOD_T kRead = 12;"));
        assert!(header.contains("TASK_METHOD_T kCount = 13;"));
        assert!(header.contains("#ifndef KILN_KV_STORE_METHODS_H_"));
        // Exactly three constants plus the count sentinel.
        assert_eq!(header.matches("TASK_METHOD_T").count(), 4);
    }

    #[test]
    fn test_methods_header_hides_builtin_ids() {
        let methods = methods(&[("kCreate", 0), ("kFlush", 5), ("kPut", 10)]);
        let header = render_methods_header("kv_store", &methods).unwrap();
        assert!(!header.contains("kCreate = 0"));
        assert!(!header.contains("kFlush"));
        assert!(header.contains("TASK_METHOD_T kPut = 10;"));
        assert!(header.contains("TASK_METHOD_T kCount = 11;"));
    }

    #[test]
    fn test_methods_header_empty_is_error() {
        let err = render_methods_header("kv_store", &[]).unwrap_err();
        assert!(matches!(err, EmitError::NoMethods { .. }));
        // All-disabled counts as empty too.
        let disabled = methods(&[("kOld", -1)]);
        assert!(render_methods_header("kv_store", &disabled).is_err());
    }

    #[test]
    fn test_dispatch_case_count() {
        let methods = methods(&[("kCreate", 10), ("kDestroy", 11), ("kRead", 12)]);
        let header = render_dispatch_header("kv_store", &methods);
        // 9 operations x 3 methods.
        assert_eq!(header.matches("case Method::").count(), 27);
        assert_eq!(header.matches("case Method::kRead:").count(), 9);
    }

    #[test]
    fn test_dispatch_excludes_disabled() {
        let methods = methods(&[("kOld", -1), ("kPut", 10)]);
        let header = render_dispatch_header("kv_store", &methods);
        assert!(!header.contains("kOld"));
        assert_eq!(header.matches("case Method::kPut:").count(), 9);
    }

    #[test]
    fn test_dispatch_derived_names() {
        let methods = methods(&[("kPut", 10)]);
        let header = render_dispatch_header("kv_store", &methods);
        assert!(header.contains("MethodPut(reinterpret_cast<PutTask *>(task), rctx);"));
        assert!(header.contains("MonitorPut(mode, reinterpret_cast<PutTask *>(task), rctx);"));
        assert!(header.contains("KILN_CLIENT->NewEmptyTask<PutTask>(task_ptr.shm_);"));
    }
}
