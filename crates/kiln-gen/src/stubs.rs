//! Per-method stub texts for the three hand-edited artifacts.
//!
//! Stubs are fixed templates with the method's names substituted in. Every
//! stub carries its own begin/end markers so the splicer can anchor later
//! insertions off it, and starts with a blank separator line.

use kiln_core::naming;
use kiln_core::registry::MethodDef;

const TASK_DECL_TEMPLATE: &str = include_str!("templates/task_decl.h.in");
const CLIENT_METHOD_TEMPLATE: &str = include_str!("templates/client_method.h.in");
const RUNTIME_METHOD_TEMPLATE: &str = include_str!("templates/runtime_method.cc.in");

/// Render the task type declaration stub for the tasks header.
pub fn render_task_decl(method: &MethodDef) -> String {
    fill(TASK_DECL_TEMPLATE, method)
}

/// Render the client wrapper stub for the client header.
pub fn render_client_method(method: &MethodDef) -> String {
    fill(CLIENT_METHOD_TEMPLATE, method)
}

/// Render the runtime handler pair stub for the runtime source.
pub fn render_runtime_method(method: &MethodDef) -> String {
    fill(RUNTIME_METHOD_TEMPLATE, method)
}

fn fill(template: &str, method: &MethodDef) -> String {
    template
        .replace("@TASK@", &naming::task_type(&method.name))
        .replace("@METHOD@", naming::display_name(&method.name))
        .replace("@ENUM@", &method.name)
}
