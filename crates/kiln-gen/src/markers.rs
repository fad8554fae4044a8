//! The marker grammar for hand-edited files.
//!
//! The splicer locates insertion points through line-oriented comment tokens
//! rather than parsing the generated C++. The grammar is a contract:
//!
//! - `// kiln:begin(<name>)` opens a method's region
//! - `// kiln:end(<name>)` closes it; end markers are the splice anchors
//! - `// kiln:autogen` is the end-of-autogenerated-section sentinel and must
//!   appear at most once per file
//!
//! `<name>` is the registry method name (`kCreate`). Markers are matched
//! after trimming surrounding whitespace, so they may sit at any indent.
//! A method's end marker is expected to follow its declaration; the scan
//! does not verify that ordering.

/// The end-of-autogenerated-section sentinel.
pub const AUTOGEN: &str = "// kiln:autogen";

const END_PREFIX: &str = "// kiln:end(";

/// Render the begin marker for a method.
pub fn begin(method: &str) -> String {
    format!("// kiln:begin({method})")
}

/// Render the end marker for a method.
pub fn end(method: &str) -> String {
    format!("// kiln:end({method})")
}

/// Parse a line as an end marker, returning the method name.
pub fn parse_end(line: &str) -> Option<&str> {
    line.trim().strip_prefix(END_PREFIX)?.strip_suffix(')')
}

/// Whether a line is the autogen sentinel.
pub fn is_autogen(line: &str) -> bool {
    line.trim() == AUTOGEN
}
