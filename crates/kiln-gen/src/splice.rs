//! Marker-based stub splicing into hand-edited source.
//!
//! Given a hand-edited file and the id-sorted method list, insert a stub for
//! every uncompiled method at the right anchor point:
//!
//! - immediately after the end marker of the preceding method, or
//! - chained onto a stub already pending for the preceding method (several
//!   newly declared methods land consecutively off one anchor, since none of
//!   them has an end marker of its own yet), or
//! - immediately before the autogen sentinel.
//!
//! Pending insertions are batched into [`InsertionGroup`]s and committed in
//! descending anchor order, so line numbers computed against the original
//! content stay valid throughout the commit. If no stub can be placed the
//! content is left untouched and the caller falls back to a scratch file.

use crate::markers;
use std::collections::{BTreeMap, HashMap};

/// Errors from marker scanning. These are contract violations in the
/// hand-edited file; erroring beats silently misplacing code.
#[derive(Debug, thiserror::Error)]
pub enum SpliceError {
    #[error("duplicate end marker for {name} (lines {first} and {second})")]
    DuplicateEndMarker {
        name: String,
        first: usize,
        second: usize,
    },
    #[error("multiple autogen sentinels (lines {first} and {second})")]
    MultipleSentinels { first: usize, second: usize },
}

/// Marker positions scanned from one file. Rebuilt on every pass.
#[derive(Debug, Default)]
pub struct MarkerSet {
    /// Method name -> zero-based line index of its end marker.
    pub end_lines: BTreeMap<String, usize>,
    /// Zero-based line index of the autogen sentinel, if present.
    pub sentinel: Option<usize>,
}

/// Scan lines for end markers and the sentinel.
pub fn scan_markers(lines: &[&str]) -> Result<MarkerSet, SpliceError> {
    let mut set = MarkerSet::default();
    for (index, line) in lines.iter().enumerate() {
        if let Some(name) = markers::parse_end(line) {
            if let Some(&first) = set.end_lines.get(name) {
                return Err(SpliceError::DuplicateEndMarker {
                    name: name.to_string(),
                    first: first + 1,
                    second: index + 1,
                });
            }
            set.end_lines.insert(name.to_string(), index);
        } else if markers::is_autogen(line) {
            if let Some(first) = set.sentinel {
                return Err(SpliceError::MultipleSentinels {
                    first: first + 1,
                    second: index + 1,
                });
            }
            set.sentinel = Some(index);
        }
    }
    Ok(set)
}

/// One method as seen by the splicer: name, current compile status, and the
/// rendered stub to insert if the method is uncompiled.
#[derive(Debug, Clone)]
pub struct SpliceMethod {
    pub name: String,
    pub compiled: bool,
    pub stub: String,
}

/// Result of one splice pass.
#[derive(Debug, Default)]
pub struct SpliceOutcome {
    /// The mutated file content, if at least one stub was placed.
    pub content: Option<String>,
    /// Methods whose stubs were placed, in id order.
    pub spliced: Vec<String>,
    /// Uncompiled methods with no usable anchor this pass.
    pub unresolved: Vec<String>,
}

/// A batch of stub lines pending insertion at one anchor line.
struct InsertionGroup<'a> {
    anchor: usize,
    lines: Vec<&'a str>,
}

/// Where an already-processed method can anchor its successor.
#[derive(Clone, Copy)]
enum Anchor {
    /// A real end marker scanned from the file.
    Line(usize),
    /// A stub pending in the given insertion group.
    Pending(usize),
}

/// Splice stubs for uncompiled methods into `content`.
///
/// `methods` must be the id-sorted, disabled-filtered method list for the
/// artifact. Returns the mutated content when at least one stub was placed;
/// otherwise `content` is reported unchanged and `unresolved` lists the
/// methods a scratch file should cover.
pub fn splice_stubs<'a>(
    content: &'a str,
    methods: &'a [SpliceMethod],
) -> Result<SpliceOutcome, SpliceError> {
    let mut lines: Vec<&str> = content.split('\n').collect();
    let marker_set = scan_markers(&lines)?;

    let mut anchors: HashMap<&str, Anchor> = marker_set
        .end_lines
        .iter()
        .map(|(name, &line)| (name.as_str(), Anchor::Line(line)))
        .collect();
    let mut groups: Vec<InsertionGroup<'a>> = Vec::new();
    let mut outcome = SpliceOutcome::default();

    for (index, method) in methods.iter().enumerate() {
        if method.compiled {
            continue;
        }
        let prior = index
            .checked_sub(1)
            .and_then(|i| anchors.get(methods[i].name.as_str()))
            .copied();
        match prior {
            Some(Anchor::Line(line)) => {
                groups.push(InsertionGroup {
                    anchor: line + 1,
                    lines: stub_lines(&method.stub),
                });
                anchors.insert(&method.name, Anchor::Pending(groups.len() - 1));
            }
            Some(Anchor::Pending(group)) => {
                // The prior method's stub has not been committed yet, so this
                // stub rides along in the same batch instead of computing a
                // fresh (and stale) anchor.
                groups[group].lines.extend(stub_lines(&method.stub));
                anchors.insert(&method.name, Anchor::Pending(group));
            }
            None => {
                let Some(sentinel) = marker_set.sentinel else {
                    outcome.unresolved.push(method.name.clone());
                    continue;
                };
                groups.push(InsertionGroup {
                    anchor: sentinel,
                    lines: stub_lines(&method.stub),
                });
                anchors.insert(&method.name, Anchor::Pending(groups.len() - 1));
            }
        }
        outcome.spliced.push(method.name.clone());
    }

    if outcome.spliced.is_empty() {
        return Ok(outcome);
    }

    // Commit highest anchor first so earlier-computed anchors stay valid.
    // Groups sharing an anchor (several sentinel fallbacks) commit in reverse
    // creation order, which keeps the final text in id order.
    let mut order: Vec<usize> = (0..groups.len()).collect();
    order.sort_by(|&a, &b| (groups[b].anchor, b).cmp(&(groups[a].anchor, a)));
    for group_index in order {
        let group = &groups[group_index];
        lines.splice(group.anchor..group.anchor, group.lines.iter().copied());
    }
    outcome.content = Some(lines.join("\n"));
    Ok(outcome)
}

fn stub_lines(stub: &str) -> Vec<&str> {
    stub.strip_suffix('\n').unwrap_or(stub).split('\n').collect()
}
