//! # kiln-gen
//!
//! Code generation for Kiln task modules.
//!
//! This crate turns a module's method registry into source artifacts and
//! keeps hand-edited files synchronized as methods are added:
//!
//! - **Emitters**: render the method-id header and the dispatch-table header
//!   from the sorted method list (pure, stateless)
//! - **Stubs**: render per-method skeletons for the three hand-edited
//!   artifacts (task declaration, client wrapper, runtime handler pair)
//! - **Splicer**: insert stubs for newly declared methods into hand-edited
//!   files at marker-delimited anchor points, without clobbering prior edits
//! - **Refresh driver**: one full synchronization pass per module
//! - **Scaffolding**: repo and module bootstrap, CMake lists, macro/config
//!   embedding

pub mod cmake;
pub mod embed;
pub mod headers;
pub mod markers;
pub mod refresh;
pub mod scaffold;
pub mod splice;
pub mod stubs;

pub use headers::{EmitError, render_dispatch_header, render_methods_header};
pub use refresh::{RefreshSummary, clear_scratch, refresh_module};
pub use splice::{MarkerSet, SpliceError, SpliceMethod, SpliceOutcome, splice_stubs};
