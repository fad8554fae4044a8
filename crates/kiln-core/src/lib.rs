//! Core types and persistence for kiln-modgen.
//!
//! Provides the method registry ([`registry::MethodRegistry`]), the persisted
//! compile-status ledger ([`ledger::CompileLedger`]), name derivation helpers,
//! the per-module path context, and the repo-level configuration.

pub mod ledger;
pub mod module;
pub mod naming;
pub mod registry;
pub mod repo;
