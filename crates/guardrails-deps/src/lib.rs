//! # guardrails-deps
//!
//! Dependency boundary analyzer for guardrails.
//!
//! A renamed or aliased package can still resolve to a forbidden platform
//! source, so the boundary is checked at three levels:
//!
//! - [`check_manifest`]: declared dependencies in `package.json`
//! - [`scan_lockfile`]: origin markers in the raw `pnpm-lock.yaml` text
//! - [`DependencyGraph::violations`]: every resolved node, at any depth,
//!   reached from a workspace root
//!
//! [`BoundaryAnalyzer`] ties the three together into a [`BoundaryReport`].
//! The resolved graph comes from a [`GraphSource`]: [`PnpmCli`] asks the
//! package manager, [`GraphFile`] reads a saved `pnpm list --json` document.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod analyzer;
pub mod graph;
pub mod lockfile;
pub mod manifest;
pub mod pnpm;
pub mod spec;

pub use analyzer::{BoundaryAnalyzer, BoundaryReport, FAMILY};
pub use graph::{DependencyGraph, GraphViolation, NodeId, PackageNode};
pub use lockfile::{scan_lockfile, LockfileScan, OriginHit};
pub use manifest::{check_manifest, resolve_alias, ManifestHit, ManifestHitKind, DEPENDENCY_BLOCKS};
pub use pnpm::{ChainExplainer, GraphFile, GraphSource, PnpmCli};
pub use spec::{BoundarySpec, DOC_POINTER, RULE_ID, TITLE};
