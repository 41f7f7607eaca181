//! Domain model for FAIR submission preparation projects.
//!
//! # Responsibility
//! - Define canonical project records and the per-tab wizard sections.
//! - Keep field-level validation next to the data it guards.
//!
//! # Invariants
//! - Every project is identified by a stable `ProjectId`.
//! - Archiving is a status change, not a hard delete.

pub mod bundle;
pub mod project;
pub mod sections;
pub mod timestamp;
