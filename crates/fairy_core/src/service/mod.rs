//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep the CLI decoupled from storage details.

pub mod error;
pub mod export;
pub mod project_service;
pub mod readiness;
pub mod sample_import;
pub mod wizard_service;
