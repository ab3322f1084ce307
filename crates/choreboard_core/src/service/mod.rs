//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep API/UI layers decoupled from storage details.

pub mod assignment_service;
pub mod category_service;
pub mod scoring_service;
pub mod template_service;
