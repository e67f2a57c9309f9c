//! Core domain concepts shared across all subdomains.
//!
//! - [`model::Model`] - available Gemini models
//! - [`error::DomainError`] - domain-level errors

pub mod error;
pub mod model;
pub mod string;
