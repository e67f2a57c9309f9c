//! Terminal output formatting

pub mod console;
pub mod markdown;
