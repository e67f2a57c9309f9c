//! Prompt domain
//!
//! The fixed assistant persona and the localized texts shown to the user.

mod persona;

pub use persona::{FallbackText, Persona};
