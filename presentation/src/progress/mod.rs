//! Rendering of a submission while it runs

pub mod reporter;
