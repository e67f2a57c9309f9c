//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure and presentation adapters
//! must implement.

pub mod credentials;
pub mod llm_gateway;
pub mod observer;
