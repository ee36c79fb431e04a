//! # jet_core
//!
//! Core domain logic for Jet.

pub mod auth;
pub mod clock;
pub mod migrate;
pub mod models;
pub mod repo;
pub mod seed;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
