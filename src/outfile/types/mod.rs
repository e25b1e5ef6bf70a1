//! Foundational data structures, error types and dialect profiles.

pub mod error;
pub mod models;
pub mod profile;
pub mod results;
