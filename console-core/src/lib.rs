//! console-core: Shared infrastructure for the admin console crates.
pub mod config;
pub mod observability;
