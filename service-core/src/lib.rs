//! service-core: Shared infrastructure for the order engine workspace.
pub mod config;
pub mod error;
pub mod observability;
