//! CLI command implementations.

pub mod config;
pub mod stamp;
pub mod theme;
