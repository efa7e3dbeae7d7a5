//! Shared types and configuration for Ledgerbook.
//!
//! This crate holds the pieces every other crate needs:
//! - Typed entity identifiers
//! - Configuration loading

pub mod config;
pub mod types;

pub use config::AppConfig;
