//! Core business logic for Ledgerbook.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. All domain types, validation rules, and query compilation
//! live here.
//!
//! # Modules
//!
//! - `ledger` - Reference resolution, double-entry posting validation, and
//!   sequence code allocation
//! - `query` - Engine-independent retrieval plans, the query compiler, and
//!   the report aggregator

pub mod ledger;
pub mod query;
