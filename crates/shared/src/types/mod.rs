//! Shared value types used across crates.

pub mod id;

pub use id::{AccountId, TransactionId, TransactionLineId, UserId, VendorId};
