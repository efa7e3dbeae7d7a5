//! Ledger domain logic.
//!
//! This module implements the write-path core:
//! - Reference resolution (identifier parsing and lookup requirements)
//! - Line and header validation with the debit/credit posting rule
//! - Sequence code formatting and allocation
//! - Error types for all ledger operations

pub mod error;
pub mod resolver;
pub mod sequence;
pub mod types;
pub mod validation;

#[cfg(test)]
mod posting_props;

pub use error::LedgerError;
pub use resolver::{parse_reference, require_found, EntityKind};
pub use sequence::{
    AllocatedCode, Counter, CounterStore, SequenceAllocator, TRANSACTION_SEQ_KEY, TRANSACTION_TAG,
};
pub use types::{
    AccountRef, AccountType, HeaderDraft, LineDraft, PostedHeader, PostedLine, TransactionState,
};
pub use validation::{coerce_amount, validate_header, validate_line};
