//! Ledger domain types for transaction creation and validation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ledgerbook_shared::types::{AccountId, TransactionId, UserId, VendorId};

/// Account classification.
///
/// The account type decides which side of a line carries the amount:
/// income accounts post to the debit side, expense accounts to the credit
/// side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Income account - lines post on the debit side.
    Income,
    /// Expense account - lines post on the credit side.
    Expense,
}

impl AccountType {
    /// Parses an account type from its wire representation.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }

    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

/// Transaction lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionState {
    /// Transaction is being drafted.
    Draft,
    /// Transaction has been posted to the ledger.
    Posted,
    /// Transaction has been cancelled.
    Cancel,
}

impl TransactionState {
    /// Parses a state from its wire representation.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "draft" => Some(Self::Draft),
            "posted" => Some(Self::Posted),
            "cancel" => Some(Self::Cancel),
            _ => None,
        }
    }

    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Posted => "posted",
            Self::Cancel => "cancel",
        }
    }
}

impl Default for TransactionState {
    fn default() -> Self {
        Self::Posted
    }
}

/// The slice of an account record the validator needs.
///
/// The account type is read at write time, never cached on the line.
#[derive(Debug, Clone, Copy)]
pub struct AccountRef {
    /// The account ID.
    pub id: AccountId,
    /// The account's current type.
    pub account_type: AccountType,
}

/// Raw field set for a transaction line, exactly as the caller supplied it.
///
/// Identifiers arrive as unvalidated strings and amounts as raw JSON values;
/// validation turns this into a [`PostedLine`] or fails with the first unmet
/// precondition.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineDraft {
    /// Line date.
    pub date: Option<DateTime<Utc>>,
    /// Optional free-form label.
    pub label: Option<String>,
    /// Referenced account identifier.
    pub account_id: Option<String>,
    /// Owning transaction identifier.
    pub transaction_id: Option<String>,
    /// Optional counterparty identifier.
    pub vendor_id: Option<String>,
    /// Authoring user identifier.
    pub user_id: Option<String>,
    /// Client-supplied debit amount (number or numeric string).
    pub debit: Option<serde_json::Value>,
    /// Client-supplied credit amount (number or numeric string).
    pub credit: Option<serde_json::Value>,
}

/// Raw field set for a transaction header.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderDraft {
    /// Transaction date.
    pub date: Option<DateTime<Utc>>,
    /// Authoring user identifier.
    pub user_id: Option<String>,
    /// Lifecycle state; defaults to `posted` when absent.
    pub state: Option<String>,
}

/// Normalized write record for a transaction line.
///
/// Invariant: exactly one of `debit`/`credit` is nonzero, decided by the
/// referenced account's type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostedLine {
    /// Line date.
    pub date: DateTime<Utc>,
    /// Optional label; omitted when the draft carried none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Owning transaction (absent for the header variant).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<TransactionId>,
    /// Referenced account.
    pub account_id: AccountId,
    /// Optional counterparty; omitted when the draft carried none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<VendorId>,
    /// Authoring user.
    pub user_id: UserId,
    /// Debit amount (zero unless the account is an income account).
    pub debit: Decimal,
    /// Credit amount (zero unless the account is an expense account).
    pub credit: Decimal,
}

/// Normalized write record for a transaction header.
///
/// The sequence name is assigned separately by the allocator, never here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostedHeader {
    /// Transaction date.
    pub date: DateTime<Utc>,
    /// Authoring user.
    pub user_id: UserId,
    /// Lifecycle state.
    pub state: TransactionState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_type_parse() {
        assert_eq!(AccountType::parse("income"), Some(AccountType::Income));
        assert_eq!(AccountType::parse("expense"), Some(AccountType::Expense));
        assert_eq!(AccountType::parse("asset"), None);
        assert_eq!(AccountType::parse(""), None);
    }

    #[test]
    fn test_state_parse_and_default() {
        assert_eq!(TransactionState::parse("draft"), Some(TransactionState::Draft));
        assert_eq!(TransactionState::parse("posted"), Some(TransactionState::Posted));
        assert_eq!(TransactionState::parse("cancel"), Some(TransactionState::Cancel));
        assert_eq!(TransactionState::parse("void"), None);
        assert_eq!(TransactionState::default(), TransactionState::Posted);
    }

    #[test]
    fn test_wire_representations_roundtrip() {
        for t in [AccountType::Income, AccountType::Expense] {
            assert_eq!(AccountType::parse(t.as_str()), Some(t));
        }
        for s in [
            TransactionState::Draft,
            TransactionState::Posted,
            TransactionState::Cancel,
        ] {
            assert_eq!(TransactionState::parse(s.as_str()), Some(s));
        }
    }
}
