//! Reference resolution building blocks.
//!
//! Every write path validates each foreign key through the same two steps:
//! parse the raw identifier (before any lookup is attempted), then require
//! that the lookup found a record. The lookup itself belongs to the
//! persistence collaborator; only the decisions live here.

use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use super::error::LedgerError;

/// The kinds of entity a reference can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// Ledger account.
    Account,
    /// Vendor counterparty.
    Vendor,
    /// Authoring user.
    User,
    /// Transaction header.
    Transaction,
    /// Transaction line.
    TransactionLine,
    /// Exported document record.
    Document,
}

impl EntityKind {
    /// Wire name used in messages, matching the API's message vocabulary.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Account => "ACCOUNT",
            Self::Vendor => "VENDOR",
            Self::User => "USER",
            Self::Transaction => "TRANSACTION",
            Self::TransactionLine => "TRANSACTION_LINE",
            Self::Document => "DOCUMENT",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a required reference identifier.
///
/// Fails with `MISSING_FIELD` when the identifier is absent or empty, and
/// with `INVALID_IDENTIFIER` when it is not a well-formed UUID. The
/// syntactic check always runs before any lookup.
///
/// # Errors
///
/// Returns [`LedgerError::MissingField`] or [`LedgerError::InvalidIdentifier`].
pub fn parse_reference(kind: EntityKind, raw: Option<&str>) -> Result<Uuid, LedgerError> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty());
    let Some(raw) = raw else {
        return Err(LedgerError::MissingField(kind.as_str()));
    };
    Uuid::from_str(raw).map_err(|_| LedgerError::InvalidIdentifier(kind))
}

/// Requires that a lookup found a record.
///
/// Both resolution modes (full record wanted vs. existence only) run the
/// same lookup; callers that only need existence pass the record through
/// and drop it.
///
/// # Errors
///
/// Returns [`LedgerError::NotFound`] when the lookup came back empty.
pub fn require_found<T>(kind: EntityKind, id: Uuid, found: Option<T>) -> Result<T, LedgerError> {
    found.ok_or(LedgerError::NotFound { kind, id })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_identifier() {
        assert!(matches!(
            parse_reference(EntityKind::Account, None),
            Err(LedgerError::MissingField("ACCOUNT"))
        ));
        assert!(matches!(
            parse_reference(EntityKind::Account, Some("")),
            Err(LedgerError::MissingField("ACCOUNT"))
        ));
        assert!(matches!(
            parse_reference(EntityKind::Account, Some("   ")),
            Err(LedgerError::MissingField("ACCOUNT"))
        ));
    }

    #[test]
    fn test_malformed_identifier_fails_before_lookup() {
        assert!(matches!(
            parse_reference(EntityKind::Vendor, Some("not-a-uuid")),
            Err(LedgerError::InvalidIdentifier(EntityKind::Vendor))
        ));
    }

    #[test]
    fn test_well_formed_identifier_parses() {
        let id = Uuid::new_v4();
        let parsed = parse_reference(EntityKind::User, Some(&id.to_string())).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_require_found() {
        let id = Uuid::new_v4();
        assert_eq!(require_found(EntityKind::User, id, Some(42)).unwrap(), 42);
        assert!(matches!(
            require_found::<i32>(EntityKind::User, id, None),
            Err(LedgerError::NotFound {
                kind: EntityKind::User,
                ..
            })
        ));
    }
}
