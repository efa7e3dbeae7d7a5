//! Error taxonomy for ledger and query operations.
//!
//! Every component function returns a tagged success-or-failure result; no
//! default is ever silently substituted for a hard precondition failure. The
//! HTTP layer maps failures to transport responses through
//! [`LedgerError::http_status_code`] and [`LedgerError::error_code`]; the
//! core never produces a response body itself.

use thiserror::Error;
use uuid::Uuid;

use super::resolver::EntityKind;

/// Errors that can occur during ledger and query operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Required input was absent or empty.
    #[error("{0}_IS_REQUIRED")]
    MissingField(&'static str),

    /// A reference identifier was syntactically malformed.
    #[error("{0} identifier is malformed")]
    InvalidIdentifier(EntityKind),

    /// A well-formed reference did not resolve to a record.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// The entity kind that was looked up.
        kind: EntityKind,
        /// The identifier that did not resolve.
        id: Uuid,
    },

    /// A monetary field was non-numeric or absent where an amount was due.
    #[error("invalid amount for field '{0}'")]
    InvalidAmount(&'static str),

    /// An unknown lifecycle state was supplied.
    #[error("invalid state '{0}'")]
    InvalidState(String),

    /// A grouping request named an unknown dimension.
    #[error("unsupported grouping dimension")]
    UnsupportedDimension,

    /// The counter increment failed; the enclosing creation must abort.
    #[error("sequence allocation failed: {0}")]
    SequenceUnavailable(String),

    /// A delete was blocked because dependent lines exist.
    #[error("{kind} is referenced by {count} transaction line(s)")]
    ReferentialConflict {
        /// The entity kind whose deletion was refused.
        kind: EntityKind,
        /// Number of referencing lines.
        count: u64,
    },

    /// A storage write was rejected.
    #[error("persistence failure: {0}")]
    PersistenceFailure(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "MISSING_FIELD",
            Self::InvalidIdentifier(_) => "INVALID_IDENTIFIER",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::InvalidState(_) => "INVALID_STATE",
            Self::UnsupportedDimension => "UNSUPPORTED_DIMENSION",
            Self::SequenceUnavailable(_) => "SEQUENCE_UNAVAILABLE",
            Self::ReferentialConflict { .. } => "REFERENTIAL_CONFLICT",
            Self::PersistenceFailure(_) => "PERSISTENCE_FAILURE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 428 Precondition Required - missing or malformed write input
            Self::MissingField(_)
            | Self::InvalidIdentifier(_)
            | Self::InvalidAmount(_)
            | Self::InvalidState(_) => 428,

            // 404 Not Found - reference does not resolve
            Self::NotFound { .. } => 404,

            // 400 Bad Request - grouping request
            Self::UnsupportedDimension => 400,

            // 500 Internal Server Error
            Self::SequenceUnavailable(_)
            | Self::ReferentialConflict { .. }
            | Self::PersistenceFailure(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(LedgerError::MissingField("DATE").error_code(), "MISSING_FIELD");
        assert_eq!(
            LedgerError::InvalidIdentifier(EntityKind::Account).error_code(),
            "INVALID_IDENTIFIER"
        );
        assert_eq!(
            LedgerError::NotFound {
                kind: EntityKind::Vendor,
                id: Uuid::nil(),
            }
            .error_code(),
            "NOT_FOUND"
        );
        assert_eq!(LedgerError::InvalidAmount("debit").error_code(), "INVALID_AMOUNT");
        assert_eq!(LedgerError::UnsupportedDimension.error_code(), "UNSUPPORTED_DIMENSION");
        assert_eq!(
            LedgerError::SequenceUnavailable("down".into()).error_code(),
            "SEQUENCE_UNAVAILABLE"
        );
        assert_eq!(
            LedgerError::ReferentialConflict {
                kind: EntityKind::Account,
                count: 3,
            }
            .error_code(),
            "REFERENTIAL_CONFLICT"
        );
        assert_eq!(
            LedgerError::PersistenceFailure("write rejected".into()).error_code(),
            "PERSISTENCE_FAILURE"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(LedgerError::MissingField("DATE").http_status_code(), 428);
        assert_eq!(
            LedgerError::InvalidIdentifier(EntityKind::User).http_status_code(),
            428
        );
        assert_eq!(
            LedgerError::NotFound {
                kind: EntityKind::Transaction,
                id: Uuid::nil(),
            }
            .http_status_code(),
            404
        );
        assert_eq!(LedgerError::UnsupportedDimension.http_status_code(), 400);
        assert_eq!(
            LedgerError::SequenceUnavailable(String::new()).http_status_code(),
            500
        );
        assert_eq!(
            LedgerError::ReferentialConflict {
                kind: EntityKind::Vendor,
                count: 1,
            }
            .http_status_code(),
            500
        );
    }

    #[test]
    fn test_missing_field_display_matches_wire_message() {
        assert_eq!(
            LedgerError::MissingField("DATE").to_string(),
            "DATE_IS_REQUIRED"
        );
        assert_eq!(
            LedgerError::MissingField("ACCOUNT").to_string(),
            "ACCOUNT_IS_REQUIRED"
        );
    }
}
