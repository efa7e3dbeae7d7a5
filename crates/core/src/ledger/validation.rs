//! Write-path validation and debit/credit posting.
//!
//! Preconditions are checked in a fixed order; the first unmet one wins:
//! date present, account present and resolving, transaction present and
//! resolving (line variant only), user present and resolving, then vendor
//! resolving when one was supplied. On success debit and credit are
//! recomputed from the resolved account's current type. This runs on every
//! write path, update included; a client can never smuggle an amount onto
//! the suppressed side.

use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use ledgerbook_shared::types::{AccountId, TransactionId, UserId, VendorId};

use super::error::LedgerError;
use super::resolver::{parse_reference, require_found, EntityKind};
use super::types::{
    AccountRef, AccountType, HeaderDraft, LineDraft, PostedHeader, PostedLine, TransactionState,
};

/// Coerces a raw JSON amount into a non-negative decimal.
///
/// Accepts JSON numbers and numeric strings. Anything else, including an
/// absent value where an amount is due, fails with `INVALID_AMOUNT` rather
/// than silently becoming zero.
///
/// # Errors
///
/// Returns [`LedgerError::InvalidAmount`] for absent, non-numeric, or
/// negative input.
pub fn coerce_amount(
    field: &'static str,
    raw: Option<&serde_json::Value>,
) -> Result<Decimal, LedgerError> {
    let amount = match raw {
        Some(serde_json::Value::Number(n)) => {
            Decimal::from_str(&n.to_string()).map_err(|_| LedgerError::InvalidAmount(field))?
        }
        Some(serde_json::Value::String(s)) => {
            Decimal::from_str(s.trim()).map_err(|_| LedgerError::InvalidAmount(field))?
        }
        _ => return Err(LedgerError::InvalidAmount(field)),
    };

    if amount < Decimal::ZERO {
        return Err(LedgerError::InvalidAmount(field));
    }
    Ok(amount)
}

/// Validates a raw line draft and produces the normalized write record.
///
/// The lookups report resolution results for already-parsed identifiers;
/// this function owns the ordering and the posting rule. `require_transaction`
/// distinguishes the line variant (owning header mandatory) from header
/// writes that carry amount fields themselves.
///
/// # Errors
///
/// Returns the first unmet precondition, in the fixed order documented on
/// this module.
pub fn validate_line<A, T, U, V>(
    draft: &LineDraft,
    require_transaction: bool,
    account_lookup: A,
    transaction_lookup: T,
    user_lookup: U,
    vendor_lookup: V,
) -> Result<PostedLine, LedgerError>
where
    A: Fn(Uuid) -> Option<AccountRef>,
    T: Fn(Uuid) -> bool,
    U: Fn(Uuid) -> bool,
    V: Fn(Uuid) -> bool,
{
    let date = draft.date.ok_or(LedgerError::MissingField("DATE"))?;

    let account_id = parse_reference(EntityKind::Account, draft.account_id.as_deref())?;
    let account = require_found(EntityKind::Account, account_id, account_lookup(account_id))?;

    let transaction_id = if require_transaction {
        let id = parse_reference(EntityKind::Transaction, draft.transaction_id.as_deref())?;
        require_found(
            EntityKind::Transaction,
            id,
            transaction_lookup(id).then_some(()),
        )?;
        Some(TransactionId::from_uuid(id))
    } else {
        None
    };

    let user_id = parse_reference(EntityKind::User, draft.user_id.as_deref())?;
    require_found(EntityKind::User, user_id, user_lookup(user_id).then_some(()))?;

    let vendor_id = match draft.vendor_id.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => {
            let id = parse_reference(EntityKind::Vendor, Some(raw))?;
            require_found(EntityKind::Vendor, id, vendor_lookup(id).then_some(()))?;
            Some(VendorId::from_uuid(id))
        }
        _ => None,
    };

    // Posting rule: the account type decides which side carries the amount.
    // The other side is forced to zero no matter what the client sent.
    let (debit, credit) = match account.account_type {
        AccountType::Income => (coerce_amount("debit", draft.debit.as_ref())?, Decimal::ZERO),
        AccountType::Expense => (Decimal::ZERO, coerce_amount("credit", draft.credit.as_ref())?),
    };

    Ok(PostedLine {
        date,
        label: draft
            .label
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_owned),
        transaction_id,
        account_id: AccountId::from_uuid(account_id),
        vendor_id,
        user_id: UserId::from_uuid(user_id),
        debit,
        credit,
    })
}

/// Validates a raw header draft.
///
/// The sequence name is not part of the draft; the allocator assigns it
/// once, after validation and before persistence.
///
/// # Errors
///
/// Returns the first unmet precondition: date present, user present and
/// resolving, state recognized.
pub fn validate_header<U>(draft: &HeaderDraft, user_lookup: U) -> Result<PostedHeader, LedgerError>
where
    U: Fn(Uuid) -> bool,
{
    let date = draft.date.ok_or(LedgerError::MissingField("DATE"))?;

    let user_id = parse_reference(EntityKind::User, draft.user_id.as_deref())?;
    require_found(EntityKind::User, user_id, user_lookup(user_id).then_some(()))?;

    let state = match draft.state.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => TransactionState::parse(raw)
            .ok_or_else(|| LedgerError::InvalidState(raw.to_owned()))?,
        _ => TransactionState::default(),
    };

    Ok(PostedHeader {
        date,
        user_id: UserId::from_uuid(user_id),
        state,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn a_date() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 0, 0, 0).unwrap()
    }

    fn income_account(id: Uuid) -> AccountRef {
        AccountRef {
            id: AccountId::from_uuid(id),
            account_type: AccountType::Income,
        }
    }

    fn expense_account(id: Uuid) -> AccountRef {
        AccountRef {
            id: AccountId::from_uuid(id),
            account_type: AccountType::Expense,
        }
    }

    fn draft(account: Uuid, transaction: Uuid, user: Uuid) -> LineDraft {
        LineDraft {
            date: Some(a_date()),
            label: None,
            account_id: Some(account.to_string()),
            transaction_id: Some(transaction.to_string()),
            vendor_id: None,
            user_id: Some(user.to_string()),
            debit: Some(json!(50)),
            credit: Some(json!(999)),
        }
    }

    #[test]
    fn test_income_account_posts_debit_and_forces_credit_zero() {
        let account = Uuid::new_v4();
        let line = validate_line(
            &draft(account, Uuid::new_v4(), Uuid::new_v4()),
            true,
            |id| Some(income_account(id)),
            |_| true,
            |_| true,
            |_| true,
        )
        .unwrap();

        assert_eq!(line.debit, dec!(50));
        assert_eq!(line.credit, Decimal::ZERO);
    }

    #[test]
    fn test_expense_account_posts_credit_and_forces_debit_zero() {
        let line = validate_line(
            &draft(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()),
            true,
            |id| Some(expense_account(id)),
            |_| true,
            |_| true,
            |_| true,
        )
        .unwrap();

        assert_eq!(line.credit, dec!(999));
        assert_eq!(line.debit, Decimal::ZERO);
    }

    #[test]
    fn test_string_amount_is_coerced() {
        let mut d = draft(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        d.debit = Some(json!("50.25"));
        let line = validate_line(
            &d,
            true,
            |id| Some(income_account(id)),
            |_| true,
            |_| true,
            |_| true,
        )
        .unwrap();
        assert_eq!(line.debit, dec!(50.25));
    }

    #[test]
    fn test_non_numeric_amount_rejected() {
        let mut d = draft(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        d.debit = Some(json!("fifty"));
        let result = validate_line(
            &d,
            true,
            |id| Some(income_account(id)),
            |_| true,
            |_| true,
            |_| true,
        );
        assert!(matches!(result, Err(LedgerError::InvalidAmount("debit"))));
    }

    #[test]
    fn test_absent_active_amount_rejected() {
        let mut d = draft(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        d.debit = None;
        let result = validate_line(
            &d,
            true,
            |id| Some(income_account(id)),
            |_| true,
            |_| true,
            |_| true,
        );
        assert!(matches!(result, Err(LedgerError::InvalidAmount("debit"))));
    }

    #[test]
    fn test_missing_date_reported_first() {
        let mut d = LineDraft::default();
        d.account_id = Some("garbage".into());
        let result = validate_line(&d, true, |_| None, |_| false, |_| false, |_| false);
        assert!(matches!(result, Err(LedgerError::MissingField("DATE"))));
    }

    #[test]
    fn test_unresolvable_account_beats_missing_transaction() {
        // Account resolution comes before the transaction presence check.
        let mut d = draft(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        d.transaction_id = None;
        let result = validate_line(&d, true, |_| None, |_| true, |_| true, |_| true);
        assert!(matches!(
            result,
            Err(LedgerError::NotFound {
                kind: EntityKind::Account,
                ..
            })
        ));
    }

    #[test]
    fn test_missing_transaction_for_line_variant() {
        let mut d = draft(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        d.transaction_id = None;
        let result = validate_line(
            &d,
            true,
            |id| Some(income_account(id)),
            |_| true,
            |_| true,
            |_| true,
        );
        assert!(matches!(result, Err(LedgerError::MissingField("TRANSACTION"))));
    }

    #[test]
    fn test_header_variant_skips_transaction_checks() {
        let mut d = draft(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        d.transaction_id = None;
        let line = validate_line(
            &d,
            false,
            |id| Some(income_account(id)),
            |_| false,
            |_| true,
            |_| true,
        )
        .unwrap();
        assert!(line.transaction_id.is_none());
    }

    #[test]
    fn test_unresolved_vendor_fails() {
        let mut d = draft(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        d.vendor_id = Some(Uuid::new_v4().to_string());
        let result = validate_line(
            &d,
            true,
            |id| Some(income_account(id)),
            |_| true,
            |_| true,
            |_| false,
        );
        assert!(matches!(
            result,
            Err(LedgerError::NotFound {
                kind: EntityKind::Vendor,
                ..
            })
        ));
    }

    #[test]
    fn test_optional_fields_omitted_when_absent() {
        let mut d = draft(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        d.label = Some("  ".into());
        d.vendor_id = Some(String::new());
        let line = validate_line(
            &d,
            true,
            |id| Some(income_account(id)),
            |_| true,
            |_| true,
            |_| panic!("empty vendor id must not be looked up"),
        )
        .unwrap();
        assert!(line.label.is_none());
        assert!(line.vendor_id.is_none());
    }

    #[test]
    fn test_negative_amount_rejected() {
        let mut d = draft(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        d.debit = Some(json!(-5));
        let result = validate_line(
            &d,
            true,
            |id| Some(income_account(id)),
            |_| true,
            |_| true,
            |_| true,
        );
        assert!(matches!(result, Err(LedgerError::InvalidAmount("debit"))));
    }

    #[test]
    fn test_header_defaults_to_posted() {
        let user = Uuid::new_v4();
        let header = validate_header(
            &HeaderDraft {
                date: Some(a_date()),
                user_id: Some(user.to_string()),
                state: None,
            },
            |_| true,
        )
        .unwrap();
        assert_eq!(header.state, TransactionState::Posted);
        assert_eq!(header.user_id, UserId::from_uuid(user));
    }

    #[test]
    fn test_header_unknown_state_rejected() {
        let result = validate_header(
            &HeaderDraft {
                date: Some(a_date()),
                user_id: Some(Uuid::new_v4().to_string()),
                state: Some("void".into()),
            },
            |_| true,
        );
        assert!(matches!(result, Err(LedgerError::InvalidState(_))));
    }

    #[test]
    fn test_header_missing_user() {
        let result = validate_header(
            &HeaderDraft {
                date: Some(a_date()),
                user_id: None,
                state: None,
            },
            |_| true,
        );
        assert!(matches!(result, Err(LedgerError::MissingField("USER"))));
    }
}
