//! Property-based tests for the debit/credit posting rule.

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

use ledgerbook_shared::types::AccountId;

use super::types::{AccountRef, AccountType, LineDraft};
use super::validation::validate_line;

/// Strategy for positive amounts expressed in cents.
fn amount_cents() -> impl Strategy<Value = i64> {
    1i64..100_000_000i64
}

fn draft_with_amounts(debit: serde_json::Value, credit: serde_json::Value) -> LineDraft {
    LineDraft {
        date: Some(Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap()),
        label: None,
        account_id: Some(Uuid::new_v4().to_string()),
        transaction_id: Some(Uuid::new_v4().to_string()),
        vendor_id: None,
        user_id: Some(Uuid::new_v4().to_string()),
        debit: Some(debit),
        credit: Some(credit),
    }
}

fn account_of(account_type: AccountType) -> impl Fn(Uuid) -> Option<AccountRef> {
    move |id| {
        Some(AccountRef {
            id: AccountId::from_uuid(id),
            account_type,
        })
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// For any income-account line, credit is forced to zero and debit
    /// carries the coerced input, whatever credit value was supplied.
    #[test]
    fn prop_income_account_forces_credit_zero(
        debit_cents in amount_cents(),
        credit_cents in amount_cents(),
    ) {
        let expected = Decimal::new(debit_cents, 2);
        let draft = draft_with_amounts(
            json!(expected.to_string()),
            json!(Decimal::new(credit_cents, 2).to_string()),
        );
        let line = validate_line(
            &draft,
            true,
            account_of(AccountType::Income),
            |_| true,
            |_| true,
            |_| true,
        )
        .unwrap();

        prop_assert_eq!(line.credit, Decimal::ZERO);
        prop_assert_eq!(line.debit, expected);
    }

    /// Symmetric property for expense accounts: debit is forced to zero.
    #[test]
    fn prop_expense_account_forces_debit_zero(
        debit_cents in amount_cents(),
        credit_cents in amount_cents(),
    ) {
        let expected = Decimal::new(credit_cents, 2);
        let draft = draft_with_amounts(
            json!(Decimal::new(debit_cents, 2).to_string()),
            json!(expected.to_string()),
        );
        let line = validate_line(
            &draft,
            true,
            account_of(AccountType::Expense),
            |_| true,
            |_| true,
            |_| true,
        )
        .unwrap();

        prop_assert_eq!(line.debit, Decimal::ZERO);
        prop_assert_eq!(line.credit, expected);
    }

    /// Exactly one side is nonzero for any positive input pair.
    #[test]
    fn prop_exactly_one_side_nonzero(
        debit_cents in amount_cents(),
        credit_cents in amount_cents(),
        is_income in any::<bool>(),
    ) {
        let account_type = if is_income { AccountType::Income } else { AccountType::Expense };
        let draft = draft_with_amounts(
            json!(Decimal::new(debit_cents, 2).to_string()),
            json!(Decimal::new(credit_cents, 2).to_string()),
        );
        let line = validate_line(
            &draft,
            true,
            account_of(account_type),
            |_| true,
            |_| true,
            |_| true,
        )
        .unwrap();

        let sides_nonzero =
            u8::from(line.debit > Decimal::ZERO) + u8::from(line.credit > Decimal::ZERO);
        prop_assert_eq!(sides_nonzero, 1);
    }
}
