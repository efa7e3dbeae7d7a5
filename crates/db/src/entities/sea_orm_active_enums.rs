//! Postgres enum mappings.
//!
//! Database-side counterparts of the domain enums, plus lossless
//! conversions in both directions for the enums the core reasons about.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use ledgerbook_core::ledger;

/// Account classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_type")]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Income account.
    #[sea_orm(string_value = "income")]
    Income,
    /// Expense account.
    #[sea_orm(string_value = "expense")]
    Expense,
}

impl From<AccountType> for ledger::AccountType {
    fn from(value: AccountType) -> Self {
        match value {
            AccountType::Income => Self::Income,
            AccountType::Expense => Self::Expense,
        }
    }
}

impl From<ledger::AccountType> for AccountType {
    fn from(value: ledger::AccountType) -> Self {
        match value {
            ledger::AccountType::Income => Self::Income,
            ledger::AccountType::Expense => Self::Expense,
        }
    }
}

/// Transaction lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_state")]
#[serde(rename_all = "lowercase")]
pub enum TransactionState {
    /// Being drafted.
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Posted to the ledger.
    #[sea_orm(string_value = "posted")]
    Posted,
    /// Cancelled.
    #[sea_orm(string_value = "cancel")]
    Cancel,
}

impl From<TransactionState> for ledger::TransactionState {
    fn from(value: TransactionState) -> Self {
        match value {
            TransactionState::Draft => Self::Draft,
            TransactionState::Posted => Self::Posted,
            TransactionState::Cancel => Self::Cancel,
        }
    }
}

impl From<ledger::TransactionState> for TransactionState {
    fn from(value: ledger::TransactionState) -> Self {
        match value {
            ledger::TransactionState::Draft => Self::Draft,
            ledger::TransactionState::Posted => Self::Posted,
            ledger::TransactionState::Cancel => Self::Cancel,
        }
    }
}

/// User role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Full administrative access.
    #[sea_orm(string_value = "superadmin")]
    Superadmin,
    /// Administrative access.
    #[sea_orm(string_value = "admin")]
    Admin,
    /// Day-to-day bookkeeping access.
    #[sea_orm(string_value = "staff")]
    Staff,
}

/// User account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_status")]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    /// May sign in.
    #[sea_orm(string_value = "active")]
    Active,
    /// Access suspended.
    #[sea_orm(string_value = "inactive")]
    Inactive,
}

/// Exported document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "document_type")]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    /// PDF export.
    #[sea_orm(string_value = "pdf")]
    Pdf,
    /// Spreadsheet export.
    #[sea_orm(string_value = "excel")]
    Excel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_type_roundtrips_through_domain() {
        for db_type in [AccountType::Income, AccountType::Expense] {
            let domain: ledger::AccountType = db_type.into();
            assert_eq!(AccountType::from(domain), db_type);
        }
    }

    #[test]
    fn test_state_roundtrips_through_domain() {
        for db_state in [
            TransactionState::Draft,
            TransactionState::Posted,
            TransactionState::Cancel,
        ] {
            let domain: ledger::TransactionState = db_state.into();
            assert_eq!(TransactionState::from(domain), db_state);
        }
    }
}
