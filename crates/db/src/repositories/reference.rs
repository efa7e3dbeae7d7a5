//! Reference resolution against live tables.
//!
//! Two distinct disciplines share the lookups here:
//!
//! - **Write-path** resolution is strict: the core's `parse_reference` has
//!   already rejected missing/malformed input, and a miss here is a hard
//!   `NOT_FOUND`.
//! - **Filter** resolution is permissive: a malformed or unknown identifier
//!   in a search parameter means "no filter", never an error.

use sea_orm::{DatabaseConnection, DbErr, EntityTrait, PaginatorTrait};
use uuid::Uuid;

use ledgerbook_core::ledger::{AccountRef, LedgerError};
use ledgerbook_core::query::{LineSearchParams, ResolvedRefFilters};

use crate::entities::{accounts, transactions, users, vendors};

/// Maps a storage error into the domain taxonomy.
pub fn map_db_err(err: DbErr) -> LedgerError {
    LedgerError::PersistenceFailure(err.to_string())
}

/// Loads the slice of an account the validator needs.
///
/// # Errors
///
/// Returns [`LedgerError::PersistenceFailure`] when the query fails.
pub async fn find_account_ref(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<AccountRef>, LedgerError> {
    let account = accounts::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(map_db_err)?;
    Ok(account.map(|account| AccountRef {
        id: ledgerbook_shared::types::AccountId::from_uuid(account.id),
        account_type: account.account_type.into(),
    }))
}

/// Existence check for a transaction header.
///
/// # Errors
///
/// Returns [`LedgerError::PersistenceFailure`] when the query fails.
pub async fn transaction_exists(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<bool, LedgerError> {
    let count = transactions::Entity::find_by_id(id)
        .count(db)
        .await
        .map_err(map_db_err)?;
    Ok(count > 0)
}

/// Existence check for a user.
///
/// # Errors
///
/// Returns [`LedgerError::PersistenceFailure`] when the query fails.
pub async fn user_exists(db: &DatabaseConnection, id: Uuid) -> Result<bool, LedgerError> {
    let count = users::Entity::find_by_id(id)
        .count(db)
        .await
        .map_err(map_db_err)?;
    Ok(count > 0)
}

/// Existence check for a vendor.
///
/// # Errors
///
/// Returns [`LedgerError::PersistenceFailure`] when the query fails.
pub async fn vendor_exists(db: &DatabaseConnection, id: Uuid) -> Result<bool, LedgerError> {
    let count = vendors::Entity::find_by_id(id)
        .count(db)
        .await
        .map_err(map_db_err)?;
    Ok(count > 0)
}

/// Resolves the exact-match filter identifiers of a line search.
///
/// Each identifier is kept only when it parses as a UUID and names a live
/// row; anything else drops that filter.
///
/// # Errors
///
/// Returns [`LedgerError::PersistenceFailure`] when a lookup query fails.
pub async fn resolve_ref_filters(
    db: &DatabaseConnection,
    params: &LineSearchParams,
) -> Result<ResolvedRefFilters, LedgerError> {
    let mut refs = ResolvedRefFilters::default();

    if let Some(id) = parse_filter_id(params.account_id.as_deref()) {
        if find_account_ref(db, id).await?.is_some() {
            refs.account_id = Some(id);
        } else {
            tracing::debug!(%id, "dropping unresolvable account filter");
        }
    }
    if let Some(id) = parse_filter_id(params.transaction_id.as_deref()) {
        if transaction_exists(db, id).await? {
            refs.transaction_id = Some(id);
        } else {
            tracing::debug!(%id, "dropping unresolvable transaction filter");
        }
    }
    if let Some(id) = parse_filter_id(params.vendor_id.as_deref()) {
        if vendor_exists(db, id).await? {
            refs.vendor_id = Some(id);
        } else {
            tracing::debug!(%id, "dropping unresolvable vendor filter");
        }
    }

    Ok(refs)
}

/// Parses a filter identifier; malformed input means "no filter".
fn parse_filter_id(raw: Option<&str>) -> Option<Uuid> {
    Uuid::parse_str(raw?.trim()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter_id_permissive() {
        assert!(parse_filter_id(None).is_none());
        assert!(parse_filter_id(Some("")).is_none());
        assert!(parse_filter_id(Some("not-a-uuid")).is_none());

        let id = Uuid::new_v4();
        assert_eq!(parse_filter_id(Some(&id.to_string())), Some(id));
        assert_eq!(parse_filter_id(Some(&format!("  {id}  "))), Some(id));
    }

    #[test]
    fn test_map_db_err_is_persistence_failure() {
        let err = map_db_err(DbErr::Custom("boom".into()));
        assert!(matches!(err, LedgerError::PersistenceFailure(_)));
        assert_eq!(err.error_code(), "PERSISTENCE_FAILURE");
    }
}
