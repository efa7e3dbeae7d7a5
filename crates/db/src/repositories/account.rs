//! Account repository.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use ledgerbook_core::ledger::{AccountType, EntityKind, LedgerError};
use ledgerbook_shared::types::AccountId;

use crate::entities::{accounts, transaction_lines};

use super::reference::map_db_err;

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct AccountInput {
    /// Account name.
    pub name: String,
    /// Account classification.
    pub account_type: AccountType,
}

/// Input for updating an account; absent fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct AccountUpdate {
    /// New account name.
    pub name: Option<String>,
    /// New account classification.
    pub account_type: Option<AccountType>,
}

/// Account repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an account.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PersistenceFailure`] when the insert fails.
    pub async fn create(&self, input: AccountInput) -> Result<accounts::Model, LedgerError> {
        let now = chrono::Utc::now().into();
        let account = accounts::ActiveModel {
            id: Set(AccountId::new().into_inner()),
            name: Set(input.name),
            account_type: Set(input.account_type.into()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        account.insert(&self.db).await.map_err(map_db_err)
    }

    /// Lists all accounts, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PersistenceFailure`] when the query fails.
    pub async fn list(&self) -> Result<Vec<accounts::Model>, LedgerError> {
        accounts::Entity::find()
            .order_by_asc(accounts::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)
    }

    /// Finds an account by ID.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PersistenceFailure`] when the query fails.
    pub async fn find(&self, id: Uuid) -> Result<Option<accounts::Model>, LedgerError> {
        accounts::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)
    }

    /// Updates an account.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotFound`] when the account does not exist,
    /// or [`LedgerError::PersistenceFailure`] when the write fails.
    pub async fn update(
        &self,
        id: Uuid,
        input: AccountUpdate,
    ) -> Result<accounts::Model, LedgerError> {
        let account = self.find(id).await?.ok_or(LedgerError::NotFound {
            kind: EntityKind::Account,
            id,
        })?;

        let mut active: accounts::ActiveModel = account.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(account_type) = input.account_type {
            active.account_type = Set(account_type.into());
        }
        active.updated_at = Set(chrono::Utc::now().into());

        active.update(&self.db).await.map_err(map_db_err)
    }

    /// Deletes an account.
    ///
    /// Deletion is refused while any transaction line references the
    /// account.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotFound`] when the account does not exist,
    /// [`LedgerError::ReferentialConflict`] when lines still reference it,
    /// or [`LedgerError::PersistenceFailure`] when the delete fails.
    pub async fn delete(&self, id: Uuid) -> Result<(), LedgerError> {
        let account = self.find(id).await?.ok_or(LedgerError::NotFound {
            kind: EntityKind::Account,
            id,
        })?;

        let referencing = transaction_lines::Entity::find()
            .filter(transaction_lines::Column::AccountId.eq(id))
            .count(&self.db)
            .await
            .map_err(map_db_err)?;
        if referencing > 0 {
            tracing::warn!(%id, referencing, "refusing account delete");
            return Err(LedgerError::ReferentialConflict {
                kind: EntityKind::Account,
                count: referencing,
            });
        }

        accounts::Entity::delete_by_id(account.id)
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(())
    }
}
