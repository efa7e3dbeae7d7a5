//! Vendor repository.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use ledgerbook_core::ledger::{EntityKind, LedgerError};
use ledgerbook_shared::types::VendorId;

use crate::entities::{transaction_lines, vendors};

use super::reference::map_db_err;

/// Input for creating or renaming a vendor.
#[derive(Debug, Clone)]
pub struct VendorInput {
    /// Vendor name.
    pub name: String,
}

/// Vendor repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct VendorRepository {
    db: DatabaseConnection,
}

impl VendorRepository {
    /// Creates a new vendor repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a vendor.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PersistenceFailure`] when the insert fails.
    pub async fn create(&self, input: VendorInput) -> Result<vendors::Model, LedgerError> {
        let now = chrono::Utc::now().into();
        let vendor = vendors::ActiveModel {
            id: Set(VendorId::new().into_inner()),
            name: Set(input.name),
            created_at: Set(now),
            updated_at: Set(now),
        };
        vendor.insert(&self.db).await.map_err(map_db_err)
    }

    /// Lists all vendors, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PersistenceFailure`] when the query fails.
    pub async fn list(&self) -> Result<Vec<vendors::Model>, LedgerError> {
        vendors::Entity::find()
            .order_by_asc(vendors::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)
    }

    /// Finds a vendor by ID.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PersistenceFailure`] when the query fails.
    pub async fn find(&self, id: Uuid) -> Result<Option<vendors::Model>, LedgerError> {
        vendors::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)
    }

    /// Renames a vendor.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotFound`] when the vendor does not exist,
    /// or [`LedgerError::PersistenceFailure`] when the write fails.
    pub async fn update(&self, id: Uuid, input: VendorInput) -> Result<vendors::Model, LedgerError> {
        let vendor = self.find(id).await?.ok_or(LedgerError::NotFound {
            kind: EntityKind::Vendor,
            id,
        })?;

        let mut active: vendors::ActiveModel = vendor.into();
        active.name = Set(input.name);
        active.updated_at = Set(chrono::Utc::now().into());

        active.update(&self.db).await.map_err(map_db_err)
    }

    /// Deletes a vendor.
    ///
    /// Deletion is refused while any transaction line references the
    /// vendor.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotFound`] when the vendor does not exist,
    /// [`LedgerError::ReferentialConflict`] when lines still reference it,
    /// or [`LedgerError::PersistenceFailure`] when the delete fails.
    pub async fn delete(&self, id: Uuid) -> Result<(), LedgerError> {
        let vendor = self.find(id).await?.ok_or(LedgerError::NotFound {
            kind: EntityKind::Vendor,
            id,
        })?;

        let referencing = transaction_lines::Entity::find()
            .filter(transaction_lines::Column::VendorId.eq(id))
            .count(&self.db)
            .await
            .map_err(map_db_err)?;
        if referencing > 0 {
            tracing::warn!(%id, referencing, "refusing vendor delete");
            return Err(LedgerError::ReferentialConflict {
                kind: EntityKind::Vendor,
                count: referencing,
            });
        }

        vendors::Entity::delete_by_id(vendor.id)
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(())
    }
}
