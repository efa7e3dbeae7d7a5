//! Document repository.
//!
//! Export records only; rendering happens elsewhere.

use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};
use uuid::Uuid;

use ledgerbook_core::ledger::LedgerError;

use crate::entities::documents;

use super::reference::map_db_err;

/// Document repository for read operations.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    db: DatabaseConnection,
}

impl DocumentRepository {
    /// Creates a new document repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists all documents, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PersistenceFailure`] when the query fails.
    pub async fn list(&self) -> Result<Vec<documents::Model>, LedgerError> {
        documents::Entity::find()
            .order_by_desc(documents::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)
    }

    /// Finds a document by ID.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PersistenceFailure`] when the query fails.
    pub async fn find(&self, id: Uuid) -> Result<Option<documents::Model>, LedgerError> {
        documents::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)
    }
}
