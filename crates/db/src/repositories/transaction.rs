//! Transaction header repository.
//!
//! Creation follows a strict order: validate the header, allocate the
//! sequence code, then insert. Allocation failure aborts before anything
//! is persisted; the name, once assigned, is never recomputed.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};
use uuid::Uuid;

use ledgerbook_core::ledger::{
    validate_header, EntityKind, HeaderDraft, LedgerError, SequenceAllocator, TRANSACTION_SEQ_KEY,
    TRANSACTION_TAG,
};
use ledgerbook_core::query::{compile_transaction_search, TransactionSearchParams};
use ledgerbook_shared::types::TransactionId;

use crate::entities::{transaction_lines, transactions, users};

use super::counter::CounterRepository;
use super::plan_exec::{PlanExecutor, TransactionWithUser};
use super::reference::{map_db_err, user_exists};

/// Transaction repository.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
    allocator: SequenceAllocator<CounterRepository>,
    executor: PlanExecutor,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        let allocator = SequenceAllocator::new(CounterRepository::new(db.clone()), TRANSACTION_TAG);
        let executor = PlanExecutor::new(db.clone());
        Self {
            db,
            allocator,
            executor,
        }
    }

    /// Creates a transaction header.
    ///
    /// # Errors
    ///
    /// Returns the first unmet validation precondition,
    /// [`LedgerError::SequenceUnavailable`] when allocation fails, or
    /// [`LedgerError::PersistenceFailure`] when the insert fails.
    pub async fn create(&self, draft: HeaderDraft) -> Result<transactions::Model, LedgerError> {
        let resolved_user = self.prefetch_user(draft.user_id.as_deref()).await?;
        let header = validate_header(&draft, |id| resolved_user == Some(id))?;

        let allocated = self.allocator.allocate(TRANSACTION_SEQ_KEY).await?;
        tracing::debug!(seq = allocated.seq, code = %allocated.code, "allocated transaction code");

        let now = chrono::Utc::now().into();
        let transaction = transactions::ActiveModel {
            id: Set(TransactionId::new().into_inner()),
            seq: Set(allocated.seq),
            name: Set(allocated.code),
            date: Set(header.date.into()),
            user_id: Set(header.user_id.into_inner()),
            state: Set(header.state.into()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        transaction.insert(&self.db).await.map_err(map_db_err)
    }

    /// Searches transaction headers with the compiled plan.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PersistenceFailure`] when a query fails.
    pub async fn search(
        &self,
        params: &TransactionSearchParams,
    ) -> Result<(Vec<TransactionWithUser>, u64), LedgerError> {
        let plan = compile_transaction_search(params);
        self.executor.search_transactions(&plan).await
    }

    /// Finds a transaction with its user.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PersistenceFailure`] when a query fails.
    pub async fn find(&self, id: Uuid) -> Result<Option<TransactionWithUser>, LedgerError> {
        let Some(transaction) = transactions::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
        else {
            return Ok(None);
        };

        let user = users::Entity::find_by_id(transaction.user_id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(Some(TransactionWithUser { transaction, user }))
    }

    /// Updates a transaction header.
    ///
    /// Absent draft fields fall back to the stored values, and the merged
    /// header passes the full validation again. The sequence name and raw
    /// seq are untouched.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotFound`] when the transaction does not
    /// exist, the first unmet validation precondition, or
    /// [`LedgerError::PersistenceFailure`] when the write fails.
    pub async fn update(
        &self,
        id: Uuid,
        draft: HeaderDraft,
    ) -> Result<transactions::Model, LedgerError> {
        let existing = transactions::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .ok_or(LedgerError::NotFound {
                kind: EntityKind::Transaction,
                id,
            })?;

        let merged = HeaderDraft {
            date: draft.date.or(Some(existing.date.to_utc())),
            user_id: draft.user_id.or(Some(existing.user_id.to_string())),
            state: draft.state.or_else(|| {
                let state: ledgerbook_core::ledger::TransactionState = existing.state.into();
                Some(state.as_str().to_owned())
            }),
        };

        let resolved_user = self.prefetch_user(merged.user_id.as_deref()).await?;
        let header = validate_header(&merged, |uid| resolved_user == Some(uid))?;

        let mut active: transactions::ActiveModel = existing.into();
        active.date = Set(header.date.into());
        active.user_id = Set(header.user_id.into_inner());
        active.state = Set(header.state.into());
        active.updated_at = Set(chrono::Utc::now().into());

        active.update(&self.db).await.map_err(map_db_err)
    }

    /// Deletes a transaction header.
    ///
    /// Deletion is refused while any line references the header.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotFound`] when the transaction does not
    /// exist, [`LedgerError::ReferentialConflict`] when lines still
    /// reference it, or [`LedgerError::PersistenceFailure`] on failure.
    pub async fn delete(&self, id: Uuid) -> Result<(), LedgerError> {
        let existing = transactions::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .ok_or(LedgerError::NotFound {
                kind: EntityKind::Transaction,
                id,
            })?;

        let referencing = transaction_lines::Entity::find()
            .filter(transaction_lines::Column::TransactionId.eq(id))
            .count(&self.db)
            .await
            .map_err(map_db_err)?;
        if referencing > 0 {
            tracing::warn!(%id, referencing, "refusing transaction delete");
            return Err(LedgerError::ReferentialConflict {
                kind: EntityKind::Transaction,
                count: referencing,
            });
        }

        transactions::Entity::delete_by_id(existing.id)
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(())
    }

    /// Permissive user prefetch for the validator's lookup closure.
    ///
    /// Parse failures surface later, from the validator, in precondition
    /// order; this only reports what resolved.
    async fn prefetch_user(&self, raw: Option<&str>) -> Result<Option<Uuid>, LedgerError> {
        let Some(id) = raw.map(str::trim).and_then(|r| Uuid::parse_str(r).ok()) else {
            return Ok(None);
        };
        Ok(user_exists(&self.db, id).await?.then_some(id))
    }
}
