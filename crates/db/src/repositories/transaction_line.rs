//! Transaction line repository.
//!
//! Every write path funnels through the core validator: referenced records
//! are prefetched permissively, then the validator drives the precondition
//! checks in its fixed order and recomputes the debit/credit posting. An
//! update merges the stored values under the incoming draft and validates
//! the merged result, so a partial update can never bypass the posting
//! rule.

use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use ledgerbook_core::ledger::{
    validate_line, AccountRef, EntityKind, LedgerError, LineDraft, PostedLine,
};
use ledgerbook_core::query::{compile_group, compile_line_search, LineSearchParams};
use ledgerbook_shared::types::TransactionLineId;

use crate::entities::{accounts, transaction_lines, transactions, users, vendors};

use super::plan_exec::{GroupRow, LineWithRefs, PlanExecutor};
use super::reference::{
    find_account_ref, map_db_err, resolve_ref_filters, transaction_exists, user_exists,
    vendor_exists,
};

/// Resolution results prefetched for one validation pass.
#[derive(Debug, Default)]
struct ResolvedRefs {
    account: Option<AccountRef>,
    transaction: Option<Uuid>,
    user: Option<Uuid>,
    vendor: Option<Uuid>,
}

/// Transaction line repository.
#[derive(Debug, Clone)]
pub struct TransactionLineRepository {
    db: DatabaseConnection,
    executor: PlanExecutor,
}

impl TransactionLineRepository {
    /// Creates a new transaction line repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        let executor = PlanExecutor::new(db.clone());
        Self { db, executor }
    }

    /// Creates a transaction line.
    ///
    /// # Errors
    ///
    /// Returns the first unmet validation precondition, or
    /// [`LedgerError::PersistenceFailure`] when the insert fails.
    pub async fn create(&self, draft: LineDraft) -> Result<transaction_lines::Model, LedgerError> {
        let posted = self.validate(&draft).await?;
        self.insert(posted).await
    }

    /// Updates a transaction line.
    ///
    /// Absent draft fields fall back to the stored values; the merged draft
    /// passes the full validation, posting rule included.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotFound`] when the line does not exist, the
    /// first unmet validation precondition, or
    /// [`LedgerError::PersistenceFailure`] when the write fails.
    pub async fn update(
        &self,
        id: Uuid,
        draft: LineDraft,
    ) -> Result<transaction_lines::Model, LedgerError> {
        let existing = transaction_lines::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .ok_or(LedgerError::NotFound {
                kind: EntityKind::TransactionLine,
                id,
            })?;

        let merged = LineDraft {
            date: draft.date.or(Some(existing.date.to_utc())),
            label: draft.label.or_else(|| existing.label.clone()),
            account_id: draft.account_id.or(Some(existing.account_id.to_string())),
            transaction_id: draft
                .transaction_id
                .or_else(|| existing.transaction_id.map(|t| t.to_string())),
            vendor_id: draft
                .vendor_id
                .or_else(|| existing.vendor_id.map(|v| v.to_string())),
            user_id: draft.user_id.or(Some(existing.user_id.to_string())),
            debit: draft
                .debit
                .or_else(|| Some(serde_json::Value::String(existing.debit.to_string()))),
            credit: draft
                .credit
                .or_else(|| Some(serde_json::Value::String(existing.credit.to_string()))),
        };

        let posted = self.validate(&merged).await?;

        let mut active: transaction_lines::ActiveModel = existing.into();
        active.date = Set(posted.date.into());
        active.label = Set(posted.label);
        active.transaction_id = Set(posted.transaction_id.map(|t| t.into_inner()));
        active.account_id = Set(posted.account_id.into_inner());
        active.vendor_id = Set(posted.vendor_id.map(|v| v.into_inner()));
        active.user_id = Set(posted.user_id.into_inner());
        active.debit = Set(posted.debit);
        active.credit = Set(posted.credit);
        active.updated_at = Set(chrono::Utc::now().into());

        active.update(&self.db).await.map_err(map_db_err)
    }

    /// Searches lines: resolves filter identifiers, compiles the plan,
    /// executes it.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PersistenceFailure`] when a query fails.
    pub async fn search(
        &self,
        params: &LineSearchParams,
    ) -> Result<(Vec<LineWithRefs>, u64), LedgerError> {
        let refs = resolve_ref_filters(&self.db, params).await?;
        let plan = compile_line_search(params, &refs);
        self.executor.search_lines(&plan).await
    }

    /// Groups lines by a dimension, counting per group.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnsupportedDimension`] for an unknown
    /// dimension, or [`LedgerError::PersistenceFailure`] when a query
    /// fails.
    pub async fn group(&self, dimension: &str) -> Result<Vec<GroupRow>, LedgerError> {
        let plan = compile_group(dimension)?;
        self.executor.group_lines(&plan).await
    }

    /// Finds a line with its joined references.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PersistenceFailure`] when a query fails.
    pub async fn find(&self, id: Uuid) -> Result<Option<LineWithRefs>, LedgerError> {
        let Some(line) = transaction_lines::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
        else {
            return Ok(None);
        };

        let transaction = match line.transaction_id {
            Some(tid) => transactions::Entity::find_by_id(tid)
                .one(&self.db)
                .await
                .map_err(map_db_err)?,
            None => None,
        };
        let account = accounts::Entity::find_by_id(line.account_id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        let vendor = match line.vendor_id {
            Some(vid) => vendors::Entity::find_by_id(vid)
                .one(&self.db)
                .await
                .map_err(map_db_err)?,
            None => None,
        };
        let user = users::Entity::find_by_id(line.user_id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(Some(LineWithRefs {
            line,
            transaction,
            account,
            vendor,
            user,
        }))
    }

    /// Deletes a line.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotFound`] when the line does not exist, or
    /// [`LedgerError::PersistenceFailure`] when the delete fails.
    pub async fn delete(&self, id: Uuid) -> Result<(), LedgerError> {
        let result = transaction_lines::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;
        if result.rows_affected == 0 {
            return Err(LedgerError::NotFound {
                kind: EntityKind::TransactionLine,
                id,
            });
        }
        Ok(())
    }

    /// Runs the core validator over a draft with prefetched references.
    async fn validate(&self, draft: &LineDraft) -> Result<PostedLine, LedgerError> {
        let refs = self.prefetch(draft).await?;
        validate_line(
            draft,
            true,
            |id| refs.account.filter(|a| a.id.into_inner() == id),
            |id| refs.transaction == Some(id),
            |id| refs.user == Some(id),
            |id| refs.vendor == Some(id),
        )
    }

    /// Permissively prefetches every referenced record of a draft.
    ///
    /// Parse failures are not errors here; the validator reports them in
    /// precondition order.
    async fn prefetch(&self, draft: &LineDraft) -> Result<ResolvedRefs, LedgerError> {
        let mut refs = ResolvedRefs::default();

        if let Some(id) = parse_candidate(draft.account_id.as_deref()) {
            refs.account = find_account_ref(&self.db, id).await?;
        }
        if let Some(id) = parse_candidate(draft.transaction_id.as_deref()) {
            refs.transaction = transaction_exists(&self.db, id).await?.then_some(id);
        }
        if let Some(id) = parse_candidate(draft.user_id.as_deref()) {
            refs.user = user_exists(&self.db, id).await?.then_some(id);
        }
        if let Some(id) = parse_candidate(draft.vendor_id.as_deref()) {
            refs.vendor = vendor_exists(&self.db, id).await?.then_some(id);
        }

        Ok(refs)
    }

    async fn insert(&self, posted: PostedLine) -> Result<transaction_lines::Model, LedgerError> {
        let now = chrono::Utc::now().into();
        let line = transaction_lines::ActiveModel {
            id: Set(TransactionLineId::new().into_inner()),
            date: Set(posted.date.into()),
            label: Set(posted.label),
            transaction_id: Set(posted.transaction_id.map(|t| t.into_inner())),
            account_id: Set(posted.account_id.into_inner()),
            vendor_id: Set(posted.vendor_id.map(|v| v.into_inner())),
            user_id: Set(posted.user_id.into_inner()),
            debit: Set(posted.debit),
            credit: Set(posted.credit),
            created_at: Set(now),
            updated_at: Set(now),
        };
        line.insert(&self.db).await.map_err(map_db_err)
    }
}

fn parse_candidate(raw: Option<&str>) -> Option<Uuid> {
    Uuid::parse_str(raw?.trim()).ok()
}
