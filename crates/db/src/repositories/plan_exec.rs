//! Retrieval plan execution.
//!
//! Interprets the stage lists built by the core compiler into `SeaORM`
//! selects. Join stages are satisfied by batched reference loads after the
//! page is fetched, preserving left-outer semantics: a row with a null or
//! dangling reference is returned with the joined side absent. Totals are
//! computed from the filter predicates alone; pagination never affects the
//! count.

use std::collections::HashMap;

use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, FromQueryResult, JoinType, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select,
};
use serde::Serialize;
use uuid::Uuid;

use ledgerbook_core::ledger::LedgerError;
use ledgerbook_core::query::{Direction, FilterField, GroupDimension, Plan, Predicate, Stage};

use crate::entities::{accounts, sea_orm_active_enums, transaction_lines, transactions, users, vendors};

use super::reference::map_db_err;

/// A transaction line with its joined references.
#[derive(Debug, Clone, Serialize)]
pub struct LineWithRefs {
    /// The line itself.
    #[serde(flatten)]
    pub line: transaction_lines::Model,
    /// Owning transaction header, when the reference resolves.
    pub transaction: Option<transactions::Model>,
    /// Referenced account, when the reference resolves.
    pub account: Option<accounts::Model>,
    /// Referenced vendor, when present and resolvable.
    pub vendor: Option<vendors::Model>,
    /// Authoring user, when the reference resolves.
    pub user: Option<users::Model>,
}

/// A transaction header with its joined user.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionWithUser {
    /// The header itself.
    #[serde(flatten)]
    pub transaction: transactions::Model,
    /// Authoring user, when the reference resolves.
    pub user: Option<users::Model>,
}

/// One group of a group/count report.
#[derive(Debug, Clone, Serialize)]
pub struct GroupRow {
    /// The dimension record, or null for rows with an absent reference.
    #[serde(rename = "_id")]
    pub record: Option<serde_json::Value>,
    /// Number of lines in the group.
    pub count: i64,
}

/// Executes retrieval plans against the database.
#[derive(Debug, Clone)]
pub struct PlanExecutor {
    db: DatabaseConnection,
}

impl PlanExecutor {
    /// Creates a new executor.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Executes a line search plan, returning the page and the unpaginated
    /// total.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PersistenceFailure`] when a query fails.
    pub async fn search_lines(
        &self,
        plan: &Plan,
    ) -> Result<(Vec<LineWithRefs>, u64), LedgerError> {
        let total = self
            .line_base(plan)
            .count(&self.db)
            .await
            .map_err(map_db_err)?;

        let mut select = self.line_base(plan);
        select = apply_line_sort(select, plan);
        let (skip, limit) = plan.window();
        if let Some(skip) = skip {
            select = select.offset(skip);
        }
        if let Some(limit) = limit {
            select = select.limit(limit);
        }

        let lines = select.all(&self.db).await.map_err(map_db_err)?;
        let rows = self.attach_line_refs(lines).await?;
        Ok((rows, total))
    }

    /// Executes a transaction search plan.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PersistenceFailure`] when a query fails.
    pub async fn search_transactions(
        &self,
        plan: &Plan,
    ) -> Result<(Vec<TransactionWithUser>, u64), LedgerError> {
        let condition = transaction_conditions(plan.filter_predicates());

        let total = transactions::Entity::find()
            .filter(condition.clone())
            .count(&self.db)
            .await
            .map_err(map_db_err)?;

        let mut select = transactions::Entity::find().filter(condition);
        select = apply_transaction_sort(select, plan);
        let (skip, limit) = plan.window();
        if let Some(skip) = skip {
            select = select.offset(skip);
        }
        if let Some(limit) = limit {
            select = select.limit(limit);
        }

        let headers = select.all(&self.db).await.map_err(map_db_err)?;

        let user_ids: Vec<Uuid> = headers.iter().map(|h| h.user_id).collect();
        let user_map = load_map::<users::Entity>(&self.db, users::Column::Id, user_ids).await?;

        let rows = headers
            .into_iter()
            .map(|transaction| {
                let user = user_map.get(&transaction.user_id).cloned();
                TransactionWithUser { transaction, user }
            })
            .collect();
        Ok((rows, total))
    }

    /// Executes a group/count plan over transaction lines.
    ///
    /// Zero groups on an empty dataset is a valid result.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PersistenceFailure`] when a query fails.
    pub async fn group_lines(&self, plan: &Plan) -> Result<Vec<GroupRow>, LedgerError> {
        #[derive(FromQueryResult)]
        struct CountRow {
            group_id: Option<Uuid>,
            count: i64,
        }

        let Some(dimension) = plan.stages.iter().find_map(|stage| match stage {
            Stage::GroupCount(dimension) => Some(*dimension),
            _ => None,
        }) else {
            return Ok(Vec::new());
        };

        let group_col = match dimension {
            GroupDimension::Account => transaction_lines::Column::AccountId,
            GroupDimension::Vendor => transaction_lines::Column::VendorId,
        };

        let counts: Vec<CountRow> = transaction_lines::Entity::find()
            .select_only()
            .column_as(group_col, "group_id")
            .column_as(transaction_lines::Column::Id.count(), "count")
            .group_by(group_col)
            .into_model::<CountRow>()
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        let ids: Vec<Uuid> = counts.iter().filter_map(|row| row.group_id).collect();
        let records: HashMap<Uuid, serde_json::Value> = match dimension {
            GroupDimension::Account => {
                load_map::<accounts::Entity>(&self.db, accounts::Column::Id, ids)
                    .await?
                    .into_iter()
                    .map(|(id, model)| Ok((id, to_json(&model)?)))
                    .collect::<Result<_, LedgerError>>()?
            }
            GroupDimension::Vendor => {
                load_map::<vendors::Entity>(&self.db, vendors::Column::Id, ids)
                    .await?
                    .into_iter()
                    .map(|(id, model)| Ok((id, to_json(&model)?)))
                    .collect::<Result<_, LedgerError>>()?
            }
        };

        Ok(counts
            .into_iter()
            .map(|row| GroupRow {
                record: row.group_id.and_then(|id| records.get(&id).cloned()),
                count: row.count,
            })
            .collect())
    }

    /// Builds the filtered (unsorted, unpaginated) line select.
    fn line_base(&self, plan: &Plan) -> Select<transaction_lines::Entity> {
        let (condition, needs_transaction_join) = line_conditions(plan.filter_predicates());
        let mut select = transaction_lines::Entity::find();
        if needs_transaction_join {
            select = select.join(
                JoinType::LeftJoin,
                transaction_lines::Relation::Transactions.def(),
            );
        }
        select.filter(condition)
    }

    /// Batch-loads the referenced records of a page of lines.
    async fn attach_line_refs(
        &self,
        lines: Vec<transaction_lines::Model>,
    ) -> Result<Vec<LineWithRefs>, LedgerError> {
        let transaction_ids: Vec<Uuid> = lines.iter().filter_map(|l| l.transaction_id).collect();
        let account_ids: Vec<Uuid> = lines.iter().map(|l| l.account_id).collect();
        let vendor_ids: Vec<Uuid> = lines.iter().filter_map(|l| l.vendor_id).collect();
        let user_ids: Vec<Uuid> = lines.iter().map(|l| l.user_id).collect();

        let transaction_map =
            load_map::<transactions::Entity>(&self.db, transactions::Column::Id, transaction_ids)
                .await?;
        let account_map =
            load_map::<accounts::Entity>(&self.db, accounts::Column::Id, account_ids).await?;
        let vendor_map =
            load_map::<vendors::Entity>(&self.db, vendors::Column::Id, vendor_ids).await?;
        let user_map = load_map::<users::Entity>(&self.db, users::Column::Id, user_ids).await?;

        Ok(lines
            .into_iter()
            .map(|line| LineWithRefs {
                transaction: line
                    .transaction_id
                    .and_then(|id| transaction_map.get(&id).cloned()),
                account: account_map.get(&line.account_id).cloned(),
                vendor: line.vendor_id.and_then(|id| vendor_map.get(&id).cloned()),
                user: user_map.get(&line.user_id).cloned(),
                line,
            })
            .collect())
    }
}

/// Loads the named rows into an id-keyed map with one `IN` query.
async fn load_map<E>(
    db: &DatabaseConnection,
    id_col: E::Column,
    mut ids: Vec<Uuid>,
) -> Result<HashMap<Uuid, E::Model>, LedgerError>
where
    E: EntityTrait,
    E::Model: ModelWithId,
{
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = E::find()
        .filter(id_col.is_in(ids))
        .all(db)
        .await
        .map_err(map_db_err)?;
    Ok(rows.into_iter().map(|row| (row.model_id(), row)).collect())
}

/// Access to the primary key of a loaded model.
trait ModelWithId {
    fn model_id(&self) -> Uuid;
}

macro_rules! model_with_id {
    ($($model:ty),+ $(,)?) => {
        $(impl ModelWithId for $model {
            fn model_id(&self) -> Uuid {
                self.id
            }
        })+
    };
}

model_with_id!(
    transactions::Model,
    accounts::Model,
    vendors::Model,
    users::Model,
);

fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value, LedgerError> {
    serde_json::to_value(value).map_err(|err| LedgerError::PersistenceFailure(err.to_string()))
}

/// Translates line filter predicates into a condition tree.
///
/// Returns whether any predicate reads the joined transaction, in which
/// case the select needs the left join in SQL.
fn line_conditions(predicates: &[Predicate]) -> (Condition, bool) {
    let mut condition = Condition::all();
    let mut needs_transaction_join = false;

    for predicate in predicates {
        match predicate {
            Predicate::RefEquals { field, id } => {
                let column = match field {
                    FilterField::AccountId => transaction_lines::Column::AccountId,
                    FilterField::TransactionId => transaction_lines::Column::TransactionId,
                    FilterField::VendorId => transaction_lines::Column::VendorId,
                    _ => continue,
                };
                condition = condition.add(column.eq(*id));
            }
            Predicate::DateBetween { field, start, end } => {
                if *field == FilterField::TransactionDate {
                    needs_transaction_join = true;
                    if let Some(start) = start {
                        condition = condition.add(transactions::Column::Date.gte(*start));
                    }
                    if let Some(end) = end {
                        condition = condition.add(transactions::Column::Date.lte(*end));
                    }
                } else {
                    if let Some(start) = start {
                        condition = condition.add(transaction_lines::Column::Date.gte(*start));
                    }
                    if let Some(end) = end {
                        condition = condition.add(transaction_lines::Column::Date.lte(*end));
                    }
                }
            }
            Predicate::AtLeast { field, amount } => {
                let column = match field {
                    FilterField::Credit => transaction_lines::Column::Credit,
                    _ => transaction_lines::Column::Debit,
                };
                condition = condition.add(column.gte(*amount));
            }
            Predicate::StateEquals(state) => {
                needs_transaction_join = true;
                let db_state = sea_orm_active_enums::TransactionState::from(*state);
                condition = condition.add(transactions::Column::State.eq(db_state));
            }
        }
    }

    (condition, needs_transaction_join)
}

/// Translates header filter predicates into a condition tree.
fn transaction_conditions(predicates: &[Predicate]) -> Condition {
    let mut condition = Condition::all();
    for predicate in predicates {
        match predicate {
            Predicate::DateBetween { start, end, .. } => {
                if let Some(start) = start {
                    condition = condition.add(transactions::Column::Date.gte(*start));
                }
                if let Some(end) = end {
                    condition = condition.add(transactions::Column::Date.lte(*end));
                }
            }
            Predicate::StateEquals(state) => {
                let db_state = sea_orm_active_enums::TransactionState::from(*state);
                condition = condition.add(transactions::Column::State.eq(db_state));
            }
            Predicate::RefEquals { .. } | Predicate::AtLeast { .. } => {}
        }
    }
    condition
}

fn apply_line_sort(
    mut select: Select<transaction_lines::Entity>,
    plan: &Plan,
) -> Select<transaction_lines::Entity> {
    for stage in &plan.stages {
        if let Stage::Sort { field, direction } = stage {
            let Some(column) = line_sort_column(field) else {
                tracing::debug!(field, "ignoring unknown sort field");
                continue;
            };
            select = select.order_by(column, order_of(*direction));
        }
    }
    select
}

fn apply_transaction_sort(
    mut select: Select<transactions::Entity>,
    plan: &Plan,
) -> Select<transactions::Entity> {
    for stage in &plan.stages {
        if let Stage::Sort { field, direction } = stage {
            let Some(column) = transaction_sort_column(field) else {
                tracing::debug!(field, "ignoring unknown sort field");
                continue;
            };
            select = select.order_by(column, order_of(*direction));
        }
    }
    select
}

const fn order_of(direction: Direction) -> Order {
    match direction {
        Direction::Ascending => Order::Asc,
        Direction::Descending => Order::Desc,
    }
}

fn line_sort_column(field: &str) -> Option<transaction_lines::Column> {
    match field {
        "date" => Some(transaction_lines::Column::Date),
        "label" => Some(transaction_lines::Column::Label),
        "debit" => Some(transaction_lines::Column::Debit),
        "credit" => Some(transaction_lines::Column::Credit),
        "createdAt" | "created_at" => Some(transaction_lines::Column::CreatedAt),
        "updatedAt" | "updated_at" => Some(transaction_lines::Column::UpdatedAt),
        _ => None,
    }
}

fn transaction_sort_column(field: &str) -> Option<transactions::Column> {
    match field {
        "date" => Some(transactions::Column::Date),
        "name" => Some(transactions::Column::Name),
        "seq" => Some(transactions::Column::Seq),
        "state" => Some(transactions::Column::State),
        "createdAt" | "created_at" => Some(transactions::Column::CreatedAt),
        "updatedAt" | "updated_at" => Some(transactions::Column::UpdatedAt),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    #[test]
    fn test_line_conditions_join_detection() {
        let own_date = vec![Predicate::DateBetween {
            field: FilterField::Date,
            start: Some(Utc.timestamp_opt(100, 0).unwrap()),
            end: None,
        }];
        let (_, joins) = line_conditions(&own_date);
        assert!(!joins);

        let txn_date = vec![Predicate::DateBetween {
            field: FilterField::TransactionDate,
            start: Some(Utc.timestamp_opt(100, 0).unwrap()),
            end: None,
        }];
        let (_, joins) = line_conditions(&txn_date);
        assert!(joins);

        let state = vec![Predicate::StateEquals(
            ledgerbook_core::ledger::TransactionState::Posted,
        )];
        let (_, joins) = line_conditions(&state);
        assert!(joins);
    }

    #[test]
    fn test_ref_and_amount_predicates_stay_on_own_table() {
        let predicates = vec![
            Predicate::RefEquals {
                field: FilterField::AccountId,
                id: Uuid::new_v4(),
            },
            Predicate::AtLeast {
                field: FilterField::Debit,
                amount: dec!(10),
            },
        ];
        let (_, joins) = line_conditions(&predicates);
        assert!(!joins);
    }

    #[test]
    fn test_sort_column_mapping() {
        assert!(line_sort_column("date").is_some());
        assert!(line_sort_column("createdAt").is_some());
        assert!(line_sort_column("nonsense").is_none());
        assert!(transaction_sort_column("name").is_some());
        assert!(transaction_sort_column("nonsense").is_none());
    }
}
