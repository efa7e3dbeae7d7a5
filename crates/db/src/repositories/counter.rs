//! Sequence counter repository.
//!
//! Implements the core's `CounterStore` port with a single conditional
//! update. The increment and the read-back happen in one statement, so
//! concurrent allocations on a key serialize on the row lock and can never
//! observe the same value.

use sea_orm::{DatabaseConnection, DbBackend, FromQueryResult, Statement};

use ledgerbook_core::ledger::{Counter, CounterStore, LedgerError};

use crate::entities::counters;

const INCREMENT_SQL: &str = "\
UPDATE counters \
SET seq = seq + 1, updated_at = NOW() \
WHERE key = $1 \
RETURNING *";

/// Counter repository backing the sequence allocator.
#[derive(Debug, Clone)]
pub struct CounterRepository {
    db: DatabaseConnection,
}

impl CounterRepository {
    /// Creates a new counter repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl CounterStore for CounterRepository {
    async fn increment(&self, key: &str) -> Result<Counter, LedgerError> {
        let statement = Statement::from_sql_and_values(
            DbBackend::Postgres,
            INCREMENT_SQL,
            [key.into()],
        );

        let row = counters::Model::find_by_statement(statement)
            .one(&self.db)
            .await
            .map_err(|err| LedgerError::SequenceUnavailable(err.to_string()))?
            .ok_or_else(|| {
                LedgerError::SequenceUnavailable(format!("no counter row for key '{key}'"))
            })?;

        Ok(Counter {
            key: row.key,
            seq: row.seq,
            prefix_width: u32::try_from(row.prefix_width).unwrap_or(0),
            suffix_width: u32::try_from(row.suffix_width).unwrap_or(0),
        })
    }
}
