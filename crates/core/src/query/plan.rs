//! Plan and stage types.
//!
//! A [`Plan`] is an explicit ordered list of stage variants built
//! deterministically from whichever optional parameters were present. Stage
//! order is data, not push-order side effect, and carries no execution
//! engine syntax.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::ledger::TransactionState;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Ascending order.
    Ascending,
    /// Descending order.
    Descending,
}

/// Referenced record attached by a join stage.
///
/// Joins are always left-outer: the owning row survives a null or dangling
/// reference, with the joined side absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinTarget {
    /// Owning transaction header.
    Transaction,
    /// Referenced account.
    Account,
    /// Referenced vendor.
    Vendor,
    /// Authoring user.
    User,
}

/// Grouping dimension for report plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupDimension {
    /// Group rows per referenced account.
    Account,
    /// Group rows per referenced vendor.
    Vendor,
}

/// Column a filter predicate applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterField {
    /// The row's account reference.
    AccountId,
    /// The row's owning-transaction reference.
    TransactionId,
    /// The row's vendor reference.
    VendorId,
    /// The row's own date.
    Date,
    /// The joined transaction's date.
    TransactionDate,
    /// Debit amount.
    Debit,
    /// Credit amount.
    Credit,
}

/// One independently-testable filter predicate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "predicate", rename_all = "snake_case")]
pub enum Predicate {
    /// Exact match on a resolved foreign-key reference.
    ///
    /// Only ever built from an identifier that resolved; unresolvable
    /// filter identifiers are dropped upstream, matching "no filter".
    RefEquals {
        /// Column the reference lives in.
        field: FilterField,
        /// The resolved identifier.
        id: Uuid,
    },
    /// Inclusive date range; either bound may be open.
    DateBetween {
        /// Column the range applies to.
        field: FilterField,
        /// Inclusive lower bound.
        start: Option<DateTime<Utc>>,
        /// Inclusive upper bound.
        end: Option<DateTime<Utc>>,
    },
    /// Minimum threshold (`>=`) on a monetary column.
    AtLeast {
        /// Column the threshold applies to.
        field: FilterField,
        /// The minimum amount.
        amount: Decimal,
    },
    /// Exact match on the lifecycle state of the joined transaction.
    StateEquals(TransactionState),
}

/// One step of a retrieval plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum Stage {
    /// Order rows by a named field.
    Sort {
        /// Field name as supplied by the caller (without direction marker).
        field: String,
        /// Sort direction.
        direction: Direction,
    },
    /// Attach a referenced record, preserving rows with absent references.
    Join(JoinTarget),
    /// Keep rows matching every predicate.
    Filter(Vec<Predicate>),
    /// Skip this many rows.
    Skip(u64),
    /// Keep at most this many rows.
    Limit(u64),
    /// Group rows by the joined dimension record, counting rows per group.
    GroupCount(GroupDimension),
}

/// An ordered, engine-independent retrieval plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Plan {
    /// The stages, in execution order.
    pub stages: Vec<Stage>,
}

impl Plan {
    /// Creates a plan from stages.
    #[must_use]
    pub const fn new(stages: Vec<Stage>) -> Self {
        Self { stages }
    }

    /// Returns the filter predicates, if the plan has a filter stage.
    #[must_use]
    pub fn filter_predicates(&self) -> &[Predicate] {
        self.stages
            .iter()
            .find_map(|stage| match stage {
                Stage::Filter(predicates) => Some(predicates.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    /// Returns the skip/limit window, if the plan paginates.
    #[must_use]
    pub fn window(&self) -> (Option<u64>, Option<u64>) {
        let mut skip = None;
        let mut limit = None;
        for stage in &self.stages {
            match stage {
                Stage::Skip(n) => skip = Some(*n),
                Stage::Limit(n) => limit = Some(*n),
                _ => {}
            }
        }
        (skip, limit)
    }
}
