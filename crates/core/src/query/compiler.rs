//! The query compiler.
//!
//! Turns a set of loosely-typed filter/sort/pagination parameters into an
//! executable retrieval plan. Inputs arrive as raw strings straight off the
//! query string; anything that fails to parse degrades the way the API
//! always has: an unresolvable filter identifier means "no filter", a
//! non-numeric page means "first page". The compiler never executes the
//! plan it returns.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use uuid::Uuid;

use crate::ledger::TransactionState;

use super::plan::{Direction, FilterField, JoinTarget, Plan, Predicate, Stage};

/// Raw pagination parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    /// Page number (1-indexed); non-numeric or non-positive means page one.
    pub page: Option<String>,
    /// Page size; pagination only happens when this parses positive.
    pub limit: Option<String>,
}

/// Raw search parameters for transaction lines.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineSearchParams {
    /// Exact-match account filter (applied only if it resolves).
    pub account_id: Option<String>,
    /// Exact-match transaction filter (applied only if it resolves).
    pub transaction_id: Option<String>,
    /// Exact-match vendor filter (applied only if it resolves).
    pub vendor_id: Option<String>,
    /// Inclusive lower date bound, epoch seconds; zero means open.
    pub start_date: Option<String>,
    /// Inclusive upper date bound, epoch seconds; zero means open.
    pub end_date: Option<String>,
    /// Minimum debit amount.
    pub debit: Option<String>,
    /// Minimum credit amount.
    pub credit: Option<String>,
    /// Exact-match lifecycle state.
    pub state: Option<String>,
    /// Sort key; a leading `-` means descending.
    pub sort: Option<String>,
    /// Pagination.
    #[serde(flatten)]
    pub page: PageParams,
}

/// Raw search parameters for transaction headers.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSearchParams {
    /// Inclusive lower date bound, epoch seconds; zero means open.
    pub start_date: Option<String>,
    /// Inclusive upper date bound, epoch seconds; zero means open.
    pub end_date: Option<String>,
    /// Sort key; a leading `-` means descending.
    pub sort: Option<String>,
    /// Pagination.
    #[serde(flatten)]
    pub page: PageParams,
}

/// Resolution outcomes for the exact-match filter identifiers.
///
/// The persistence layer resolves each supplied identifier before
/// compilation; malformed or unknown identifiers come back as `None` and
/// the filter is silently dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolvedRefFilters {
    /// Resolved account filter, if any.
    pub account_id: Option<Uuid>,
    /// Resolved transaction filter, if any.
    pub transaction_id: Option<Uuid>,
    /// Resolved vendor filter, if any.
    pub vendor_id: Option<Uuid>,
}

/// Compiles the line search plan.
///
/// Stage order is fixed: optional sort, the four left-outer joins, one
/// filter stage (possibly empty, meaning match-all), then pagination when a
/// page size was supplied.
#[must_use]
pub fn compile_line_search(params: &LineSearchParams, refs: &ResolvedRefFilters) -> Plan {
    let mut stages = Vec::new();

    if let Some(sort) = parse_sort(params.sort.as_deref()) {
        stages.push(sort);
    }

    stages.push(Stage::Join(JoinTarget::Transaction));
    stages.push(Stage::Join(JoinTarget::Account));
    stages.push(Stage::Join(JoinTarget::Vendor));
    stages.push(Stage::Join(JoinTarget::User));

    let mut predicates = Vec::new();
    if let Some(id) = refs.account_id {
        predicates.push(Predicate::RefEquals {
            field: FilterField::AccountId,
            id,
        });
    }
    if let Some(id) = refs.transaction_id {
        predicates.push(Predicate::RefEquals {
            field: FilterField::TransactionId,
            id,
        });
    }
    if let Some(id) = refs.vendor_id {
        predicates.push(Predicate::RefEquals {
            field: FilterField::VendorId,
            id,
        });
    }
    if let Some(range) = parse_date_range(
        FilterField::TransactionDate,
        params.start_date.as_deref(),
        params.end_date.as_deref(),
    ) {
        predicates.push(range);
    }
    if let Some(amount) = parse_threshold(params.debit.as_deref()) {
        predicates.push(Predicate::AtLeast {
            field: FilterField::Debit,
            amount,
        });
    }
    if let Some(amount) = parse_threshold(params.credit.as_deref()) {
        predicates.push(Predicate::AtLeast {
            field: FilterField::Credit,
            amount,
        });
    }
    if let Some(state) = params
        .state
        .as_deref()
        .map(str::trim)
        .and_then(TransactionState::parse)
    {
        predicates.push(Predicate::StateEquals(state));
    }
    stages.push(Stage::Filter(predicates));

    push_pagination(&mut stages, &params.page);

    Plan::new(stages)
}

/// Compiles the transaction header search plan.
///
/// Same shape as the line search, over the header's own date with only the
/// user join.
#[must_use]
pub fn compile_transaction_search(params: &TransactionSearchParams) -> Plan {
    let mut stages = Vec::new();

    if let Some(sort) = parse_sort(params.sort.as_deref()) {
        stages.push(sort);
    }

    stages.push(Stage::Join(JoinTarget::User));

    let mut predicates = Vec::new();
    if let Some(range) = parse_date_range(
        FilterField::Date,
        params.start_date.as_deref(),
        params.end_date.as_deref(),
    ) {
        predicates.push(range);
    }
    stages.push(Stage::Filter(predicates));

    push_pagination(&mut stages, &params.page);

    Plan::new(stages)
}

/// Parses the sort parameter; a leading `-` flips direction.
fn parse_sort(raw: Option<&str>) -> Option<Stage> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    let (field, direction) = match raw.strip_prefix('-') {
        Some(field) => (field, Direction::Descending),
        None => (raw, Direction::Ascending),
    };
    if field.is_empty() {
        return None;
    }
    Some(Stage::Sort {
        field: field.to_owned(),
        direction,
    })
}

/// Parses one epoch-seconds bound; zero or unparseable means open.
fn parse_epoch_bound(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let secs = raw?.trim().parse::<i64>().ok()?;
    if secs == 0 {
        return None;
    }
    DateTime::from_timestamp(secs, 0)
}

/// Builds the inclusive date-range predicate when either bound is present.
fn parse_date_range(
    field: FilterField,
    start: Option<&str>,
    end: Option<&str>,
) -> Option<Predicate> {
    let start = parse_epoch_bound(start);
    let end = parse_epoch_bound(end);
    if start.is_none() && end.is_none() {
        return None;
    }
    Some(Predicate::DateBetween { field, start, end })
}

/// Parses a minimum-threshold amount; only positive values filter.
fn parse_threshold(raw: Option<&str>) -> Option<Decimal> {
    let amount = Decimal::from_str(raw?.trim()).ok()?;
    (amount > Decimal::ZERO).then_some(amount)
}

/// Appends skip/limit stages when a positive page size was supplied.
///
/// `skip = (page - 1) * limit` when both parse as positive numbers,
/// otherwise zero.
fn push_pagination(stages: &mut Vec<Stage>, page: &PageParams) {
    let Some(limit) = page
        .limit
        .as_deref()
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .filter(|limit| *limit > 0)
    else {
        return;
    };

    // Saturating: an absurd page number clamps to the end instead of
    // overflowing the multiply.
    let skip = page
        .page
        .as_deref()
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .filter(|page| *page > 0)
        .map_or(0, |page| page.saturating_sub(1).saturating_mul(limit));

    stages.push(Stage::Skip(skip));
    stages.push(Stage::Limit(limit));
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn line_params() -> LineSearchParams {
        LineSearchParams::default()
    }

    #[test]
    fn test_default_plan_shape() {
        let plan = compile_line_search(&line_params(), &ResolvedRefFilters::default());
        assert_eq!(
            plan.stages,
            vec![
                Stage::Join(JoinTarget::Transaction),
                Stage::Join(JoinTarget::Account),
                Stage::Join(JoinTarget::Vendor),
                Stage::Join(JoinTarget::User),
                Stage::Filter(vec![]),
            ]
        );
    }

    #[rstest]
    #[case("date", Direction::Ascending, "date")]
    #[case("-date", Direction::Descending, "date")]
    #[case("  -debit ", Direction::Descending, "debit")]
    fn test_sort_direction(
        #[case] raw: &str,
        #[case] direction: Direction,
        #[case] field: &str,
    ) {
        let mut params = line_params();
        params.sort = Some(raw.to_owned());
        let plan = compile_line_search(&params, &ResolvedRefFilters::default());
        assert_eq!(
            plan.stages[0],
            Stage::Sort {
                field: field.to_owned(),
                direction,
            }
        );
    }

    #[test]
    fn test_blank_sort_ignored() {
        let mut params = line_params();
        params.sort = Some("   ".to_owned());
        let plan = compile_line_search(&params, &ResolvedRefFilters::default());
        assert!(matches!(plan.stages[0], Stage::Join(_)));
    }

    #[test]
    fn test_resolved_filters_become_predicates() {
        let refs = ResolvedRefFilters {
            account_id: Some(Uuid::new_v4()),
            transaction_id: None,
            vendor_id: Some(Uuid::new_v4()),
        };
        let plan = compile_line_search(&line_params(), &refs);
        let predicates = plan.filter_predicates();
        assert_eq!(predicates.len(), 2);
        assert!(matches!(
            predicates[0],
            Predicate::RefEquals {
                field: FilterField::AccountId,
                ..
            }
        ));
        assert!(matches!(
            predicates[1],
            Predicate::RefEquals {
                field: FilterField::VendorId,
                ..
            }
        ));
    }

    #[test]
    fn test_date_range_is_inclusive_of_bounds() {
        let mut params = line_params();
        params.start_date = Some("100".to_owned());
        params.end_date = Some("200".to_owned());
        let plan = compile_line_search(&params, &ResolvedRefFilters::default());

        let Predicate::DateBetween { start, end, field } = &plan.filter_predicates()[0] else {
            panic!("expected a date-range predicate");
        };
        assert_eq!(*field, FilterField::TransactionDate);
        let start = start.unwrap();
        let end = end.unwrap();

        let admits = |secs: i64| {
            let date = DateTime::from_timestamp(secs, 0).unwrap();
            date >= start && date <= end
        };
        assert!(!admits(50));
        assert!(admits(100));
        assert!(admits(150));
        assert!(admits(200));
        assert!(!admits(250));
    }

    #[rstest]
    #[case(Some("100"), None)]
    #[case(None, Some("200"))]
    fn test_single_bound_range(#[case] start: Option<&str>, #[case] end: Option<&str>) {
        let mut params = line_params();
        params.start_date = start.map(str::to_owned);
        params.end_date = end.map(str::to_owned);
        let plan = compile_line_search(&params, &ResolvedRefFilters::default());
        assert_eq!(plan.filter_predicates().len(), 1);
    }

    #[test]
    fn test_zero_bound_means_open() {
        let mut params = line_params();
        params.start_date = Some("0".to_owned());
        params.end_date = Some("200".to_owned());
        let plan = compile_line_search(&params, &ResolvedRefFilters::default());
        let Predicate::DateBetween { start, end, .. } = &plan.filter_predicates()[0] else {
            panic!("expected a date-range predicate");
        };
        assert!(start.is_none());
        assert!(end.is_some());
    }

    #[test]
    fn test_amount_thresholds() {
        let mut params = line_params();
        params.debit = Some("10.50".to_owned());
        params.credit = Some("0".to_owned());
        let plan = compile_line_search(&params, &ResolvedRefFilters::default());
        let predicates = plan.filter_predicates();
        assert_eq!(predicates.len(), 1);
        assert!(matches!(
            predicates[0],
            Predicate::AtLeast {
                field: FilterField::Debit,
                ..
            }
        ));
    }

    #[test]
    fn test_state_filter() {
        let mut params = line_params();
        params.state = Some("draft".to_owned());
        let plan = compile_line_search(&params, &ResolvedRefFilters::default());
        assert_eq!(
            plan.filter_predicates(),
            &[Predicate::StateEquals(TransactionState::Draft)]
        );
    }

    #[rstest]
    #[case(Some("2"), Some("10"), Some(10), Some(10))]
    #[case(Some("0"), Some("10"), Some(0), Some(10))]
    #[case(Some("abc"), Some("10"), Some(0), Some(10))]
    #[case(None, Some("10"), Some(0), Some(10))]
    #[case(Some("2"), None, None, None)]
    #[case(Some("2"), Some("0"), None, None)]
    #[case(Some("2"), Some("nope"), None, None)]
    #[case(Some("18446744073709551615"), Some("10"), Some(u64::MAX), Some(10))]
    fn test_pagination(
        #[case] page: Option<&str>,
        #[case] limit: Option<&str>,
        #[case] skip: Option<u64>,
        #[case] expected_limit: Option<u64>,
    ) {
        let mut params = line_params();
        params.page = PageParams {
            page: page.map(str::to_owned),
            limit: limit.map(str::to_owned),
        };
        let plan = compile_line_search(&params, &ResolvedRefFilters::default());
        assert_eq!(plan.window(), (skip, expected_limit));
    }

    #[test]
    fn test_transaction_search_shape() {
        let params = TransactionSearchParams {
            start_date: Some("100".to_owned()),
            sort: Some("-date".to_owned()),
            ..TransactionSearchParams::default()
        };
        let plan = compile_transaction_search(&params);
        assert!(matches!(
            plan.stages[0],
            Stage::Sort {
                direction: Direction::Descending,
                ..
            }
        ));
        assert_eq!(plan.stages[1], Stage::Join(JoinTarget::User));
        assert!(matches!(
            plan.filter_predicates()[0],
            Predicate::DateBetween {
                field: FilterField::Date,
                ..
            }
        ));
    }
}
