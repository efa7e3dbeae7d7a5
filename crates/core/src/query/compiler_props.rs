//! Property-based tests for the query compiler.

use proptest::prelude::*;

use super::compiler::{compile_line_search, LineSearchParams, PageParams, ResolvedRefFilters};
use super::plan::{Predicate, Stage};

fn params_with_page(page: String, limit: String) -> LineSearchParams {
    LineSearchParams {
        page: PageParams {
            page: Some(page),
            limit: Some(limit),
        },
        ..LineSearchParams::default()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The skip window is always `(page - 1) * limit` for positive numeric
    /// inputs, and the limit stage carries the parsed size unchanged.
    #[test]
    fn prop_window_arithmetic(page in 1u64..10_000, limit in 1u64..1_000) {
        let params = params_with_page(page.to_string(), limit.to_string());
        let plan = compile_line_search(&params, &ResolvedRefFilters::default());
        prop_assert_eq!(plan.window(), (Some((page - 1) * limit), Some(limit)));
    }

    /// Arbitrary junk in the page parameter never breaks compilation; it
    /// degrades to skip zero whenever a limit is present.
    #[test]
    fn prop_junk_page_degrades_to_first_page(page in "\\PC*", limit in 1u64..1_000) {
        prop_assume!(page.trim().parse::<u64>().ok().filter(|n| *n > 0).is_none());
        let params = params_with_page(page, limit.to_string());
        let plan = compile_line_search(&params, &ResolvedRefFilters::default());
        prop_assert_eq!(plan.window(), (Some(0), Some(limit)));
    }

    /// Without a positive limit no pagination stages exist at all.
    #[test]
    fn prop_no_limit_means_unbounded(page in "\\PC*", limit in "\\PC*") {
        prop_assume!(limit.trim().parse::<u64>().ok().filter(|n| *n > 0).is_none());
        let params = params_with_page(page, limit);
        let plan = compile_line_search(&params, &ResolvedRefFilters::default());
        prop_assert_eq!(plan.window(), (None, None));
    }

    /// Every compiled date range keeps start at or below end whenever both
    /// bounds are supplied in order, and both bounds land in the predicate.
    #[test]
    fn prop_ordered_bounds_survive(start in 1i64..1_000_000, span in 0i64..1_000_000) {
        let end = start + span;
        let params = LineSearchParams {
            start_date: Some(start.to_string()),
            end_date: Some(end.to_string()),
            ..LineSearchParams::default()
        };
        let plan = compile_line_search(&params, &ResolvedRefFilters::default());
        let Predicate::DateBetween { start: lo, end: hi, .. } = &plan.filter_predicates()[0]
        else {
            return Err(TestCaseError::fail("expected a date-range predicate"));
        };
        let lo = lo.ok_or_else(|| TestCaseError::fail("missing lower bound"))?;
        let hi = hi.ok_or_else(|| TestCaseError::fail("missing upper bound"))?;
        prop_assert!(lo <= hi);
        prop_assert_eq!(lo.timestamp(), start);
        prop_assert_eq!(hi.timestamp(), end);
    }

    /// The stage order is invariant under any parameter combination: joins
    /// always precede the filter stage, and the filter stage precedes any
    /// pagination.
    #[test]
    fn prop_stage_order_is_fixed(
        sort in proptest::option::of("-?[a-z]{1,8}"),
        limit in proptest::option::of(1u64..100),
    ) {
        let params = LineSearchParams {
            sort,
            page: PageParams {
                page: None,
                limit: limit.map(|n| n.to_string()),
            },
            ..LineSearchParams::default()
        };
        let plan = compile_line_search(&params, &ResolvedRefFilters::default());

        let position = |matcher: fn(&Stage) -> bool| plan.stages.iter().position(matcher);
        let first_join = position(|s| matches!(s, Stage::Join(_)));
        let filter = position(|s| matches!(s, Stage::Filter(_)));
        let skip = position(|s| matches!(s, Stage::Skip(_)));

        let first_join = first_join.ok_or_else(|| TestCaseError::fail("missing joins"))?;
        let filter = filter.ok_or_else(|| TestCaseError::fail("missing filter stage"))?;
        prop_assert!(first_join < filter);
        if let Some(skip) = skip {
            prop_assert!(filter < skip);
        }
    }
}
