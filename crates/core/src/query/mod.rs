//! Engine-independent data-retrieval plans.
//!
//! The compiler turns loosely-typed search parameters into an ordered stage
//! list; the report aggregator builds group/count plans. Neither executes
//! anything - execution belongs to the persistence collaborator.

pub mod compiler;
pub mod plan;
pub mod report;

#[cfg(test)]
mod compiler_props;

pub use compiler::{
    compile_line_search, compile_transaction_search, LineSearchParams, PageParams,
    ResolvedRefFilters, TransactionSearchParams,
};
pub use plan::{Direction, FilterField, GroupDimension, JoinTarget, Plan, Predicate, Stage};
pub use report::compile_group;
