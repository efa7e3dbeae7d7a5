//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. Domain failures surface as `LedgerError`; raw `DbErr`
//! never crosses the crate boundary.

pub mod account;
pub mod counter;
pub mod document;
pub mod plan_exec;
pub mod reference;
pub mod transaction;
pub mod transaction_line;
pub mod user;
pub mod vendor;

#[cfg(test)]
mod posting_integration_tests;

pub use account::{AccountInput, AccountRepository, AccountUpdate};
pub use counter::CounterRepository;
pub use document::DocumentRepository;
pub use plan_exec::{GroupRow, LineWithRefs, PlanExecutor, TransactionWithUser};
pub use transaction::TransactionRepository;
pub use transaction_line::TransactionLineRepository;
pub use user::{UserInput, UserRepository, UserUpdate};
pub use vendor::{VendorInput, VendorRepository};
