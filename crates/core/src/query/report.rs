//! Report aggregation plans.

use crate::ledger::LedgerError;

use super::plan::{GroupDimension, JoinTarget, Plan, Stage};

/// Compiles a group/count plan over transaction lines.
///
/// Only the `account` and `vendor` dimensions exist; anything else is
/// rejected before any data is touched.
///
/// # Errors
///
/// Returns [`LedgerError::UnsupportedDimension`] for an unknown dimension
/// name.
pub fn compile_group(dimension: &str) -> Result<Plan, LedgerError> {
    let (target, dimension) = match dimension.trim() {
        "account" => (JoinTarget::Account, GroupDimension::Account),
        "vendor" => (JoinTarget::Vendor, GroupDimension::Vendor),
        _ => return Err(LedgerError::UnsupportedDimension),
    };
    Ok(Plan::new(vec![
        Stage::Join(target),
        Stage::GroupCount(dimension),
    ]))
}
