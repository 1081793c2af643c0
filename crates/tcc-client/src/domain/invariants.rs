//! # Domain Invariants
//!
//! Business rules every transaction context must satisfy.

use super::errors::TccError;

/// Highest ordinal a single context may hand out (two decimal digits).
pub const MAX_BRANCH_ORDINAL: u32 = 99;

/// Invariant: a context needs both a coordinator address and a global id
/// before any phase call may be made.
pub fn invariant_identity_present(dtm: &str, gid: &str) -> bool {
    !dtm.is_empty() && !gid.is_empty()
}

/// Invariant: sub-branch ordinals fit in two digits.
///
/// Keeps ids produced under one parent the same width, so they sort
/// in issue order.
pub fn invariant_branch_ordinal(ordinal: u32, parent_branch_id: &str) -> Result<(), TccError> {
    if ordinal == 0 || ordinal > MAX_BRANCH_ORDINAL {
        return Err(TccError::BranchLimitExceeded {
            parent_branch_id: parent_branch_id.to_string(),
        });
    }
    Ok(())
}
