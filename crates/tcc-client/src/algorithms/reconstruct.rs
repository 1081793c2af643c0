//! # Context Reconstruction
//!
//! Lets a branch service that received a try/confirm/cancel call act as a
//! sub-coordinator within the same global transaction.

use crate::domain::{Result, TransactionContext};
use std::collections::HashMap;
use tracing::debug;

/// Builds branch-side contexts from inbound request parameters.
pub struct ContextReconstructor;

impl ContextReconstructor {
    /// Rebuild the caller's transaction from `params`.
    ///
    /// The returned context numbers its sub-branches under the inbound
    /// `branch_id`, so ids stay unique across the whole transaction tree.
    pub fn from_inbound_with_parent(params: &HashMap<String, String>) -> Result<TransactionContext> {
        let ctx = TransactionContext::from_inbound(params)?;
        debug!(
            gid = %ctx.gid(),
            parent_branch_id = %ctx.parent_branch_id(),
            "reconstructed branch context"
        );
        Ok(ctx)
    }
}
