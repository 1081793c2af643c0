//! # Branch Invocation
//!
//! Issues the try call of an already registered branch.

use crate::domain::{BranchOp, BranchResponse, Result, TccError, TransactionContext};
use crate::ports::BranchGateway;
use std::sync::Arc;
use tracing::{debug, warn};

/// Performs branch try calls.
#[derive(Clone)]
pub struct BranchInvoker {
    branches: Arc<dyn BranchGateway>,
}

impl BranchInvoker {
    /// Create an invoker backed by `branches`.
    pub fn new(branches: Arc<dyn BranchGateway>) -> Self {
        Self { branches }
    }

    /// Call the try address of `branch_id`.
    pub async fn try_branch(
        &self,
        ctx: &TransactionContext,
        branch_id: &str,
        payload: &serde_json::Value,
        try_url: &str,
    ) -> Result<BranchResponse> {
        debug!(gid = %ctx.gid(), branch_id, url = try_url, "calling branch try");

        self.branches
            .request_branch(ctx, branch_id, BranchOp::Try, try_url, payload)
            .await
            .map_err(|e| {
                warn!(gid = %ctx.gid(), branch_id, error = %e, "branch try failed");
                TccError::TryFailed {
                    branch_id: branch_id.to_string(),
                    class: e.class(),
                    reason: e.to_string(),
                }
            })
    }
}
