//! # Branch Registration
//!
//! Tells the coordinator how to confirm or cancel a branch. Must complete
//! before the branch's try call is made.

use crate::domain::{BranchRegistration, GatewayError, Result, TccError, TransactionContext};
use crate::ports::CoordinatorGateway;
use std::sync::Arc;
use tracing::{debug, warn};

/// Registers branches with the coordinator.
#[derive(Clone)]
pub struct BranchRegistrar {
    coordinator: Arc<dyn CoordinatorGateway>,
}

impl BranchRegistrar {
    /// Create a registrar backed by `coordinator`.
    pub fn new(coordinator: Arc<dyn CoordinatorGateway>) -> Self {
        Self { coordinator }
    }

    /// Register `branch_id` with its callbacks and payload.
    pub async fn register(
        &self,
        ctx: &TransactionContext,
        branch_id: &str,
        payload: &serde_json::Value,
        confirm_url: &str,
        cancel_url: &str,
    ) -> Result<()> {
        let registration =
            BranchRegistration::new(branch_id, payload.to_string(), confirm_url, cancel_url);

        debug!(gid = %ctx.gid(), branch_id, "registering branch");

        self.coordinator
            .register_branch(ctx, &registration)
            .await
            .map_err(|e| {
                warn!(gid = %ctx.gid(), branch_id, error = %e, "branch registration failed");
                match e {
                    GatewayError::Transport(reason) => TccError::RegistrationFailed {
                        branch_id: branch_id.to_string(),
                        reason,
                    },
                    other => TccError::RegistrationRejected {
                        branch_id: branch_id.to_string(),
                        class: other.class(),
                        reason: other.to_string(),
                    },
                }
            })
    }
}
