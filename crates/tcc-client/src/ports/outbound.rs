//! # Outbound Ports
//!
//! Traits for the remote parties a participant talks to: the coordinator
//! and the branch services.

use crate::domain::{
    BranchOp, BranchRegistration, BranchResponse, GatewayError, TransactionContext,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Coordinator - outbound port.
///
/// Each call is one blocking round-trip from the caller's point of view.
/// Implementations must not retry on their own.
#[async_trait]
pub trait CoordinatorGateway: Send + Sync {
    /// Open the global transaction.
    async fn prepare(&self, ctx: &TransactionContext) -> Result<(), GatewayError>;

    /// Ask the coordinator to confirm every registered branch.
    async fn submit(&self, ctx: &TransactionContext) -> Result<(), GatewayError>;

    /// Ask the coordinator to cancel every registered branch. Carries the
    /// context's failure reason.
    async fn abort(&self, ctx: &TransactionContext) -> Result<(), GatewayError>;

    /// Record a branch's confirm/cancel callbacks.
    async fn register_branch(
        &self,
        ctx: &TransactionContext,
        registration: &BranchRegistration,
    ) -> Result<(), GatewayError>;

    /// Allocate a fresh global id.
    async fn new_gid(&self, dtm: &str) -> Result<String, GatewayError>;
}

/// Branch service - outbound port.
#[async_trait]
pub trait BranchGateway: Send + Sync {
    /// Call `url` for `op` on branch `branch_id`, passing the transaction
    /// identity along so the callee can rebuild it.
    async fn request_branch(
        &self,
        ctx: &TransactionContext,
        branch_id: &str,
        op: BranchOp,
        url: &str,
        payload: &serde_json::Value,
    ) -> Result<BranchResponse, GatewayError>;
}

// =============================================================================
// Recording Implementation for Testing
// =============================================================================

/// One call observed by [`RecordingTransport`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedCall {
    /// `prepare`.
    Prepare {
        /// Global id
        gid: String,
    },
    /// `submit`.
    Submit {
        /// Global id
        gid: String,
    },
    /// `abort`.
    Abort {
        /// Global id
        gid: String,
        /// Failure reason carried by the call
        reason: Option<String>,
    },
    /// `registerBranch`, recorded once the registration has completed.
    RegisterBranch {
        /// Global id
        gid: String,
        /// Branch id
        branch_id: String,
        /// Confirm address
        confirm: String,
        /// Cancel address
        cancel: String,
    },
    /// A branch call, recorded when it starts.
    Branch {
        /// Global id
        gid: String,
        /// Branch id
        branch_id: String,
        /// Operation
        op: BranchOp,
        /// Target address
        url: String,
    },
    /// `newGid`.
    NewGid,
}

/// Failures a [`RecordingTransport`] should inject.
#[derive(Clone, Debug, Default)]
pub struct FailurePlan {
    /// Error returned by `prepare`.
    pub prepare: Option<GatewayError>,
    /// Error returned by `submit`.
    pub submit: Option<GatewayError>,
    /// Error returned by `abort`.
    pub abort: Option<GatewayError>,
    /// Error returned by `register_branch`.
    pub register: Option<GatewayError>,
    /// Error returned by branch calls.
    pub branch: Option<GatewayError>,
    /// Error returned by `new_gid`.
    pub new_gid: Option<GatewayError>,
    /// Time `register_branch` takes before it completes.
    pub register_delay: Option<Duration>,
}

/// In-memory coordinator and branch service that records every call in
/// the order it happened.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    calls: Mutex<Vec<RecordedCall>>,
    plan: FailurePlan,
    gid_seq: AtomicU64,
}

impl RecordingTransport {
    /// Transport where every call succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport that injects the failures in `plan`.
    pub fn with_plan(plan: FailurePlan) -> Self {
        Self {
            plan,
            ..Self::default()
        }
    }

    /// Snapshot of the calls made so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Number of `submit` calls.
    pub fn submit_count(&self) -> usize {
        self.count(|c| matches!(c, RecordedCall::Submit { .. }))
    }

    /// Number of `abort` calls.
    pub fn abort_count(&self) -> usize {
        self.count(|c| matches!(c, RecordedCall::Abort { .. }))
    }

    fn count(&self, pred: impl Fn(&RecordedCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: RecordedCall) {
        self.calls.lock().push(call);
    }

    fn outcome(failure: &Option<GatewayError>) -> Result<(), GatewayError> {
        match failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CoordinatorGateway for RecordingTransport {
    async fn prepare(&self, ctx: &TransactionContext) -> Result<(), GatewayError> {
        self.record(RecordedCall::Prepare {
            gid: ctx.gid().to_string(),
        });
        Self::outcome(&self.plan.prepare)
    }

    async fn submit(&self, ctx: &TransactionContext) -> Result<(), GatewayError> {
        self.record(RecordedCall::Submit {
            gid: ctx.gid().to_string(),
        });
        Self::outcome(&self.plan.submit)
    }

    async fn abort(&self, ctx: &TransactionContext) -> Result<(), GatewayError> {
        self.record(RecordedCall::Abort {
            gid: ctx.gid().to_string(),
            reason: ctx.failure_reason(),
        });
        Self::outcome(&self.plan.abort)
    }

    async fn register_branch(
        &self,
        ctx: &TransactionContext,
        registration: &BranchRegistration,
    ) -> Result<(), GatewayError> {
        if let Some(delay) = self.plan.register_delay {
            tokio::time::sleep(delay).await;
        }
        self.record(RecordedCall::RegisterBranch {
            gid: ctx.gid().to_string(),
            branch_id: registration.branch_id.clone(),
            confirm: registration.confirm.clone(),
            cancel: registration.cancel.clone(),
        });
        Self::outcome(&self.plan.register)
    }

    async fn new_gid(&self, _dtm: &str) -> Result<String, GatewayError> {
        self.record(RecordedCall::NewGid);
        Self::outcome(&self.plan.new_gid)?;
        let n = self.gid_seq.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("gid-{}", n))
    }
}

#[async_trait]
impl BranchGateway for RecordingTransport {
    async fn request_branch(
        &self,
        ctx: &TransactionContext,
        branch_id: &str,
        op: BranchOp,
        url: &str,
        _payload: &serde_json::Value,
    ) -> Result<BranchResponse, GatewayError> {
        self.record(RecordedCall::Branch {
            gid: ctx.gid().to_string(),
            branch_id: branch_id.to_string(),
            op,
            url: url.to_string(),
        });
        Self::outcome(&self.plan.branch)?;
        Ok(BranchResponse {
            status: 200,
            body: "{\"dtm_result\":\"SUCCESS\"}".to_string(),
        })
    }
}
