//! # TCC Handle
//!
//! What a business function receives: the shared transaction context plus
//! the means to register and try branches inside it.

use super::invoker::BranchInvoker;
use super::reconstruct::ContextReconstructor;
use super::registrar::BranchRegistrar;
use crate::domain::{BranchResponse, Result, TccError, TransactionContext};
use crate::ports::{BranchGateway, CoordinatorGateway};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Handle to one global transaction.
///
/// Cheap to clone; clones share the same context, so branches may be
/// fanned out concurrently and still receive distinct ids.
#[derive(Clone)]
pub struct Tcc {
    ctx: Arc<TransactionContext>,
    registrar: BranchRegistrar,
    invoker: BranchInvoker,
}

impl Tcc {
    pub(crate) fn new(
        ctx: Arc<TransactionContext>,
        registrar: BranchRegistrar,
        invoker: BranchInvoker,
    ) -> Self {
        Self {
            ctx,
            registrar,
            invoker,
        }
    }

    /// Rebuild a handle inside a branch service so it can open sub-branches
    /// of the transaction that called it.
    pub fn from_inbound(
        params: &HashMap<String, String>,
        coordinator: Arc<dyn CoordinatorGateway>,
        branches: Arc<dyn BranchGateway>,
    ) -> Result<Self> {
        let ctx = ContextReconstructor::from_inbound_with_parent(params)?;
        Ok(Self::new(
            Arc::new(ctx),
            BranchRegistrar::new(coordinator),
            BranchInvoker::new(branches),
        ))
    }

    /// Shared transaction context.
    pub fn context(&self) -> &TransactionContext {
        &self.ctx
    }

    /// Global transaction id.
    pub fn gid(&self) -> &str {
        self.ctx.gid()
    }

    /// Next sub-branch id of this transaction.
    pub fn next_branch_id(&self) -> Result<String> {
        self.ctx.next_branch_id()
    }

    /// Mark the transaction as failed without returning an error, e.g. from
    /// one of several concurrently running branches. The first reason wins
    /// and forces an abort.
    pub fn report_failure(&self, reason: impl Into<String>) {
        self.ctx.record_failure(reason);
    }

    /// Register `branch_id` with the coordinator.
    pub async fn register_branch(
        &self,
        branch_id: &str,
        payload: &serde_json::Value,
        confirm_url: &str,
        cancel_url: &str,
    ) -> Result<()> {
        self.registrar
            .register(&self.ctx, branch_id, payload, confirm_url, cancel_url)
            .await
    }

    /// Call the try address of an already registered branch.
    pub async fn try_branch(
        &self,
        branch_id: &str,
        payload: &serde_json::Value,
        try_url: &str,
    ) -> Result<BranchResponse> {
        self.invoker
            .try_branch(&self.ctx, branch_id, payload, try_url)
            .await
    }

    /// Allocate a branch id, register it, then try it.
    ///
    /// The try call is only made once registration has completed.
    pub async fn call_branch<B: Serialize + ?Sized>(
        &self,
        body: &B,
        try_url: &str,
        confirm_url: &str,
        cancel_url: &str,
    ) -> Result<BranchResponse> {
        let payload = serde_json::to_value(body)
            .map_err(|e| TccError::InvalidArgument(format!("unserializable branch body: {}", e)))?;
        let branch_id = self.next_branch_id()?;
        self.register_branch(&branch_id, &payload, confirm_url, cancel_url)
            .await?;
        self.try_branch(&branch_id, &payload, try_url).await
    }
}
