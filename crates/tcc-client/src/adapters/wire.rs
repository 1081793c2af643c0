//! Request and response bodies exchanged with the coordinator.

use crate::domain::{BranchRegistration, TransKind, TransOptions, TransactionContext};
use serde::{Deserialize, Serialize};

/// Body of `prepare`, `submit` and `abort`.
#[derive(Debug, Serialize)]
pub struct PhaseBody<'a> {
    /// Global id
    pub gid: &'a str,
    /// Transaction kind
    pub trans_type: TransKind,
    /// Opaque caller data
    #[serde(skip_serializing_if = "is_empty")]
    pub custom_data: &'a str,
    /// Why the transaction is being aborted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rollback_reason: Option<String>,
    /// Transaction options, inlined
    #[serde(flatten)]
    pub options: &'a TransOptions,
}

impl<'a> PhaseBody<'a> {
    /// Snapshot the context into a phase body.
    pub fn from_context(ctx: &'a TransactionContext) -> Self {
        Self {
            gid: ctx.gid(),
            trans_type: ctx.kind(),
            custom_data: ctx.custom_data(),
            rollback_reason: ctx.failure_reason(),
            options: ctx.options(),
        }
    }
}

/// Body of `registerBranch`.
#[derive(Debug, Serialize)]
pub struct RegisterBranchBody<'a> {
    /// Global id
    pub gid: &'a str,
    /// Transaction kind
    pub trans_type: TransKind,
    /// Branch id, payload and callbacks, inlined
    #[serde(flatten)]
    pub registration: &'a BranchRegistration,
}

/// Response of `newGid`.
#[derive(Debug, Deserialize)]
pub struct NewGidResponse {
    /// Allocated global id
    pub gid: String,
}

fn is_empty(s: &&str) -> bool {
    s.is_empty()
}
