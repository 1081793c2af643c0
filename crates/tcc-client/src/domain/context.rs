//! # Transaction Context
//!
//! Identity and mutable status of one global transaction, or of one inbound
//! branch acting as a sub-coordinator inside it.

use super::errors::{Result, TccError};
use super::invariants::{invariant_branch_ordinal, invariant_identity_present};
use super::value_objects::{BranchOp, TransKind, TransOptions};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

/// Inbound/outbound parameter carrying the coordinator address.
pub const PARAM_DTM: &str = "dtm";
/// Parameter carrying the global id.
pub const PARAM_GID: &str = "gid";
/// Parameter carrying the calling branch id.
pub const PARAM_BRANCH_ID: &str = "branch_id";
/// Parameter carrying the transaction kind.
pub const PARAM_TRANS_TYPE: &str = "trans_type";
/// Parameter carrying the branch operation.
pub const PARAM_OP: &str = "op";

/// One global transaction as seen by this participant.
///
/// Identity fields never change after construction. The branch counter and
/// the failure reason are the only mutable state; both are safe to touch
/// from concurrently running branches.
#[derive(Debug)]
pub struct TransactionContext {
    gid: String,
    dtm: String,
    kind: TransKind,
    parent_branch_id: String,
    op: Option<BranchOp>,
    branch_seq: AtomicU32,
    failure_reason: Mutex<Option<String>>,
    options: TransOptions,
    custom_data: String,
}

impl TransactionContext {
    /// Open a fresh global transaction context.
    pub fn open(dtm: impl Into<String>, gid: impl Into<String>, kind: TransKind) -> Result<Self> {
        let dtm = dtm.into();
        let gid = gid.into();
        if !invariant_identity_present(&dtm, &gid) {
            return Err(TccError::InvalidArgument(format!(
                "coordinator address and gid are required, got dtm='{}' gid='{}'",
                dtm, gid
            )));
        }
        if kind != TransKind::Tcc {
            return Err(TccError::InvalidArgument(format!(
                "unsupported transaction kind: {}",
                kind
            )));
        }
        Ok(Self::with_parts(dtm, gid, kind, String::new(), None))
    }

    /// Rebuild a context from the parameters of an inbound branch call.
    ///
    /// `dtm` and `gid` are mandatory. `branch_id` becomes the parent id of
    /// every sub-branch registered from the returned context.
    pub fn from_inbound(params: &HashMap<String, String>) -> Result<Self> {
        let get = |key: &str| params.get(key).map(String::as_str).unwrap_or_default();
        let dtm = get(PARAM_DTM);
        let gid = get(PARAM_GID);
        let parent_branch_id = get(PARAM_BRANCH_ID);

        let malformed = || TccError::MalformedContext {
            dtm: dtm.to_string(),
            gid: gid.to_string(),
            parent_branch_id: parent_branch_id.to_string(),
        };

        if !invariant_identity_present(dtm, gid) {
            return Err(malformed());
        }

        let kind = match get(PARAM_TRANS_TYPE) {
            "" => TransKind::Tcc,
            raw => match raw.parse::<TransKind>() {
                Ok(TransKind::Tcc) => TransKind::Tcc,
                _ => return Err(malformed()),
            },
        };
        let op = get(PARAM_OP).parse::<BranchOp>().ok();

        Ok(Self::with_parts(
            dtm.to_string(),
            gid.to_string(),
            kind,
            parent_branch_id.to_string(),
            op,
        ))
    }

    fn with_parts(
        dtm: String,
        gid: String,
        kind: TransKind,
        parent_branch_id: String,
        op: Option<BranchOp>,
    ) -> Self {
        Self {
            gid,
            dtm,
            kind,
            parent_branch_id,
            op,
            branch_seq: AtomicU32::new(0),
            failure_reason: Mutex::new(None),
            options: TransOptions::default(),
            custom_data: String::new(),
        }
    }

    /// Hand out the next sub-branch id: the parent id followed by a
    /// two-digit ordinal starting at `01`.
    pub fn next_branch_id(&self) -> Result<String> {
        let previous = self
            .branch_seq
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                invariant_branch_ordinal(n + 1, &self.parent_branch_id)
                    .ok()
                    .map(|_| n + 1)
            })
            .map_err(|_| TccError::BranchLimitExceeded {
                parent_branch_id: self.parent_branch_id.clone(),
            })?;
        Ok(format!("{}{:02}", self.parent_branch_id, previous + 1))
    }

    /// Record why the business function failed. The first reason wins.
    pub fn record_failure(&self, reason: impl Into<String>) -> bool {
        let mut slot = self.failure_reason.lock();
        if slot.is_some() {
            return false;
        }
        *slot = Some(reason.into());
        true
    }

    /// Recorded failure reason, if any.
    pub fn failure_reason(&self) -> Option<String> {
        self.failure_reason.lock().clone()
    }

    /// Query parameters attached to a branch call so the callee can
    /// reconstruct this transaction.
    pub fn branch_params(&self, branch_id: &str, op: BranchOp) -> Vec<(&'static str, String)> {
        vec![
            (PARAM_DTM, self.dtm.clone()),
            (PARAM_GID, self.gid.clone()),
            (PARAM_BRANCH_ID, branch_id.to_string()),
            (PARAM_TRANS_TYPE, self.kind.as_str().to_string()),
            (PARAM_OP, op.as_str().to_string()),
        ]
    }

    /// Global transaction id.
    pub fn gid(&self) -> &str {
        &self.gid
    }

    /// Coordinator address.
    pub fn dtm(&self) -> &str {
        &self.dtm
    }

    /// Transaction kind.
    pub fn kind(&self) -> TransKind {
        self.kind
    }

    /// Id of the branch this context was reconstructed from; empty for a
    /// freshly opened transaction.
    pub fn parent_branch_id(&self) -> &str {
        &self.parent_branch_id
    }

    /// Operation the inbound call delivered, if known.
    pub fn op(&self) -> Option<BranchOp> {
        self.op
    }

    /// Number of sub-branch ids handed out so far.
    pub fn branches_issued(&self) -> u32 {
        self.branch_seq.load(Ordering::SeqCst)
    }

    /// Transaction options.
    pub fn options(&self) -> &TransOptions {
        &self.options
    }

    /// Mutable options, available until the context is shared.
    pub fn options_mut(&mut self) -> &mut TransOptions {
        &mut self.options
    }

    /// Opaque caller data stored with the transaction on the coordinator.
    pub fn custom_data(&self) -> &str {
        &self.custom_data
    }

    /// Set the opaque caller data.
    pub fn set_custom_data(&mut self, data: impl Into<String>) {
        self.custom_data = data.into();
    }
}
