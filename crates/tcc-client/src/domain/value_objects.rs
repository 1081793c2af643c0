//! # Domain Value Objects
//!
//! Immutable value types for the TCC participant.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Protocol variant of a global transaction.
///
/// The coordinator understands several variants; this participant only
/// drives the `Tcc` state machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransKind {
    /// Try-Confirm-Cancel.
    #[default]
    Tcc,
    /// Saga with compensations.
    Saga,
    /// XA two-phase commit.
    Xa,
    /// Transactional message.
    Msg,
    /// Workflow.
    Workflow,
}

impl TransKind {
    /// Wire name of the variant.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransKind::Tcc => "tcc",
            TransKind::Saga => "saga",
            TransKind::Xa => "xa",
            TransKind::Msg => "msg",
            TransKind::Workflow => "workflow",
        }
    }
}

impl fmt::Display for TransKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tcc" => Ok(TransKind::Tcc),
            "saga" => Ok(TransKind::Saga),
            "xa" => Ok(TransKind::Xa),
            "msg" => Ok(TransKind::Msg),
            "workflow" => Ok(TransKind::Workflow),
            other => Err(format!("unknown transaction kind: {}", other)),
        }
    }
}

/// Coordinator-facing calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Open the global transaction.
    Prepare,
    /// Confirm every registered branch.
    Submit,
    /// Cancel every registered branch.
    Abort,
    /// Record a branch's confirm/cancel callbacks.
    RegisterBranch,
    /// Allocate a fresh global id.
    NewGid,
}

impl Phase {
    /// Path segment appended to the coordinator address.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Phase::Prepare => "prepare",
            Phase::Submit => "submit",
            Phase::Abort => "abort",
            Phase::RegisterBranch => "registerBranch",
            Phase::NewGid => "newGid",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint())
    }
}

/// Branch operation delivered to a participant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchOp {
    /// Tentative execution.
    Try,
    /// Commit the tentative effect.
    Confirm,
    /// Reverse the tentative effect.
    Cancel,
}

impl BranchOp {
    /// Wire name of the operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            BranchOp::Try => "try",
            BranchOp::Confirm => "confirm",
            BranchOp::Cancel => "cancel",
        }
    }
}

impl fmt::Display for BranchOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BranchOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "try" => Ok(BranchOp::Try),
            "confirm" => Ok(BranchOp::Confirm),
            "cancel" => Ok(BranchOp::Cancel),
            other => Err(format!("unknown branch op: {}", other)),
        }
    }
}

/// Per-transaction options forwarded to the coordinator with every phase call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransOptions {
    /// Ask the coordinator to answer submit only after all confirms ran.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub wait_result: bool,
    /// Seconds after which the coordinator gives up and cancels.
    #[serde(skip_serializing_if = "is_zero")]
    pub timeout_to_fail: u64,
    /// Seconds the coordinator waits on each branch callback.
    #[serde(skip_serializing_if = "is_zero")]
    pub request_timeout: u64,
    /// Seconds between coordinator retries of a branch callback.
    #[serde(skip_serializing_if = "is_zero")]
    pub retry_interval: u64,
    /// Extra headers sent on branch calls (both ours and the coordinator's).
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub branch_headers: HashMap<String, String>,
    /// Inbound headers the coordinator should forward to branches.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub passthrough_headers: Vec<String>,
}

fn is_zero(v: &u64) -> bool {
    *v == 0
}

/// Classification of a coordinator or branch response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseClass {
    /// 2xx with no failure marker.
    Success,
    /// 409 or a `FAILURE` marker: the remote refused for good.
    Failure,
    /// 425 or an `ONGOING` marker: the remote has not finished.
    Ongoing,
    /// Any other non-2xx status.
    Error,
}

/// Body marker for a definitive failure.
pub const RESULT_FAILURE: &str = "FAILURE";
/// Body marker for an unfinished operation.
pub const RESULT_ONGOING: &str = "ONGOING";

impl ResponseClass {
    /// Classify a response by status code and body text.
    pub fn classify(status: u16, body: &str) -> Self {
        if status == 409 || body.contains(RESULT_FAILURE) {
            ResponseClass::Failure
        } else if status == 425 || body.contains(RESULT_ONGOING) {
            ResponseClass::Ongoing
        } else if (200..300).contains(&status) {
            ResponseClass::Success
        } else {
            ResponseClass::Error
        }
    }

    /// Check for success.
    pub fn is_success(&self) -> bool {
        *self == ResponseClass::Success
    }
}

/// Response from a successful branch call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BranchResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body text.
    pub body: String,
}
