//! # Domain Errors
//!
//! Error types for the TCC participant.
//!
//! `GatewayError` is what the outbound ports report; the algorithms layer
//! maps it onto the protocol-level `TccError` depending on which phase
//! produced it.

use super::value_objects::{Phase, ResponseClass};
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, TccError>;

/// TCC participant error types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TccError {
    /// Missing or unsupported identity fields when opening a transaction.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Inbound request parameters do not describe a usable branch context.
    #[error("bad tcc info. dtm: {dtm}, gid: {gid} parentID: {parent_branch_id}")]
    MalformedContext {
        /// Coordinator address as received (may be empty)
        dtm: String,
        /// Global id as received (may be empty)
        gid: String,
        /// Parent branch id as received
        parent_branch_id: String,
    },

    /// The coordinator did not accept `prepare`; no branch was attempted.
    #[error("Prepare failed for {gid}: {reason}")]
    PrepareFailed {
        /// Global transaction id
        gid: String,
        /// Transport or coordinator message
        reason: String,
    },

    /// Branch registration could not reach the coordinator.
    #[error("Register branch {branch_id} failed: {reason}")]
    RegistrationFailed {
        /// Branch id being registered
        branch_id: String,
        /// Transport message
        reason: String,
    },

    /// The coordinator refused the branch registration.
    #[error("Register branch {branch_id} rejected: {reason}")]
    RegistrationRejected {
        /// Branch id being registered
        branch_id: String,
        /// How the coordinator's answer was classified, if it answered
        class: Option<ResponseClass>,
        /// Coordinator response
        reason: String,
    },

    /// The try call of a branch did not succeed.
    #[error("Try of branch {branch_id} failed: {reason}")]
    TryFailed {
        /// Branch id
        branch_id: String,
        /// Classification of the branch's answer; `None` when no answer
        /// arrived
        class: Option<ResponseClass>,
        /// Transport message or branch response
        reason: String,
    },

    /// The terminal phase call itself failed. The coordinator may still
    /// drive the transaction to completion on its own schedule.
    #[error("Completion uncertain: {phase} failed: {reason}")]
    CompletionUncertain {
        /// Terminal phase that was attempted
        phase: Phase,
        /// Transport or coordinator message
        reason: String,
        /// Business failure that led to an abort, if any
        original: Option<String>,
    },

    /// Failure reported by the business function.
    #[error("{0}")]
    Business(String),

    /// The business function panicked; the transaction was aborted.
    #[error("business function panicked: {0}")]
    BusinessFault(String),

    /// No sub-branch ordinals left under this parent.
    #[error("branch id is larger than 99 under parent '{parent_branch_id}'")]
    BranchLimitExceeded {
        /// Parent branch id of the exhausted context
        parent_branch_id: String,
    },

    /// The coordinator could not allocate a global id.
    #[error("Gid allocation failed: {0}")]
    GidAllocationFailed(String),

    /// Invalid client configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TccError {
    /// Shorthand for a business-level failure.
    pub fn business(reason: impl Into<String>) -> Self {
        Self::Business(reason.into())
    }
}

/// Errors reported by outbound ports.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The remote side answered with something other than success.
    #[error("status {status}: {body}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Failure, ongoing or plain error
        class: ResponseClass,
        /// Response body text
        body: String,
    },

    /// The response could not be decoded.
    #[error("bad response: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Classification of the remote answer, if one was received.
    pub fn class(&self) -> Option<ResponseClass> {
        match self {
            Self::Rejected { class, .. } => Some(*class),
            Self::Transport(_) | Self::Decode(_) => None,
        }
    }
}
