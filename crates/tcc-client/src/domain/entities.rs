//! # Domain Entities
//!
//! Requests that travel from the participant to the coordinator.

use serde::{Deserialize, Serialize};

/// A branch's registration: where the coordinator should call back on
/// confirm and on cancel, and what to send.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchRegistration {
    /// Sub-branch id issued by the owning context.
    pub branch_id: String,
    /// Opaque payload delivered to confirm/cancel, already serialized.
    pub data: String,
    /// Confirm callback address.
    pub confirm: String,
    /// Cancel callback address.
    pub cancel: String,
}

impl BranchRegistration {
    /// Create a registration for `branch_id`.
    pub fn new(
        branch_id: impl Into<String>,
        data: impl Into<String>,
        confirm: impl Into<String>,
        cancel: impl Into<String>,
    ) -> Self {
        Self {
            branch_id: branch_id.into(),
            data: data.into(),
            confirm: confirm.into(),
            cancel: cancel.into(),
        }
    }
}
