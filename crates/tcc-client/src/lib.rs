//! # TCC Client
//!
//! Participant side of the Try-Confirm-Cancel distributed transaction
//! protocol.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Coordinate several independently failing remote operations ("branches")
//! through an external coordinator so that every branch ends up either
//! confirmed or cancelled:
//! - `prepare` opens the global transaction before any branch runs
//! - each branch is registered with its confirm/cancel callbacks, then tried
//! - exactly one `submit` or `abort` closes the transaction, however the
//!   business function exits
//!
//! ## Guarantees
//!
//! | Property | How |
//! |----------|-----|
//! | Register before try | `Tcc::call_branch` awaits registration first |
//! | Unique branch ids | atomic counter per context, ids nested under parent |
//! | One terminal call | catch_unwind + drop guard around the business future |
//! | First failure wins | failure reason slot is written once |
//!
//! ## Module Structure
//!
//! ```text
//! tcc-client/
//! ├── domain/          # TransactionContext, value objects, errors
//! ├── algorithms/      # Registrar, invoker, global lifecycle, reconstruction
//! ├── ports/           # CoordinatorGateway, BranchGateway
//! └── adapters/        # HTTP/JSON transport
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! let client = GlobalTransactionCoordinatorClient::http(&TccConfig::from_env())?;
//! client
//!     .global_transaction(client.coordinator_url(), "gid-1", |tcc| async move {
//!         tcc.call_branch(&body, TRY_URL, CONFIRM_URL, CANCEL_URL).await?;
//!         tcc.call_branch(&body, TRY_URL_2, CONFIRM_URL_2, CANCEL_URL_2).await
//!     })
//!     .await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::HttpTransport;
pub use algorithms::{
    BranchInvoker, BranchRegistrar, ContextReconstructor, GlobalTransactionCoordinatorClient, Tcc,
    REASON_CANCELLED,
};
pub use config::TccConfig;
pub use domain::{
    invariant_branch_ordinal, invariant_identity_present, BranchOp, BranchRegistration,
    BranchResponse, GatewayError, Phase, ResponseClass, Result, TccError, TransKind,
    TransOptions, TransactionContext, MAX_BRANCH_ORDINAL, PARAM_BRANCH_ID, PARAM_DTM, PARAM_GID,
    PARAM_OP, PARAM_TRANS_TYPE,
};
pub use ports::{
    BranchGateway, CoordinatorGateway, FailurePlan, RecordedCall, RecordingTransport,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
