//! # Algorithms Module
//!
//! The transaction lifecycle: branch registration, try calls, the
//! prepare/submit/abort state machine and inbound context reconstruction.

pub mod global;
pub mod invoker;
pub mod reconstruct;
pub mod registrar;
pub mod tcc;

pub use global::{GlobalTransactionCoordinatorClient, REASON_CANCELLED};
pub use invoker::BranchInvoker;
pub use reconstruct::ContextReconstructor;
pub use registrar::BranchRegistrar;
pub use tcc::Tcc;
