//! # Domain Module
//!
//! Core domain types for the TCC participant.

pub mod context;
pub mod entities;
pub mod errors;
pub mod invariants;
pub mod value_objects;

pub use context::*;
pub use entities::*;
pub use errors::*;
pub use invariants::*;
pub use value_objects::*;
