//! # TCC Test Suite
//!
//! End-to-end flows of the participant library against an in-process
//! coordinator and branch service speaking real HTTP.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── support.rs     # axum coordinator + branch service harness
//!     └── http_flows.rs  # global transaction scenarios
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p tcc-tests
//! ```

pub mod integration;
