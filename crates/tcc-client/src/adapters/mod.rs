//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements the outbound port traits over HTTP.

mod http_transport;
pub mod wire;

pub use http_transport::HttpTransport;
