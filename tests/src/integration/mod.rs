//! Cross-crate integration flows.

pub mod http_flows;
