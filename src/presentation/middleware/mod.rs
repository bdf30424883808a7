//! HTTP middleware

pub mod quota_gate;

pub use quota_gate::{QuotaGateState, quota_gate_middleware};
