//! JurisAI gatekeeping backend
//!
//! Request gatekeeping and quota management for the JurisAI legal-assistant
//! application: caller identification, tiered usage quotas, quota-state
//! persistence, and the admission gate in front of the upstream AI proxy.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logging;
pub mod presentation;

mod app;

pub use app::create_app;
pub use config::Config;
pub use logging::init_tracing;
