//! Chat application module

pub mod use_cases;
