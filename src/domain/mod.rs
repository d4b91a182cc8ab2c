//! Core domain types and logic.

pub mod candle;
pub mod indicator;
pub mod signal;
pub mod frame;
pub mod strategy;
pub mod config_validation;
pub mod error;
