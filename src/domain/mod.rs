//! Core domain types and logic.

pub mod series;
pub mod returns;
pub mod position;
pub mod signal;
pub mod exposure;
pub mod valuation;
pub mod metrics;
pub mod backtest;
pub mod config_validation;
pub mod error;
