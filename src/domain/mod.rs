//! Core domain types and allocation logic.

pub mod price_table;
pub mod theme;
pub mod returns;
pub mod volatility;
pub mod weights;
pub mod allocation;
pub mod report;
pub mod pipeline;
pub mod config_validation;
pub mod error;
