//! Configuration validation.
//!
//! Checks every config field before an allocation runs.

use crate::domain::error::AllocatorError;
use crate::domain::pipeline::{
    DEFAULT_LOOKBACK_DAYS, DEFAULT_PORTFOLIO_VALUE, MAX_LOOKBACK_DAYS, MIN_LOOKBACK_DAYS,
    parse_portfolio_value,
};
use crate::domain::theme::parse_tickers;
use crate::ports::config_port::ConfigPort;
use std::collections::HashSet;

pub const THEME_ORDER_KEY: &str = "order";

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), AllocatorError> {
    validate_portfolio_value(config)?;
    validate_lookback(config)?;
    validate_periods_per_year(config)?;
    validate_themes(config)?;
    Ok(())
}

/// An unusable value is not fatal: the run falls back to the default.
fn validate_portfolio_value(config: &dyn ConfigPort) -> Result<(), AllocatorError> {
    if let Some(raw) = config.get_string("portfolio", "value") {
        if parse_portfolio_value(&raw).is_none() {
            log::warn!(
                "[portfolio] value {:?} is not a positive amount, default ${:.2} will be used",
                raw,
                DEFAULT_PORTFOLIO_VALUE
            );
        }
    }
    Ok(())
}

fn validate_lookback(config: &dyn ConfigPort) -> Result<(), AllocatorError> {
    let value = config.get_int("portfolio", "lookback_days", DEFAULT_LOOKBACK_DAYS);
    if !(MIN_LOOKBACK_DAYS..=MAX_LOOKBACK_DAYS).contains(&value) {
        return Err(AllocatorError::ConfigInvalid {
            section: "portfolio".to_string(),
            key: "lookback_days".to_string(),
            reason: format!(
                "lookback_days must be between {MIN_LOOKBACK_DAYS} and {MAX_LOOKBACK_DAYS}"
            ),
        });
    }
    Ok(())
}

fn validate_periods_per_year(config: &dyn ConfigPort) -> Result<(), AllocatorError> {
    let value = config.get_double("portfolio", "periods_per_year", 252.0);
    if !(value.is_finite() && value > 0.0) {
        return Err(AllocatorError::ConfigInvalid {
            section: "portfolio".to_string(),
            key: "periods_per_year".to_string(),
            reason: "periods_per_year must be positive".to_string(),
        });
    }
    Ok(())
}

/// Theme names in processing order: the `order` key if present, otherwise
/// every key of `[themes]` in declaration order.
pub fn theme_names(config: &dyn ConfigPort) -> Vec<String> {
    match config.get_string("themes", THEME_ORDER_KEY) {
        Some(order) => order
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        None => config
            .section_keys("themes")
            .into_iter()
            .filter(|k| k != THEME_ORDER_KEY)
            .collect(),
    }
}

fn validate_themes(config: &dyn ConfigPort) -> Result<(), AllocatorError> {
    let names = theme_names(config);
    if names.is_empty() {
        return Err(AllocatorError::ConfigMissing {
            section: "themes".to_string(),
            key: "<theme name>".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for name in &names {
        if !seen.insert(name.as_str()) {
            return Err(AllocatorError::ConfigInvalid {
                section: "themes".to_string(),
                key: THEME_ORDER_KEY.to_string(),
                reason: format!("theme {name} listed twice"),
            });
        }
        let tickers = config
            .get_string("themes", name)
            .ok_or_else(|| AllocatorError::ConfigMissing {
                section: "themes".to_string(),
                key: name.clone(),
            })?;
        let parsed = parse_tickers(name, &tickers)?;
        let mut unique = HashSet::new();
        if let Some(dup) = parsed.iter().find(|t| !unique.insert(t.as_str())) {
            return Err(AllocatorError::ConfigInvalid {
                section: "themes".to_string(),
                key: name.clone(),
                reason: format!("ticker {dup} listed twice"),
            });
        }
    }
    Ok(())
}
