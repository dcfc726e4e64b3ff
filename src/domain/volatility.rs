//! Annualized theme volatility from equal-weighted daily theme returns.
//!
//! For each theme the daily series is the mean, across the theme's tickers
//! present in the return table, of that date's defined returns. Volatility is
//! the sample standard deviation of that series scaled by sqrt(periods/year).

use crate::domain::returns::ReturnTable;
use crate::domain::theme::ThemeGroups;
use std::collections::BTreeMap;
use std::fmt;

/// Canonical trading-day count used to annualize daily volatility.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

pub type ThemeVolatility = BTreeMap<String, f64>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// None of the theme's tickers appear in the return table.
    NoValidTickers,
    /// Fewer than two daily observations; sample deviation is undefined.
    InsufficientHistory { observations: usize },
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::NoValidTickers => write!(f, "no valid price data for any ticker"),
            DropReason::InsufficientHistory { observations } => {
                write!(f, "only {observations} daily return(s), need at least 2")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedTheme {
    pub theme: String,
    pub reason: DropReason,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VolatilityEstimate {
    pub volatilities: ThemeVolatility,
    pub dropped: Vec<DroppedTheme>,
}

pub fn estimate_theme_volatility(
    returns: &ReturnTable,
    themes: &ThemeGroups,
    periods_per_year: f64,
) -> VolatilityEstimate {
    let mut volatilities = ThemeVolatility::new();
    let mut dropped = Vec::new();

    for theme in themes.iter() {
        let columns: Vec<usize> = theme
            .tickers
            .iter()
            .filter_map(|t| returns.column_index(t))
            .collect();

        if columns.is_empty() {
            log::warn!("no valid data for theme {}, dropping it", theme.name);
            dropped.push(DroppedTheme {
                theme: theme.name.clone(),
                reason: DropReason::NoValidTickers,
            });
            continue;
        }

        let series = equal_weight_series(returns, &columns);
        match sample_std_dev(&series) {
            Some(std_dev) => {
                let vol = std_dev * periods_per_year.sqrt();
                log::debug!(
                    "theme {}: {} of {} tickers valid, volatility {:.4}",
                    theme.name,
                    columns.len(),
                    theme.ticker_count(),
                    vol
                );
                volatilities.insert(theme.name.clone(), vol);
            }
            None => {
                log::warn!(
                    "theme {} has {} daily return(s), dropping it",
                    theme.name,
                    series.len()
                );
                dropped.push(DroppedTheme {
                    theme: theme.name.clone(),
                    reason: DropReason::InsufficientHistory {
                        observations: series.len(),
                    },
                });
            }
        }
    }

    VolatilityEstimate {
        volatilities,
        dropped,
    }
}

/// Per-date mean of the defined cells in `columns`; dates with no defined
/// cell are skipped.
fn equal_weight_series(returns: &ReturnTable, columns: &[usize]) -> Vec<f64> {
    returns
        .rows()
        .iter()
        .filter_map(|row| {
            let values: Vec<f64> = columns.iter().filter_map(|&c| row[c]).collect();
            if values.is_empty() {
                None
            } else {
                Some(values.iter().sum::<f64>() / values.len() as f64)
            }
        })
        .collect()
}

/// Sample standard deviation (n - 1 denominator).
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(variance.sqrt())
}
