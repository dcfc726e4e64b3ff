//! Allocation pipeline entry point.
//!
//! prices -> returns -> theme volatility -> theme weights -> ticker weights
//! -> allocation rows -> report. Each stage consumes the previous stage's
//! output whole and builds a fresh value.

use crate::domain::allocation::build_allocation;
use crate::domain::error::AllocatorError;
use crate::domain::price_table::{LookbackWindow, PriceTable};
use crate::domain::report::{AllocationReport, theme_summary};
use crate::domain::returns::compute_returns;
use crate::domain::theme::ThemeGroups;
use crate::domain::volatility::{TRADING_DAYS_PER_YEAR, estimate_theme_volatility};
use crate::domain::weights::{ConvictionMultipliers, expand_ticker_weights, theme_weights};
use crate::ports::price_port::PriceSeriesProvider;
use chrono::NaiveDate;

pub const DEFAULT_PORTFOLIO_VALUE: f64 = 23_429.0;
pub const DEFAULT_LOOKBACK_DAYS: i64 = 365;
pub const MIN_LOOKBACK_DAYS: i64 = 2;
/// One hundred years of calendar days.
pub const MAX_LOOKBACK_DAYS: i64 = 36_500;

/// Run parameters, built once by the caller and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationConfig {
    pub portfolio_value: f64,
    pub conviction: Option<ConvictionMultipliers>,
    pub lookback_days: i64,
    pub periods_per_year: f64,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            portfolio_value: DEFAULT_PORTFOLIO_VALUE,
            conviction: None,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            periods_per_year: TRADING_DAYS_PER_YEAR,
        }
    }
}

/// Parses a dollar amount, accepting a leading `$` and thousands separators.
pub fn parse_portfolio_value(input: &str) -> Option<f64> {
    let cleaned: String = input
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

impl AllocationConfig {
    pub fn lookback(&self, as_of: NaiveDate) -> LookbackWindow {
        LookbackWindow::new(as_of, self.lookback_days)
    }
}

/// Runs every stage after price retrieval.
pub fn allocate(
    prices: &PriceTable,
    themes: &ThemeGroups,
    config: &AllocationConfig,
) -> Result<AllocationReport, AllocatorError> {
    if !(config.periods_per_year.is_finite() && config.periods_per_year > 0.0) {
        return Err(AllocatorError::InvalidPeriodsPerYear {
            value: config.periods_per_year,
        });
    }
    let returns = compute_returns(prices)?;
    let estimate = estimate_theme_volatility(&returns, themes, config.periods_per_year);
    for dropped in &estimate.dropped {
        log::warn!("dropped theme {}: {}", dropped.theme, dropped.reason);
    }

    let weights = theme_weights(&estimate.volatilities, config.conviction.as_ref())?;
    let tickers = expand_ticker_weights(themes, &weights);
    let allocation = build_allocation(&tickers.weights, prices, config.portfolio_value)?;
    log::info!(
        "allocated {:.2} across {} tickers in {} themes",
        config.portfolio_value,
        allocation.len(),
        weights.len()
    );

    Ok(AllocationReport {
        theme_summary: theme_summary(&estimate.volatilities, &weights),
        theme_weights: weights,
        allocation,
        dropped: estimate.dropped,
        overwritten_tickers: tickers.overwritten,
    })
}

/// Fetches prices for every ticker in `themes` over the configured lookback
/// ending on `as_of`, then allocates.
pub fn run_allocation(
    provider: &dyn PriceSeriesProvider,
    themes: &ThemeGroups,
    config: &AllocationConfig,
    as_of: NaiveDate,
) -> Result<AllocationReport, AllocatorError> {
    let tickers = themes.unique_tickers();
    log::info!("fetching prices for {} tickers", tickers.len());
    let prices = provider.fetch(&tickers, config.lookback(as_of))?;
    allocate(&prices, themes, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::theme::Theme;
    use approx::assert_abs_diff_eq;

    fn themes() -> ThemeGroups {
        ThemeGroups::new(vec![
            Theme::new("Defense", vec!["GD".into(), "LMT".into()]).unwrap(),
            Theme::new("Index", vec!["DIA".into()]).unwrap(),
        ])
        .unwrap()
    }

    fn prices() -> PriceTable {
        let dates = (1..=5)
            .map(|d| NaiveDate::from_ymd_opt(2024, 2, d).unwrap())
            .collect();
        PriceTable::new(
            dates,
            vec!["DIA".into(), "GD".into(), "LMT".into()],
            vec![
                vec![Some(380.0), Some(250.0), Some(450.0)],
                vec![Some(382.0), Some(240.0), Some(460.0)],
                vec![Some(381.0), Some(255.0), Some(440.0)],
                vec![Some(384.0), Some(245.0), Some(470.0)],
                vec![Some(383.0), Some(260.0), Some(455.0)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn allocate_produces_full_report() {
        let report = allocate(&prices(), &themes(), &AllocationConfig::default()).unwrap();

        assert_eq!(report.theme_summary.len(), 2);
        assert_eq!(report.allocation.len(), 3);
        assert!(report.dropped.is_empty());
        assert_abs_diff_eq!(
            report.theme_weights.values().sum::<f64>(),
            1.0,
            epsilon = 1e-9
        );
        // the index moves far less than defense, so it dominates
        assert!(report.theme_weights["Index"] > report.theme_weights["Defense"]);
        assert_eq!(report.allocation[0].ticker, "DIA");
    }

    #[test]
    fn non_positive_periods_per_year_fails() {
        for periods in [-1.0, 0.0, f64::NAN] {
            let config = AllocationConfig {
                periods_per_year: periods,
                ..AllocationConfig::default()
            };
            let result = allocate(&prices(), &themes(), &config);
            assert!(
                matches!(result, Err(AllocatorError::InvalidPeriodsPerYear { .. })),
                "periods_per_year {periods}"
            );
        }
    }

    #[test]
    fn default_config_values() {
        let config = AllocationConfig::default();
        assert_eq!(config.portfolio_value, 23_429.0);
        assert_eq!(config.lookback_days, 365);
        assert_eq!(config.periods_per_year, 252.0);
        assert!(config.conviction.is_none());
    }
}
