//! Theme summary and allocation bundle handed to display and export sinks.

use crate::domain::allocation::{AllocationRow, round2};
use crate::domain::volatility::{DroppedTheme, ThemeVolatility};
use crate::domain::weights::ThemeWeights;

#[derive(Debug, Clone, PartialEq)]
pub struct ThemeSummaryRow {
    pub theme: String,
    pub volatility: f64,
    pub weight_pct: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AllocationReport {
    pub theme_summary: Vec<ThemeSummaryRow>,
    pub theme_weights: ThemeWeights,
    pub allocation: Vec<AllocationRow>,
    pub dropped: Vec<DroppedTheme>,
    pub overwritten_tickers: Vec<String>,
}

impl AllocationReport {
    pub fn total_invested(&self) -> f64 {
        self.allocation.iter().map(|r| r.dollar_allocation).sum()
    }
}

/// Joins volatility and weight by theme; themes missing from either side
/// are omitted.
pub fn theme_summary(volatilities: &ThemeVolatility, weights: &ThemeWeights) -> Vec<ThemeSummaryRow> {
    volatilities
        .iter()
        .filter_map(|(theme, &volatility)| {
            weights.get(theme).map(|&weight| ThemeSummaryRow {
                theme: theme.clone(),
                volatility,
                weight_pct: round2(weight * 100.0),
            })
        })
        .collect()
}
