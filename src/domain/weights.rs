//! Inverse-volatility theme weights and their expansion into ticker weights.

use crate::domain::error::AllocatorError;
use crate::domain::theme::ThemeGroups;
use crate::domain::volatility::ThemeVolatility;
use std::collections::BTreeMap;

pub type ThemeWeights = BTreeMap<String, f64>;

/// Per-theme scaling applied to the inverse volatility before normalizing.
/// Themes without an entry use 1.0.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConvictionMultipliers {
    multipliers: BTreeMap<String, f64>,
}

impl ConvictionMultipliers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Multipliers must be positive and finite.
    pub fn set(&mut self, theme: impl Into<String>, value: f64) -> Result<(), AllocatorError> {
        let theme = theme.into();
        if !(value.is_finite() && value > 0.0) {
            return Err(AllocatorError::InvalidMultiplier { theme, value });
        }
        self.multipliers.insert(theme, value);
        Ok(())
    }

    pub fn with(mut self, theme: impl Into<String>, value: f64) -> Result<Self, AllocatorError> {
        self.set(theme, value)?;
        Ok(self)
    }

    pub fn get(&self, theme: &str) -> f64 {
        self.multipliers.get(theme).copied().unwrap_or(1.0)
    }

    pub fn is_empty(&self) -> bool {
        self.multipliers.is_empty()
    }
}

/// weight = (multiplier / volatility) / sum over themes of (multiplier / volatility)
pub fn theme_weights(
    volatilities: &ThemeVolatility,
    conviction: Option<&ConvictionMultipliers>,
) -> Result<ThemeWeights, AllocatorError> {
    if volatilities.is_empty() {
        return Err(AllocatorError::NoSurvivingThemes);
    }

    let mut inverse = BTreeMap::new();
    for (theme, &vol) in volatilities {
        if vol == 0.0 {
            return Err(AllocatorError::DivisionByZero {
                theme: theme.clone(),
            });
        }
        if !(vol.is_finite() && vol > 0.0) {
            return Err(AllocatorError::InvalidVolatility {
                theme: theme.clone(),
                value: vol,
            });
        }
        let multiplier = conviction.map_or(1.0, |c| c.get(theme));
        inverse.insert(theme.clone(), multiplier / vol);
    }

    let total: f64 = inverse.values().sum();
    Ok(inverse
        .into_iter()
        .map(|(theme, inv)| (theme, inv / total))
        .collect())
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickerWeights {
    pub weights: BTreeMap<String, f64>,
    /// Tickers listed in more than one weighted theme. Each keeps the weight
    /// from the last theme that lists it.
    pub overwritten: Vec<String>,
}

/// Splits each weighted theme equally across its full ticker list, including
/// tickers that had no usable price data. Themes are processed in group order
/// and a later theme replaces an earlier theme's weight for a shared ticker.
pub fn expand_ticker_weights(themes: &ThemeGroups, weights: &ThemeWeights) -> TickerWeights {
    let mut ticker_weights = BTreeMap::new();
    let mut overwritten = Vec::new();

    for theme in themes.iter() {
        let Some(&theme_weight) = weights.get(&theme.name) else {
            continue;
        };
        let per_ticker = theme_weight / theme.ticker_count() as f64;
        for ticker in &theme.tickers {
            if let Some(previous) = ticker_weights.insert(ticker.clone(), per_ticker) {
                log::warn!(
                    "{} appears in several themes; {} replaces weight {:.6} with {:.6}",
                    ticker,
                    theme.name,
                    previous,
                    per_ticker
                );
                if !overwritten.contains(ticker) {
                    overwritten.push(ticker.clone());
                }
            }
        }
    }

    TickerWeights {
        weights: ticker_weights,
        overwritten,
    }
}
