//! Conversion of ticker weights into a dollar and share buy list.

use crate::domain::error::AllocatorError;
use crate::domain::price_table::PriceTable;
use std::cmp::Ordering;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct AllocationRow {
    pub ticker: String,
    pub weight_pct: f64,
    pub latest_price: f64,
    pub dollar_allocation: f64,
    pub shares: i64,
}

/// Rounds half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round-half-up share count for a non-negative dollar amount. Zero when the
/// quotient is not finite.
pub fn share_count(dollar_allocation: f64, latest_price: f64) -> i64 {
    let shares = (dollar_allocation / latest_price).round();
    if shares.is_finite() {
        shares as i64
    } else {
        0
    }
}

/// Rows are sorted by weight percent descending, then ticker ascending.
pub fn build_allocation(
    ticker_weights: &BTreeMap<String, f64>,
    prices: &PriceTable,
    portfolio_value: f64,
) -> Result<Vec<AllocationRow>, AllocatorError> {
    if !(portfolio_value.is_finite() && portfolio_value > 0.0) {
        return Err(AllocatorError::InvalidPortfolioValue {
            value: portfolio_value,
        });
    }

    let mut rows = ticker_weights
        .iter()
        .map(|(ticker, &weight)| {
            let price = prices
                .latest_price(ticker)
                .ok_or_else(|| AllocatorError::MissingPrice {
                    ticker: ticker.clone(),
                })?;
            let latest_price = round2(price);
            if latest_price <= 0.0 {
                return Err(AllocatorError::UnpriceableTicker {
                    ticker: ticker.clone(),
                    price,
                });
            }
            let dollar_allocation = round2(weight * portfolio_value);
            Ok(AllocationRow {
                ticker: ticker.clone(),
                weight_pct: round2(weight * 100.0),
                latest_price,
                dollar_allocation,
                shares: share_count(dollar_allocation, latest_price),
            })
        })
        .collect::<Result<Vec<_>, AllocatorError>>()?;

    rows.sort_by(|a, b| {
        b.weight_pct
            .partial_cmp(&a.weight_pct)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.ticker.cmp(&b.ticker))
    });
    Ok(rows)
}
