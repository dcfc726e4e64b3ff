//! Daily price table indexed by (date, ticker).
//!
//! Every provider produces the same shape: one ascending date axis shared by
//! all tickers, with `None` wherever a ticker has no price on that date.

use crate::domain::error::AllocatorError;
use chrono::{NaiveDate, TimeDelta};
use std::collections::{BTreeMap, BTreeSet};

/// History window ending on `end` and reaching back `days` calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookbackWindow {
    pub end: NaiveDate,
    pub days: i64,
}

impl LookbackWindow {
    pub fn new(end: NaiveDate, days: i64) -> Self {
        Self { end, days }
    }

    /// First date in the window. Saturates at `NaiveDate::MIN` when `days`
    /// reaches past the representable calendar.
    pub fn start(&self) -> NaiveDate {
        TimeDelta::try_days(self.days)
            .and_then(|span| self.end.checked_sub_signed(span))
            .unwrap_or(NaiveDate::MIN)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start() && date <= self.end
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    dates: Vec<NaiveDate>,
    tickers: Vec<String>,
    rows: Vec<Vec<Option<f64>>>,
}

impl PriceTable {
    /// Builds a table from row-major cells. Dates must be strictly ascending
    /// and every row must have one cell per ticker.
    pub fn new(
        dates: Vec<NaiveDate>,
        tickers: Vec<String>,
        rows: Vec<Vec<Option<f64>>>,
    ) -> Result<Self, AllocatorError> {
        if dates.len() != rows.len() {
            return Err(AllocatorError::PriceData {
                reason: format!("{} dates but {} rows", dates.len(), rows.len()),
            });
        }
        if let Some(w) = dates.windows(2).find(|w| w[0] >= w[1]) {
            return Err(AllocatorError::PriceData {
                reason: format!("dates not ascending at {}", w[1]),
            });
        }
        let mut seen = BTreeSet::new();
        for ticker in &tickers {
            if !seen.insert(ticker.as_str()) {
                return Err(AllocatorError::PriceData {
                    reason: format!("duplicate ticker column {ticker}"),
                });
            }
        }
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != tickers.len())
        {
            return Err(AllocatorError::PriceData {
                reason: format!(
                    "row {} has {} cells, expected {}",
                    dates[i],
                    row.len(),
                    tickers.len()
                ),
            });
        }
        Ok(Self {
            dates,
            tickers,
            rows,
        })
    }

    /// Merges per-ticker `(date, price)` series onto one unified date axis.
    /// Non-positive prices are treated as absent.
    pub fn from_series(series: BTreeMap<String, Vec<(NaiveDate, f64)>>) -> Self {
        let dates: Vec<NaiveDate> = series
            .values()
            .flat_map(|points| points.iter().map(|(d, _)| *d))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let date_index: BTreeMap<NaiveDate, usize> =
            dates.iter().enumerate().map(|(i, d)| (*d, i)).collect();

        let tickers: Vec<String> = series.keys().cloned().collect();
        let mut rows = vec![vec![None; tickers.len()]; dates.len()];

        for (col, points) in series.values().enumerate() {
            for (date, price) in points {
                if *price > 0.0 && price.is_finite() {
                    rows[date_index[date]][col] = Some(*price);
                }
            }
        }

        Self {
            dates,
            tickers,
            rows,
        }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    pub fn rows(&self) -> &[Vec<Option<f64>>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() || self.tickers.is_empty()
    }

    pub fn column_index(&self, ticker: &str) -> Option<usize> {
        self.tickers.iter().position(|t| t == ticker)
    }

    pub fn price(&self, date: NaiveDate, ticker: &str) -> Option<f64> {
        let row = self.dates.binary_search(&date).ok()?;
        let col = self.column_index(ticker)?;
        self.rows[row][col]
    }

    /// Price on the final dated row, if that cell is present.
    pub fn latest_price(&self, ticker: &str) -> Option<f64> {
        let col = self.column_index(ticker)?;
        self.rows.last().and_then(|row| row[col])
    }
}
