//! Periodic percentage returns derived from a price table.
//!
//! return[t] = price[t] / price[t-1] - 1, per ticker column. A cell is absent
//! when either price is absent or the previous price is zero. A date row is
//! dropped only when every cell in it is absent, and a ticker column is kept
//! only when it has at least one defined return.

use crate::domain::error::AllocatorError;
use crate::domain::price_table::PriceTable;
use chrono::NaiveDate;

pub const MIN_PRICE_ROWS: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnTable {
    dates: Vec<NaiveDate>,
    tickers: Vec<String>,
    rows: Vec<Vec<Option<f64>>>,
}

impl ReturnTable {
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    pub fn rows(&self) -> &[Vec<Option<f64>>] {
        &self.rows
    }

    pub fn has_ticker(&self, ticker: &str) -> bool {
        self.tickers.iter().any(|t| t == ticker)
    }

    pub fn column_index(&self, ticker: &str) -> Option<usize> {
        self.tickers.iter().position(|t| t == ticker)
    }

    /// The return series for one ticker, one entry per kept date.
    pub fn column(&self, ticker: &str) -> Option<Vec<Option<f64>>> {
        let col = self.column_index(ticker)?;
        Some(self.rows.iter().map(|row| row[col]).collect())
    }
}

pub fn compute_returns(prices: &PriceTable) -> Result<ReturnTable, AllocatorError> {
    if prices.row_count() < MIN_PRICE_ROWS {
        return Err(AllocatorError::InsufficientData {
            rows: prices.row_count(),
            minimum: MIN_PRICE_ROWS,
        });
    }

    let raw: Vec<(NaiveDate, Vec<Option<f64>>)> = prices
        .rows()
        .windows(2)
        .zip(prices.dates().iter().skip(1))
        .map(|(pair, date)| {
            let cells: Vec<Option<f64>> = pair[0]
                .iter()
                .zip(pair[1].iter())
                .map(|(prev, curr)| match (prev, curr) {
                    (Some(p), Some(c)) if *p != 0.0 => Some(c / p - 1.0),
                    _ => None,
                })
                .collect();
            (*date, cells)
        })
        .filter(|(_, cells)| cells.iter().any(Option::is_some))
        .collect();

    let kept_columns: Vec<usize> = (0..prices.tickers().len())
        .filter(|&col| raw.iter().any(|(_, cells)| cells[col].is_some()))
        .collect();

    let tickers = kept_columns
        .iter()
        .map(|&col| prices.tickers()[col].clone())
        .collect();
    let (dates, rows): (Vec<NaiveDate>, Vec<Vec<Option<f64>>>) = raw
        .into_iter()
        .map(|(date, cells)| (date, kept_columns.iter().map(|&col| cells[col]).collect()))
        .unzip();

    log::debug!(
        "computed returns: {} rows x {} tickers",
        dates.len(),
        kept_columns.len()
    );

    Ok(ReturnTable {
        dates,
        tickers,
        rows,
    })
}
