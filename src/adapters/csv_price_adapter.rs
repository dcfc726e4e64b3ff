//! CSV directory price provider.
//!
//! Reads `<TICKER>.csv` files with a header row. The `date` column is
//! `YYYY-MM-DD`; prices come from the adjusted close column when present and
//! from the close column otherwise. Empty or non-positive cells are absent.

use crate::domain::error::AllocatorError;
use crate::domain::price_table::{LookbackWindow, PriceTable};
use crate::ports::price_port::PriceSeriesProvider;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceField {
    AdjClose,
    Close,
}

pub struct CsvPriceAdapter {
    base_path: PathBuf,
}

impl CsvPriceAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker))
    }

    /// Reads one ticker's series inside `window`, reporting which price
    /// column was used.
    pub fn read_series(
        &self,
        ticker: &str,
        window: LookbackWindow,
    ) -> Result<(PriceField, Vec<(NaiveDate, f64)>), AllocatorError> {
        let path = self.csv_path(ticker);
        let content = fs::read_to_string(&path).map_err(|e| AllocatorError::PriceData {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr.headers().map_err(|e| AllocatorError::PriceData {
            reason: format!("{}: CSV header error: {}", path.display(), e),
        })?;
        let columns: Vec<String> = headers.iter().map(normalize_header).collect();
        let find = |name: &str| columns.iter().position(|c| c == name);

        let date_col = find("date").ok_or_else(|| AllocatorError::PriceData {
            reason: format!("{}: missing date column", path.display()),
        })?;
        let (field, price_col) = match (find("adj_close"), find("close")) {
            (Some(col), _) => (PriceField::AdjClose, col),
            (None, Some(col)) => (PriceField::Close, col),
            (None, None) => {
                return Err(AllocatorError::PriceData {
                    reason: format!("{}: no adj_close or close column", path.display()),
                });
            }
        };

        let mut points = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| AllocatorError::PriceData {
                reason: format!("{}: CSV parse error: {}", path.display(), e),
            })?;

            let date_str = record.get(date_col).unwrap_or_default().trim();
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                AllocatorError::PriceData {
                    reason: format!("{}: invalid date {:?}: {}", path.display(), date_str, e),
                }
            })?;
            if !window.contains(date) {
                continue;
            }

            let cell = record.get(price_col).unwrap_or_default().trim();
            if cell.is_empty() {
                continue;
            }
            let price: f64 = cell.parse().map_err(|e| AllocatorError::PriceData {
                reason: format!("{}: invalid price {:?}: {}", path.display(), cell, e),
            })?;
            if price > 0.0 {
                points.push((date, price));
            }
        }

        points.sort_by_key(|(date, _)| *date);
        points.dedup_by_key(|(date, _)| *date);
        Ok((field, points))
    }
}

fn normalize_header(name: &str) -> String {
    name.trim().to_lowercase().replace([' ', '-'], "_")
}

impl PriceSeriesProvider for CsvPriceAdapter {
    fn fetch(
        &self,
        tickers: &[String],
        window: LookbackWindow,
    ) -> Result<PriceTable, AllocatorError> {
        let mut series = BTreeMap::new();

        for ticker in tickers {
            match self.read_series(ticker, window) {
                Ok((field, points)) => {
                    if field == PriceField::Close {
                        log::warn!("{}: adjusted close not available, using close prices", ticker);
                    }
                    if points.is_empty() {
                        log::warn!(
                            "{}: no prices between {} and {}",
                            ticker,
                            window.start(),
                            window.end
                        );
                        continue;
                    }
                    series.insert(ticker.clone(), points);
                }
                Err(e) => {
                    log::warn!("skipping {} ({})", ticker, e);
                }
            }
        }

        if series.is_empty() {
            return Err(AllocatorError::DataUnavailable {
                reason: format!(
                    "none of {} tickers has prices in {}",
                    tickers.len(),
                    self.base_path.display()
                ),
            });
        }

        Ok(PriceTable::from_series(series))
    }
}
