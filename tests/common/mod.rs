#![allow(dead_code)]

use chrono::NaiveDate;
use std::cell::RefCell;
use std::collections::BTreeMap;
use themealloc::domain::error::AllocatorError;
use themealloc::domain::price_table::{LookbackWindow, PriceTable};
use themealloc::domain::theme::{Theme, ThemeGroups};
use themealloc::ports::price_port::PriceSeriesProvider;

pub struct MockPriceProvider {
    pub series: BTreeMap<String, Vec<(NaiveDate, f64)>>,
    pub fail: Option<String>,
    pub requests: RefCell<Vec<(Vec<String>, LookbackWindow)>>,
}

impl MockPriceProvider {
    pub fn new() -> Self {
        Self {
            series: BTreeMap::new(),
            fail: None,
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn with_prices(mut self, ticker: &str, start: &str, prices: &[f64]) -> Self {
        let start = NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap();
        let points = prices
            .iter()
            .enumerate()
            .map(|(i, p)| (start + chrono::Duration::days(i as i64), *p))
            .collect();
        self.series.insert(ticker.to_string(), points);
        self
    }

    pub fn with_failure(mut self, reason: &str) -> Self {
        self.fail = Some(reason.to_string());
        self
    }
}

impl PriceSeriesProvider for MockPriceProvider {
    fn fetch(
        &self,
        tickers: &[String],
        window: LookbackWindow,
    ) -> Result<PriceTable, AllocatorError> {
        self.requests
            .borrow_mut()
            .push((tickers.to_vec(), window));
        if let Some(reason) = &self.fail {
            return Err(AllocatorError::DataUnavailable {
                reason: reason.clone(),
            });
        }
        let series: BTreeMap<_, _> = tickers
            .iter()
            .filter_map(|t| self.series.get(t).map(|s| (t.clone(), s.clone())))
            .collect();
        if series.is_empty() {
            return Err(AllocatorError::DataUnavailable {
                reason: "no requested ticker is known".into(),
            });
        }
        Ok(PriceTable::from_series(series))
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn themes(defs: &[(&str, &[&str])]) -> ThemeGroups {
    ThemeGroups::new(
        defs.iter()
            .map(|(name, tickers)| {
                Theme::new(*name, tickers.iter().map(|s| s.to_string()).collect()).unwrap()
            })
            .collect(),
    )
    .unwrap()
}

/// Prices that alternate between +r and -r each day, so the daily return
/// series has a known dispersion.
pub fn zigzag(start_price: f64, r: f64, count: usize) -> Vec<f64> {
    let mut prices = vec![start_price];
    for i in 1..count {
        let prev = prices[i - 1];
        let step = if i % 2 == 1 { r } else { -r };
        prices.push(prev * (1.0 + step));
    }
    prices
}
