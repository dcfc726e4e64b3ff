//! Historical price retrieval port.

use crate::domain::error::AllocatorError;
use crate::domain::price_table::{LookbackWindow, PriceTable};

pub trait PriceSeriesProvider {
    /// Returns one complete table for `tickers` over `window`, or fails as a
    /// whole. Tickers with no data may be left out of the table; when none
    /// has data the call fails with `DataUnavailable`.
    fn fetch(
        &self,
        tickers: &[String],
        window: LookbackWindow,
    ) -> Result<PriceTable, AllocatorError>;
}
