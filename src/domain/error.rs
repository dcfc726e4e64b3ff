//! Domain error types.

/// Top-level error type for themealloc.
#[derive(Debug, thiserror::Error)]
pub enum AllocatorError {
    #[error("insufficient data: have {rows} dated price rows, need {minimum}")]
    InsufficientData { rows: usize, minimum: usize },

    #[error("no price data available: {reason}")]
    DataUnavailable { reason: String },

    #[error("price data error: {reason}")]
    PriceData { reason: String },

    #[error("no latest price for {ticker}")]
    MissingPrice { ticker: String },

    #[error("latest price of {ticker} is {price}, too small to buy in whole cents")]
    UnpriceableTicker { ticker: String, price: f64 },

    #[error("volatility of theme {theme} is {value}, expected a positive number")]
    InvalidVolatility { theme: String, value: f64 },

    #[error("periods per year must be positive, got {value}")]
    InvalidPeriodsPerYear { value: f64 },

    #[error("volatility of theme {theme} is zero")]
    DivisionByZero { theme: String },

    #[error("every theme was dropped, nothing to allocate")]
    NoSurvivingThemes,

    #[error("invalid theme {theme}: {reason}")]
    InvalidTheme { theme: String, reason: String },

    #[error("invalid conviction multiplier for {theme}: {value}")]
    InvalidMultiplier { theme: String, value: f64 },

    #[error("portfolio value must be positive, got {value}")]
    InvalidPortfolioValue { value: f64 },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("export to {path} failed: {reason}")]
    Export { path: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&AllocatorError> for std::process::ExitCode {
    fn from(err: &AllocatorError) -> Self {
        let code: u8 = match err {
            AllocatorError::Io(_) => 1,
            AllocatorError::ConfigParse { .. }
            | AllocatorError::ConfigMissing { .. }
            | AllocatorError::ConfigInvalid { .. }
            | AllocatorError::InvalidTheme { .. }
            | AllocatorError::InvalidMultiplier { .. }
            | AllocatorError::InvalidPortfolioValue { .. }
            | AllocatorError::InvalidPeriodsPerYear { .. } => 2,
            AllocatorError::InsufficientData { .. }
            | AllocatorError::DataUnavailable { .. }
            | AllocatorError::PriceData { .. }
            | AllocatorError::UnpriceableTicker { .. } => 5,
            AllocatorError::MissingPrice { .. }
            | AllocatorError::DivisionByZero { .. }
            | AllocatorError::InvalidVolatility { .. }
            | AllocatorError::NoSurvivingThemes => 6,
            AllocatorError::Export { .. } => 7,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failing_item() {
        let err = AllocatorError::MissingPrice {
            ticker: "NVDA".into(),
        };
        assert_eq!(err.to_string(), "no latest price for NVDA");

        let err = AllocatorError::DivisionByZero {
            theme: "Gold".into(),
        };
        assert_eq!(err.to_string(), "volatility of theme Gold is zero");
    }

    #[test]
    fn io_errors_convert() {
        let err: AllocatorError = std::io::Error::other("disk full").into();
        assert!(matches!(err, AllocatorError::Io(_)));
        assert_eq!(err.to_string(), "disk full");
    }
}
