//! Themes: named groups of tickers treated as one risk bucket.

use crate::domain::error::AllocatorError;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub name: String,
    pub tickers: Vec<String>,
}

impl Theme {
    /// A theme must own at least one ticker and list each ticker once.
    pub fn new(name: impl Into<String>, tickers: Vec<String>) -> Result<Self, AllocatorError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(AllocatorError::InvalidTheme {
                theme: name,
                reason: "theme name is empty".into(),
            });
        }
        if tickers.is_empty() {
            return Err(AllocatorError::InvalidTheme {
                theme: name,
                reason: "theme has no tickers".into(),
            });
        }
        let mut seen = HashSet::new();
        for ticker in &tickers {
            if !seen.insert(ticker.as_str()) {
                return Err(AllocatorError::InvalidTheme {
                    theme: name.clone(),
                    reason: format!("duplicate ticker {ticker}"),
                });
            }
        }
        Ok(Self { name, tickers })
    }

    pub fn ticker_count(&self) -> usize {
        self.tickers.len()
    }
}

/// Ordered collection of themes with unique names. Processing order matters
/// for tickers shared between themes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ThemeGroups {
    themes: Vec<Theme>,
}

impl ThemeGroups {
    pub fn new(themes: Vec<Theme>) -> Result<Self, AllocatorError> {
        let mut seen = HashSet::new();
        for theme in &themes {
            if !seen.insert(theme.name.as_str()) {
                return Err(AllocatorError::InvalidTheme {
                    theme: theme.name.clone(),
                    reason: "duplicate theme name".into(),
                });
            }
        }
        Ok(Self { themes })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Theme> {
        self.themes.iter()
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Theme> {
        self.themes.iter().find(|t| t.name == name)
    }

    /// Every distinct ticker across all themes, in first-seen order.
    pub fn unique_tickers(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.themes
            .iter()
            .flat_map(|t| t.tickers.iter())
            .filter(|t| seen.insert(t.as_str()))
            .cloned()
            .collect()
    }
}

/// Parses a comma-separated ticker list, upper-casing each symbol.
pub fn parse_tickers(theme: &str, input: &str) -> Result<Vec<String>, AllocatorError> {
    let mut tickers = Vec::new();
    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(AllocatorError::InvalidTheme {
                theme: theme.to_string(),
                reason: "empty token in ticker list".into(),
            });
        }
        tickers.push(trimmed.to_uppercase());
    }
    Ok(tickers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn theme(name: &str, tickers: &[&str]) -> Theme {
        Theme::new(name, tickers.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    #[test]
    fn parse_tickers_trims_and_uppercases() {
        let result = parse_tickers("Gold", "  fnv , WPM,voxr ").unwrap();
        assert_eq!(result, vec!["FNV", "WPM", "VOXR"]);
    }

    #[test]
    fn parse_tickers_rejects_empty_token() {
        let result = parse_tickers("Gold", "FNV,,WPM");
        assert!(matches!(result, Err(AllocatorError::InvalidTheme { .. })));
    }

    #[test]
    fn theme_requires_tickers() {
        let result = Theme::new("Index", vec![]);
        assert!(matches!(result, Err(AllocatorError::InvalidTheme { .. })));
    }

    #[test]
    fn theme_rejects_duplicate_ticker() {
        let result = Theme::new("Index", vec!["RSP".into(), "RSP".into()]);
        assert!(
            matches!(result, Err(AllocatorError::InvalidTheme { reason, .. }) if reason.contains("RSP"))
        );
    }

    #[test]
    fn groups_reject_duplicate_names() {
        let result = ThemeGroups::new(vec![theme("AI", &["NVDA"]), theme("AI", &["TSM"])]);
        assert!(matches!(result, Err(AllocatorError::InvalidTheme { .. })));
    }

    #[test]
    fn unique_tickers_keeps_first_seen_order() {
        let groups = ThemeGroups::new(vec![
            theme("AI", &["NVDA", "TSM"]),
            theme("Great-Companies", &["AMZN", "NVDA"]),
        ])
        .unwrap();
        assert_eq!(groups.unique_tickers(), vec!["NVDA", "TSM", "AMZN"]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups.get("AI").unwrap().ticker_count(), 2);
    }
}
