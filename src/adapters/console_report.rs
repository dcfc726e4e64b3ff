//! Plain-text tables for terminal output.

use crate::domain::allocation::AllocationRow;
use crate::domain::report::{AllocationReport, ThemeSummaryRow};
use crate::domain::volatility::DroppedTheme;

pub fn format_theme_summary(rows: &[ThemeSummaryRow]) -> String {
    let width = rows
        .iter()
        .map(|r| r.theme.len())
        .max()
        .unwrap_or(0)
        .max("Theme".len());

    let mut out = format!("{:<width$}  {:>10}  {:>8}\n", "Theme", "Volatility", "Weight %");
    for row in rows {
        out.push_str(&format!(
            "{:<width$}  {:>10.4}  {:>8.2}\n",
            row.theme, row.volatility, row.weight_pct
        ));
    }
    out
}

pub fn format_allocation(rows: &[AllocationRow]) -> String {
    let width = rows
        .iter()
        .map(|r| r.ticker.len())
        .max()
        .unwrap_or(0)
        .max("Ticker".len());

    let mut out = format!(
        "{:<width$}  {:>8}  {:>12}  {:>17}  {:>13}\n",
        "Ticker", "Weight %", "Latest Price", "Dollar Allocation", "Shares to Buy"
    );
    for row in rows {
        out.push_str(&format!(
            "{:<width$}  {:>8.2}  {:>12.2}  {:>17.2}  {:>13}\n",
            row.ticker, row.weight_pct, row.latest_price, row.dollar_allocation, row.shares
        ));
    }
    out
}

pub fn format_dropped(dropped: &[DroppedTheme]) -> String {
    dropped
        .iter()
        .map(|d| format!("  {}: {}\n", d.theme, d.reason))
        .collect()
}

pub fn format_report(report: &AllocationReport) -> String {
    let mut out = String::from("--- Theme Risk & Weights ---\n");
    out.push_str(&format_theme_summary(&report.theme_summary));
    out.push_str("\n--- Portfolio Allocation ---\n");
    out.push_str(&format_allocation(&report.allocation));
    out.push_str(&format!("\nTotal allocated: ${:.2}\n", report.total_invested()));
    out
}
