//! CSV export of the allocation table.

use crate::domain::allocation::AllocationRow;
use crate::domain::error::AllocatorError;
use crate::domain::report::AllocationReport;
use crate::ports::report_port::ReportPort;
use std::io::Write;
use std::path::Path;

pub const HEADER: [&str; 5] = [
    "Ticker",
    "Weight %",
    "Latest Price",
    "Dollar Allocation",
    "Shares to Buy",
];

pub struct CsvExportAdapter;

impl CsvExportAdapter {
    pub fn write_rows<W: Write>(rows: &[AllocationRow], out: W) -> csv::Result<()> {
        let mut wtr = csv::Writer::from_writer(out);
        wtr.write_record(HEADER)?;
        for row in rows {
            wtr.write_record([
                row.ticker.clone(),
                format!("{:.2}", row.weight_pct),
                format!("{:.2}", row.latest_price),
                format!("{:.2}", row.dollar_allocation),
                row.shares.to_string(),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl ReportPort for CsvExportAdapter {
    fn write(&self, report: &AllocationReport, output_path: &Path) -> Result<(), AllocatorError> {
        let export_err = |reason: String| AllocatorError::Export {
            path: output_path.display().to_string(),
            reason,
        };
        let file = std::fs::File::create(output_path).map_err(|e| export_err(e.to_string()))?;
        Self::write_rows(&report.allocation, file).map_err(|e| export_err(e.to_string()))
    }
}
