//! Report sink port trait.

use crate::domain::error::AllocatorError;
use crate::domain::report::AllocationReport;
use std::path::Path;

/// Port for writing an allocation report to a file.
pub trait ReportPort {
    fn write(&self, report: &AllocationReport, output_path: &Path) -> Result<(), AllocatorError>;
}
