//! Report generation port.

use crate::domain::error::SmacrossError;
use crate::domain::evaluator::EvaluationResult;
use std::path::Path;

/// Port for writing evaluation output into a directory.
pub trait ReportPort {
    fn write_instrument(
        &self,
        result: &EvaluationResult,
        output_dir: &Path,
    ) -> Result<(), SmacrossError>;

    fn write_summary(
        &self,
        results: &[EvaluationResult],
        output_dir: &Path,
    ) -> Result<(), SmacrossError>;

    /// Default implementation: every instrument, then the summary.
    fn write_all(
        &self,
        results: &[EvaluationResult],
        output_dir: &Path,
    ) -> Result<(), SmacrossError> {
        for result in results {
            self.write_instrument(result, output_dir)?;
        }
        self.write_summary(results, output_dir)
    }
}
