//! Progress reporting hooks for batch runs

use super::models::SummarizationResult;
use tracing::info;

/// Observer notified as a batch advances
pub trait ProgressObserver: Send + Sync {
    /// Called after each record with the completed fraction in (0, 1]
    fn on_progress(&self, fraction_complete: f64);

    /// Called after each record with its result
    fn on_record(&self, _index: usize, _result: &SummarizationResult) {}
}

impl<F> ProgressObserver for F
where
    F: Fn(f64) + Send + Sync,
{
    fn on_progress(&self, fraction_complete: f64) {
        self(fraction_complete)
    }
}

/// Discards progress
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&self, _fraction_complete: f64) {}
}

/// Logs progress through tracing
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_progress(&self, fraction_complete: f64) {
        info!(progress = %format!("{:.0}%", fraction_complete * 100.0), "Batch progress");
    }

    fn on_record(&self, index: usize, result: &SummarizationResult) {
        info!("{}", result.log_line(index));
    }
}
