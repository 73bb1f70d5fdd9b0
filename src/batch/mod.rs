//! Batch summarization runs

pub mod models;
pub mod orchestrator;
pub mod progress;

pub use models::{BatchMetrics, BatchOutcome, ExampleRecord, RecordStatus, SummarizationResult};
pub use orchestrator::BatchOrchestrator;
pub use progress::{LogProgress, NoProgress, ProgressObserver};
