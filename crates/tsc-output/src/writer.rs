//! The `OutputWriter` trait implemented by all backend writers.

use crate::{DecisionRow, EpisodeRow, OutputResult};

/// Trait implemented by the CSV and SQLite writers.
///
/// Errors surface through
/// [`EpisodeOutputObserver::take_error`][crate::EpisodeOutputObserver::take_error]
/// when the writer is driven by the observer.
pub trait OutputWriter {
    /// Write a batch of decision rows.
    fn write_decisions(&mut self, rows: &[DecisionRow]) -> OutputResult<()>;

    /// Write one episode summary row.
    fn write_episode(&mut self, row: &EpisodeRow) -> OutputResult<()>;

    /// Flush and close all underlying handles.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
