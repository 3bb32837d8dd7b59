//! `EpisodeOutputObserver<W>`: bridges `EpisodeObserver` to an `OutputWriter`.

use tsc_adapter::Scenario;
use tsc_control::ControlMode;
use tsc_core::Tick;
use tsc_episode::{DecisionRecord, EpisodeObserver, EpisodeReport};

use crate::row::{DecisionRow, EpisodeRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// An [`EpisodeObserver`] that writes decision and episode rows to any
/// [`OutputWriter`] backend.
///
/// Decisions are buffered and written once per step.  Errors from the writer
/// are stored internally because observer methods have no return value;
/// check [`take_error`][Self::take_error] after the run, then call
/// [`finish`][Self::finish].
pub struct EpisodeOutputObserver<W: OutputWriter> {
    writer:           W,
    episode:          u32,
    record_decisions: bool,
    pending:          Vec<DecisionRow>,
    last_error:       Option<OutputError>,
}

impl<W: OutputWriter> EpisodeOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            episode: 0,
            record_decisions: true,
            pending: Vec::new(),
            last_error: None,
        }
    }

    /// Write episode summaries only.
    pub fn without_decisions(mut self) -> Self {
        self.record_decisions = false;
        self
    }

    /// Take the stored write error (if any).
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Flush the writer.  Reports a stored error first, if there is one.
    pub fn finish(&mut self) -> OutputResult<()> {
        self.flush_pending();
        if let Some(e) = self.last_error.take() {
            return Err(e);
        }
        self.writer.finish()
    }

    /// Unwrap the inner writer.
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn flush_pending(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let result = self.writer.write_decisions(&self.pending);
        self.pending.clear();
        self.store_err(result);
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> EpisodeObserver for EpisodeOutputObserver<W> {
    fn on_episode_start(&mut self, _scenario: &Scenario, _mode: ControlMode) {
        self.episode += 1;
    }

    fn on_step_end(&mut self, _tick: Tick) {
        self.flush_pending();
    }

    fn on_decision(&mut self, record: &DecisionRecord<'_>) {
        if !self.record_decisions {
            return;
        }
        let d = record.decision;
        self.pending.push(DecisionRow {
            episode:      self.episode,
            tick:         record.tick.0,
            intersection: record.intersection.to_owned(),
            phase:        d.phase,
            next_phase:   d.next_phase,
            state:        d.state.0,
            action:       d.action.0,
            duration:     d.duration,
            reward:       d.reward,
        });
    }

    fn on_episode_end(&mut self, report: &EpisodeReport) {
        self.flush_pending();
        let row = EpisodeRow {
            episode:           self.episode,
            scenario:          report.scenario.clone(),
            mode:              report.mode,
            steps:             report.steps,
            departed:          report.departed as u64,
            completed_trips:   report.completed_trips as u64,
            decisions:         report.decisions,
            average_trip_time: report.average_trip_time,
        };
        let result = self.writer.write_episode(&row);
        self.store_err(result);
    }
}
