//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `decisions.csv`
//! - `episodes.csv`
//!
//! A missing reward is written as an empty field and a missing average trip
//! time as `NaN`.

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{DecisionRow, EpisodeRow, OutputResult};

/// Writes run output to two CSV files.
pub struct CsvWriter {
    decisions: Writer<File>,
    episodes:  Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Open (or create) the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut decisions = Writer::from_path(dir.join("decisions.csv"))?;
        decisions.write_record([
            "episode",
            "tick",
            "intersection",
            "phase",
            "next_phase",
            "state",
            "action",
            "duration",
            "reward",
        ])?;

        let mut episodes = Writer::from_path(dir.join("episodes.csv"))?;
        episodes.write_record([
            "episode",
            "scenario",
            "mode",
            "steps",
            "departed",
            "completed_trips",
            "decisions",
            "average_trip_time",
        ])?;

        Ok(Self { decisions, episodes, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_decisions(&mut self, rows: &[DecisionRow]) -> OutputResult<()> {
        for row in rows {
            self.decisions.write_record(&[
                row.episode.to_string(),
                row.tick.to_string(),
                row.intersection.clone(),
                row.phase.to_string(),
                row.next_phase.to_string(),
                row.state.to_string(),
                row.action.to_string(),
                row.duration.to_string(),
                row.reward.map(|r| r.to_string()).unwrap_or_default(),
            ])?;
        }
        Ok(())
    }

    fn write_episode(&mut self, row: &EpisodeRow) -> OutputResult<()> {
        self.episodes.write_record(&[
            row.episode.to_string(),
            row.scenario.clone(),
            row.mode.to_string(),
            row.steps.to_string(),
            row.departed.to_string(),
            row.completed_trips.to_string(),
            row.decisions.to_string(),
            row.average_trip_time.unwrap_or(f64::NAN).to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.decisions.flush()?;
        self.episodes.flush()?;
        Ok(())
    }
}
