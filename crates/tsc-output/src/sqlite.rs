//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! two tables: `decisions` and `episodes`.  Missing rewards and averages are
//! stored as `NULL`.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::OutputWriter;
use crate::{DecisionRow, EpisodeRow, OutputResult};

/// Writes run output to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS decisions (
                 episode      INTEGER NOT NULL,
                 tick         INTEGER NOT NULL,
                 intersection TEXT    NOT NULL,
                 phase        INTEGER NOT NULL,
                 next_phase   INTEGER NOT NULL,
                 state        INTEGER NOT NULL,
                 action       INTEGER NOT NULL,
                 duration     INTEGER NOT NULL,
                 reward       REAL
             );
             CREATE TABLE IF NOT EXISTS episodes (
                 episode           INTEGER PRIMARY KEY,
                 scenario          TEXT    NOT NULL,
                 mode              TEXT    NOT NULL,
                 steps             INTEGER NOT NULL,
                 departed          INTEGER NOT NULL,
                 completed_trips   INTEGER NOT NULL,
                 decisions         INTEGER NOT NULL,
                 average_trip_time REAL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_decisions(&mut self, rows: &[DecisionRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO decisions \
                 (episode, tick, intersection, phase, next_phase, state, action, duration, reward) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.episode,
                    row.tick as i64,
                    row.intersection,
                    row.phase,
                    row.next_phase,
                    row.state,
                    row.action,
                    row.duration,
                    row.reward,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_episode(&mut self, row: &EpisodeRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO episodes \
             (episode, scenario, mode, steps, departed, completed_trips, decisions, average_trip_time) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                row.episode,
                row.scenario,
                row.mode.to_string(),
                row.steps as i64,
                row.departed as i64,
                row.completed_trips as i64,
                row.decisions as i64,
                row.average_trip_time,
            ],
        )?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
