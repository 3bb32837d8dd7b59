//! `tsc-output`: run output writers and Q-table persistence.
//!
//! Two record backends are provided:
//!
//! | Feature   | Backend | Files created                      |
//! |-----------|---------|------------------------------------|
//! | *(none)*  | CSV     | `decisions.csv`, `episodes.csv`    |
//! | `sqlite`  | SQLite  | `output.db`                        |
//!
//! Both implement [`OutputWriter`] and are driven by
//! [`EpisodeOutputObserver`], which implements
//! `tsc_episode::EpisodeObserver`.
//!
//! Learned tables are saved and restored separately with
//! [`write_qtables`] / [`read_qtables`] as `(intersection, state, action,
//! value)` CSV rows.
//!
//! # Usage
//!
//! ```rust,ignore
//! use tsc_output::{CsvWriter, EpisodeOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = EpisodeOutputObserver::new(writer);
//! schedule.run(&mut controller, &mut obs)?;
//! obs.finish()?;
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod qtable_io;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::EpisodeOutputObserver;
pub use qtable_io::{read_qtables, write_qtables};
pub use row::{DecisionRow, EpisodeRow};
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;
