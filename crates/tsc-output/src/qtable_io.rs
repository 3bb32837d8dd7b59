//! Q-table persistence as CSV.
//!
//! One row per cell:
//!
//! ```text
//! intersection,state,action,value
//! J0,0,0,0.3
//! J0,0,1,0
//! ```
//!
//! Values are written with Rust's shortest round-trip float formatting, so a
//! table read back is bit-for-bit identical to the one written.

use std::collections::HashMap;
use std::path::Path;

use tsc_control::QTable;
use tsc_core::{ActionIndex, StateIndex};

use crate::{OutputError, OutputResult};

/// Write every `(name, table)` pair to `path`, replacing any existing file.
pub fn write_qtables<'a, I>(path: &Path, tables: I) -> OutputResult<()>
where
    I: IntoIterator<Item = (&'a str, &'a QTable)>,
{
    let mut w = csv::Writer::from_path(path)?;
    w.write_record(["intersection", "state", "action", "value"])?;
    for (name, table) in tables {
        for (state, action, value) in table.cells() {
            w.write_record(&[
                name.to_owned(),
                state.0.to_string(),
                action.0.to_string(),
                value.to_string(),
            ])?;
        }
    }
    w.flush()?;
    Ok(())
}

/// Read tables for `names` (in that order) from `path`.
///
/// Every table starts at zero with the given `(states, actions)` shape; cells
/// absent from the file stay zero.
///
/// # Errors
///
/// [`OutputError::Format`] for an unparsable field or an intersection not in
/// `names`; [`OutputError::Control`] for a cell outside the shape.
pub fn read_qtables<S: AsRef<str>>(
    path: &Path,
    names: &[S],
    (states, actions): (usize, usize),
) -> OutputResult<Vec<QTable>> {
    let index: HashMap<&str, usize> =
        names.iter().enumerate().map(|(i, n)| (n.as_ref(), i)).collect();
    let mut tables = vec![QTable::new(states, actions); names.len()];

    let mut r = csv::Reader::from_path(path)?;
    for (line, record) in r.records().enumerate() {
        let record = record?;
        let field = |i: usize, what: &str| {
            record.get(i).ok_or_else(|| {
                OutputError::Format(format!("row {}: missing {what}", line + 1))
            })
        };

        let name = field(0, "intersection")?;
        let &slot = index.get(name).ok_or_else(|| {
            OutputError::Format(format!("row {}: unknown intersection {name:?}", line + 1))
        })?;
        let state: u32 = parse(field(1, "state")?, line)?;
        let action: u16 = parse(field(2, "action")?, line)?;
        let value: f64 = parse(field(3, "value")?, line)?;

        tables[slot].set(StateIndex(state), ActionIndex(action), value)?;
    }
    Ok(tables)
}

fn parse<T: std::str::FromStr>(raw: &str, line: usize) -> OutputResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| OutputError::Format(format!("row {}: cannot parse {raw:?}", line + 1)))
}
