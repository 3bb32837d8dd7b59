//! CSV demand loader.
//!
//! # CSV format
//!
//! One row per vehicle.  `route` lists the signalised legs the vehicle
//! crosses, in order, as `intersection:approach` pairs separated by `;`.
//!
//! ```csv
//! vehicle,depart,route
//! v0,2,J0:0;J1:0
//! v1,5,J1:3
//! ```
//!
//! `depart` is the tick at which the vehicle enters its first approach.
//! Rows need not be sorted.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use tsc_core::Tick;

use crate::{AdapterError, AdapterResult};

// ── Public types ──────────────────────────────────────────────────────────────

/// One signalised leg of a trip: the approach a vehicle queues on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leg {
    pub intersection: String,
    pub approach:     usize,
}

/// A vehicle's full trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trip {
    pub vehicle: String,
    pub depart:  Tick,
    /// Never empty.
    pub route:   Vec<Leg>,
}

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct TripRecord {
    vehicle: String,
    depart:  u64,
    route:   String,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load all trips from a demand CSV file.
pub fn load_demand_csv(path: &Path) -> AdapterResult<Vec<Trip>> {
    let file = std::fs::File::open(path)?;
    load_demand_reader(file)
}

/// Like [`load_demand_csv`] but accepts any `Read` source.
pub fn load_demand_reader<R: Read>(reader: R) -> AdapterResult<Vec<Trip>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut trips = Vec::new();

    for result in csv_reader.deserialize::<TripRecord>() {
        let row = result.map_err(|e| AdapterError::Demand(e.to_string()))?;
        let route = parse_route(&row.route)
            .map_err(|msg| AdapterError::Demand(format!("vehicle {:?}: {msg}", row.vehicle)))?;
        trips.push(Trip {
            vehicle: row.vehicle,
            depart:  Tick(row.depart),
            route,
        });
    }

    Ok(trips)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn parse_route(s: &str) -> Result<Vec<Leg>, String> {
    let legs: Vec<Leg> = s
        .split(';')
        .map(str::trim)
        .filter(|leg| !leg.is_empty())
        .map(parse_leg)
        .collect::<Result<_, _>>()?;
    if legs.is_empty() {
        return Err("route has no legs".into());
    }
    Ok(legs)
}

fn parse_leg(s: &str) -> Result<Leg, String> {
    let (intersection, approach) = s
        .rsplit_once(':')
        .ok_or_else(|| format!("invalid leg {s:?}: expected \"intersection:approach\""))?;
    if intersection.is_empty() {
        return Err(format!("invalid leg {s:?}: empty intersection id"));
    }
    let approach = approach
        .parse::<usize>()
        .map_err(|_| format!("invalid leg {s:?}: approach must be a non-negative integer"))?;
    Ok(Leg { intersection: intersection.to_owned(), approach })
}
