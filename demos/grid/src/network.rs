//! Synthetic square grid of signalised junctions and its demand.
//!
//! Junction `J{r}_{c}` sits at row `r`, column `c`.  Approaches are numbered
//! by the side traffic enters from:
//!
//! | Approach | Enters from | Served by |
//! |----------|-------------|-----------|
//! | 0        | north       | slot 0    |
//! | 1        | east        | slot 4    |
//! | 2        | south       | slot 0    |
//! | 3        | west        | slot 4    |
//!
//! Every synthetic trip drives straight through one full row or column.

use tsc_adapter::{JunctionSpec, Leg, Trip};
use tsc_core::{SimRng, Tick};

pub const APPROACHES: usize = 4;

pub fn junction_name(row: usize, col: usize) -> String {
    format!("J{row}_{col}")
}

/// `size × size` junctions in row-major order.
pub fn grid(size: usize) -> Vec<JunctionSpec> {
    (0..size)
        .flat_map(|r| (0..size).map(move |c| JunctionSpec::new(junction_name(r, c), APPROACHES)))
        .collect()
}

/// `vehicles` straight-through trips departing uniformly in `[0, horizon)`.
pub fn demand(rng: &mut SimRng, size: usize, vehicles: usize, horizon: u64) -> Vec<Trip> {
    let mut trips: Vec<Trip> = (0..vehicles)
        .map(|i| {
            let line = rng.gen_range(0..size);
            let heading = rng.gen_range(0..4u8);
            let route = match heading {
                // southbound down column `line`, entering each junction from the north
                0 => (0..size).map(|r| leg(r, line, 0)).collect(),
                // westbound along row `line`
                1 => (0..size).rev().map(|c| leg(line, c, 1)).collect(),
                // northbound up column `line`
                2 => (0..size).rev().map(|r| leg(r, line, 2)).collect(),
                // eastbound along row `line`
                _ => (0..size).map(|c| leg(line, c, 3)).collect(),
            };
            Trip {
                vehicle: format!("veh{i}"),
                depart: Tick(rng.gen_range(0..horizon.max(1))),
                route,
            }
        })
        .collect();
    trips.sort_by_key(|t| t.depart);
    trips
}

fn leg(row: usize, col: usize, approach: usize) -> Leg {
    Leg { intersection: junction_name(row, col), approach }
}
