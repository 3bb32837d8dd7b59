//! The `SimulationAdapter` trait: the control core's only window onto the
//! simulated world.

use std::path::PathBuf;

use crate::AdapterResult;

/// One demand scenario: the unit of work for one episode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    /// Human-readable name, also used to look up in-memory demand.
    pub name: String,
    /// Demand (route) file handed to the simulator on start.
    pub demand: PathBuf,
}

impl Scenario {
    pub fn new(name: impl Into<String>, demand: impl Into<PathBuf>) -> Self {
        Self { name: name.into(), demand: demand.into() }
    }

    /// A scenario named after its demand file's stem.
    pub fn from_path(demand: impl Into<PathBuf>) -> Self {
        let demand = demand.into();
        let name = demand
            .file_name()
            .map(|n| n.to_string_lossy().split('.').next().unwrap_or_default().to_owned())
            .unwrap_or_default();
        Self { name, demand }
    }
}

/// Stepping and query primitives over a running simulation.
///
/// Intersections are addressed by the simulator's own identifiers.  Every
/// method may fail with an [`AdapterError`][crate::AdapterError]; callers
/// treat any failure as fatal.
///
/// # Example
///
/// ```rust,ignore
/// adapter.start(&scenario)?;
/// while !adapter.is_drained()? {
///     adapter.step()?;
///     let phase = adapter.current_phase("J0")?;
///     // ...
/// }
/// adapter.close()?;
/// ```
pub trait SimulationAdapter {
    /// Launch or attach to the simulation for `scenario`.
    fn start(&mut self, scenario: &Scenario) -> AdapterResult<()>;

    /// Advance simulated time by exactly one tick.
    fn step(&mut self) -> AdapterResult<()>;

    /// `true` once no further vehicles are expected.
    fn is_drained(&mut self) -> AdapterResult<bool>;

    /// Vehicles that completed their trip during the last step.
    fn arrived_vehicles(&mut self) -> AdapterResult<Vec<String>>;

    /// Vehicles that started their trip during the last step.
    fn departed_vehicles(&mut self) -> AdapterResult<Vec<String>>;

    /// One vehicle count per controlled approach, in a fixed order.
    fn vehicle_counts(&mut self, intersection: &str) -> AdapterResult<Vec<u32>>;

    /// One occupancy ratio in `[0, 1]` per controlled approach.
    fn occupancy(&mut self, intersection: &str) -> AdapterResult<Vec<f64>>;

    /// The simulator's current phase cursor for `intersection`.
    fn current_phase(&mut self, intersection: &str) -> AdapterResult<u32>;

    /// Jump `intersection`'s signal to `phase`.
    fn set_phase(&mut self, intersection: &str, phase: u32) -> AdapterResult<()>;

    /// Release simulation resources.
    fn close(&mut self) -> AdapterResult<()>;
}
