//! Per-step reward samples.
//!
//! The control core only ever sees a scalar; which scalar is a pluggable
//! strategy chosen by [`RewardKind`].

use tsc_core::RewardKind;

use crate::{AdapterResult, SimulationAdapter};

/// Produces the instantaneous reward sample for one intersection.
pub trait RewardSignal: Send + Sync {
    fn sample(&self, adapter: &mut dyn SimulationAdapter, intersection: &str) -> AdapterResult<f64>;
}

/// Vehicles currently on the intersection's approaches.
pub struct QueuedVehicles;

impl RewardSignal for QueuedVehicles {
    fn sample(&self, adapter: &mut dyn SimulationAdapter, intersection: &str) -> AdapterResult<f64> {
        let counts = adapter.vehicle_counts(intersection)?;
        Ok(counts.iter().map(|&c| f64::from(c)).sum())
    }
}

/// [`QueuedVehicles`] negated, so that maximising reward minimises queueing.
pub struct NegativeQueue;

impl RewardSignal for NegativeQueue {
    fn sample(&self, adapter: &mut dyn SimulationAdapter, intersection: &str) -> AdapterResult<f64> {
        QueuedVehicles.sample(adapter, intersection).map(|q| -q)
    }
}

/// Mean occupancy ratio over the intersection's approaches (0 if it has none).
pub struct MeanOccupancy;

impl RewardSignal for MeanOccupancy {
    fn sample(&self, adapter: &mut dyn SimulationAdapter, intersection: &str) -> AdapterResult<f64> {
        let ratios = adapter.occupancy(intersection)?;
        if ratios.is_empty() {
            return Ok(0.0);
        }
        Ok(ratios.iter().sum::<f64>() / ratios.len() as f64)
    }
}

/// The strategy for `kind`.
pub fn reward_signal(kind: RewardKind) -> Box<dyn RewardSignal> {
    match kind {
        RewardKind::QueuedVehicles => Box::new(QueuedVehicles),
        RewardKind::NegativeQueue  => Box::new(NegativeQueue),
        RewardKind::MeanOccupancy  => Box::new(MeanOccupancy),
    }
}
