//! `TripTimes`: matched departure/arrival accumulator for one episode.
//!
//! Only vehicles seen both departing and arriving contribute.  An arrival
//! without a recorded departure (a vehicle already in the network when the
//! episode's bookkeeping started) is ignored, and an episode in which no
//! trip completed has no average at all.

use tsc_core::Tick;

#[cfg(feature = "fx-hash")]
type DepartureMap = rustc_hash::FxHashMap<String, Tick>;
#[cfg(not(feature = "fx-hash"))]
type DepartureMap = std::collections::HashMap<String, Tick>;

#[derive(Debug, Clone, Default)]
pub struct TripTimes {
    /// Departed vehicles still in the network.
    open:        DepartureMap,
    departed:    usize,
    completed:   usize,
    total_ticks: u64,
}

impl TripTimes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_departure(&mut self, vehicle: impl Into<String>, at: Tick) {
        self.open.insert(vehicle.into(), at);
        self.departed += 1;
    }

    /// Close `vehicle`'s trip.  Returns its duration, or `None` if it never
    /// departed in this episode.
    pub fn record_arrival(&mut self, vehicle: &str, at: Tick) -> Option<u64> {
        let departed_at = self.open.remove(vehicle)?;
        let duration = at.since(departed_at);
        self.completed += 1;
        self.total_ticks += duration;
        Some(duration)
    }

    /// Mean trip duration in ticks over completed trips.
    pub fn average(&self) -> Option<f64> {
        (self.completed > 0).then(|| self.total_ticks as f64 / self.completed as f64)
    }

    #[inline]
    pub fn departed(&self) -> usize {
        self.departed
    }

    #[inline]
    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Departed vehicles that have not arrived yet.
    #[inline]
    pub fn in_progress(&self) -> usize {
        self.open.len()
    }
}
