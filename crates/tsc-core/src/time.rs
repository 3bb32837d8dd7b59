//! Simulation step counter.
//!
//! The controller never deals in wall-clock time: one `Tick` is one call to
//! the adapter's `step()`, and every countdown, trip time, and phase
//! duration is an integer number of ticks.

/// An absolute simulation step counter.  Tick 0 is "before the first step".
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }

    /// The tick immediately after `self`.
    #[inline]
    pub fn next(self) -> Tick {
        self.offset(1)
    }

    /// Ticks elapsed from `earlier` to `self`, saturating at zero.
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}
