//! Reward samples collected between two decision boundaries.

use thiserror::Error;

/// A decision boundary was reached with no reward samples in the window.
///
/// The scheduler's countdown guarantees at least one sample per window, so
/// this always signals a scheduling bug.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("decision window closed with no reward samples")]
pub struct DegenerateWindow;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RewardWindow {
    samples: Vec<f64>,
}

impl RewardWindow {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, sample: f64) {
        self.samples.push(sample);
    }

    /// Arithmetic mean of the samples.  The window is left untouched.
    pub fn reduce(&self) -> Result<f64, DegenerateWindow> {
        if self.samples.is_empty() {
            return Err(DegenerateWindow);
        }
        Ok(self.samples.iter().sum::<f64>() / self.samples.len() as f64)
    }

    /// [`reduce`](Self::reduce), then clear.  On error the window is unchanged.
    pub fn take_mean(&mut self) -> Result<f64, DegenerateWindow> {
        let mean = self.reduce()?;
        self.samples.clear();
        Ok(mean)
    }

    #[inline]
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }
}
