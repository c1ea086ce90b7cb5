//! Statistical accumulators.

/// Area under a piecewise-constant function of simulation time.
///
/// The function value must be the one that held over the whole elapsed interval, i.e., the
/// state *before* the event that ends the interval is processed.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct TimeIntegral {
    area: f64,
}

impl TimeIntegral {
    /// Adds `value * elapsed` to the area.
    pub fn accumulate(&mut self, value: f64, elapsed: f64) {
        debug_assert!(elapsed >= 0.0, "negative time interval: {}", elapsed);
        self.area += value * elapsed;
    }

    /// Total accumulated area.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Time average over `horizon`, or zero if the horizon is empty.
    #[must_use]
    pub fn average(&self, horizon: f64) -> f64 {
        if horizon > 0.0 {
            self.area / horizon
        } else {
            0.0
        }
    }
}

/// Sum and count of discrete observations, such as customer delays.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Tally {
    sum: f64,
    count: usize,
}

impl Tally {
    /// Records an observation.
    pub fn record(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    /// Sum of all observations.
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Number of observations.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Mean observation, or zero if nothing was recorded.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}
