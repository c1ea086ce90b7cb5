//! Random variates drawn from a single uniform stream.

use rand::RngCore;
use rand_chacha::{rand_core::SeedableRng, ChaChaRng};
use rand_distr::{Distribution, Open01};

/// Errors raised while constructing distributions or drawing variates.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VariateError {
    /// Exponential mean must be positive and finite.
    #[error("exponential mean must be positive, got {0}")]
    NonPositiveMean(f64),
    /// Uniform range must satisfy `low <= high`, both finite.
    #[error("invalid uniform range [{low}, {high}]")]
    InvalidRange {
        /// Lower bound.
        low: f64,
        /// Upper bound.
        high: f64,
    },
    /// A discrete draw did not land on any of the distribution's values.
    #[error("uniform draw {u} exceeds every cumulative probability of a {len}-value distribution")]
    OutOfRange {
        /// The uniform value drawn.
        u: f64,
        /// Number of values in the distribution.
        len: usize,
    },
    /// Cumulative distribution with no values.
    #[error("cumulative distribution must contain at least one value")]
    EmptyDistribution,
    /// Cumulative probabilities must be within `[0, 1]` and non-decreasing.
    #[error("invalid cumulative probability {value} at position {position}")]
    InvalidProbability {
        /// 1-based position of the offending value.
        position: usize,
        /// The offending value.
        value: f64,
    },
    /// The last cumulative probability must be 1.
    #[error("cumulative distribution must end at 1.0, but ends at {0}")]
    IncompleteDistribution(f64),
}

const COMPLETENESS_TOLERANCE: f64 = 1e-9;

/// Empirical discrete distribution over `1..=len`, given by its cumulative probabilities.
#[derive(Debug, Clone, PartialEq)]
pub struct CumulativeDistribution {
    cumulative: Vec<f64>,
}

impl CumulativeDistribution {
    /// Constructs a distribution from cumulative probabilities, e.g., `[0.167, 0.5, 0.833, 1.0]`
    /// for values 1 to 4 with probabilities 1/6, 1/3, 1/3, and 1/6.
    ///
    /// # Errors
    ///
    /// Returns an error if the sequence is empty, decreasing, leaves `[0, 1]`, or does not end at
    /// (approximately) 1.
    pub fn new(cumulative: Vec<f64>) -> Result<Self, VariateError> {
        let last = *cumulative.last().ok_or(VariateError::EmptyDistribution)?;
        let mut previous = 0.0;
        for (idx, &value) in cumulative.iter().enumerate() {
            if !(previous..=1.0).contains(&value) {
                return Err(VariateError::InvalidProbability {
                    position: idx + 1,
                    value,
                });
            }
            previous = value;
        }
        if (1.0 - last).abs() > COMPLETENESS_TOLERANCE {
            return Err(VariateError::IncompleteDistribution(last));
        }
        Ok(Self { cumulative })
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cumulative.len()
    }

    /// Always `false`; a distribution cannot be constructed without values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }

    /// Cumulative probabilities as given at construction.
    #[must_use]
    pub fn cumulative(&self) -> &[f64] {
        &self.cumulative
    }

    /// Maps a uniform value to the 1-based position of the first cumulative probability
    /// strictly greater than `u`. A value equal to a cumulative probability therefore selects
    /// the next position.
    ///
    /// Returns `None` if `u` is not below any of the cumulative probabilities.
    #[must_use]
    pub fn position(&self, u: f64) -> Option<usize> {
        self.cumulative
            .iter()
            .position(|&p| p > u)
            .map(|idx| idx + 1)
    }
}

/// Generates exponential, uniform, and discrete variates from one pseudo-random stream.
pub struct VariateGenerator<R> {
    rng: R,
}

impl VariateGenerator<ChaChaRng> {
    /// Constructs a generator over a `ChaCha` stream seeded with `seed`.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaChaRng::seed_from_u64(seed))
    }
}

impl<R: RngCore> VariateGenerator<R> {
    /// Wraps a random number generator.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Draws `U` from the open interval `(0, 1)`.
    pub fn uniform01(&mut self) -> f64 {
        Open01.sample(&mut self.rng)
    }

    /// Draws from an exponential distribution with the given mean, as `-mean * ln(U)`.
    ///
    /// # Errors
    ///
    /// Returns [`VariateError::NonPositiveMean`] if `mean` is not a positive finite number.
    pub fn exponential(&mut self, mean: f64) -> Result<f64, VariateError> {
        if !(mean > 0.0 && mean.is_finite()) {
            return Err(VariateError::NonPositiveMean(mean));
        }
        Ok(-mean * self.uniform01().ln())
    }

    /// Draws from a uniform distribution over `[low, high]`, as `low + (high - low) * U`.
    ///
    /// # Errors
    ///
    /// Returns [`VariateError::InvalidRange`] if `low > high` or either bound is not finite.
    pub fn uniform(&mut self, low: f64, high: f64) -> Result<f64, VariateError> {
        if !(low.is_finite() && high.is_finite() && low <= high) {
            return Err(VariateError::InvalidRange { low, high });
        }
        Ok(low + (high - low) * self.uniform01())
    }

    /// Draws a value in `1..=distribution.len()`. See [`CumulativeDistribution::position`].
    ///
    /// # Errors
    ///
    /// Returns [`VariateError::OutOfRange`] if the draw falls past the last cumulative
    /// probability, which can only happen when it is slightly below 1.
    pub fn discrete(&mut self, distribution: &CumulativeDistribution) -> Result<usize, VariateError> {
        let u = self.uniform01();
        distribution.position(u).ok_or(VariateError::OutOfRange {
            u,
            len: distribution.len(),
        })
    }

    /// Borrows the generator so that a shorter-lived simulation continues this stream.
    pub fn by_ref(&mut self) -> VariateGenerator<&mut R> {
        VariateGenerator::new(&mut self.rng)
    }

    /// Consumes the generator and returns the underlying stream.
    pub fn into_inner(self) -> R {
        self.rng
    }
}
