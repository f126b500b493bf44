//! Seedable source of randomness shared by the network construction and connectivity routines.
//!
//! All draws come from one running generator: for a fixed seed, the order of the calls is the
//! only thing that determines the produced values.
//!
//! # Examples
//!
//! ```rust
//! use rusty_izh::random::RandomSource;
//!
//! let mut rng1 = RandomSource::new(42);
//! let mut rng2 = RandomSource::new(42);
//!
//! let mut degrees1 = vec![0; 10];
//! let mut degrees2 = vec![0; 10];
//! rng1.fill_poisson(&mut degrees1, 3.0).unwrap();
//! rng2.fill_poisson(&mut degrees2, 3.0).unwrap();
//!
//! assert_eq!(degrees1, degrees2);
//! assert_eq!(rng1.uniform_double(0.0, 1.0), rng2.uniform_double(0.0, 1.0));
//! ```
use rand::distributions::{Distribution, Uniform};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Normal, Poisson};

use crate::error::SNNError;

/// The seed value requesting a seed drawn from the system entropy.
pub const ENTROPY_SEED: u64 = 0;

/// A pseudo-random number generator with the distributions used throughout the library.
#[derive(Debug, Clone)]
pub struct RandomSource {
    seed: u64,
    rng: ChaCha8Rng,
}

impl RandomSource {
    /// Create a new random source from the provided seed.
    /// A seed of [`ENTROPY_SEED`] is replaced by a fresh seed drawn from the system entropy.
    pub fn new(seed: u64) -> Self {
        let seed = if seed == ENTROPY_SEED {
            rand::thread_rng().gen_range(1..u64::MAX)
        } else {
            seed
        };
        RandomSource {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Returns the seed actually used by the generator.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns a uniform sample in `[low, high)`.
    ///
    /// # Panics
    ///
    /// Panics if `low >= high` or if the range is not finite.
    pub fn uniform_double(&mut self, low: f64, high: f64) -> f64 {
        self.rng.gen_range(low..high)
    }

    /// Fill the slice with independent uniform samples in `[low, high)`.
    ///
    /// # Panics
    ///
    /// Panics if `low >= high` or if the range is not finite.
    pub fn fill_uniform(&mut self, values: &mut [f64], low: f64, high: f64) {
        let dist = Uniform::new(low, high);
        values
            .iter_mut()
            .for_each(|value| *value = dist.sample(&mut self.rng));
    }

    /// Returns a normal sample with the provided mean and standard deviation.
    pub fn normal(&mut self, mean: f64, sd: f64) -> Result<f64, SNNError> {
        let dist = normal_dist(mean, sd)?;
        Ok(dist.sample(&mut self.rng))
    }

    /// Fill the slice with independent normal samples.
    pub fn fill_normal(&mut self, values: &mut [f64], mean: f64, sd: f64) -> Result<(), SNNError> {
        let dist = normal_dist(mean, sd)?;
        values
            .iter_mut()
            .for_each(|value| *value = dist.sample(&mut self.rng));
        Ok(())
    }

    /// Returns a Poisson sample with the provided mean.
    /// A zero mean is valid and always yields zero.
    pub fn poisson(&mut self, mean: f64) -> Result<usize, SNNError> {
        match poisson_dist(mean)? {
            Some(dist) => Ok(dist.sample(&mut self.rng) as usize),
            None => Ok(0),
        }
    }

    /// Fill the slice with independent Poisson samples.
    pub fn fill_poisson(&mut self, values: &mut [usize], mean: f64) -> Result<(), SNNError> {
        match poisson_dist(mean)? {
            Some(dist) => values
                .iter_mut()
                .for_each(|value| *value = dist.sample(&mut self.rng) as usize),
            None => values.fill(0),
        }
        Ok(())
    }

    /// Shuffle the slice in place, with all permutations equally likely.
    pub fn shuffle<T>(&mut self, values: &mut [T]) {
        values.shuffle(&mut self.rng);
    }
}

fn normal_dist(mean: f64, sd: f64) -> Result<Normal<f64>, SNNError> {
    if !mean.is_finite() {
        return Err(SNNError::InvalidParameter(
            "Normal mean must be finite".to_string(),
        ));
    }
    Normal::new(mean, sd).map_err(|e| {
        SNNError::InvalidParameter(format!("Invalid normal distribution: {}", e))
    })
}

/// A degenerate zero-mean distribution is returned as `None`.
fn poisson_dist(mean: f64) -> Result<Option<Poisson<f64>>, SNNError> {
    if !mean.is_finite() || mean < 0.0 {
        return Err(SNNError::InvalidParameter(
            "Poisson mean must be finite and non-negative".to_string(),
        ));
    }
    if mean == 0.0 {
        return Ok(None);
    }
    Poisson::new(mean)
        .map(Some)
        .map_err(|e| SNNError::InvalidParameter(format!("Invalid Poisson distribution: {}", e)))
}
