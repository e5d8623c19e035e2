use rand::{rngs::StdRng, SeedableRng};

use crate::error::{NetworkError, Result};

/// Configuration for a `Network::learn_over_data` run.
///
/// # Fields
/// - `epochs`: total number of full passes over the training data
/// - `batch_size`: samples per update; use `1` for online SGD. A trailing
///   partial batch is skipped.
/// - `seed`: makes the per-epoch shuffles reproducible; entropy-seeded
///   when `None`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub seed: Option<u64>,
}

impl TrainConfig {
    pub fn new(epochs: usize, batch_size: usize) -> Self {
        TrainConfig {
            epochs,
            batch_size,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(NetworkError::InvalidArgument("epochs must be at least 1".to_owned()));
        }
        if self.batch_size == 0 {
            return Err(NetworkError::InvalidArgument("batch_size must be at least 1".to_owned()));
        }
        Ok(())
    }

    pub(crate) fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}
