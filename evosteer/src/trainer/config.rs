use serde::{Deserialize, Serialize};

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration data for a [`Trainer`].
///
/// [`Trainer`]: crate::Trainer
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrainerConfig {
    /// Number of member networks in the population.
    pub size: NonZeroUsize,
    /// Simulated time between epoch boundaries.
    pub epoch_duration: Duration,
    /// Whether members receive a mutation pass after adopting the
    /// champion's weights at each epoch boundary. Disable to replay
    /// a trained champion without selective pressure.
    pub training: bool,
    /// Path the champion's weights are persisted to at every epoch
    /// boundary, and read from by [`Trainer::load_champion`].
    ///
    /// [`Trainer::load_champion`]: crate::Trainer::load_champion
    pub weights_path: PathBuf,
}

impl TrainerConfig {
    /// Returns a minimal single-member training configuration
    /// persisting to the given path.
    ///
    /// Meant as a way to abbreviate configuration instantiation;
    /// real experiments will want a larger population.
    ///
    /// # Examples
    /// ```
    /// use evosteer::TrainerConfig;
    /// use std::num::NonZeroUsize;
    ///
    /// let config = TrainerConfig {
    ///     size: NonZeroUsize::new(64).unwrap(),
    ///     ..TrainerConfig::minimal("champion.weights")
    /// };
    ///
    /// assert!(config.training);
    /// assert_eq!(config.epoch_duration.as_secs(), 15);
    /// ```
    pub fn minimal(weights_path: impl Into<PathBuf>) -> TrainerConfig {
        TrainerConfig {
            size: NonZeroUsize::new(1).expect("1 is non-zero"),
            epoch_duration: Duration::from_secs(15),
            training: true,
            weights_path: weights_path.into(),
        }
    }
}
