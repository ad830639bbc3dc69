use evosteer_nn::networks::{InferenceError, TopologyError};

use std::error::Error;
use std::fmt;

/// An error type indicating the trainer could not build
/// its population.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SetupError {
    /// The network topology was malformed.
    Topology(TopologyError),
}

/// An error type for failures while advancing the trainer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrainerError {
    /// A member's forward pass was fed a sensor vector of the
    /// wrong size by the environment.
    Inference {
        /// Index of the affected member.
        member: usize,
        /// The underlying inference failure.
        source: InferenceError,
    },
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Topology(e) => write!(f, "trainer setup failed: {}", e),
        }
    }
}

impl fmt::Display for TrainerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inference { member, source } => {
                write!(f, "member {} failed inference: {}", member, source)
            }
        }
    }
}

impl Error for SetupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Topology(e) => Some(e),
        }
    }
}

impl Error for TrainerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Inference { source, .. } => Some(source),
        }
    }
}

impl From<TopologyError> for SetupError {
    fn from(e: TopologyError) -> SetupError {
        SetupError::Topology(e)
    }
}
