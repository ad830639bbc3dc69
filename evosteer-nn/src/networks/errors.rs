use std::error::Error;
use std::fmt;

/// An error type indicating a malformed layer
/// configuration at network construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TopologyError {
    /// Fewer than two layers were specified.
    /// Contains the number of layers given.
    TooFewLayers(usize),
    /// A layer was specified with a width of zero.
    /// Contains the index of the offending layer.
    ZeroWidthLayer(usize),
}

/// An error type indicating an input vector whose
/// size does not match the network's input layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InferenceError {
    /// The input slice length differs from the input layer width.
    InputSize {
        /// Width of the network's input layer.
        expected: usize,
        /// Length of the slice that was passed.
        actual: usize,
    },
}

/// An error type indicating a weight transfer between
/// networks of differing shapes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CopyError {
    /// The source network's topology differs from the destination's.
    TopologyMismatch {
        /// Layer sizes of the destination network.
        expected: Vec<usize>,
        /// Layer sizes of the source network.
        actual: Vec<usize>,
    },
}

/// An error type indicating a deserialized network
/// snapshot that is internally inconsistent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SnapshotError {
    /// The snapshot's topology is malformed.
    Topology(TopologyError),
    /// The number of weight buffers does not match the topology.
    TransitionCount {
        /// Transition count implied by the topology.
        expected: usize,
        /// Number of weight buffers in the snapshot.
        actual: usize,
    },
    /// A weight buffer's length does not match its transition.
    BufferSize {
        /// Index of the offending layer transition.
        transition: usize,
        /// Buffer length implied by the topology.
        expected: usize,
        /// Buffer length found in the snapshot.
        actual: usize,
    },
}

impl fmt::Display for TopologyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewLayers(count) => {
                write!(f, "network topology requires at least 2 layers, got {}", count)
            }
            Self::ZeroWidthLayer(layer) => {
                write!(f, "network layer {} has a width of zero", layer)
            }
        }
    }
}

impl fmt::Display for InferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InputSize { expected, actual } => write!(
                f,
                "feedforward input has {} values but the input layer expects {}",
                actual, expected
            ),
        }
    }
}

impl fmt::Display for CopyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TopologyMismatch { expected, actual } => write!(
                f,
                "weight copy between mismatched topologies {:?} and {:?}",
                expected, actual
            ),
        }
    }
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Topology(e) => write!(f, "snapshot topology is malformed: {}", e),
            Self::TransitionCount { expected, actual } => write!(
                f,
                "snapshot holds {} weight buffers but the topology requires {}",
                actual, expected
            ),
            Self::BufferSize {
                transition,
                expected,
                actual,
            } => write!(
                f,
                "snapshot weight buffer {} holds {} weights but the topology requires {}",
                transition, actual, expected
            ),
        }
    }
}

impl Error for TopologyError {}
impl Error for InferenceError {}
impl Error for CopyError {}

impl Error for SnapshotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Topology(e) => Some(e),
            _ => None,
        }
    }
}
