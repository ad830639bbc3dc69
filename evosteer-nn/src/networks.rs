//! Network phenotypes driven by the trainer.
mod dense;
mod errors;

pub use dense::DenseNetwork;
pub use errors::{CopyError, InferenceError, SnapshotError, TopologyError};
