//! # EvoSteer-NN
//! Dense feedforward neural networks evolved by the [`EvoSteer` crate](https://crates.io/crates/evosteer)'s `Trainer`.
//!
//! Provides a [`DenseNetwork`] type holding a fixed topology and per-transition
//! weight buffers, together with the three genetic-algorithm operators the
//! trainer relies on:
//! - feedforward inference ([`DenseNetwork::feed_forward`]),
//! - stochastic weight perturbation ([`DenseNetwork::mutate`]),
//! - wholesale weight transfer ([`DenseNetwork::copy_weights_from`]).
//!
//! Weights can be persisted as a raw little-endian `f32` stream through the
//! [`persistence`] module. There is no gradient-based learning anywhere in
//! this crate; networks only ever run inference and get perturbed.
//!
//! [`DenseNetwork`]: crate::networks::DenseNetwork
//! [`DenseNetwork::feed_forward`]: crate::networks::DenseNetwork::feed_forward
//! [`DenseNetwork::mutate`]: crate::networks::DenseNetwork::mutate
//! [`DenseNetwork::copy_weights_from`]: crate::networks::DenseNetwork::copy_weights_from
//!
//! # Example usage: inference and weight transfer
//! ```
//! use evosteer_nn::networks::DenseNetwork;
//! use evosteer_nn::persistence;
//!
//! let mut parent = DenseNetwork::new(&[6, 4, 3]).unwrap();
//! let mut child = DenseNetwork::new(&[6, 4, 3]).unwrap();
//!
//! // Offspring adopt the parent's weights wholesale, then diverge.
//! child.copy_weights_from(&parent).unwrap();
//! child.mutate();
//!
//! let outputs = parent.feed_forward(&[1.0, 0.0, 0.0, 0.0, 0.0, 0.0]).unwrap();
//! assert_eq!(outputs.len(), 3);
//!
//! // Weights round-trip bit-exactly through the binary codec.
//! let mut stream = Vec::new();
//! persistence::write_weights(&parent, &mut stream).unwrap();
//! persistence::read_weights(&mut child, stream.as_slice()).unwrap();
//! ```

pub mod activation;
pub mod networks;
pub mod persistence;
