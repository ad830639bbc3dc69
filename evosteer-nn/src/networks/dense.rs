use crate::activation::{Activation, LeakyRelu};
use crate::networks::errors::{CopyError, InferenceError, SnapshotError, TopologyError};
use crate::persistence::{self, PersistenceError};

use std::path::Path;

use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};

/// Chance in 100 that a weight is nudged by a uniform offset during mutation.
const NUDGE_CHANCE: i32 = 30;
/// Cumulative chance in 100 that a weight is instead scaled by a uniform factor.
const SCALE_CHANCE: i32 = 60;
/// Cumulative chance in 100 that a weight is instead negated.
const NEGATE_CHANCE: i32 = 90;
/// Magnitude bound for mutation offsets and scale factors.
const MUTATION_MAGNITUDE: f32 = 4.0;

/// A dense feedforward neural network with a fixed topology.
///
/// The topology is an ordered list of layer widths, at least two
/// entries long: the first entry is the input width, the last the
/// output width. Every pair of adjacent layers is fully connected
/// through a flat weight buffer in which
/// `weights[i][d * layer_sizes[i + 1] + s]` connects source neuron
/// `d` of layer `i` to destination neuron `s` of layer `i + 1`.
///
/// Weights are the network's only evolved state. They are drawn
/// uniformly from [-1, 1] at construction and thereafter only ever
/// replaced wholesale ([`copy_weights_from`]) or perturbed in place
/// ([`mutate`]); they are never resized. Neuron activations are
/// transient scratch state, overwritten by every [`feed_forward`]
/// call and excluded from serialization and persistence.
///
/// The fitness slot is written by the trainer at epoch boundaries
/// and is never read during inference. It starts out at [`f32::MIN`]
/// so that any evaluated score replaces it.
///
/// [`copy_weights_from`]: DenseNetwork::copy_weights_from
/// [`mutate`]: DenseNetwork::mutate
/// [`feed_forward`]: DenseNetwork::feed_forward
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(
    try_from = "NetworkSnapshot",
    into = "NetworkSnapshot",
    bound(serialize = "A: Activation + Clone", deserialize = "A: Activation + Default")
)]
pub struct DenseNetwork<A: Activation = LeakyRelu> {
    layer_sizes: Vec<usize>,
    neurons: Vec<Vec<f32>>,
    weights: Vec<Vec<f32>>,
    fitness: f32,
    activation: A,
}

impl DenseNetwork {
    /// Returns a randomized network with the default
    /// leaky-ReLU activation.
    ///
    /// Every weight is an independent uniform draw from [-1, 1].
    ///
    /// # Errors
    /// Fails if `layer_sizes` has fewer than two entries, or
    /// any entry is zero.
    ///
    /// # Examples
    /// ```
    /// use evosteer_nn::networks::DenseNetwork;
    ///
    /// let network = DenseNetwork::new(&[6, 4, 3]).unwrap();
    ///
    /// assert_eq!(network.input_size(), 6);
    /// assert_eq!(network.output_size(), 3);
    /// assert!(DenseNetwork::new(&[6]).is_err());
    /// assert!(DenseNetwork::new(&[6, 0, 3]).is_err());
    /// ```
    pub fn new(layer_sizes: &[usize]) -> Result<DenseNetwork, TopologyError> {
        DenseNetwork::with_activation(layer_sizes, LeakyRelu)
    }
}

impl<A: Activation> DenseNetwork<A> {
    /// Returns a randomized network using the passed
    /// activation strategy.
    ///
    /// # Errors
    /// Fails if `layer_sizes` has fewer than two entries, or
    /// any entry is zero.
    ///
    /// # Examples
    /// ```
    /// use evosteer_nn::activation::LeakyRelu;
    /// use evosteer_nn::networks::DenseNetwork;
    ///
    /// let network = DenseNetwork::with_activation(&[2, 2], LeakyRelu).unwrap();
    /// ```
    pub fn with_activation(
        layer_sizes: &[usize],
        activation: A,
    ) -> Result<DenseNetwork<A>, TopologyError> {
        if layer_sizes.len() < 2 {
            return Err(TopologyError::TooFewLayers(layer_sizes.len()));
        }
        if let Some(layer) = layer_sizes.iter().position(|&width| width == 0) {
            return Err(TopologyError::ZeroWidthLayer(layer));
        }

        let mut rng = thread_rng();
        Ok(DenseNetwork {
            layer_sizes: layer_sizes.to_vec(),
            neurons: layer_sizes.iter().map(|&width| vec![0.0; width]).collect(),
            weights: layer_sizes
                .windows(2)
                .map(|pair| {
                    (0..pair[0] * pair[1])
                        .map(|_| rng.gen_range(-1.0..=1.0))
                        .collect()
                })
                .collect(),
            fitness: f32::MIN,
            activation,
        })
    }

    /// Runs one forward pass and returns the output layer's activations.
    ///
    /// Inputs are copied into the input layer; each subsequent layer's
    /// neurons receive the activation of the weighted sum over all source
    /// neurons. The pass is a pure function of the inputs and the current
    /// weights, with no side effect beyond overwriting the transient
    /// neuron buffers. The returned slice remains available through
    /// [`outputs`] until the next pass.
    ///
    /// [`outputs`]: DenseNetwork::outputs
    ///
    /// # Errors
    /// Fails if `inputs` does not have exactly [`input_size`] elements.
    ///
    /// [`input_size`]: DenseNetwork::input_size
    ///
    /// # Examples
    /// ```
    /// use evosteer_nn::networks::DenseNetwork;
    ///
    /// let mut network = DenseNetwork::new(&[2, 3, 1]).unwrap();
    ///
    /// let outputs = network.feed_forward(&[0.5, -0.5]).unwrap();
    /// assert_eq!(outputs.len(), 1);
    ///
    /// assert!(network.feed_forward(&[0.5]).is_err());
    /// ```
    pub fn feed_forward(&mut self, inputs: &[f32]) -> Result<&[f32], InferenceError> {
        if inputs.len() != self.layer_sizes[0] {
            return Err(InferenceError::InputSize {
                expected: self.layer_sizes[0],
                actual: inputs.len(),
            });
        }

        self.neurons[0].copy_from_slice(inputs);
        for i in 0..self.layer_sizes.len() - 1 {
            let width = self.layer_sizes[i + 1];
            let (sources, destinations) = self.neurons.split_at_mut(i + 1);
            let source = &sources[i];
            let destination = &mut destinations[0];
            for s in 0..width {
                let mut sum = 0.0;
                for (d, value) in source.iter().enumerate() {
                    sum += value * self.weights[i][d * width + s];
                }
                destination[s] = self.activation.apply(sum);
            }
        }
        Ok(self.outputs())
    }

    /// Returns the output layer's activations from the latest
    /// forward pass, or all zeroes if none has run yet.
    pub fn outputs(&self) -> &[f32] {
        &self.neurons[self.neurons.len() - 1]
    }

    /// Perturbs the network's weights in place.
    ///
    /// Every weight independently rolls a uniform integer in [0, 100):
    /// - below 30, a uniform offset in [-4, 4] is added;
    /// - below 60, the weight is scaled by a uniform factor in [-4, 4]
    ///   (sign flips and large jumps are intended);
    /// - below 90, the weight is negated;
    /// - otherwise (10% of rolls) it is left unchanged.
    ///
    /// # Examples
    /// ```
    /// use evosteer_nn::networks::DenseNetwork;
    ///
    /// let mut network = DenseNetwork::new(&[4, 4, 2]).unwrap();
    /// network.mutate();
    /// ```
    pub fn mutate(&mut self) {
        let mut rng = thread_rng();
        for transition in &mut self.weights {
            for weight in transition.iter_mut() {
                let roll: i32 = rng.gen_range(0..100);
                if roll < NUDGE_CHANCE {
                    *weight += rng.gen_range(-MUTATION_MAGNITUDE..=MUTATION_MAGNITUDE);
                } else if roll < SCALE_CHANCE {
                    *weight *= rng.gen_range(-MUTATION_MAGNITUDE..=MUTATION_MAGNITUDE);
                } else if roll < NEGATE_CHANCE {
                    *weight = -*weight;
                }
            }
        }
    }

    /// Deep-copies every weight buffer from `source` into this network.
    ///
    /// The two networks share no storage afterwards; mutating one
    /// leaves the other untouched. The source's activation strategy
    /// and fitness are not copied.
    ///
    /// # Errors
    /// Fails if the source's topology differs from this network's.
    ///
    /// # Examples
    /// ```
    /// use evosteer_nn::networks::DenseNetwork;
    ///
    /// let parent = DenseNetwork::new(&[3, 2]).unwrap();
    /// let mut child = DenseNetwork::new(&[3, 2]).unwrap();
    /// let mut stranger = DenseNetwork::new(&[3, 3]).unwrap();
    ///
    /// child.copy_weights_from(&parent).unwrap();
    /// assert!(stranger.copy_weights_from(&parent).is_err());
    /// ```
    pub fn copy_weights_from<B: Activation>(
        &mut self,
        source: &DenseNetwork<B>,
    ) -> Result<(), CopyError> {
        if self.layer_sizes != source.layer_sizes {
            return Err(CopyError::TopologyMismatch {
                expected: self.layer_sizes.clone(),
                actual: source.layer_sizes.clone(),
            });
        }
        for (destination, source) in self.weights.iter_mut().zip(&source.weights) {
            destination.copy_from_slice(source);
        }
        Ok(())
    }

    /// Persists the network's weights to a file.
    ///
    /// Equivalent to [`persistence::save`].
    ///
    /// # Errors
    /// Fails if the file cannot be created or written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), PersistenceError> {
        persistence::save(self, path)
    }

    /// Replaces the network's weights with the contents of a file.
    ///
    /// Equivalent to [`persistence::load`].
    ///
    /// # Errors
    /// Fails if the file cannot be opened or read, or holds fewer
    /// weights than the topology requires. The network's weights are
    /// untouched on failure.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<(), PersistenceError> {
        persistence::load(self, path)
    }

    /// Returns the network's topology as an ordered list of layer widths.
    pub fn layer_sizes(&self) -> &[usize] {
        &self.layer_sizes
    }

    /// Returns the width of the input layer.
    pub fn input_size(&self) -> usize {
        self.layer_sizes[0]
    }

    /// Returns the width of the output layer.
    pub fn output_size(&self) -> usize {
        self.layer_sizes[self.layer_sizes.len() - 1]
    }

    /// Returns an iterator over the flat weight buffer
    /// of each layer transition, in layer order.
    pub fn weights(&self) -> impl Iterator<Item = &[f32]> {
        self.weights.iter().map(Vec::as_slice)
    }

    /// Returns the total number of weights across all transitions.
    pub fn weight_count(&self) -> usize {
        self.weights.iter().map(Vec::len).sum()
    }

    /// Sets the network's fitness value.
    pub fn set_fitness(&mut self, fitness: f32) {
        self.fitness = fitness;
    }

    /// Returns the network's fitness value.
    pub fn fitness(&self) -> f32 {
        self.fitness
    }

    pub(crate) fn weight_buffers_mut(&mut self) -> &mut [Vec<f32>] {
        &mut self.weights
    }
}

/// Persistent form of a network: topology, weights and fitness.
/// Neuron buffers are scratch state and are rebuilt when the
/// snapshot is turned back into a network.
#[derive(Serialize, Deserialize)]
#[serde(rename = "DenseNetwork")]
pub(crate) struct NetworkSnapshot {
    layer_sizes: Vec<usize>,
    weights: Vec<Vec<f32>>,
    fitness: f32,
}

impl<A: Activation> From<DenseNetwork<A>> for NetworkSnapshot {
    fn from(network: DenseNetwork<A>) -> NetworkSnapshot {
        NetworkSnapshot {
            layer_sizes: network.layer_sizes,
            weights: network.weights,
            fitness: network.fitness,
        }
    }
}

impl<A: Activation + Default> TryFrom<NetworkSnapshot> for DenseNetwork<A> {
    type Error = SnapshotError;

    fn try_from(snapshot: NetworkSnapshot) -> Result<DenseNetwork<A>, SnapshotError> {
        let mut network = DenseNetwork::with_activation(&snapshot.layer_sizes, A::default())
            .map_err(SnapshotError::Topology)?;
        if snapshot.weights.len() != network.weights.len() {
            return Err(SnapshotError::TransitionCount {
                expected: network.weights.len(),
                actual: snapshot.weights.len(),
            });
        }
        for (transition, (found, required)) in
            snapshot.weights.iter().zip(&network.weights).enumerate()
        {
            if found.len() != required.len() {
                return Err(SnapshotError::BufferSize {
                    transition,
                    expected: required.len(),
                    actual: found.len(),
                });
            }
        }
        network.weights = snapshot.weights;
        network.fitness = snapshot.fitness;
        Ok(network)
    }
}
