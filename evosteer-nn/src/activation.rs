//! Activation strategies applied to each neuron's weighted input sum.

use serde::{Deserialize, Serialize};

/// A per-neuron activation function.
///
/// This is the network's single extensibility seam: a
/// [`DenseNetwork`] is generic over its activation strategy,
/// so a variant network can swap the nonlinearity without
/// touching inference, mutation or persistence.
///
/// [`DenseNetwork`]: crate::networks::DenseNetwork
///
/// # Examples
/// ```
/// use evosteer_nn::activation::Activation;
/// use evosteer_nn::networks::DenseNetwork;
///
/// #[derive(Clone, Default)]
/// struct Threshold;
///
/// impl Activation for Threshold {
///     fn apply(&self, x: f32) -> f32 {
///         if x > 0.0 {
///             1.0
///         } else {
///             0.0
///         }
///     }
/// }
///
/// let network = DenseNetwork::with_activation(&[4, 2], Threshold).unwrap();
/// ```
pub trait Activation {
    /// Maps a neuron's weighted input sum to its activation value.
    fn apply(&self, x: f32) -> f32;
}

/// Leaky rectifier, the default activation strategy.
///
/// Positive sums pass through unchanged; negative sums
/// are scaled down by a factor of 0.01.
///
/// # Examples
/// ```
/// use evosteer_nn::activation::{Activation, LeakyRelu};
///
/// assert_eq!(LeakyRelu.apply(2.5), 2.5);
/// assert_eq!(LeakyRelu.apply(0.0), 0.0);
/// assert_eq!(LeakyRelu.apply(-2.0), -0.02);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeakyRelu;

/// Slope applied to negative weighted sums.
const NEGATIVE_SLOPE: f32 = 0.01;

impl Activation for LeakyRelu {
    fn apply(&self, x: f32) -> f32 {
        if x > 0.0 {
            x
        } else {
            NEGATIVE_SLOPE * x
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn zero_sum_maps_to_zero() {
        assert_eq!(LeakyRelu.apply(0.0), 0.0);
    }

    #[test]
    fn positive_sums_pass_through() {
        assert_eq!(LeakyRelu.apply(f32::EPSILON), f32::EPSILON);
        assert_eq!(LeakyRelu.apply(1.0), 1.0);
        assert_eq!(LeakyRelu.apply(1e6), 1e6);
    }

    #[test]
    fn negative_sums_are_scaled() {
        assert_eq!(LeakyRelu.apply(-f32::EPSILON), 0.01 * -f32::EPSILON);
        assert_eq!(LeakyRelu.apply(-1.0), -0.01);
        assert_eq!(LeakyRelu.apply(-100.0), -1.0);
    }
}
