/// The host simulation the trainer steers.
///
/// An implementation supplies per-member observations, consumes
/// per-member actuation commands, and exposes just enough spatial
/// state for the trainer to score members at epoch boundaries.
/// Everything engine-specific (physics integration, rendering,
/// scene lifecycle) stays on the implementor's side of this trait.
///
/// Member indices passed by the trainer are always below the
/// configured population size.
pub trait Environment {
    /// Returns the member's current observation vector.
    ///
    /// The vector's length must equal the networks' input width;
    /// a mismatch surfaces as a [`TrainerError`] on the tick that
    /// consumed it.
    ///
    /// [`TrainerError`]: crate::TrainerError
    fn sense(&self, member: usize) -> Vec<f32>;

    /// Applies the member's actuation command for this tick.
    ///
    /// `outputs` has exactly the networks' output width.
    fn actuate(&mut self, member: usize, outputs: &[f32]);

    /// Returns the member's current position.
    fn position(&self, member: usize) -> [f32; 3];

    /// Returns the position of the steering target.
    fn target_position(&self) -> [f32; 3];

    /// Returns the member to its start configuration.
    ///
    /// Called for every member at each epoch boundary, after the
    /// member has adopted the champion's weights.
    fn reset_member(&mut self, member: usize);
}
