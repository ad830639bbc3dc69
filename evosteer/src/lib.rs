//! An epoch-based genetic-algorithm trainer that steers simulated
//! agents toward a target with small dense feedforward networks.
//!
//! The trainer owns a population of [`DenseNetwork`]s plus a champion
//! holding the best weights observed so far. The host simulation stays
//! behind the [`Environment`] trait: every tick the trainer gathers a
//! sensor vector per member, runs one forward pass, and hands the
//! output back as an actuation command. Once per configured epoch it
//! scores every member by its negated distance to the target, lets the
//! champion adopt the best member's weights if they are at least as
//! good as anything seen before, resets the population from the
//! champion (with one mutation pass per member while training), and
//! persists the champion's weights. There is no internal termination
//! condition; the caller stops the loop.
//!
//! The trainer is single-threaded and tick-driven: member inference
//! runs sequentially within a tick, and all epoch-boundary work is
//! serialized with acting, so no member's weights are ever mutated
//! mid-pass. Members share no mutable state during acting, which
//! leaves per-member inference embarrassingly parallel should a
//! caller ever need to shard it.
//!
//! [`DenseNetwork`]: evosteer_nn::networks::DenseNetwork
//!
//! # Example usage: steering drifting agents toward a fixed target
//! ```
//! use evosteer::{Environment, Tick, Trainer, TrainerConfig};
//! use std::num::NonZeroUsize;
//! use std::time::Duration;
//!
//! const TARGET: [f32; 3] = [10.0, 0.0, 0.0];
//!
//! struct Drifters {
//!     positions: Vec<[f32; 3]>,
//! }
//!
//! impl Environment for Drifters {
//!     fn sense(&self, member: usize) -> Vec<f32> {
//!         let p = self.positions[member];
//!         vec![p[0], p[1], p[2], TARGET[0], TARGET[1], TARGET[2]]
//!     }
//!
//!     fn actuate(&mut self, member: usize, outputs: &[f32]) {
//!         for axis in 0..3 {
//!             self.positions[member][axis] += 0.01 * outputs[axis].clamp(-1.0, 1.0);
//!         }
//!     }
//!
//!     fn position(&self, member: usize) -> [f32; 3] {
//!         self.positions[member]
//!     }
//!
//!     fn target_position(&self) -> [f32; 3] {
//!         TARGET
//!     }
//!
//!     fn reset_member(&mut self, member: usize) {
//!         self.positions[member] = [0.0; 3];
//!     }
//! }
//!
//! let config = TrainerConfig {
//!     size: NonZeroUsize::new(8).unwrap(),
//!     epoch_duration: Duration::from_secs(2),
//!     training: true,
//!     weights_path: std::env::temp_dir().join("evosteer-doc.weights"),
//! };
//! let mut trainer = Trainer::new(&[6, 4, 3], config).unwrap();
//! let mut env = Drifters {
//!     positions: vec![[0.0; 3]; 8],
//! };
//!
//! for _ in 0..60 {
//!     match trainer.advance(&mut env, Duration::from_millis(100)).unwrap() {
//!         Tick::EpochCompleted(report) => {
//!             println!("epoch {}: best fitness {}", report.epoch, report.best_fitness);
//!             if let Some(e) = report.persistence {
//!                 eprintln!("champion not persisted this epoch: {}", e);
//!             }
//!         }
//!         Tick::Acted => {}
//!     }
//! }
//! ```

mod environment;
mod trainer;

pub use environment::*;
pub use trainer::*;
