//! A Trainer owns a population of networks and evolves it
//! against an [`Environment`] through an epoch state machine:
//! acting ticks repeat until the epoch clock expires, then one
//! boundary pass evaluates, selects, repopulates and persists.
mod config;
mod errors;
pub mod logging;

use crate::environment::Environment;
pub use config::TrainerConfig;
pub use errors::{SetupError, TrainerError};

use evosteer_nn::activation::{Activation, LeakyRelu};
use evosteer_nn::networks::DenseNetwork;
use evosteer_nn::persistence::{self, PersistenceError};

use std::time::Duration;

/// Edge-triggered signals dispatched synchronously to
/// [subscribed] listeners.
///
/// [subscribed]: Trainer::subscribe
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrainerEvent {
    /// The population has been set up; fires once, before the
    /// first acting tick.
    NetworksInitialized,
    /// An epoch boundary has completed; fires once per epoch.
    NewEpoch,
}

/// Outcome of a single [`Trainer::advance`] call.
#[derive(Debug)]
pub enum Tick {
    /// An acting tick ran: every member sensed, inferred and actuated.
    Acted,
    /// The epoch clock expired and a boundary pass ran instead.
    EpochCompleted(EpochReport),
}

/// Summary of one epoch boundary.
#[derive(Debug)]
pub struct EpochReport {
    /// Number of the epoch that just completed, starting at 1.
    pub epoch: usize,
    /// Index of the best-scoring member; ties go to the lowest index.
    pub best_index: usize,
    /// The best member's fitness (negated distance to the target).
    pub best_fitness: f32,
    /// Whether the champion adopted the best member's weights.
    pub champion_replaced: bool,
    /// The failure, if any, while persisting the champion's weights.
    /// A failed save never aborts training; the champion's weights
    /// stay in memory and the next boundary tries again.
    pub persistence: Option<PersistenceError>,
}

/// An epoch-based genetic-algorithm trainer.
///
/// Owns the population and the champion network; the host
/// simulation stays behind the [`Environment`] trait. See the
/// [crate documentation](crate) for the full protocol and a
/// usage example.
pub struct Trainer<A: Activation = LeakyRelu> {
    members: Vec<DenseNetwork<A>>,
    champion: DenseNetwork<A>,
    epoch: usize,
    clock: Duration,
    started: bool,
    config: TrainerConfig,
    listeners: Vec<Box<dyn FnMut(TrainerEvent)>>,
}

impl Trainer {
    /// Creates a trainer whose networks use the default
    /// leaky-ReLU activation.
    ///
    /// Members are independently randomized; the champion is seeded
    /// with member 0's initial weights.
    ///
    /// # Errors
    /// Fails if `layer_sizes` has fewer than two entries or any
    /// entry is zero.
    ///
    /// # Examples
    /// ```
    /// use evosteer::{Trainer, TrainerConfig};
    ///
    /// let trainer = Trainer::new(
    ///     &[6, 4, 3],
    ///     TrainerConfig::minimal(std::env::temp_dir().join("new-doc.weights")),
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(trainer.epoch(), 0);
    /// ```
    pub fn new(layer_sizes: &[usize], config: TrainerConfig) -> Result<Trainer, SetupError> {
        Trainer::with_activation(layer_sizes, LeakyRelu, config)
    }
}

impl<A: Activation> Trainer<A> {
    /// Creates a trainer whose networks use the passed
    /// activation strategy.
    ///
    /// # Errors
    /// Fails if `layer_sizes` has fewer than two entries or any
    /// entry is zero.
    pub fn with_activation(
        layer_sizes: &[usize],
        activation: A,
        config: TrainerConfig,
    ) -> Result<Trainer<A>, SetupError>
    where
        A: Clone,
    {
        let members: Vec<DenseNetwork<A>> = (0..config.size.get())
            .map(|_| DenseNetwork::with_activation(layer_sizes, activation.clone()))
            .collect::<Result<_, _>>()?;
        let mut champion = DenseNetwork::with_activation(layer_sizes, activation)?;
        champion
            .copy_weights_from(&members[0])
            .expect("champion shares the members' topology");

        Ok(Trainer {
            members,
            champion,
            epoch: 0,
            clock: Duration::ZERO,
            started: false,
            config,
            listeners: Vec::new(),
        })
    }

    /// Registers a listener for [`TrainerEvent`]s.
    ///
    /// Listeners are invoked synchronously at each trigger point,
    /// in registration order.
    pub fn subscribe<F: FnMut(TrainerEvent) + 'static>(&mut self, listener: F) {
        self.listeners.push(Box::new(listener));
    }

    /// Advances the trainer by one simulation tick of length `dt`.
    ///
    /// While the accumulated epoch clock is below the configured
    /// epoch duration this is an acting tick: every member senses,
    /// runs one forward pass and actuates. Once the clock expires
    /// the boundary pass runs instead: members are scored by negated
    /// distance to the target, the best member is selected (ties to
    /// the lowest index), the champion adopts its weights if they
    /// score at least as well as the best ever observed, the whole
    /// population is reset from the champion (mutated iff training
    /// is enabled), every member's spatial state is reset, and the
    /// champion's weights are persisted.
    ///
    /// The first call dispatches [`TrainerEvent::NetworksInitialized`]
    /// before anything else; every boundary pass ends by dispatching
    /// [`TrainerEvent::NewEpoch`].
    ///
    /// # Errors
    /// Fails if the environment supplies a sensor vector whose size
    /// does not match the networks' input width. A persistence
    /// failure is not an error here; it is reported through the
    /// returned [`EpochReport`].
    pub fn advance<E: Environment>(
        &mut self,
        env: &mut E,
        dt: Duration,
    ) -> Result<Tick, TrainerError> {
        if !self.started {
            self.started = true;
            self.dispatch(TrainerEvent::NetworksInitialized);
        }

        self.clock += dt;
        if self.clock >= self.config.epoch_duration {
            self.clock = Duration::ZERO;
            Ok(Tick::EpochCompleted(self.complete_epoch(env)))
        } else {
            self.act(env)?;
            Ok(Tick::Acted)
        }
    }

    /// Overwrites the champion's weights from the configured
    /// weights file.
    ///
    /// An operator command; it may be issued at any time and does
    /// not alter the epoch cycle. Members pick up the loaded
    /// weights at the next boundary.
    ///
    /// # Errors
    /// Fails if the file cannot be opened or read, or holds fewer
    /// weights than the topology requires. The champion's weights
    /// are untouched on failure.
    pub fn load_champion(&mut self) -> Result<(), PersistenceError> {
        persistence::load(&mut self.champion, &self.config.weights_path)
    }

    /// Returns the champion network.
    pub fn champion(&self) -> &DenseNetwork<A> {
        &self.champion
    }

    /// Returns an iterator over the population's members.
    pub fn members(&self) -> impl Iterator<Item = &DenseNetwork<A>> {
        self.members.iter()
    }

    /// Returns the number of completed epochs.
    pub fn epoch(&self) -> usize {
        self.epoch
    }

    /// Returns the trainer's configuration.
    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    fn act<E: Environment>(&mut self, env: &mut E) -> Result<(), TrainerError> {
        for (index, member) in self.members.iter_mut().enumerate() {
            let inputs = env.sense(index);
            let outputs = member
                .feed_forward(&inputs)
                .map_err(|source| TrainerError::Inference {
                    member: index,
                    source,
                })?;
            env.actuate(index, outputs);
        }
        Ok(())
    }

    fn complete_epoch<E: Environment>(&mut self, env: &mut E) -> EpochReport {
        self.epoch += 1;

        let target = env.target_position();
        for (index, member) in self.members.iter_mut().enumerate() {
            member.set_fitness(-distance(env.position(index), target));
        }

        let (best_index, best_fitness) = self.best_member();
        let champion_replaced = best_fitness >= self.champion.fitness();
        if champion_replaced {
            self.champion
                .copy_weights_from(&self.members[best_index])
                .expect("members share the champion's topology");
            self.champion.set_fitness(best_fitness);
        }

        for (index, member) in self.members.iter_mut().enumerate() {
            member
                .copy_weights_from(&self.champion)
                .expect("members share the champion's topology");
            if self.config.training {
                member.mutate();
            }
            env.reset_member(index);
        }

        let persistence = persistence::save(&self.champion, &self.config.weights_path).err();
        self.dispatch(TrainerEvent::NewEpoch);

        EpochReport {
            epoch: self.epoch,
            best_index,
            best_fitness,
            champion_replaced,
            persistence,
        }
    }

    /// Returns the index and fitness of the best-scoring member.
    /// Strict comparison keeps the first-encountered index on ties.
    fn best_member(&self) -> (usize, f32) {
        let mut best_index = 0;
        let mut best_fitness = f32::MIN;
        for (index, member) in self.members.iter().enumerate() {
            if member.fitness() > best_fitness {
                best_index = index;
                best_fitness = member.fitness();
            }
        }
        (best_index, best_fitness)
    }

    fn dispatch(&mut self, event: TrainerEvent) {
        for listener in &mut self.listeners {
            listener(event);
        }
    }
}

fn distance(a: [f32; 3], b: [f32; 3]) -> f32 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}

#[cfg(test)]
mod test {
    use super::*;

    use std::cell::RefCell;
    use std::num::NonZeroUsize;
    use std::path::PathBuf;
    use std::process;
    use std::rc::Rc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fixed-position arena: members sit where the test puts them
    /// and record every actuation and reset.
    struct Arena {
        positions: Vec<[f32; 3]>,
        target: [f32; 3],
        actuations: Vec<usize>,
        resets: Vec<usize>,
    }

    impl Arena {
        fn new(positions: Vec<[f32; 3]>, target: [f32; 3]) -> Arena {
            Arena {
                positions,
                target,
                actuations: Vec::new(),
                resets: Vec::new(),
            }
        }
    }

    impl Environment for Arena {
        fn sense(&self, member: usize) -> Vec<f32> {
            let p = self.positions[member];
            vec![p[0], p[1], p[2], self.target[0], self.target[1], self.target[2]]
        }

        fn actuate(&mut self, member: usize, outputs: &[f32]) {
            assert_eq!(outputs.len(), 3);
            self.actuations.push(member);
        }

        fn position(&self, member: usize) -> [f32; 3] {
            self.positions[member]
        }

        fn target_position(&self) -> [f32; 3] {
            self.target
        }

        fn reset_member(&mut self, member: usize) {
            self.resets.push(member);
        }
    }

    fn scratch_file(tag: &str) -> PathBuf {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        std::env::temp_dir().join(format!(
            "evosteer-{}-{}-{}.weights",
            tag,
            process::id(),
            COUNTER.fetch_add(1, Ordering::Relaxed)
        ))
    }

    fn config(size: usize, tag: &str) -> TrainerConfig {
        TrainerConfig {
            size: NonZeroUsize::new(size).unwrap(),
            epoch_duration: Duration::from_secs(1),
            training: true,
            weights_path: scratch_file(tag),
        }
    }

    fn weight_bits<A: Activation>(network: &DenseNetwork<A>) -> Vec<u32> {
        network.weights().flatten().map(|w| w.to_bits()).collect()
    }

    fn cleanup(trainer: &Trainer) {
        let _ = std::fs::remove_file(&trainer.config().weights_path);
    }

    const TICK: Duration = Duration::from_millis(100);
    const EPOCH: Duration = Duration::from_secs(1);

    #[test]
    fn champion_is_seeded_from_member_zero() {
        let trainer = Trainer::new(&[6, 4, 3], config(4, "seed")).unwrap();
        let member_zero = trainer.members().next().unwrap();
        assert_eq!(weight_bits(trainer.champion()), weight_bits(member_zero));
    }

    #[test]
    fn acting_tick_drives_every_member() {
        let mut trainer = Trainer::new(&[6, 4, 3], config(5, "acting")).unwrap();
        let mut arena = Arena::new(vec![[0.0; 3]; 5], [10.0, 0.0, 0.0]);

        assert!(matches!(
            trainer.advance(&mut arena, TICK).unwrap(),
            Tick::Acted
        ));
        assert_eq!(arena.actuations, vec![0, 1, 2, 3, 4]);
        assert_eq!(trainer.epoch(), 0);
    }

    #[test]
    fn epoch_fires_once_clock_expires() {
        let mut trainer = Trainer::new(&[6, 4, 3], config(2, "clock")).unwrap();
        let mut arena = Arena::new(vec![[0.0; 3]; 2], [10.0, 0.0, 0.0]);

        for _ in 0..9 {
            assert!(matches!(
                trainer.advance(&mut arena, TICK).unwrap(),
                Tick::Acted
            ));
        }
        assert!(matches!(
            trainer.advance(&mut arena, TICK).unwrap(),
            Tick::EpochCompleted(_)
        ));
        assert_eq!(trainer.epoch(), 1);
        assert_eq!(arena.resets, vec![0, 1]);
        cleanup(&trainer);
    }

    #[test]
    fn fitness_is_negated_distance_to_target() {
        let mut trainer = Trainer::new(&[6, 4, 3], config(2, "fitness")).unwrap();
        let mut arena = Arena::new(vec![[3.0, 4.0, 0.0], [0.0; 3]], [0.0; 3]);

        match trainer.advance(&mut arena, EPOCH).unwrap() {
            Tick::EpochCompleted(report) => {
                assert_eq!(report.best_index, 1);
                assert_eq!(report.best_fitness, 0.0);
            }
            Tick::Acted => panic!("expected an epoch boundary"),
        }
        let fitnesses: Vec<f32> = trainer.members().map(|m| m.fitness()).collect();
        assert_eq!(fitnesses[0], -5.0);
        cleanup(&trainer);
    }

    #[test]
    fn selection_tie_breaks_to_lowest_index() {
        let mut trainer = Trainer::new(&[6, 4, 3], config(4, "tie")).unwrap();
        let mut arena = Arena::new(
            vec![[2.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]],
            [0.0; 3],
        );

        match trainer.advance(&mut arena, EPOCH).unwrap() {
            Tick::EpochCompleted(report) => assert_eq!(report.best_index, 1),
            Tick::Acted => panic!("expected an epoch boundary"),
        }
        cleanup(&trainer);
    }

    #[test]
    fn champion_adopts_best_member_weights() {
        let mut trainer = Trainer::new(&[6, 4, 3], config(3, "adopt")).unwrap();
        let best_before = weight_bits(trainer.members().nth(2).unwrap());
        let mut arena = Arena::new(
            vec![[9.0, 0.0, 0.0], [9.0, 0.0, 0.0], [1.0, 0.0, 0.0]],
            [0.0; 3],
        );

        match trainer.advance(&mut arena, EPOCH).unwrap() {
            Tick::EpochCompleted(report) => {
                assert_eq!(report.best_index, 2);
                assert!(report.champion_replaced);
            }
            Tick::Acted => panic!("expected an epoch boundary"),
        }
        assert_eq!(weight_bits(trainer.champion()), best_before);
        cleanup(&trainer);
    }

    #[test]
    fn champion_keeps_best_ever_weights() {
        let mut trainer = Trainer::new(&[6, 4, 3], config(2, "ratchet")).unwrap();

        // First epoch: member 1 scores -1.
        let mut near = Arena::new(vec![[5.0, 0.0, 0.0], [1.0, 0.0, 0.0]], [0.0; 3]);
        match trainer.advance(&mut near, EPOCH).unwrap() {
            Tick::EpochCompleted(report) => assert!(report.champion_replaced),
            Tick::Acted => panic!("expected an epoch boundary"),
        }
        let champion_before = weight_bits(trainer.champion());

        // Second epoch: everyone scores worse than -1; the champion
        // must keep the earlier weights.
        let mut far = Arena::new(vec![[50.0, 0.0, 0.0], [40.0, 0.0, 0.0]], [0.0; 3]);
        match trainer.advance(&mut far, EPOCH).unwrap() {
            Tick::EpochCompleted(report) => assert!(!report.champion_replaced),
            Tick::Acted => panic!("expected an epoch boundary"),
        }
        assert_eq!(weight_bits(trainer.champion()), champion_before);
        cleanup(&trainer);
    }

    #[test]
    fn repopulation_propagates_champion_without_mutation_when_not_training() {
        let mut config = config(4, "repopulate");
        config.training = false;
        let mut trainer = Trainer::new(&[6, 4, 3], config).unwrap();
        let mut arena = Arena::new(vec![[1.0, 0.0, 0.0]; 4], [0.0; 3]);

        match trainer.advance(&mut arena, EPOCH).unwrap() {
            Tick::EpochCompleted(_) => {}
            Tick::Acted => panic!("expected an epoch boundary"),
        }
        let champion = weight_bits(trainer.champion());
        for member in trainer.members() {
            assert_eq!(weight_bits(member), champion);
        }
        cleanup(&trainer);
    }

    #[test]
    fn repopulation_mutates_members_when_training() {
        let mut trainer = Trainer::new(&[8, 8, 4], config(3, "mutated")).unwrap();
        let mut arena = Arena::new(vec![[1.0, 0.0, 0.0]; 3], [0.0; 3]);

        match trainer.advance(&mut arena, EPOCH).unwrap() {
            Tick::EpochCompleted(_) => {}
            Tick::Acted => panic!("expected an epoch boundary"),
        }
        let champion = weight_bits(trainer.champion());
        assert!(trainer.members().any(|m| weight_bits(m) != champion));
        cleanup(&trainer);
    }

    #[test]
    fn champion_is_persisted_at_epoch_boundary() {
        let trainer_config = config(2, "persisted");
        let path = trainer_config.weights_path.clone();
        let mut trainer = Trainer::new(&[6, 4, 3], trainer_config).unwrap();
        let mut arena = Arena::new(vec![[1.0, 0.0, 0.0]; 2], [0.0; 3]);

        match trainer.advance(&mut arena, EPOCH).unwrap() {
            Tick::EpochCompleted(report) => assert!(report.persistence.is_none()),
            Tick::Acted => panic!("expected an epoch boundary"),
        }

        let mut restored = DenseNetwork::new(&[6, 4, 3]).unwrap();
        restored.load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(weight_bits(&restored), weight_bits(trainer.champion()));
    }

    #[test]
    fn failed_save_is_reported_not_fatal() {
        let mut trainer_config = config(2, "unused");
        trainer_config.weights_path = std::env::temp_dir()
            .join("evosteer-missing-dir")
            .join("champion.weights");
        let mut trainer = Trainer::new(&[6, 4, 3], trainer_config).unwrap();
        let mut arena = Arena::new(vec![[1.0, 0.0, 0.0]; 2], [0.0; 3]);

        match trainer.advance(&mut arena, EPOCH).unwrap() {
            Tick::EpochCompleted(report) => assert!(report.persistence.is_some()),
            Tick::Acted => panic!("expected an epoch boundary"),
        }

        // The loop keeps going afterwards.
        assert!(matches!(
            trainer.advance(&mut arena, TICK).unwrap(),
            Tick::Acted
        ));
    }

    #[test]
    fn load_champion_restores_persisted_weights() {
        let trainer_config = config(2, "reload");
        let path = trainer_config.weights_path.clone();
        let mut trainer = Trainer::new(&[6, 4, 3], trainer_config).unwrap();
        let mut arena = Arena::new(vec![[1.0, 0.0, 0.0]; 2], [0.0; 3]);

        trainer.advance(&mut arena, EPOCH).unwrap();
        let persisted = weight_bits(trainer.champion());

        // Later epochs may change the champion; the operator command
        // snaps it back to the file.
        trainer.load_champion().unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(weight_bits(trainer.champion()), persisted);
    }

    #[test]
    fn events_fire_at_defined_trigger_points() {
        let mut trainer = Trainer::new(&[6, 4, 3], config(2, "events")).unwrap();
        let seen: Rc<RefCell<Vec<TrainerEvent>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        trainer.subscribe(move |event| sink.borrow_mut().push(event));

        let mut arena = Arena::new(vec![[1.0, 0.0, 0.0]; 2], [0.0; 3]);
        for _ in 0..10 {
            trainer.advance(&mut arena, TICK).unwrap();
        }
        for _ in 0..10 {
            trainer.advance(&mut arena, TICK).unwrap();
        }
        let _ = std::fs::remove_file(&trainer.config().weights_path);

        assert_eq!(
            *seen.borrow(),
            vec![
                TrainerEvent::NetworksInitialized,
                TrainerEvent::NewEpoch,
                TrainerEvent::NewEpoch
            ]
        );
    }

    #[test]
    fn sensor_size_mismatch_surfaces_as_trainer_error() {
        struct Blind;
        impl Environment for Blind {
            fn sense(&self, _member: usize) -> Vec<f32> {
                vec![0.0; 2]
            }
            fn actuate(&mut self, _member: usize, _outputs: &[f32]) {}
            fn position(&self, _member: usize) -> [f32; 3] {
                [0.0; 3]
            }
            fn target_position(&self) -> [f32; 3] {
                [0.0; 3]
            }
            fn reset_member(&mut self, _member: usize) {}
        }

        let mut trainer = Trainer::new(&[6, 4, 3], config(2, "blind")).unwrap();
        let error = trainer.advance(&mut Blind, TICK).unwrap_err();
        assert!(matches!(error, TrainerError::Inference { member: 0, .. }));
    }

    #[test]
    fn malformed_topology_fails_setup() {
        assert!(matches!(
            Trainer::new(&[6], config(2, "bad-topology")),
            Err(SetupError::Topology(_))
        ));
    }
}
