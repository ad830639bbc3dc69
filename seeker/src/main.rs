use evosteer::logging::Stats;
use evosteer::{Environment, Tick, Trainer, TrainerConfig};
use evosteer_nn::networks::DenseNetwork;
use evosteer_nn::persistence;

use std::error::Error;
use std::num::NonZeroUsize;
use std::path::Path;
use std::process;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rayon::prelude::*;

/// Where the agents are steered to.
const TARGET: [f32; 3] = [10.0, 1.0, -4.0];
/// Where every agent starts each epoch.
const START: [f32; 3] = [0.0, 0.0, 0.0];

const TICK: Duration = Duration::from_millis(100);
const EPOCH_DURATION: Duration = Duration::from_secs(5);
const POPULATION: usize = 24;
const TOPOLOGY: [usize; 3] = [6, 4, 3];

/// A run succeeds once the epoch's best agent ends within this
/// distance of the target.
const SUCCESS_RADIUS: f32 = 2.0;
const EPOCH_BUDGET: usize = 60;
const ITERATIONS: usize = 32;

/// Frictionless point agents: network outputs are clamped and
/// applied as per-axis acceleration.
struct PointField {
    positions: Vec<[f32; 3]>,
    velocities: Vec<[f32; 3]>,
}

impl PointField {
    fn new(size: usize) -> PointField {
        PointField {
            positions: vec![START; size],
            velocities: vec![[0.0; 3]; size],
        }
    }
}

impl Environment for PointField {
    fn sense(&self, member: usize) -> Vec<f32> {
        let p = self.positions[member];
        vec![p[0], p[1], p[2], TARGET[0], TARGET[1], TARGET[2]]
    }

    fn actuate(&mut self, member: usize, outputs: &[f32]) {
        let dt = TICK.as_secs_f32();
        for axis in 0..3 {
            self.velocities[member][axis] += outputs[axis].clamp(-1.0, 1.0) * dt;
            self.positions[member][axis] += self.velocities[member][axis] * dt;
        }
    }

    fn position(&self, member: usize) -> [f32; 3] {
        self.positions[member]
    }

    fn target_position(&self) -> [f32; 3] {
        TARGET
    }

    fn reset_member(&mut self, member: usize) {
        self.positions[member] = START;
        self.velocities[member] = [0.0; 3];
    }
}

fn main() {
    let results = Arc::new(Mutex::new(vec![]));

    (0..ITERATIONS).into_par_iter().for_each(|run| {
        record(&results, || train_once(run));
    });

    let results = results.lock().unwrap();
    let solved: Vec<f32> = results
        .iter()
        .filter_map(|(epochs, _)| epochs.map(|e| e as f32))
        .collect();

    if solved.is_empty() {
        println!(
            "No run reached the target within {} epochs over {} iterations",
            EPOCH_BUDGET, ITERATIONS
        );
        return;
    }

    println!(
        "Successful run epoch count {:?}, {}% failure rate over {} iterations",
        Stats::from(solved.iter().copied()),
        (results.len() - solved.len()) as f32 * 100.0 / ITERATIONS as f32,
        ITERATIONS
    );

    if let Some((_, champion)) = results.iter().find(|(epochs, _)| epochs.is_some()) {
        println!("First solving champion: {}", champion);
    }
}

/// Produces an outcome and only then appends it under the lock, so
/// concurrent runs never execute while holding `results`.
fn record<T>(results: &Mutex<Vec<T>>, outcome: impl FnOnce() -> T) {
    let outcome = outcome();
    results.lock().unwrap().push(outcome);
}

/// Runs one independent training run to success or epoch budget.
/// Returns the solving epoch, if any, and the champion's `ron` dump.
fn train_once(run: usize) -> (Option<usize>, String) {
    let config = TrainerConfig {
        size: NonZeroUsize::new(POPULATION).unwrap(),
        epoch_duration: EPOCH_DURATION,
        training: true,
        weights_path: std::env::temp_dir()
            .join(format!("seeker-{}-{}.weights", process::id(), run)),
    };
    let mut trainer = match Trainer::new(&TOPOLOGY, config) {
        Ok(trainer) => trainer,
        Err(e) => {
            eprintln!("{}", e);
            return (None, String::new());
        }
    };
    let mut field = PointField::new(POPULATION);

    let mut solved = None;
    loop {
        match trainer.advance(&mut field, TICK) {
            Ok(Tick::Acted) => {}
            Ok(Tick::EpochCompleted(report)) => {
                if let Some(e) = report.persistence {
                    eprintln!("run {}: champion not persisted: {}", run, e);
                }
                if report.best_fitness >= -SUCCESS_RADIUS {
                    solved = Some(report.epoch);
                    break;
                }
                if report.epoch >= EPOCH_BUDGET {
                    break;
                }
            }
            Err(e) => {
                eprintln!("run {}: {}", run, e);
                break;
            }
        }
    }

    if solved.is_some() {
        match replay(&trainer.config().weights_path) {
            Ok(distance) if distance > SUCCESS_RADIUS => eprintln!(
                "run {}: replayed champion missed the target by {}",
                run, distance
            ),
            Ok(_) => {}
            Err(e) => eprintln!("run {}: champion replay failed: {}", run, e),
        }
    }

    let _ = std::fs::remove_file(&trainer.config().weights_path);
    let champion = ron::to_string(trainer.champion()).unwrap_or_default();
    (solved, champion)
}

/// Steers a fresh agent with the persisted champion for one epoch's
/// worth of ticks, without a trainer. Returns the agent's final
/// distance to the target.
fn replay(weights_path: &Path) -> Result<f32, Box<dyn Error>> {
    let mut pilot: DenseNetwork = DenseNetwork::new(&TOPOLOGY)?;
    persistence::load(&mut pilot, weights_path)?;

    let mut field = PointField::new(1);
    // The boundary tick itself does not act.
    let acting_ticks = (EPOCH_DURATION.as_millis() / TICK.as_millis()) as usize - 1;
    for _ in 0..acting_ticks {
        let outputs = pilot.feed_forward(&field.sense(0))?.to_vec();
        field.actuate(0, &outputs);
    }

    let p = field.position(0);
    let distance = (0..3)
        .map(|axis| (p[axis] - TARGET[axis]).powi(2))
        .sum::<f32>()
        .sqrt();
    Ok(distance)
}
