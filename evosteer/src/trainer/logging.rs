//! Epoch-by-epoch training history.
//!
//! An [`EpochLogger`] stores one snapshot of the trainer per call,
//! with fitness statistics over the population and a
//! reporting-level-dependent sample of the networks themselves.

use super::Trainer;

use evosteer_nn::activation::{Activation, LeakyRelu};
use evosteer_nn::networks::DenseNetwork;

use std::cmp::Ordering;
use std::fmt;

/// Defines different possible reporting levels for logging.
#[derive(Clone, Copy, Debug)]
pub enum ReportingLevel {
    /// Clones every member network.
    AllMembers,
    /// Clones only the champion network.
    ChampionOnly,
    /// Clones no networks.
    NoNetworks,
}

/// A struct for reporting basic statistical data.
#[derive(Clone, Debug, PartialEq)]
pub struct Stats {
    pub maximum: f32,
    pub minimum: f32,
    pub mean: f32,
    pub median: f32,
}

impl Stats {
    /// Returns statistics about the numbers in a non-empty sequence.
    ///
    /// # Panics
    /// Panics if the sequence is empty.
    ///
    /// # Examples
    /// ```
    /// use evosteer::logging::Stats;
    ///
    /// let stats = Stats::from([-2.0, -1.0, 0.5, 1.0, 1.5].iter().copied());
    /// assert_eq!(stats.maximum, 1.5);
    /// assert_eq!(stats.minimum, -2.0);
    /// assert_eq!(stats.mean, 0.0);
    /// assert_eq!(stats.median, 0.5);
    /// ```
    pub fn from(data: impl Iterator<Item = f32>) -> Stats {
        let mut data: Vec<f32> = data.collect();
        assert!(!data.is_empty(), "statistics over an empty sequence");
        data.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        let mid = data.len() / 2;
        let median = if data.len() % 2 == 0 {
            (data[mid - 1] + data[mid]) / 2.0
        } else {
            data[mid]
        };
        Stats {
            maximum: data[data.len() - 1],
            minimum: data[0],
            mean: data.iter().sum::<f32>() / data.len() as f32,
            median,
        }
    }
}

/// A reporting-level-dependent sample of a population's networks.
#[derive(Clone, Debug)]
pub enum MemberRecord<A: Activation = LeakyRelu> {
    /// Every member network.
    AllMembers(Vec<DenseNetwork<A>>),
    /// Only the champion network.
    Champion(DenseNetwork<A>),
    /// Empty.
    None,
}

/// A snapshot of a trainer's population.
#[derive(Clone, Debug)]
pub struct EpochLog<A: Activation = LeakyRelu> {
    pub epoch: usize,
    pub member_count: usize,
    pub fitness: Stats,
    pub sample: MemberRecord<A>,
}

impl<A: Activation> fmt::Display for EpochLog<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EpochLog {{\n\
            \tepoch: {:?}\n\
            \tmember_count: {:?}\n\
            \tfitness: {:?}\n\
            }}",
            &self.epoch, &self.member_count, &self.fitness,
        )
    }
}

/// A log of the evolution of a trainer's population over time.
#[derive(Clone, Debug)]
pub struct EpochLogger<A: Activation = LeakyRelu> {
    reporting_level: ReportingLevel,
    logs: Vec<EpochLog<A>>,
}

impl<A: Activation + Clone> EpochLogger<A> {
    /// Returns a logger with the appropriate reporting level.
    ///
    /// # Examples
    /// ```
    /// use evosteer::logging::{EpochLogger, ReportingLevel};
    ///
    /// let logger: EpochLogger = EpochLogger::new(ReportingLevel::NoNetworks);
    /// ```
    pub fn new(reporting_level: ReportingLevel) -> EpochLogger<A> {
        EpochLogger {
            reporting_level,
            logs: Vec::new(),
        }
    }

    /// Stores a snapshot of the trainer's population.
    ///
    /// Most useful right after an epoch boundary, when every
    /// member carries a freshly evaluated fitness.
    pub fn log(&mut self, trainer: &Trainer<A>) {
        self.logs.push(EpochLog {
            epoch: trainer.epoch(),
            member_count: trainer.members().count(),
            fitness: Stats::from(trainer.members().map(|m| m.fitness())),
            sample: match self.reporting_level {
                ReportingLevel::AllMembers => {
                    MemberRecord::AllMembers(trainer.members().cloned().collect())
                }
                ReportingLevel::ChampionOnly => {
                    MemberRecord::Champion(trainer.champion().clone())
                }
                ReportingLevel::NoNetworks => MemberRecord::None,
            },
        })
    }

    /// Iterates over all logged snapshots.
    pub fn iter(&self) -> impl Iterator<Item = &EpochLog<A>> {
        self.logs.iter()
    }
}
