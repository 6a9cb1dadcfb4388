//! Training configuration.
//!
//! Every knob of the genetic algorithm is an explicit field of
//! [`GeneticAlgorithmParams`]; the canonical values live in one place,
//! [`TrainingConfig::canonical`], which is also what `snakevo print-config` emits.

use serde::{Deserialize, Serialize};
use snakevo_engine::{ConfigError, Direction, GameConfig, VISION_LEN};
use snakevo_evaluator::{network::NetworkError, session_evaluator::FitnessParams};

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ParamsError {
    #[display("population size must be positive")]
    EmptyPopulation,
    #[display("hidden layer {layer} has size 0")]
    InvalidHiddenLayerSize { layer: usize },
    #[display("batch size must be positive")]
    ZeroBatchSize,
    #[display("tournament size must be positive")]
    ZeroTournamentSize,
    #[display("tournament size {tournament_size} exceeds population size {population_size}")]
    TournamentTooLarge {
        tournament_size: usize,
        population_size: usize,
    },
    #[display("elitism fraction must be within [0, 1], got {fraction}")]
    InvalidElitismFraction { fraction: f64 },
    #[display("mutation rate must be within [0, 1], got {rate}")]
    InvalidMutationRate { rate: f64 },
    #[display("mutation sigma must be finite and non-negative, got {sigma}")]
    InvalidMutationSigma { sigma: f32 },
    #[display("episodes per individual must be positive")]
    ZeroEpisodes,
    #[display("invalid game configuration: {_0}")]
    Game(ConfigError),
    #[display("invalid network shape: {_0}")]
    Network(NetworkError),
}

impl From<ConfigError> for ParamsError {
    fn from(err: ConfigError) -> Self {
        Self::Game(err)
    }
}

impl From<NetworkError> for ParamsError {
    fn from(err: NetworkError) -> Self {
        Self::Network(err)
    }
}

/// Parameters of the genetic algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneticAlgorithmParams {
    /// Number of controllers per generation
    pub population_size: usize,
    /// Hidden layer sizes; input is the vision length and output the direction count
    pub hidden_layer_sizes: Vec<usize>,
    /// Probability of perturbing each weight matrix (all-or-nothing per layer)
    pub mutation_rate: f64,
    /// Standard deviation of the Gaussian mutation noise
    pub mutation_sigma: f32,
    /// Number of controllers evaluated concurrently
    pub batch_size: usize,
    /// Fraction of the population carried over unchanged (rounded up)
    pub elitism_fraction: f64,
    /// Entrants per tournament (1 = uniform selection)
    pub tournament_size: usize,
    /// Generations to run
    pub max_generations: usize,
    /// Episodes played per controller per generation
    pub episodes_per_individual: usize,
    /// Length of the shared pre-generated food sequence
    pub food_sequence_len: usize,
    /// Seed of the algorithm's random generator; `None` draws one from the OS
    pub seed: Option<u64>,
}

impl GeneticAlgorithmParams {
    #[must_use]
    pub fn canonical() -> Self {
        Self {
            population_size: 500,
            hidden_layer_sizes: vec![16, 16],
            mutation_rate: 0.15,
            mutation_sigma: 0.1,
            batch_size: 50,
            elitism_fraction: 0.05,
            tournament_size: 3,
            max_generations: 500,
            episodes_per_individual: 1,
            food_sequence_len: 400,
            seed: None,
        }
    }

    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.population_size == 0 {
            return Err(ParamsError::EmptyPopulation);
        }
        if let Some(layer) = self.hidden_layer_sizes.iter().position(|s| *s == 0) {
            return Err(ParamsError::InvalidHiddenLayerSize { layer });
        }
        if self.batch_size == 0 {
            return Err(ParamsError::ZeroBatchSize);
        }
        if self.tournament_size == 0 {
            return Err(ParamsError::ZeroTournamentSize);
        }
        if self.tournament_size > self.population_size {
            return Err(ParamsError::TournamentTooLarge {
                tournament_size: self.tournament_size,
                population_size: self.population_size,
            });
        }
        if !(0.0..=1.0).contains(&self.elitism_fraction) {
            return Err(ParamsError::InvalidElitismFraction {
                fraction: self.elitism_fraction,
            });
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(ParamsError::InvalidMutationRate {
                rate: self.mutation_rate,
            });
        }
        if !(self.mutation_sigma.is_finite() && self.mutation_sigma >= 0.0) {
            return Err(ParamsError::InvalidMutationSigma {
                sigma: self.mutation_sigma,
            });
        }
        if self.episodes_per_individual == 0 {
            return Err(ParamsError::ZeroEpisodes);
        }
        Ok(())
    }

    /// Number of elites: `ceil(elitism_fraction * population_size)`.
    ///
    /// Products that land just above an integer through rounding error (`0.07 * 100`
    /// is `7.000000000000001`) count as that integer.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    pub fn elite_count(&self) -> usize {
        const TOLERANCE: f64 = 1e-9;
        let product = self.elitism_fraction * self.population_size as f64;
        let count = (product - TOLERANCE).ceil().max(0.0) as usize;
        count.min(self.population_size)
    }

    /// Layer sizes of every controller: vision input, hidden layers, one output per direction.
    #[must_use]
    pub fn layer_sizes(&self) -> Vec<usize> {
        std::iter::once(VISION_LEN)
            .chain(self.hidden_layer_sizes.iter().copied())
            .chain([Direction::LEN])
            .collect()
    }
}

/// Complete training configuration, as stored in a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub genetic: GeneticAlgorithmParams,
    pub game: GameConfig,
    pub fitness: FitnessParams,
}

impl TrainingConfig {
    #[must_use]
    pub fn canonical() -> Self {
        Self {
            genetic: GeneticAlgorithmParams::canonical(),
            game: GameConfig::CANONICAL,
            fitness: FitnessParams::CANONICAL,
        }
    }

    pub fn validate(&self) -> Result<(), ParamsError> {
        self.genetic.validate()?;
        self.game.validate()?;
        Ok(())
    }
}
