//! Genetic algorithm evolving neural-network controllers.
//!
//! [`GeneticAlgorithm`] owns a fixed-size population of [`NeuralNetwork`]s and a
//! seeded random generator, and advances the population one generation at a time.
//!
//! # Generation Cycle
//!
//! 1. **Evaluate** ([`GeneticAlgorithm::evaluate_generation`]) - A fresh [`FoodPlan`] is
//!    drawn for the generation and every controller plays it. Controllers are evaluated
//!    in batches of `batch_size`, one thread per controller; a batch completes before
//!    the next starts.
//! 2. **Record** - Raw fitness is clamped to [`FITNESS_FLOOR`] and normalized into a
//!    selection distribution ([`FitnessRecord`]).
//! 3. **Elitism** - The top `ceil(elitism_fraction * population_size)` controllers are
//!    copied unchanged into the next generation.
//! 4. **Reproduction** ([`GeneticAlgorithm::advance_generation`]) - Pairs of parents are
//!    chosen by tournament, combined by column crossover, and mutated until the
//!    population is full again.
//!
//! # Reproducibility
//!
//! All randomness (initial weights, food plans, selection, crossover, mutation) comes
//! from one [`Pcg32`] seeded with [`GeneticAlgorithmParams::seed`]. Evaluation results are
//! collected in population order regardless of thread scheduling, so a seeded run is
//! reproducible end to end.
//!
//! # Failure Handling
//!
//! A controller whose evaluation returns an error, produces a non-finite fitness, or
//! panics is scored at [`FITNESS_FLOOR`] and reported in [`FitnessRecord::failures`];
//! the rest of the generation is unaffected.
//!
//! # Example
//!
//! ```
//! use snakevo_engine::GameConfig;
//! use snakevo_evaluator::session_evaluator::{DefaultSessionEvaluator, FitnessParams};
//! use snakevo_training::{genetic::GeneticAlgorithm, params::GeneticAlgorithmParams};
//!
//! let params = GeneticAlgorithmParams {
//!     population_size: 8,
//!     hidden_layer_sizes: vec![4],
//!     batch_size: 4,
//!     tournament_size: 2,
//!     seed: Some(1),
//!     ..GeneticAlgorithmParams::canonical()
//! };
//! let evaluator =
//!     DefaultSessionEvaluator::new(GameConfig::CANONICAL, FitnessParams::CANONICAL).unwrap();
//! let mut ga = GeneticAlgorithm::new(params, evaluator).unwrap();
//!
//! let report = ga.run_generation().unwrap();
//! assert_eq!(report.generation, 0);
//! assert_eq!(ga.generation(), 1);
//! assert_eq!(ga.current_population().len(), 8);
//! ```

use std::{any::Any, thread};

use rand::{Rng as _, SeedableRng as _};
use rand_distr::Normal;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use snakevo_engine::{Direction, FoodPlan, VISION_LEN};
use snakevo_evaluator::{network::NeuralNetwork, session_evaluator::SessionEvaluator};
use tracing::{debug, info};

use crate::{
    fitness::{FITNESS_FLOOR, FitnessRecord, FitnessSummary},
    operators,
    params::{GeneticAlgorithmParams, ParamsError},
};

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum GeneticError {
    #[display("the current generation has not been evaluated")]
    NotEvaluated,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum PopulationError {
    #[display("population has {actual} networks, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },
    #[display("network {index} has layer sizes {actual:?}, expected {expected:?}")]
    LayerSizesMismatch {
        index: usize,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
}

/// Summary of one evaluated generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub generation: usize,
    pub best_index: usize,
    pub best_fitness: f64,
    pub summary: FitnessSummary,
    pub failures: usize,
    pub non_positive_sum: bool,
}

impl GenerationReport {
    #[must_use]
    pub fn from_record(generation: usize, record: &FitnessRecord) -> Self {
        let best_index = record.best_index();
        Self {
            generation,
            best_index,
            best_fitness: record.raw()[best_index],
            summary: record.summary(),
            failures: record.failures().len(),
            non_positive_sum: record.has_non_positive_sum(),
        }
    }
}

/// A population together with its generation counter, for saving and resuming runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationSnapshot {
    pub generation: usize,
    pub networks: Vec<NeuralNetwork>,
}

#[derive(Debug)]
pub struct GeneticAlgorithm<E> {
    params: GeneticAlgorithmParams,
    evaluator: E,
    seed: u64,
    rng: Pcg32,
    mutation_noise: Normal<f32>,
    layer_sizes: Vec<usize>,
    generation: usize,
    population: Vec<NeuralNetwork>,
    fitness: Option<FitnessRecord>,
}

impl<E> GeneticAlgorithm<E>
where
    E: SessionEvaluator,
{
    /// Creates a randomly initialized population.
    ///
    /// Without [`GeneticAlgorithmParams::seed`] a seed is drawn from the thread RNG;
    /// [`GeneticAlgorithm::seed`] returns the seed actually used.
    pub fn new(params: GeneticAlgorithmParams, evaluator: E) -> Result<Self, ParamsError> {
        params.validate()?;
        evaluator.game_config().validate()?;
        let mutation_noise = Normal::new(0.0, params.mutation_sigma).map_err(|_| {
            ParamsError::InvalidMutationSigma {
                sigma: params.mutation_sigma,
            }
        })?;

        let seed = params.seed.unwrap_or_else(|| rand::rng().random());
        let mut rng = Pcg32::seed_from_u64(seed);
        let population = (0..params.population_size)
            .map(|_| {
                NeuralNetwork::random(
                    VISION_LEN,
                    &params.hidden_layer_sizes,
                    Direction::LEN,
                    &mut rng,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            seed,
            population_size = params.population_size,
            layer_sizes = ?params.layer_sizes(),
            "initialized population"
        );

        Ok(Self {
            layer_sizes: params.layer_sizes(),
            params,
            evaluator,
            seed,
            rng,
            mutation_noise,
            generation: 0,
            population,
            fitness: None,
        })
    }

    #[must_use]
    pub fn params(&self) -> &GeneticAlgorithmParams {
        &self.params
    }

    #[must_use]
    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of completed generations.
    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    #[must_use]
    pub fn current_population(&self) -> &[NeuralNetwork] {
        &self.population
    }

    /// Fitness of the current population, if it has been evaluated.
    #[must_use]
    pub fn fitness_record(&self) -> Option<&FitnessRecord> {
        self.fitness.as_ref()
    }

    /// Fittest network of the current population, if it has been evaluated.
    #[must_use]
    pub fn best_individual(&self) -> Option<(&NeuralNetwork, f64)> {
        let record = self.fitness.as_ref()?;
        let index = record.best_index();
        Some((&self.population[index], record.raw()[index]))
    }

    /// Evaluates every controller of the current population on a fresh food plan.
    pub fn evaluate_generation(&mut self) -> &FitnessRecord {
        let game_config = self.evaluator.game_config();
        let plan = FoodPlan::generate(
            &mut self.rng,
            game_config.grid_size,
            self.params.food_sequence_len,
            self.params.episodes_per_individual,
            game_config.spawn_position(),
        );

        let mut outcomes = Vec::with_capacity(self.population.len());
        for (batch, networks) in self.population.chunks(self.params.batch_size).enumerate() {
            let evaluator = &self.evaluator;
            let plan = &plan;
            let results = thread::scope(|s| {
                let handles = networks
                    .iter()
                    .map(|network| s.spawn(move || evaluator.evaluate(network, plan)))
                    .collect::<Vec<_>>();
                handles
                    .into_iter()
                    .map(|handle| match handle.join() {
                        Ok(Ok(fitness)) => Ok(fitness),
                        Ok(Err(err)) => Err(err.to_string()),
                        Err(payload) => Err(panic_reason(&*payload)),
                    })
                    .collect::<Vec<_>>()
            });
            debug!(
                generation = self.generation,
                batch,
                size = results.len(),
                "evaluated batch"
            );
            outcomes.extend(results);
        }

        let record = FitnessRecord::from_outcomes(outcomes);
        self.fitness.insert(record)
    }

    /// Selects one index by tournament over the current raw fitness.
    pub fn tournament_select(&mut self, tournament_size: usize) -> Result<usize, GeneticError> {
        let record = self.fitness.as_ref().ok_or(GeneticError::NotEvaluated)?;
        Ok(operators::tournament_select(
            record.raw(),
            tournament_size,
            &mut self.rng,
        ))
    }

    /// Replaces the evaluated population with the next generation.
    pub fn advance_generation(&mut self) -> Result<(), GeneticError> {
        let record = self.fitness.take().ok_or(GeneticError::NotEvaluated)?;
        let size = self.params.population_size;
        let elite_count = self.params.elite_count();

        let mut next = Vec::with_capacity(size);
        next.extend(
            record
                .ranking()
                .into_iter()
                .take(elite_count)
                .map(|index| self.population[index].clone()),
        );

        while next.len() < size {
            let a = operators::tournament_select(
                record.raw(),
                self.params.tournament_size,
                &mut self.rng,
            );
            let b = operators::tournament_select(
                record.raw(),
                self.params.tournament_size,
                &mut self.rng,
            );
            let (mut child_a, mut child_b) =
                operators::crossover(&self.population[a], &self.population[b], &mut self.rng);
            for child in [&mut child_a, &mut child_b] {
                operators::mutate(
                    child,
                    self.params.mutation_rate,
                    &self.mutation_noise,
                    &mut self.rng,
                );
            }
            next.push(child_a);
            if next.len() < size {
                next.push(child_b);
            }
        }

        self.population = next;
        self.generation += 1;
        Ok(())
    }

    /// Evaluates the current generation, then advances to the next one.
    pub fn run_generation(&mut self) -> Result<GenerationReport, GeneticError> {
        let generation = self.generation;
        let report = GenerationReport::from_record(generation, self.evaluate_generation());
        info!(
            generation,
            best = report.best_fitness,
            mean = report.summary.mean,
            min = report.summary.min,
            failures = report.failures,
            "generation evaluated"
        );
        self.advance_generation()?;
        Ok(report)
    }

    #[must_use]
    pub fn snapshot(&self) -> PopulationSnapshot {
        PopulationSnapshot {
            generation: self.generation,
            networks: self.population.clone(),
        }
    }

    /// Replaces the population with a saved one. Any fitness record is discarded.
    pub fn restore(&mut self, snapshot: PopulationSnapshot) -> Result<(), PopulationError> {
        if snapshot.networks.len() != self.params.population_size {
            return Err(PopulationError::SizeMismatch {
                expected: self.params.population_size,
                actual: snapshot.networks.len(),
            });
        }
        if let Some((index, network)) = snapshot
            .networks
            .iter()
            .enumerate()
            .find(|(_, network)| network.layer_sizes() != self.layer_sizes)
        {
            return Err(PopulationError::LayerSizesMismatch {
                index,
                expected: self.layer_sizes.clone(),
                actual: network.layer_sizes().to_vec(),
            });
        }
        self.generation = snapshot.generation;
        self.population = snapshot.networks;
        self.fitness = None;
        Ok(())
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    let message = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str));
    match message {
        Some(message) => format!("evaluation panicked: {message}"),
        None => "evaluation panicked".to_owned(),
    }
}
