//! Training system for evolving snake controllers with a genetic algorithm.
//!
//! Each individual is a [`NeuralNetwork`](snakevo_evaluator::network::NeuralNetwork)
//! mapping the snake's vision to one of four directions. The genetic algorithm plays
//! every network through the game, scores it with a session evaluator, and breeds the
//! next generation from the fittest.
//!
//! # Architecture
//!
//! ```text
//! Genetic Algorithm (genetic)
//!     ↓ evolves
//! Neural Networks (snakevo-evaluator::network)
//!     ↓ steer
//! Game Environment (snakevo-engine)
//!     ↓ scored by
//! Session Evaluator (fitness function)
//!     ↓ produces
//! Fitness Record (fitness)
//!     ↓ guides
//! Selection, Crossover & Mutation (operators)
//! ```
//!
//! # Modules
//!
//! - [`params`] - Algorithm parameters and the complete training configuration
//! - [`genetic`] - Population management and the generation cycle
//! - [`operators`] - Tournament selection, column crossover, Gaussian mutation
//! - [`fitness`] - Fitness clamping, normalization, and per-generation summaries

pub mod fitness;
pub mod genetic;
pub mod operators;
pub mod params;
