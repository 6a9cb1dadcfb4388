//! Controllers and fitness evaluation for the snake simulation.
//!
//! This crate sits between the game engine and the genetic algorithm:
//!
//! 1. **Controller** ([`network`]) - A feed-forward [`NeuralNetwork`](network::NeuralNetwork)
//!    maps the 24-value vision vector to one of four directions.
//! 2. **Session Evaluation** ([`session_evaluator`]) - Plays complete episodes with a
//!    controller and reduces them to a scalar fitness used for selection.
//!
//! # Architecture
//!
//! ```text
//! Session Evaluator (fitness for training)
//!     ↓ plays episodes of
//! GameEnvironment (snakevo-engine)
//!     ↓ asks for actions from
//! Controller (neural network)
//! ```
//!
//! # Example
//!
//! ```
//! use rand::SeedableRng as _;
//! use snakevo_engine::{FoodPlan, GameConfig, VISION_LEN};
//! use snakevo_evaluator::{
//!     network::NeuralNetwork,
//!     session_evaluator::{DefaultSessionEvaluator, FitnessParams, SessionEvaluator},
//! };
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! let net = NeuralNetwork::random(VISION_LEN, &[16, 16], 4, &mut rng).unwrap();
//!
//! let config = GameConfig::CANONICAL;
//! let evaluator = DefaultSessionEvaluator::new(config, FitnessParams::CANONICAL).unwrap();
//! let plan = FoodPlan::generate(&mut rng, config.grid_size, 100, 1, config.spawn_position());
//! let fitness = evaluator.evaluate(&net, &plan).unwrap();
//! assert!(fitness.is_finite());
//! ```

pub mod network;
pub mod session_evaluator;
