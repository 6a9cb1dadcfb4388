//! Session evaluation: fitness functions for training controllers.
//!
//! A session is a set of episodes played by one controller. Each episode runs a
//! [`GameEnvironment`] until it terminates, the final state is condensed into
//! [`EpisodeStats`], and a fitness function ([`EvaluateEpisodeStats`]) turns the stats
//! into a scalar. The session fitness is the mean over its episodes.
//!
//! # Fitness Function
//!
//! [`FitnessParams`] implements the canonical formula:
//!
//! ```text
//! base    = score < 10 ? lifetime * 2^score : lifetime * 2^10 * (score - 9)
//! fitness = base
//!         - loop_penalty * loop_penalty_weight
//!         + visited_cells * exploration_weight
//!         + 1 / (food_distance + 1) * proximity_weight
//!         + score * food_weight
//!         - (collided ? collision_penalty : 0)
//! ```
//!
//! The exponential base rewards eating far more than surviving, while the
//! lifetime factor keeps early survival meaningful when no food has been eaten yet.
//! The result may be negative; the genetic algorithm clamps it before selection.
//!
//! # Fairness
//!
//! Every episode draws food from a [`FoodPlan`] shared by the whole generation, so
//! all controllers are compared on the same food ordering.

use std::fmt;

use serde::{Deserialize, Serialize};
use snakevo_engine::{
    ConfigError, Controller, FoodPlan, FoodQueue, GameConfig, GameEnvironment, GameState, Steering,
};

/// Final state of one episode, as needed by fitness functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeStats {
    pub score: u32,
    pub lifetime: u32,
    pub loop_penalty: u32,
    pub visited_cells: usize,
    /// Manhattan distance from the final head position to the current food.
    pub food_distance: Option<u32>,
    pub end_state: GameState,
}

impl EpisodeStats {
    #[must_use]
    pub fn from_environment(env: &GameEnvironment) -> Self {
        let snake = env.snake();
        Self {
            score: env.score(),
            lifetime: env.lifetime(),
            loop_penalty: snake.loop_penalty(),
            visited_cells: snake.visited_count(),
            food_distance: env.food().map(|food| snake.head().manhattan_distance(food)),
            end_state: env.state(),
        }
    }

    #[must_use]
    pub fn terminated_by_collision(&self) -> bool {
        self.end_state.is_collided()
    }
}

/// Computes a fitness score from episode statistics.
pub trait EvaluateEpisodeStats {
    /// Higher is better. May be negative.
    fn evaluate_episode_stats(&self, stats: &EpisodeStats) -> f64;
}

/// Weights of the canonical fitness formula.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessParams {
    pub loop_penalty_weight: f64,
    pub exploration_weight: f64,
    pub proximity_weight: f64,
    pub food_weight: f64,
    pub collision_penalty: f64,
}

impl FitnessParams {
    pub const CANONICAL: Self = Self {
        loop_penalty_weight: 50.0,
        exploration_weight: 50.0,
        proximity_weight: 500.0,
        food_weight: 5000.0,
        collision_penalty: 200.0,
    };
}

impl EvaluateEpisodeStats for FitnessParams {
    #[expect(clippy::cast_precision_loss)]
    fn evaluate_episode_stats(&self, stats: &EpisodeStats) -> f64 {
        let lifetime = f64::from(stats.lifetime);
        let base = if stats.score < 10 {
            lifetime * f64::from(1u32 << stats.score)
        } else {
            lifetime * 2f64.powi(10) * f64::from(stats.score - 9)
        };
        let proximity = stats
            .food_distance
            .map_or(0.0, |d| 1.0 / (f64::from(d) + 1.0));
        let collision = if stats.terminated_by_collision() {
            self.collision_penalty
        } else {
            0.0
        };

        base - f64::from(stats.loop_penalty) * self.loop_penalty_weight
            + stats.visited_cells as f64 * self.exploration_weight
            + proximity * self.proximity_weight
            + f64::from(stats.score) * self.food_weight
            - collision
    }
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum EvaluationError {
    #[display("invalid game configuration: {_0}")]
    Config(ConfigError),
    #[display("food plan has no episodes")]
    NoEpisodes,
    #[display("fitness is not finite: {fitness}")]
    NonFinite { fitness: f64 },
}

impl From<ConfigError> for EvaluationError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

/// Evaluates complete sessions for training.
pub trait SessionEvaluator: fmt::Debug + Send + Sync {
    /// Configuration every episode is played with.
    fn game_config(&self) -> &GameConfig;

    /// Plays one episode until it terminates.
    fn play_episode(
        &self,
        controller: &dyn Controller,
        food_queue: FoodQueue,
    ) -> Result<EpisodeStats, EvaluationError>;

    /// Plays every episode of `plan` and returns the mean fitness.
    fn evaluate(
        &self,
        controller: &dyn Controller,
        plan: &FoodPlan,
    ) -> Result<f64, EvaluationError>;
}

/// Plays episodes with a fixed [`GameConfig`] and scores them with `E`.
#[derive(Debug, Clone)]
pub struct DefaultSessionEvaluator<E> {
    game_config: GameConfig,
    evaluator: E,
}

impl<E> DefaultSessionEvaluator<E> {
    pub fn new(game_config: GameConfig, evaluator: E) -> Result<Self, ConfigError> {
        game_config.validate()?;
        Ok(Self {
            game_config,
            evaluator,
        })
    }

    #[must_use]
    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }
}

impl<E> SessionEvaluator for DefaultSessionEvaluator<E>
where
    E: EvaluateEpisodeStats + fmt::Debug + Send + Sync,
{
    fn game_config(&self) -> &GameConfig {
        &self.game_config
    }

    fn play_episode(
        &self,
        controller: &dyn Controller,
        food_queue: FoodQueue,
    ) -> Result<EpisodeStats, EvaluationError> {
        let mut env = GameEnvironment::new(self.game_config, food_queue)?;
        env.run_to_end(Steering::Controller(controller));
        Ok(EpisodeStats::from_environment(&env))
    }

    #[expect(clippy::cast_precision_loss)]
    fn evaluate(
        &self,
        controller: &dyn Controller,
        plan: &FoodPlan,
    ) -> Result<f64, EvaluationError> {
        if plan.episodes() == 0 {
            return Err(EvaluationError::NoEpisodes);
        }
        let mut total = 0.0;
        for episode in 0..plan.episodes() {
            let stats = self.play_episode(controller, plan.queue_for_episode(episode))?;
            total += self.evaluator.evaluate_episode_stats(&stats);
        }
        let fitness = total / plan.episodes() as f64;
        if !fitness.is_finite() {
            return Err(EvaluationError::NonFinite { fitness });
        }
        Ok(fitness)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;
    use snakevo_engine::{CollisionKind, Direction, FoodSequence, Position, Vision};

    use super::*;

    #[derive(Debug)]
    struct Always(Direction);

    impl Controller for Always {
        fn select_action(&self, _vision: &Vision) -> usize {
            self.0.action_index()
        }
    }

    fn stats(score: u32, lifetime: u32) -> EpisodeStats {
        EpisodeStats {
            score,
            lifetime,
            loop_penalty: 0,
            visited_cells: 0,
            food_distance: None,
            end_state: GameState::Starved,
        }
    }

    #[test]
    fn test_base_fitness_branches() {
        let params = FitnessParams {
            loop_penalty_weight: 0.0,
            exploration_weight: 0.0,
            proximity_weight: 0.0,
            food_weight: 0.0,
            collision_penalty: 0.0,
        };
        assert_eq!(params.evaluate_episode_stats(&stats(0, 10)), 10.0);
        assert_eq!(params.evaluate_episode_stats(&stats(3, 10)), 80.0);
        assert_eq!(params.evaluate_episode_stats(&stats(9, 1)), 512.0);
        assert_eq!(params.evaluate_episode_stats(&stats(10, 1)), 1024.0);
        assert_eq!(params.evaluate_episode_stats(&stats(12, 2)), 2.0 * 1024.0 * 3.0);
    }

    #[test]
    fn test_canonical_terms() {
        let s = EpisodeStats {
            score: 1,
            lifetime: 10,
            loop_penalty: 4,
            visited_cells: 8,
            food_distance: Some(4),
            end_state: GameState::Collided(CollisionKind::Wall),
        };
        let fitness = FitnessParams::CANONICAL.evaluate_episode_stats(&s);
        let expected = 20.0 - 4.0 * 50.0 + 8.0 * 50.0 + 500.0 / 5.0 + 5000.0 - 200.0;
        assert!((fitness - expected).abs() < 1e-9);

        let starved = EpisodeStats {
            end_state: GameState::Starved,
            ..s
        };
        let diff = FitnessParams::CANONICAL.evaluate_episode_stats(&starved) - fitness;
        assert!((diff - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_play_episode_straight_into_wall() {
        let evaluator =
            DefaultSessionEvaluator::new(GameConfig::CANONICAL, FitnessParams::CANONICAL).unwrap();
        let cells = vec![Position::new(10, 12), Position::new(0, 0)];
        let queue = FoodQueue::new(FoodSequence::new(cells), 0);
        let stats = evaluator
            .play_episode(&Always(Direction::Right), queue)
            .unwrap();
        assert_eq!(stats.score, 1);
        assert_eq!(stats.lifetime, 10);
        assert_eq!(stats.visited_cells, 10);
        assert_eq!(stats.end_state, GameState::Collided(CollisionKind::Wall));
        assert!(stats.terminated_by_collision());
    }

    #[test]
    fn test_evaluate_is_deterministic_and_averaged() {
        let evaluator =
            DefaultSessionEvaluator::new(GameConfig::CANONICAL, FitnessParams::CANONICAL).unwrap();
        let mut rng = Pcg32::seed_from_u64(11);
        let plan = FoodPlan::generate(&mut rng, 20, 50, 3, Position::new(10, 10));
        let controller = Always(Direction::Down);

        let a = evaluator.evaluate(&controller, &plan).unwrap();
        let b = evaluator.evaluate(&controller, &plan).unwrap();
        assert_eq!(a, b);

        // the same straight path in every episode: the mean equals one episode
        let single = evaluator.play_episode(&controller, plan.queue_for_episode(0)).unwrap();
        let single = FitnessParams::CANONICAL.evaluate_episode_stats(&single);
        assert!((a - single).abs() < 1e-9);
    }

    #[test]
    fn test_empty_plan_is_an_error() {
        let evaluator =
            DefaultSessionEvaluator::new(GameConfig::CANONICAL, FitnessParams::CANONICAL).unwrap();
        let plan = FoodPlan::new(FoodSequence::empty(), vec![]);
        assert_eq!(
            evaluator.evaluate(&Always(Direction::Up), &plan),
            Err(EvaluationError::NoEpisodes)
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = GameConfig {
            grid_size: 0,
            ..GameConfig::CANONICAL
        };
        assert!(DefaultSessionEvaluator::new(config, FitnessParams::CANONICAL).is_err());
    }
}
