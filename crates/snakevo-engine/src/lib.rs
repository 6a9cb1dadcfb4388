//! Deterministic snake simulation used as the fitness oracle for training.
//!
//! - [`core`] - Grid geometry ([`Position`], [`Direction`]) and the ray-cast [`Vision`]
//! - [`engine`] - Agent state ([`Snake`]), food placement ([`FoodQueue`]) and the
//!   step-driven [`GameEnvironment`]
//!
//! # Example
//!
//! ```
//! use snakevo_engine::{FoodQueue, FoodSequence, GameConfig, GameEnvironment, Position, Steering};
//!
//! let config = GameConfig::CANONICAL;
//! let queue = FoodQueue::new(FoodSequence::new(vec![Position::new(10, 12)]), 0);
//! let mut env = GameEnvironment::new(config, queue)?;
//!
//! env.step(Steering::Keep);
//! env.step(Steering::Keep);
//! assert_eq!(env.score(), 1);
//! # Ok::<(), snakevo_engine::ConfigError>(())
//! ```

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// Invalid [`GameConfig`] values.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("grid size must be at least 2, got {grid_size}")]
    GridTooSmall { grid_size: i32 },
    #[display("move budgets must be positive (initial {initial_moves}, max {max_moves})")]
    NonPositiveMoveBudget { initial_moves: i32, max_moves: i32 },
    #[display("initial move budget {initial_moves} exceeds the cap {max_moves}")]
    InitialMovesAboveCap { initial_moves: i32, max_moves: i32 },
    #[display("food move bonus must be non-negative, got {food_move_bonus}")]
    NegativeFoodBonus { food_move_bonus: i32 },
    #[display("position history window must not be empty")]
    EmptyHistoryWindow,
}
