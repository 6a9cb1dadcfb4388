//! Game engine logic and state management.
//!
//! - [`GameConfig`] - Grid size, move budgets and loop-detection constants
//! - [`Snake`] - Agent state (body, budget, loop history, visited cells)
//! - [`FoodSequence`] / [`FoodPlan`] / [`FoodQueue`] - Shared food ordering and
//!   per-episode cursors
//! - [`GameEnvironment`] - The step function and termination detection
//!
//! # Game Flow
//!
//! 1. Create a [`GameEnvironment`] from a config and a [`FoodQueue`]
//! 2. Call [`GameEnvironment::step`] with a [`Steering`] source
//! 3. Repeat until [`GameEnvironment::is_terminal`]
//!
//! The move budget decreases every step and is only partially refilled by food,
//! so every episode terminates in a bounded number of steps.

pub use self::{food_queue::*, game_config::*, game_env::*, snake::*};

mod food_queue;
mod game_config;
mod game_env;
mod snake;
