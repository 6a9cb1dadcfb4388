use serde::{Deserialize, Serialize};

use crate::{ConfigError, Position};

/// Rules of the simulated game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Side length of the square grid
    pub grid_size: i32,
    /// Move budget at spawn
    pub initial_moves: i32,
    /// Upper bound of the move budget
    pub max_moves: i32,
    /// Moves added to the budget when food is eaten (capped at `max_moves`)
    pub food_move_bonus: i32,
    /// Number of recent head positions kept for loop detection
    pub history_window: usize,
    /// Loop penalty added when the head revisits a position in the window
    pub loop_penalty_increment: u32,
    /// Whether the snake may turn straight back onto itself
    pub allow_reversal: bool,
}

impl GameConfig {
    pub const CANONICAL: Self = Self {
        grid_size: 20,
        initial_moves: 200,
        max_moves: 500,
        food_move_bonus: 100,
        history_window: 50,
        loop_penalty_increment: 2,
        allow_reversal: false,
    };

    pub fn validate(&self) -> Result<(), ConfigError> {
        let Self {
            grid_size,
            initial_moves,
            max_moves,
            food_move_bonus,
            history_window,
            ..
        } = *self;
        if grid_size < 2 {
            return Err(ConfigError::GridTooSmall { grid_size });
        }
        if initial_moves <= 0 || max_moves <= 0 {
            return Err(ConfigError::NonPositiveMoveBudget {
                initial_moves,
                max_moves,
            });
        }
        if initial_moves > max_moves {
            return Err(ConfigError::InitialMovesAboveCap {
                initial_moves,
                max_moves,
            });
        }
        if food_move_bonus < 0 {
            return Err(ConfigError::NegativeFoodBonus { food_move_bonus });
        }
        if history_window == 0 {
            return Err(ConfigError::EmptyHistoryWindow);
        }
        Ok(())
    }

    /// The center cell, where every episode starts.
    #[must_use]
    pub const fn spawn_position(&self) -> Position {
        Position::new(self.grid_size / 2, self.grid_size / 2)
    }
}
