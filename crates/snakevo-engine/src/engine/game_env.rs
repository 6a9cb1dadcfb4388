use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, Direction, FoodQueue, GameConfig, Position, Snake, Vision};

/// Chooses an action from the snake's vision.
///
/// Implemented by the neural-network controller in `snakevo-evaluator`; any other
/// policy (scripted agents in tests, for example) can implement it too.
pub trait Controller: fmt::Debug + Send + Sync {
    /// Returns an action index in [`Direction::ALL`] order.
    fn select_action(&self, vision: &Vision) -> usize;
}

/// Source of the direction for one step.
#[derive(Debug, Clone, Copy)]
pub enum Steering<'a> {
    /// Keep the current direction.
    Keep,
    /// Ask a controller, using the current vision.
    Controller(&'a dyn Controller),
    /// Externally supplied direction (e.g. human control).
    Manual(Direction),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
pub enum CollisionKind {
    Wall,
    SelfBody,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant, derive_more::Display,
)]
pub enum GameState {
    Running,
    #[display("Collided({_0})")]
    Collided(CollisionKind),
    Starved,
}

impl GameState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !self.is_running()
    }
}

/// Read-only view of an environment for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub body: Vec<Position>,
    pub food: Option<Position>,
    pub direction: Direction,
    pub state: GameState,
    pub score: u32,
    pub lifetime: u32,
    pub moves_left: i32,
}

/// One episode of the game.
///
/// Only [`GameEnvironment::step`] mutates the state; every other method is a
/// pure query.
#[derive(Debug, Clone)]
pub struct GameEnvironment {
    config: GameConfig,
    snake: Snake,
    food_queue: FoodQueue,
    food: Option<Position>,
    state: GameState,
}

impl GameEnvironment {
    /// Spawns a length-1 snake at the grid center and places the first food.
    pub fn new(config: GameConfig, mut food_queue: FoodQueue) -> Result<Self, ConfigError> {
        config.validate()?;
        let snake = Snake::new(config.spawn_position(), &config);
        let food = food_queue.next_food(&snake, config.grid_size);
        Ok(Self {
            config,
            snake,
            food_queue,
            food,
            state: GameState::Running,
        })
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    #[must_use]
    pub fn food(&self) -> Option<Position> {
        self.food
    }

    #[must_use]
    pub fn state(&self) -> GameState {
        self.state
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Number of food cells eaten.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.snake.food_eaten()
    }

    #[must_use]
    pub fn lifetime(&self) -> u32 {
        self.snake.lifetime()
    }

    #[must_use]
    pub fn vision(&self) -> Vision {
        Vision::observe(
            self.snake.head(),
            |pos| self.snake.is_tail_at(pos),
            self.food,
            self.config.grid_size,
        )
    }

    #[must_use]
    pub fn agent_snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            body: self.snake.body().collect(),
            food: self.food,
            direction: self.snake.direction(),
            state: self.state,
            score: self.score(),
            lifetime: self.lifetime(),
            moves_left: self.snake.moves_left(),
        }
    }

    /// Advances the game by one move and returns the resulting state.
    ///
    /// Stepping a terminated environment does nothing.
    pub fn step(&mut self, steering: Steering<'_>) -> GameState {
        if self.is_terminal() {
            return self.state;
        }

        let requested = match steering {
            Steering::Keep => None,
            Steering::Controller(controller) => {
                Direction::from_action_index(controller.select_action(&self.vision()))
            }
            Steering::Manual(direction) => Some(direction),
        };
        if let Some(direction) = requested {
            self.snake.turn(direction, self.config.allow_reversal);
        }

        self.snake.advance();

        if self.food == Some(self.snake.head()) {
            self.snake.eat(self.config.food_move_bonus);
            self.food = self.food_queue.next_food(&self.snake, self.config.grid_size);
        }

        let head = self.snake.head();
        self.state = if !head.is_in_bounds(self.config.grid_size) {
            GameState::Collided(CollisionKind::Wall)
        } else if self.snake.is_tail_at(head) {
            GameState::Collided(CollisionKind::SelfBody)
        } else if self.snake.is_starved() {
            GameState::Starved
        } else {
            GameState::Running
        };
        self.state
    }

    /// Steps until the episode terminates.
    pub fn run_to_end(&mut self, steering: Steering<'_>) -> GameState {
        while !self.is_terminal() {
            self.step(steering);
        }
        self.state
    }
}
