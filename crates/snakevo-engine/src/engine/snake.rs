use std::collections::{HashSet, VecDeque};

use crate::{Direction, GameConfig, Position};

/// State of the agent: body, movement and the counters used for scoring.
///
/// The body is ordered head first. While the game is running every segment is
/// inside the grid and only the head may coincide with another segment (which
/// is exactly the self-collision condition).
#[derive(Debug, Clone)]
pub struct Snake {
    body: VecDeque<Position>,
    direction: Direction,
    grow_pending: bool,
    moves_left: i32,
    max_moves: i32,
    lifetime: u32,
    food_eaten: u32,
    history: VecDeque<Position>,
    history_window: usize,
    loop_penalty: u32,
    loop_penalty_increment: u32,
    visited: HashSet<Position>,
}

impl Snake {
    /// Creates a one-segment snake at `spawn` heading [`Direction::Right`].
    #[must_use]
    pub fn new(spawn: Position, config: &GameConfig) -> Self {
        Self::with_body([spawn], Direction::Right, config)
    }

    /// Creates a snake with an explicit body (head first) and direction.
    ///
    /// # Panics
    ///
    /// Panics if `body` is empty.
    #[must_use]
    pub fn with_body<I>(body: I, direction: Direction, config: &GameConfig) -> Self
    where
        I: IntoIterator<Item = Position>,
    {
        let body: VecDeque<Position> = body.into_iter().collect();
        assert!(!body.is_empty(), "snake body must have a head");
        Self {
            body,
            direction,
            grow_pending: false,
            moves_left: config.initial_moves,
            max_moves: config.max_moves,
            lifetime: 0,
            food_eaten: 0,
            history: VecDeque::with_capacity(config.history_window),
            history_window: config.history_window,
            loop_penalty: 0,
            loop_penalty_increment: config.loop_penalty_increment,
            visited: HashSet::new(),
        }
    }

    #[must_use]
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Body segments, head first.
    pub fn body(&self) -> impl ExactSizeIterator<Item = Position> + '_ {
        self.body.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Returns `true` if a non-head segment occupies `pos`.
    #[must_use]
    pub fn is_tail_at(&self, pos: Position) -> bool {
        self.body.iter().skip(1).any(|p| *p == pos)
    }

    /// Returns `true` if any segment, head included, occupies `pos`.
    #[must_use]
    pub fn occupies(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[must_use]
    pub fn is_growing(&self) -> bool {
        self.grow_pending
    }

    #[must_use]
    pub fn moves_left(&self) -> i32 {
        self.moves_left
    }

    #[must_use]
    pub fn max_moves(&self) -> i32 {
        self.max_moves
    }

    #[must_use]
    pub fn lifetime(&self) -> u32 {
        self.lifetime
    }

    #[must_use]
    pub fn food_eaten(&self) -> u32 {
        self.food_eaten
    }

    #[must_use]
    pub fn loop_penalty(&self) -> u32 {
        self.loop_penalty
    }

    #[must_use]
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    #[must_use]
    pub fn has_visited(&self, pos: Position) -> bool {
        self.visited.contains(&pos)
    }

    /// Changes the movement direction.
    ///
    /// Unless `allow_reversal` is set, a direction exactly opposite the current
    /// one is ignored. Returns whether the direction was applied.
    pub fn turn(&mut self, direction: Direction, allow_reversal: bool) -> bool {
        if !allow_reversal && direction == self.direction.opposite() {
            return false;
        }
        self.direction = direction;
        true
    }

    /// Moves the head one cell and updates the per-move counters.
    ///
    /// The tail is dropped unless a grow is pending, in which case the grow
    /// flag is consumed and the body gets one segment longer.
    pub fn advance(&mut self) {
        let new_head = self.head().offset(self.direction.delta(), 1);
        self.body.push_front(new_head);
        if self.grow_pending {
            self.grow_pending = false;
        } else {
            self.body.pop_back();
        }

        self.moves_left -= 1;
        self.lifetime += 1;

        if self.history.contains(&new_head) {
            self.loop_penalty += self.loop_penalty_increment;
        }
        if self.history.len() == self.history_window {
            self.history.pop_front();
        }
        self.history.push_back(new_head);

        self.visited.insert(new_head);
    }

    /// Records eaten food: schedules growth, refills the move budget and resets
    /// loop tracking.
    pub fn eat(&mut self, move_bonus: i32) {
        self.grow_pending = true;
        self.food_eaten += 1;
        self.moves_left = self.moves_left.saturating_add(move_bonus).min(self.max_moves);
        self.history.clear();
        self.loop_penalty = 0;
    }

    /// Returns `true` if the head is outside `[0, grid_size)²` or on another
    /// body segment.
    #[must_use]
    pub fn check_collision(&self, grid_size: i32) -> bool {
        !self.head().is_in_bounds(grid_size) || self.is_tail_at(self.head())
    }

    #[must_use]
    pub fn is_starved(&self) -> bool {
        self.moves_left <= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: GameConfig = GameConfig::CANONICAL;

    fn snake_at(body: &[(i32, i32)], direction: Direction) -> Snake {
        Snake::with_body(
            body.iter().map(|&(r, c)| Position::new(r, c)),
            direction,
            &CONFIG,
        )
    }

    #[test]
    fn test_advance_keeps_length() {
        let mut snake = snake_at(&[(5, 5), (5, 4), (5, 3)], Direction::Right);
        snake.advance();
        assert_eq!(snake.head(), Position::new(5, 6));
        assert_eq!(snake.len(), 3);
        assert_eq!(snake.lifetime(), 1);
        assert_eq!(snake.moves_left(), CONFIG.initial_moves - 1);
        assert!(snake.has_visited(Position::new(5, 6)));
    }

    #[test]
    fn test_grow_then_move_adds_exactly_one() {
        let plain = snake_at(&[(5, 5), (5, 4), (5, 3)], Direction::Right);
        let mut growing = plain.clone();
        let mut moved = plain.clone();

        growing.eat(CONFIG.food_move_bonus);
        growing.advance();
        moved.advance();

        assert_eq!(growing.len(), moved.len() + 1);
        assert!(!growing.is_growing());
        assert_eq!(growing.head(), moved.head());
    }

    #[test]
    fn test_turn_rejects_reversal() {
        let mut snake = snake_at(&[(5, 5)], Direction::Right);
        assert!(!snake.turn(Direction::Left, false));
        assert_eq!(snake.direction(), Direction::Right);
        assert!(snake.turn(Direction::Up, false));
        assert_eq!(snake.direction(), Direction::Up);
        assert!(snake.turn(Direction::Down, true));
        assert_eq!(snake.direction(), Direction::Down);
    }

    #[test]
    fn test_check_collision_wall() {
        let mut snake = snake_at(&[(0, 3)], Direction::Up);
        assert!(!snake.check_collision(CONFIG.grid_size));
        snake.advance();
        assert!(snake.check_collision(CONFIG.grid_size));

        let mut snake = snake_at(&[(4, 19)], Direction::Right);
        snake.advance();
        assert!(snake.check_collision(CONFIG.grid_size));
    }

    #[test]
    fn test_check_collision_self() {
        // head (5,5) moving down into (6,5), which the body still occupies after the tail moves
        let mut snake = snake_at(
            &[(5, 5), (5, 4), (6, 4), (6, 5), (6, 6), (5, 6)],
            Direction::Down,
        );
        assert!(!snake.check_collision(CONFIG.grid_size));
        snake.advance();
        assert_eq!(snake.head(), Position::new(6, 5));
        assert!(snake.check_collision(CONFIG.grid_size));
    }

    #[test]
    fn test_head_only_overlap_is_not_collision() {
        let snake = snake_at(&[(3, 3), (3, 2)], Direction::Right);
        assert!(!snake.check_collision(CONFIG.grid_size));
        assert!(snake.occupies(Position::new(3, 3)));
        assert!(!snake.is_tail_at(Position::new(3, 3)));
    }

    #[test]
    fn test_loop_penalty_and_reset() {
        // a 2x2 square loop revisits the same cells every 4 moves
        let mut snake = snake_at(&[(5, 5)], Direction::Right);
        for dir in [Direction::Right, Direction::Down, Direction::Left, Direction::Up] {
            snake.turn(dir, false);
            snake.advance();
        }
        assert_eq!(snake.loop_penalty(), 0);
        snake.turn(Direction::Right, false);
        snake.advance();
        assert_eq!(snake.loop_penalty(), CONFIG.loop_penalty_increment);

        snake.eat(CONFIG.food_move_bonus);
        assert_eq!(snake.loop_penalty(), 0);
        snake.advance();
        assert_eq!(snake.loop_penalty(), 0);
    }

    #[test]
    fn test_history_window_is_bounded() {
        let config = GameConfig {
            history_window: 2,
            ..CONFIG
        };
        let mut snake = Snake::new(Position::new(5, 5), &config);
        // (5,6) (5,7) (5,8): (5,6) leaves the window
        for _ in 0..3 {
            snake.advance();
        }
        snake.turn(Direction::Down, false);
        snake.advance();
        snake.turn(Direction::Left, false);
        snake.advance();
        snake.advance();
        snake.turn(Direction::Up, false);
        snake.advance(); // back on (5,6), no longer in the window
        assert_eq!(snake.head(), Position::new(5, 6));
        assert_eq!(snake.loop_penalty(), 0);
        assert!(snake.visited_count() < usize::try_from(snake.lifetime()).unwrap());
    }

    #[test]
    fn test_eat_refills_up_to_cap() {
        let mut snake = snake_at(&[(5, 5)], Direction::Right);
        snake.eat(100);
        assert_eq!(snake.moves_left(), 300);
        snake.eat(100);
        snake.eat(100);
        assert_eq!(snake.moves_left(), CONFIG.max_moves);
        assert_eq!(snake.food_eaten(), 3);
    }

    #[test]
    fn test_eat_huge_bonus_saturates_at_cap() {
        let mut snake = snake_at(&[(5, 5)], Direction::Right);
        snake.eat(i32::MAX);
        assert_eq!(snake.moves_left(), CONFIG.max_moves);
        snake.eat(i32::MAX);
        assert_eq!(snake.moves_left(), CONFIG.max_moves);
    }
}
