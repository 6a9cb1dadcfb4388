use std::sync::Arc;

use rand::{Rng, SeedableRng as _, seq::IndexedRandom as _};
use rand_pcg::Pcg32;

use crate::{Position, Snake};

/// A pre-generated, shared ordering of food cells.
///
/// Cloning is cheap: all clones refer to the same cells, which is how every
/// episode of a generation sees the same food order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoodSequence {
    cells: Arc<[Position]>,
}

impl FoodSequence {
    #[must_use]
    pub fn new(cells: Vec<Position>) -> Self {
        Self {
            cells: cells.into(),
        }
    }

    /// An empty sequence; every food cell then comes from fallback sampling.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Samples `len` cells uniformly from the grid, never placing one on `exclude`.
    pub fn random<R>(rng: &mut R, grid_size: i32, len: usize, exclude: Position) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut cells = Vec::with_capacity(len);
        while cells.len() < len {
            let pos = Position::new(
                rng.random_range(0..grid_size),
                rng.random_range(0..grid_size),
            );
            if pos != exclude {
                cells.push(pos);
            }
        }
        Self::new(cells)
    }

    #[must_use]
    pub fn cells(&self) -> &[Position] {
        &self.cells
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Food placement for all episodes of one generation.
///
/// Holds one shared [`FoodSequence`] and one fallback seed per episode index,
/// so episode `i` of every individual draws from identical sources.
#[derive(Debug, Clone)]
pub struct FoodPlan {
    sequence: FoodSequence,
    episode_seeds: Vec<u64>,
}

impl FoodPlan {
    #[must_use]
    pub fn new(sequence: FoodSequence, episode_seeds: Vec<u64>) -> Self {
        Self {
            sequence,
            episode_seeds,
        }
    }

    pub fn generate<R>(
        rng: &mut R,
        grid_size: i32,
        sequence_len: usize,
        episodes: usize,
        spawn: Position,
    ) -> Self
    where
        R: Rng + ?Sized,
    {
        let sequence = FoodSequence::random(rng, grid_size, sequence_len, spawn);
        let episode_seeds = (0..episodes).map(|_| rng.random()).collect();
        Self::new(sequence, episode_seeds)
    }

    #[must_use]
    pub fn sequence(&self) -> &FoodSequence {
        &self.sequence
    }

    #[must_use]
    pub fn episodes(&self) -> usize {
        self.episode_seeds.len()
    }

    /// Creates a fresh cursor for episode `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.episodes()`.
    #[must_use]
    pub fn queue_for_episode(&self, index: usize) -> FoodQueue {
        FoodQueue::new(self.sequence.clone(), self.episode_seeds[index])
    }
}

/// Per-episode cursor over a [`FoodSequence`].
///
/// Pre-generated cells that are covered by the snake when they come up are
/// skipped. Once the sequence is exhausted, cells are sampled uniformly from
/// the free cells with a seeded generator.
#[derive(Debug, Clone)]
pub struct FoodQueue {
    sequence: FoodSequence,
    cursor: usize,
    rng: Pcg32,
}

impl FoodQueue {
    #[must_use]
    pub fn new(sequence: FoodSequence, fallback_seed: u64) -> Self {
        Self {
            sequence,
            cursor: 0,
            rng: Pcg32::seed_from_u64(fallback_seed),
        }
    }

    /// Number of pre-generated cells consumed or skipped so far.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Returns the next food cell not covered by `snake`.
    ///
    /// Returns `None` only when the snake covers the whole grid.
    pub fn next_food(&mut self, snake: &Snake, grid_size: i32) -> Option<Position> {
        while let Some(&pos) = self.sequence.cells().get(self.cursor) {
            self.cursor += 1;
            if pos.is_in_bounds(grid_size) && !snake.occupies(pos) {
                return Some(pos);
            }
        }

        let free_cells: Vec<Position> = (0..grid_size)
            .flat_map(|row| (0..grid_size).map(move |col| Position::new(row, col)))
            .filter(|pos| !snake.occupies(*pos))
            .collect();
        free_cells.choose(&mut self.rng).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Direction, GameConfig};

    const CONFIG: GameConfig = GameConfig::CANONICAL;

    #[test]
    fn test_sequence_order_then_fallback() {
        let snake = Snake::new(Position::new(10, 10), &CONFIG);
        let cells = vec![Position::new(1, 1), Position::new(2, 2)];
        let mut queue = FoodQueue::new(FoodSequence::new(cells), 7);

        assert_eq!(queue.next_food(&snake, 20), Some(Position::new(1, 1)));
        assert_eq!(queue.next_food(&snake, 20), Some(Position::new(2, 2)));
        let fallback = queue.next_food(&snake, 20).unwrap();
        assert!(fallback.is_in_bounds(20));
        assert!(!snake.occupies(fallback));
    }

    #[test]
    fn test_occupied_cells_are_skipped() {
        let snake = Snake::with_body(
            [Position::new(3, 3), Position::new(3, 2)],
            Direction::Right,
            &CONFIG,
        );
        let cells = vec![Position::new(3, 2), Position::new(4, 4)];
        let mut queue = FoodQueue::new(FoodSequence::new(cells), 0);
        assert_eq!(queue.next_food(&snake, 20), Some(Position::new(4, 4)));
        assert_eq!(queue.cursor(), 2);
    }

    #[test]
    fn test_fallback_is_seeded() {
        let snake = Snake::new(Position::new(10, 10), &CONFIG);
        let mut a = FoodQueue::new(FoodSequence::empty(), 42);
        let mut b = FoodQueue::new(FoodSequence::empty(), 42);
        for _ in 0..20 {
            assert_eq!(a.next_food(&snake, 20), b.next_food(&snake, 20));
        }
    }

    #[test]
    fn test_full_grid_has_no_food() {
        let body = (0..2).flat_map(|r| (0..2).map(move |c| Position::new(r, c)));
        let snake = Snake::with_body(body, Direction::Right, &CONFIG);
        let mut queue = FoodQueue::new(FoodSequence::empty(), 0);
        assert_eq!(queue.next_food(&snake, 2), None);
    }

    #[test]
    fn test_plan_shares_sequence_across_episodes() {
        let mut rng = Pcg32::seed_from_u64(1);
        let plan = FoodPlan::generate(&mut rng, 20, 30, 3, Position::new(10, 10));
        assert_eq!(plan.episodes(), 3);
        assert_eq!(plan.sequence().len(), 30);
        assert!(!plan.sequence().cells().contains(&Position::new(10, 10)));

        let snake = Snake::new(Position::new(10, 10), &CONFIG);
        let first = plan.queue_for_episode(0).next_food(&snake, 20);
        let again = plan.queue_for_episode(0).next_food(&snake, 20);
        let other = plan.queue_for_episode(2).next_food(&snake, 20);
        assert_eq!(first, again);
        assert_eq!(first, other);
    }
}
