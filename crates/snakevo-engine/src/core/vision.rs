use super::position::Position;

/// Ray directions as `(d_row, d_col)`: N, S, W, E, NW, NE, SW, SE.
pub const RAY_DIRECTIONS: [(i32, i32); RAY_COUNT] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];

pub const RAY_COUNT: usize = 8;
pub const VALUES_PER_RAY: usize = 3;
pub const VISION_LEN: usize = RAY_COUNT * VALUES_PER_RAY;

/// Readings of one sensor ray, each as a reciprocal distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayReading {
    /// `1/d` to the first food cell on the ray, `0.0` if none.
    pub food: f32,
    /// `1/d` to the first non-head body segment on the ray, `0.0` if none.
    pub body: f32,
    /// `1/d` where `d` is the number of steps until the ray leaves the grid.
    ///
    /// `d >= 1` always holds, so this is in `(0, 1]`.
    pub wall: f32,
}

/// The 24-value directional vision vector fed to a controller.
///
/// Layout is `[food, body, wall]` for each ray in [`RAY_DIRECTIONS`] order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vision([f32; VISION_LEN]);

impl Vision {
    /// Casts all eight rays from `head`.
    ///
    /// `is_body` must report whether a cell is occupied by a body segment other
    /// than the head.
    pub fn observe<F>(head: Position, is_body: F, food: Option<Position>, grid_size: i32) -> Self
    where
        F: Fn(Position) -> bool,
    {
        let mut values = [0.0; VISION_LEN];
        for (chunk, direction) in values.chunks_exact_mut(VALUES_PER_RAY).zip(RAY_DIRECTIONS) {
            let ray = cast_ray(head, direction, &is_body, food, grid_size);
            chunk.copy_from_slice(&[ray.food, ray.body, ray.wall]);
        }
        Self(values)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    #[must_use]
    pub fn rays(&self) -> impl Iterator<Item = RayReading> + '_ {
        self.0.chunks_exact(VALUES_PER_RAY).map(|c| RayReading {
            food: c[0],
            body: c[1],
            wall: c[2],
        })
    }
}

#[expect(clippy::cast_precision_loss)]
fn cast_ray<F>(
    head: Position,
    direction: (i32, i32),
    is_body: &F,
    food: Option<Position>,
    grid_size: i32,
) -> RayReading
where
    F: Fn(Position) -> bool,
{
    let mut reading = RayReading {
        food: 0.0,
        body: 0.0,
        wall: 0.0,
    };
    let mut distance = 1;
    loop {
        let pos = head.offset(direction, distance);
        if !pos.is_in_bounds(grid_size) {
            break;
        }
        if reading.food == 0.0 && food == Some(pos) {
            reading.food = 1.0 / distance as f32;
        }
        if reading.body == 0.0 && is_body(pos) {
            reading.body = 1.0 / distance as f32;
        }
        distance += 1;
    }
    reading.wall = 1.0 / distance as f32;
    reading
}
