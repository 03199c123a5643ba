//! Collision shapes and the stateless hit predicate.
//!
//! All tests operate on the tile delta from the action's origin to the
//! target (`dx`, `dy`, y growing downward) plus the map-supplied distance.
//! Directional shapes use the facing captured when the action was cast.

use crate::state::{Direction, Position};

/// Offset from an action's origin to a target, as reported by the map.
///
/// `distance` is Euclidean over tile centres: a diagonal step counts
/// `sqrt(2)`, so a circle of range 1.5 reaches the eight neighbours while
/// range 1.0 only reaches the four orthogonal ones. The Chebyshev reach is
/// what [`CollisionShape::Square`] covers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Separation {
    pub dx: f64,
    pub dy: f64,
    /// Euclidean tile distance, unless the map supplies its own metric.
    pub distance: f64,
}

impl Separation {
    /// Builds a separation using Euclidean distance.
    pub fn between(from: Position, to: Position) -> Self {
        let dx = f64::from(to.x - from.x);
        let dy = f64::from(to.y - from.y);
        Self {
            dx,
            dy,
            distance: dx.hypot(dy),
        }
    }

    /// Signed distance along `facing` (positive = in front).
    pub fn forward(&self, facing: Direction) -> f64 {
        match facing {
            Direction::Up => -self.dy,
            Direction::Down => self.dy,
            Direction::Left => -self.dx,
            Direction::Right => self.dx,
        }
    }

    /// Absolute distance perpendicular to `facing`.
    pub fn lateral(&self, facing: Direction) -> f64 {
        if facing.is_vertical() {
            self.dx.abs()
        } else {
            self.dy.abs()
        }
    }

    fn manhattan(&self) -> f64 {
        self.dx.abs() + self.dy.abs()
    }
}

/// Area an action covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CollisionShape {
    Circle,
    Rhombus,
    Square,
    FrontSquare,
    Line,
    /// Front half of a rhombus.
    Arc,
    Wall,
    Cross,
}

impl CollisionShape {
    /// True for shapes whose coverage depends on facing.
    pub const fn is_directional(self) -> bool {
        matches!(
            self,
            CollisionShape::FrontSquare
                | CollisionShape::Line
                | CollisionShape::Arc
                | CollisionShape::Wall
        )
    }
}

/// A shape with its range and facing frozen at cast time.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hitbox {
    pub shape: CollisionShape,
    pub range: f64,
    pub facing: Direction,
}

impl Hitbox {
    pub fn new(shape: CollisionShape, range: f64, facing: Direction) -> Self {
        Self {
            shape,
            range,
            facing,
        }
    }

    pub fn contains(&self, separation: Separation, tolerance: f64) -> bool {
        collides(separation, self.shape, self.range, self.facing, tolerance)
    }
}

/// Returns true if a target at `separation` from the action origin lies
/// inside `shape`.
///
/// `tolerance` is the half-width of the band line, wall and cross shapes
/// accept off their axis.
pub fn collides(
    separation: Separation,
    shape: CollisionShape,
    range: f64,
    facing: Direction,
    tolerance: f64,
) -> bool {
    let Separation { dx, dy, distance } = separation;
    match shape {
        CollisionShape::Circle => distance <= range,
        CollisionShape::Rhombus => separation.manhattan() <= range,
        CollisionShape::Square => in_square(dx, dy, range),
        CollisionShape::FrontSquare => {
            in_square(dx, dy, range) && in_front_half(separation, facing)
        }
        CollisionShape::Line => {
            let ahead = separation.forward(facing);
            separation.lateral(facing) <= tolerance && (0.0..=range).contains(&ahead)
        }
        CollisionShape::Arc => {
            separation.manhattan() <= range && in_front_half(separation, facing)
        }
        CollisionShape::Wall => {
            separation.lateral(facing) <= range && separation.forward(facing).abs() <= tolerance
        }
        CollisionShape::Cross => {
            (dx.abs() <= range && dy.abs() <= tolerance)
                || (dy.abs() <= range && dx.abs() <= tolerance)
        }
    }
}

/// Proximity test used by direct actions in place of shape geometry.
pub fn within_proximity(separation: Separation, proximity: f64) -> bool {
    separation.distance <= proximity
}

fn in_square(dx: f64, dy: f64, range: f64) -> bool {
    dx.abs() <= range && dy.abs() <= range
}

/// Half-space cut: the target is level with or ahead of the facing.
fn in_front_half(separation: Separation, facing: Direction) -> bool {
    separation.forward(facing) >= 0.0
}
