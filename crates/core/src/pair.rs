//! Pair module - the falling pair and its rotation kicks
//!
//! A pair is a pivot cell plus a satellite orbiting it. The pivot has an
//! integer column and a continuous row, so it can sit between two rows while
//! falling. Collision checks both rows a cell overlaps.

use puyo_duel_types::{Placement, Puyo, Rotation, FIELD_HEIGHT, FIELD_WIDTH, SPAWN_X, SPAWN_Y};

use crate::field::Field;

/// Offsets (dx, dy) tried in order when a rotation is blocked:
/// in place, one row up, one column right, one column left
pub const ROTATION_KICKS: [(i8, i8); 4] = [(0, 0), (0, 1), (1, 0), (-1, 0)];

/// A falling pair of cells
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PuyoPair {
    pub pivot: Puyo,
    pub satellite: Puyo,
    /// Pivot column
    pub x: i8,
    /// Pivot row, continuous, 0.0 is the floor row
    pub y: f64,
    pub rotation: Rotation,
}

impl PuyoPair {
    /// Create a pair at the spawn position, satellite on top
    pub fn new(pivot: Puyo, satellite: Puyo) -> Self {
        Self {
            pivot,
            satellite,
            x: SPAWN_X,
            y: SPAWN_Y,
            rotation: Rotation::Vertical,
        }
    }

    /// Column and rotation of the pair
    pub fn placement(&self) -> Placement {
        Placement::new(self.x, self.rotation)
    }

    /// Same pair moved to a placement's column and rotation
    pub fn with_placement(self, placement: Placement) -> Self {
        Self {
            x: placement.x,
            rotation: placement.rotation,
            ..self
        }
    }

    pub fn satellite_x(&self) -> i8 {
        self.x + self.rotation.satellite_offset().0
    }

    pub fn satellite_y(&self) -> f64 {
        self.y + f64::from(self.rotation.satellite_offset().1)
    }

    pub fn shifted(self, dx: i8, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }

    pub fn rotated(self, turns: i8) -> Self {
        Self {
            rotation: self.rotation.rotate(turns),
            ..self
        }
    }

    /// Whether either cell overlaps a wall, the floor or an occupied cell
    ///
    /// Cells at row 13 and above are outside the grid and never collide.
    pub fn collides(&self, field: &Field) -> bool {
        cell_collides(field, self.x, self.y) || cell_collides(field, self.satellite_x(), self.satellite_y())
    }
}

fn cell_collides(field: &Field, x: i8, y: f64) -> bool {
    if x < 0 || x as usize >= FIELD_WIDTH {
        return true;
    }
    [y.floor(), y.ceil()].into_iter().any(|row| {
        if row < 0.0 {
            return true;
        }
        let row = row as usize;
        row < FIELD_HEIGHT && field.get(x as usize, row).is_some()
    })
}

/// Attempt to rotate a pair by `turns` quarter turns with kicks
///
/// Returns the first candidate accepted by `is_free` and the index of the
/// kick in [`ROTATION_KICKS`] that produced it, or `None` if every candidate
/// is blocked.
///
/// # Examples
///
/// ```
/// use puyo_duel_core::{pair::try_rotate, Field, PuyoPair};
/// use puyo_duel_types::{Puyo, Rotation};
///
/// let field = Field::new();
/// let mut pair = PuyoPair::new(Puyo::Red, Puyo::Blue);
/// pair.x = 0;
/// pair.y = 5.0;
///
/// // Satellite would land in column -1, so the pair is kicked right.
/// let (rotated, kick) = try_rotate(&pair, -1, |p| !p.collides(&field)).unwrap();
/// assert_eq!(rotated.rotation, Rotation::HorizontalLeft);
/// assert_eq!((rotated.x, kick), (1, 2));
/// ```
pub fn try_rotate(
    pair: &PuyoPair,
    turns: i8,
    is_free: impl Fn(&PuyoPair) -> bool,
) -> Option<(PuyoPair, usize)> {
    let rotated = pair.rotated(turns);
    ROTATION_KICKS
        .iter()
        .enumerate()
        .map(|(i, &(dx, dy))| (rotated.shifted(dx, f64::from(dy)), i))
        .find(|(candidate, _)| is_free(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_position() {
        let pair = PuyoPair::new(Puyo::Red, Puyo::Green);
        assert_eq!(pair.placement(), Placement::default());
        assert_eq!(pair.satellite_x(), 2);
        assert_eq!(pair.satellite_y(), 14.0);
        assert!(!pair.collides(&Field::new()));
    }

    #[test]
    fn test_collision_checks_both_rows() {
        let field = Field::from_rows(&["..R..."]);
        let mut pair = PuyoPair::new(Puyo::Blue, Puyo::Blue);
        pair.y = 1.0;
        assert!(!pair.collides(&field));
        pair.y = 0.5;
        assert!(pair.collides(&field));
    }

    #[test]
    fn test_walls_and_floor_collide() {
        let field = Field::new();
        let mut pair = PuyoPair::new(Puyo::Blue, Puyo::Blue);
        pair.y = 3.0;
        assert!(pair.shifted(-3, 0.0).collides(&field));
        assert!(pair.shifted(4, 0.0).collides(&field));
        assert!(pair.shifted(0, -3.5).collides(&field));
        assert!(pair.rotated(1).shifted(3, 0.0).collides(&field));
    }

    #[test]
    fn test_rows_above_field_never_collide() {
        let field = Field::from_rows(&["..R..."; 13]);
        let mut pair = PuyoPair::new(Puyo::Red, Puyo::Red);
        pair.y = 13.0;
        assert!(!pair.collides(&field));
        pair.y = 12.5;
        assert!(pair.collides(&field));
    }

    #[test]
    fn test_rotation_prefers_kick_up() {
        // pivot resting on the floor: inverse rotation needs the row above
        let field = Field::new();
        let mut pair = PuyoPair::new(Puyo::Red, Puyo::Blue).rotated(1);
        pair.y = 0.0;
        let (rotated, kick) = try_rotate(&pair, 1, |p| !p.collides(&field)).unwrap();
        assert_eq!(rotated.rotation, Rotation::VerticalInverse);
        assert_eq!(kick, 1);
        assert_eq!(rotated.y, 1.0);
    }

    #[test]
    fn test_rotation_fully_blocked() {
        let field = Field::from_rows(&["XX.XX.", "XX.XX.", "XX.XX."]);
        let mut pair = PuyoPair::new(Puyo::Red, Puyo::Blue);
        pair.y = 0.0;
        assert!(try_rotate(&pair, 1, |p| !p.collides(&field)).is_none());
    }
}
