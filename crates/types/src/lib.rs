//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are plain data with no behaviour beyond conversions, which makes
//! them usable from the engine, an observer thread, or an external AI layer.
//!
//! # Field Dimensions
//!
//! - **Width**: 6 columns (indexed 0-5, left to right)
//! - **Height**: 13 rows (indexed 0-12, from the floor upward)
//! - **Spawn position**: pivot at column 2, row 13.0 (just above the field)
//! - **Game-over cell**: column 2, row 11
//!
//! # Frame Timing Constants
//!
//! The simulation advances in frames of 1/60 s:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `FALL_SPEED` | 1.0 | Rows per second under gravity |
//! | `SOFT_DROP_SPEED` | 25.0 | Rows per second per soft-drop request |
//! | `LOCK_DELAY_FRAMES` | 100 | Grounded frames before the pair locks |
//! | `SOFT_DROP_LOCK_PENALTY` | 10 | Lock-delay frames removed per soft drop |
//! | `FALL_FRAMES` | 20 | Gravity display delay |
//! | `CHAIN_FRAMES` | 30 | Display delay per cascade step |
//! | `GARBAGE_WAIT_FRAMES` | 20 | Settle delay after garbage lands |
//!
//! # Examples
//!
//! ```
//! use puyo_duel_types::{Puyo, Rotation, GameAction, Placement, FIELD_WIDTH, FIELD_HEIGHT};
//!
//! let color = Puyo::from_str("red").unwrap();
//! assert!(color.is_color());
//! assert!(!Puyo::Garbage.is_color());
//!
//! assert_eq!(Rotation::Vertical.rotate_cw(), Rotation::HorizontalRight);
//! assert_eq!(Rotation::Vertical.rotate(-1), Rotation::HorizontalLeft);
//!
//! let place = Placement::new(0, Rotation::HorizontalRight);
//! assert_eq!(place.satellite_x(), 1);
//!
//! assert_eq!(GameAction::from_str("quickDrop"), Some(GameAction::QuickDrop));
//! assert_eq!(FIELD_WIDTH, 6);
//! assert_eq!(FIELD_HEIGHT, 13);
//! ```

use serde::{Deserialize, Serialize};

/// Field width in cells (6 columns)
pub const FIELD_WIDTH: usize = 6;

/// Field height in cells (13 rows, the top one is the hidden row)
pub const FIELD_HEIGHT: usize = 13;

/// Total number of cells on the field
pub const FIELD_SIZE: usize = FIELD_WIDTH * FIELD_HEIGHT;

/// Pairs held by the queue: the falling pair plus two previews
pub const NEXT_COUNT: usize = 3;

/// Spawn column of the pivot cell
pub const SPAWN_X: i8 = 2;

/// Spawn row of the pivot cell (just above the field)
pub const SPAWN_Y: f64 = FIELD_HEIGHT as f64;

/// Cell that ends the game when occupied at the start of a turn (x, y)
pub const GAME_OVER_CELL: (usize, usize) = (2, 11);

/// Simulated frames per second
pub const FRAMES_PER_SECOND: u32 = 60;

/// Gravity in rows per second
pub const FALL_SPEED: f64 = 1.0;

/// Descent in rows per second applied by one soft-drop request
pub const SOFT_DROP_SPEED: f64 = 25.0;

/// Grounded frames before a pair is written into the field
pub const LOCK_DELAY_FRAMES: u32 = 100;

/// Lock-delay frames removed by each soft-drop request
pub const SOFT_DROP_LOCK_PENALTY: u32 = 10;

/// Display delay after gravity moved cells
pub const FALL_FRAMES: u32 = 20;

/// Display delay per cascade step
pub const CHAIN_FRAMES: u32 = 30;

/// Settle delay after garbage landed
pub const GARBAGE_WAIT_FRAMES: u32 = 20;

/// Kicked or failed rotations allowed before further rotations are refused
pub const ROTATION_FAIL_LIMIT: u8 = 10;

/// Default frames between two soft-put navigation inputs
pub const SOFT_PUT_INTERVAL: u32 = 6;

/// Score points per garbage unit
pub const GARBAGE_RATE: u32 = 70;

/// Maximum full rows of garbage dropped in one turn
pub const GARBAGE_MAX_ROWS: usize = 5;

/// Maximum garbage units dropped in one turn (5 full rows)
pub const GARBAGE_MAX_DROP: usize = GARBAGE_MAX_ROWS * FIELD_WIDTH;

/// Minimum colored cells in a group for it to pop
pub const POP_THRESHOLD: usize = 4;

/// Upper bound of groups popping in one cascade step (6 * 13 / 4)
pub const MAX_CONNECTIONS: usize = 20;

/// Cell contents
///
/// Four colors can be drawn for falling pairs. Garbage is a colorless filler
/// that only ever arrives from the opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Puyo {
    Red,
    Blue,
    Green,
    Yellow,
    Garbage,
}

/// Colors a falling pair can be drawn from
pub const COLORS: [Puyo; 4] = [Puyo::Red, Puyo::Blue, Puyo::Green, Puyo::Yellow];

impl Puyo {
    /// Whether this is one of the four pair colors
    pub fn is_color(&self) -> bool {
        !matches!(self, Puyo::Garbage)
    }

    /// Compact code used by snapshots (0 is reserved for an empty cell)
    pub fn code(&self) -> u8 {
        match self {
            Puyo::Red => 1,
            Puyo::Blue => 2,
            Puyo::Green => 3,
            Puyo::Yellow => 4,
            Puyo::Garbage => 5,
        }
    }

    /// Parse a color from its name (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use puyo_duel_types::Puyo;
    ///
    /// assert_eq!(Puyo::from_str("Blue"), Some(Puyo::Blue));
    /// assert_eq!(Puyo::from_str("g"), Some(Puyo::Green));
    /// assert_eq!(Puyo::from_str("purple"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "red" | "r" => Some(Puyo::Red),
            "blue" | "b" => Some(Puyo::Blue),
            "green" | "g" => Some(Puyo::Green),
            "yellow" | "y" => Some(Puyo::Yellow),
            "garbage" | "x" => Some(Puyo::Garbage),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Puyo::Red => "red",
            Puyo::Blue => "blue",
            Puyo::Green => "green",
            Puyo::Yellow => "yellow",
            Puyo::Garbage => "garbage",
        }
    }
}

/// A cell on the field
///
/// - `None`: Empty cell
/// - `Some(Puyo)`: Cell filled with a color or garbage
pub type Cell = Option<Puyo>;

/// Snapshot code of a cell (0 = empty)
pub fn cell_code(cell: Cell) -> u8 {
    cell.map_or(0, |p| p.code())
}

/// Rotation states of a falling pair
///
/// The pivot stays in place and the satellite orbits it:
/// - **Vertical**: satellite above the pivot (spawn orientation)
/// - **HorizontalRight**: satellite right of the pivot
/// - **VerticalInverse**: satellite below the pivot
/// - **HorizontalLeft**: satellite left of the pivot
///
/// Clockwise order: Vertical → HorizontalRight → VerticalInverse → HorizontalLeft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rotation {
    Vertical,
    HorizontalRight,
    VerticalInverse,
    HorizontalLeft,
}

impl Rotation {
    /// Quarter turns clockwise from `Vertical`
    pub fn index(&self) -> u8 {
        match self {
            Rotation::Vertical => 0,
            Rotation::HorizontalRight => 1,
            Rotation::VerticalInverse => 2,
            Rotation::HorizontalLeft => 3,
        }
    }

    /// Inverse of [`Rotation::index`], taken modulo 4
    pub fn from_index(index: i32) -> Self {
        match index.rem_euclid(4) {
            0 => Rotation::Vertical,
            1 => Rotation::HorizontalRight,
            2 => Rotation::VerticalInverse,
            _ => Rotation::HorizontalLeft,
        }
    }

    /// Rotate by `turns` quarter turns (positive is clockwise)
    pub fn rotate(&self, turns: i8) -> Self {
        Self::from_index(self.index() as i32 + turns as i32)
    }

    pub fn rotate_cw(&self) -> Self {
        self.rotate(1)
    }

    pub fn rotate_ccw(&self) -> Self {
        self.rotate(-1)
    }

    /// Quarter turns needed to go clockwise from `self` to `target` (0..=3)
    pub fn turns_to(&self, target: Rotation) -> u8 {
        (target.index() + 4 - self.index()) % 4
    }

    /// Satellite position relative to the pivot (dx, dy), y pointing up
    pub fn satellite_offset(&self) -> (i8, i8) {
        match self {
            Rotation::Vertical => (0, 1),
            Rotation::HorizontalRight => (1, 0),
            Rotation::VerticalInverse => (0, -1),
            Rotation::HorizontalLeft => (-1, 0),
        }
    }

    /// Parse rotation from string
    ///
    /// Accepts full names or short forms (case-insensitive):
    /// "vertical" | "v", "right" | "r", "inverse" | "i", "left" | "l"
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "vertical" | "v" => Some(Rotation::Vertical),
            "horizontal_right" | "right" | "r" => Some(Rotation::HorizontalRight),
            "vertical_inverse" | "inverse" | "i" => Some(Rotation::VerticalInverse),
            "horizontal_left" | "left" | "l" => Some(Rotation::HorizontalLeft),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rotation::Vertical => "vertical",
            Rotation::HorizontalRight => "horizontal_right",
            Rotation::VerticalInverse => "vertical_inverse",
            Rotation::HorizontalLeft => "horizontal_left",
        }
    }
}

/// Where a pair should end up: pivot column plus rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    pub x: i8,
    pub rotation: Rotation,
}

impl Placement {
    pub const fn new(x: i8, rotation: Rotation) -> Self {
        Self { x, rotation }
    }

    /// Column of the satellite cell
    pub fn satellite_x(&self) -> i8 {
        self.x + self.rotation.satellite_offset().0
    }

    /// Whether both cells of the placement are inside the field columns
    pub fn is_in_field(&self) -> bool {
        let width = FIELD_WIDTH as i8;
        (0..width).contains(&self.x) && (0..width).contains(&self.satellite_x())
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::new(SPAWN_X, Rotation::Vertical)
    }
}

/// Number of distinct placements of a pair on the field
pub const PLACEMENT_COUNT: usize = 22;

/// Every distinct placement, in the order external policies index them
pub const ALL_PLACEMENTS: [Placement; PLACEMENT_COUNT] = [
    Placement::new(0, Rotation::Vertical),
    Placement::new(1, Rotation::Vertical),
    Placement::new(2, Rotation::Vertical),
    Placement::new(3, Rotation::Vertical),
    Placement::new(4, Rotation::Vertical),
    Placement::new(5, Rotation::Vertical),
    Placement::new(0, Rotation::VerticalInverse),
    Placement::new(1, Rotation::VerticalInverse),
    Placement::new(2, Rotation::VerticalInverse),
    Placement::new(3, Rotation::VerticalInverse),
    Placement::new(4, Rotation::VerticalInverse),
    Placement::new(5, Rotation::VerticalInverse),
    Placement::new(0, Rotation::HorizontalRight),
    Placement::new(1, Rotation::HorizontalRight),
    Placement::new(2, Rotation::HorizontalRight),
    Placement::new(3, Rotation::HorizontalRight),
    Placement::new(4, Rotation::HorizontalRight),
    Placement::new(1, Rotation::HorizontalLeft),
    Placement::new(2, Rotation::HorizontalLeft),
    Placement::new(3, Rotation::HorizontalLeft),
    Placement::new(4, Rotation::HorizontalLeft),
    Placement::new(5, Rotation::HorizontalLeft),
];

/// Commands that can be applied to a simulation
///
/// These are shared by human input and AI control. All of them are ignored
/// unless the simulation is in free control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameAction {
    /// Shift the pair one column left
    MoveLeft,
    /// Shift the pair one column right
    MoveRight,
    /// Rotate the pair a quarter turn clockwise
    RotateCw,
    /// Rotate the pair a quarter turn counter-clockwise
    RotateCcw,
    /// Push the pair down and shorten the lock delay
    SoftDrop,
    /// Drop the pair and lock it on the next frame
    QuickDrop,
}

impl GameAction {
    /// Parse action from string (for AI protocol)
    ///
    /// # Examples
    ///
    /// ```
    /// use puyo_duel_types::GameAction;
    ///
    /// assert_eq!(GameAction::from_str("moveLeft"), Some(GameAction::MoveLeft));
    /// assert_eq!(GameAction::from_str("rotateccw"), Some(GameAction::RotateCcw));
    /// assert_eq!(GameAction::from_str("hold"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "moveleft" => Some(GameAction::MoveLeft),
            "moveright" => Some(GameAction::MoveRight),
            "rotatecw" => Some(GameAction::RotateCw),
            "rotateccw" => Some(GameAction::RotateCcw),
            "softdrop" => Some(GameAction::SoftDrop),
            "quickdrop" => Some(GameAction::QuickDrop),
            _ => None,
        }
    }

    /// Convert to camelCase string for AI protocol
    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::MoveLeft => "moveLeft",
            GameAction::MoveRight => "moveRight",
            GameAction::RotateCw => "rotateCw",
            GameAction::RotateCcw => "rotateCcw",
            GameAction::SoftDrop => "softDrop",
            GameAction::QuickDrop => "quickDrop",
        }
    }
}

/// Tag of the current turn phase, as seen by observers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    FreeControl,
    Settling,
    GarbageExchange,
    GameOver,
}

impl PhaseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseKind::FreeControl => "free_control",
            PhaseKind::Settling => "settling",
            PhaseKind::GarbageExchange => "garbage_exchange",
            PhaseKind::GameOver => "game_over",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timing_defaults() {
        assert_eq!(LOCK_DELAY_FRAMES, 100);
        assert_eq!(SOFT_DROP_LOCK_PENALTY, 10);
        assert_eq!(FALL_FRAMES, 20);
        assert_eq!(CHAIN_FRAMES, 30);
        assert_eq!(GARBAGE_WAIT_FRAMES, 20);
        assert_eq!(GARBAGE_RATE, 70);
        assert_eq!(GARBAGE_MAX_DROP, 30);
    }

    #[test]
    fn rotation_cycle_wraps() {
        let mut r = Rotation::Vertical;
        for _ in 0..4 {
            r = r.rotate_cw();
        }
        assert_eq!(r, Rotation::Vertical);
        assert_eq!(Rotation::HorizontalLeft.rotate(2), Rotation::HorizontalRight);
        assert_eq!(Rotation::Vertical.rotate(-2), Rotation::VerticalInverse);
        assert_eq!(Rotation::Vertical.turns_to(Rotation::HorizontalLeft), 3);
        assert_eq!(Rotation::HorizontalLeft.turns_to(Rotation::Vertical), 1);
    }

    #[test]
    fn placements_are_distinct_and_in_field() {
        for (i, a) in ALL_PLACEMENTS.iter().enumerate() {
            assert!(a.is_in_field(), "{:?} leaves the field", a);
            for b in &ALL_PLACEMENTS[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn cell_codes() {
        assert_eq!(cell_code(None), 0);
        assert_eq!(cell_code(Some(Puyo::Red)), 1);
        assert_eq!(cell_code(Some(Puyo::Garbage)), 5);
    }
}
