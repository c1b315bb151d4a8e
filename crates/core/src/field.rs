//! Field module - manages the game grid
//!
//! The field is a 6x13 grid where each cell can be empty, one of four colors,
//! or garbage. Uses a flat array for cache locality and zero allocation.
//! Coordinates: (x, y) where x ranges 0..5 (left to right) and y ranges 0..12
//! from the floor upward.
//!
//! Every write marks the cell as touched. The flags are cleared when a pair is
//! written, so a cascade scan only has to seed from cells that changed.
//!
//! Out-of-range access is a programming error and panics.

use puyo_duel_types::{
    Cell, Placement, Puyo, Rotation, FIELD_HEIGHT, FIELD_SIZE, FIELD_WIDTH, GAME_OVER_CELL,
};

/// The game field - 6 columns x 13 rows using flat array storage
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    /// Flat array of cells, row-major order (y * WIDTH + x), row 0 at the floor
    cells: [Cell; FIELD_SIZE],
    /// Parallel "touched since last clear" flags
    touched: [bool; FIELD_SIZE],
}

impl Field {
    /// Create a new empty field
    pub fn new() -> Self {
        Self {
            cells: [None; FIELD_SIZE],
            touched: [false; FIELD_SIZE],
        }
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(x: usize, y: usize) -> usize {
        assert!(
            Self::in_range(x, y),
            "field access out of range: ({}, {})",
            x,
            y
        );
        y * FIELD_WIDTH + x
    }

    /// Whether (x, y) lies inside the field
    #[inline]
    pub fn in_range(x: usize, y: usize) -> bool {
        x < FIELD_WIDTH && y < FIELD_HEIGHT
    }

    pub fn width(&self) -> usize {
        FIELD_WIDTH
    }

    pub fn height(&self) -> usize {
        FIELD_HEIGHT
    }

    /// Get cell at position (x, y)
    pub fn get(&self, x: usize, y: usize) -> Cell {
        self.cells[Self::index(x, y)]
    }

    /// Set cell at position (x, y) and mark it as touched
    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        let idx = Self::index(x, y);
        self.cells[idx] = cell;
        self.touched[idx] = true;
    }

    pub fn is_empty_at(&self, x: usize, y: usize) -> bool {
        self.get(x, y).is_none()
    }

    /// Whether the cell changed since the last [`Field::clear_touched`]
    pub fn is_touched(&self, x: usize, y: usize) -> bool {
        self.touched[Self::index(x, y)]
    }

    pub fn clear_touched(&mut self) {
        self.touched = [false; FIELD_SIZE];
    }

    /// Row just above the topmost occupied cell of column `x` (0 if empty)
    pub fn column_height(&self, x: usize) -> usize {
        (0..FIELD_HEIGHT)
            .rev()
            .find(|&y| self.get(x, y).is_some())
            .map_or(0, |y| y + 1)
    }

    /// Rows the pivot and satellite would come to rest on for a placement
    ///
    /// Either row may be `FIELD_HEIGHT` or above when the column is full.
    pub fn landing_rows(&self, placement: Placement) -> (usize, usize) {
        let pivot_x = usize::try_from(placement.x).expect("pivot column is negative");
        let satellite_x =
            usize::try_from(placement.satellite_x()).expect("satellite column is negative");

        let mut pivot = self.column_height(pivot_x);
        let mut satellite = self.column_height(satellite_x);
        match placement.rotation {
            Rotation::Vertical => satellite += 1,
            Rotation::VerticalInverse => pivot += 1,
            Rotation::HorizontalLeft | Rotation::HorizontalRight => {}
        }
        (pivot, satellite)
    }

    /// Compact every column downward
    ///
    /// Returns true if any cell moved. Moved cells are marked as touched.
    pub fn apply_gravity(&mut self) -> bool {
        let mut moved = false;
        for x in 0..FIELD_WIDTH {
            let mut write_y = 0;
            for read_y in 0..FIELD_HEIGHT {
                let Some(puyo) = self.get(x, read_y) else {
                    continue;
                };
                if write_y != read_y {
                    self.set(x, write_y, Some(puyo));
                    self.set(x, read_y, None);
                    moved = true;
                }
                write_y += 1;
            }
        }
        moved
    }

    /// Check whether the game-over cell is occupied
    pub fn is_game_over(&self) -> bool {
        let (x, y) = GAME_OVER_CELL;
        self.get(x, y).is_some()
    }

    /// Number of occupied cells
    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Number of cells holding `puyo`
    pub fn count(&self, puyo: Puyo) -> usize {
        self.cells.iter().filter(|c| **c == Some(puyo)).count()
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Write color codes into a grid indexed `[y][x]`
    pub fn write_u8_grid(&self, out: &mut [[u8; FIELD_WIDTH]; FIELD_HEIGHT]) {
        for (y, row) in out.iter_mut().enumerate() {
            for (x, code) in row.iter_mut().enumerate() {
                *code = puyo_duel_types::cell_code(self.get(x, y));
            }
        }
    }

    /// Clear the entire field
    pub fn clear(&mut self) {
        self.cells = [None; FIELD_SIZE];
        self.touched = [false; FIELD_SIZE];
    }

    /// Build a field from text rows, topmost row first
    ///
    /// Rows are bottom-aligned, so fewer than 13 rows describe the lower part
    /// of the field. Each row has exactly 6 characters: `.` empty, `R` red,
    /// `B` blue, `G` green, `Y` yellow, `X` garbage. Every filled cell starts
    /// out touched.
    ///
    /// # Examples
    ///
    /// ```
    /// use puyo_duel_core::Field;
    /// use puyo_duel_types::Puyo;
    ///
    /// let field = Field::from_rows(&[
    ///     "R.....",
    ///     "RX....",
    /// ]);
    /// assert_eq!(field.get(0, 1), Some(Puyo::Red));
    /// assert_eq!(field.get(1, 0), Some(Puyo::Garbage));
    /// assert_eq!(field.column_height(0), 2);
    /// ```
    pub fn from_rows(rows: &[&str]) -> Self {
        assert!(rows.len() <= FIELD_HEIGHT, "too many rows: {}", rows.len());
        let mut field = Self::new();
        for (i, row) in rows.iter().enumerate() {
            let y = rows.len() - 1 - i;
            let chars: Vec<char> = row.chars().collect();
            assert_eq!(chars.len(), FIELD_WIDTH, "row {:?} must be 6 cells wide", row);
            for (x, ch) in chars.into_iter().enumerate() {
                let cell = match ch {
                    '.' => None,
                    'R' => Some(Puyo::Red),
                    'B' => Some(Puyo::Blue),
                    'G' => Some(Puyo::Green),
                    'Y' => Some(Puyo::Yellow),
                    'X' => Some(Puyo::Garbage),
                    other => panic!("unknown cell character {:?}", other),
                };
                if cell.is_some() {
                    field.set(x, y, cell);
                }
            }
        }
        field
    }

    /// Render as text rows, topmost row first (inverse of [`Field::from_rows`])
    pub fn to_rows(&self) -> Vec<String> {
        (0..FIELD_HEIGHT)
            .rev()
            .map(|y| {
                (0..FIELD_WIDTH)
                    .map(|x| match self.get(x, y) {
                        None => '.',
                        Some(Puyo::Red) => 'R',
                        Some(Puyo::Blue) => 'B',
                        Some(Puyo::Green) => 'G',
                        Some(Puyo::Yellow) => 'Y',
                        Some(Puyo::Garbage) => 'X',
                    })
                    .collect()
            })
            .collect()
    }
}

impl Default for Field {
    fn default() -> Self {
        Self::new()
    }
}
