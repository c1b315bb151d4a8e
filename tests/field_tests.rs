//! Field tests - grid access, gravity and landing rows

use puyo_duel::core::Field;
use puyo_duel::types::{Placement, Puyo, Rotation, FIELD_HEIGHT, FIELD_WIDTH};

#[test]
fn test_field_new_empty() {
    let field = Field::new();
    assert_eq!(field.width(), FIELD_WIDTH);
    assert_eq!(field.height(), FIELD_HEIGHT);
    for y in 0..FIELD_HEIGHT {
        for x in 0..FIELD_WIDTH {
            assert!(field.is_empty_at(x, y), "cell ({}, {}) should be empty", x, y);
        }
    }
    assert_eq!(field.occupied(), 0);
    assert!(!field.is_game_over());
}

#[test]
fn test_in_range() {
    assert!(Field::in_range(0, 0));
    assert!(Field::in_range(5, 12));
    assert!(!Field::in_range(6, 0));
    assert!(!Field::in_range(0, 13));
}

#[test]
fn test_landing_rows_per_rotation() {
    let field = Field::from_rows(&[
        "..R...", //
        "..RB..",
    ]);
    assert_eq!(field.landing_rows(Placement::new(2, Rotation::Vertical)), (2, 3));
    assert_eq!(
        field.landing_rows(Placement::new(2, Rotation::VerticalInverse)),
        (3, 2)
    );
    assert_eq!(
        field.landing_rows(Placement::new(2, Rotation::HorizontalRight)),
        (2, 1)
    );
    assert_eq!(
        field.landing_rows(Placement::new(2, Rotation::HorizontalLeft)),
        (2, 0)
    );
}

#[test]
fn test_game_over_cell() {
    let mut field = Field::new();
    field.set(2, 11, Some(Puyo::Garbage));
    assert!(field.is_game_over());

    let mut field = Field::new();
    field.set(2, 12, Some(Puyo::Red));
    field.set(1, 11, Some(Puyo::Red));
    assert!(!field.is_game_over());
}

#[test]
fn test_rows_round_trip_text() {
    let rows = ["Y.....", "RBGYX."];
    let field = Field::from_rows(&rows);
    let text = field.to_rows();
    assert_eq!(text.len(), FIELD_HEIGHT);
    assert_eq!(text[FIELD_HEIGHT - 2], "Y.....");
    assert_eq!(text[FIELD_HEIGHT - 1], "RBGYX.");
    assert_eq!(field.count(Puyo::Garbage), 1);
}

#[test]
fn test_u8_grid_codes() {
    let field = Field::from_rows(&["RBGYX."]);
    let mut grid = [[0u8; FIELD_WIDTH]; FIELD_HEIGHT];
    field.write_u8_grid(&mut grid);
    assert_eq!(grid[0], [1, 2, 3, 4, 5, 0]);
    assert_eq!(grid[1], [0; FIELD_WIDTH]);
}
