//! Chain engine - connected groups, cascade steps and cascades
//!
//! A connected group grows over 4-neighbour adjacency between cells of the
//! same color. Garbage next to any cell of the group is swept along with it,
//! but it never counts toward the pop threshold and the fill never continues
//! past it, so garbage cannot join two groups into one.
//!
//! All fills use an explicit worklist bounded by the field size.

use arrayvec::ArrayVec;
use puyo_duel_types::{Puyo, FIELD_HEIGHT, FIELD_SIZE, FIELD_WIDTH, MAX_CONNECTIONS, POP_THRESHOLD};

use crate::field::Field;
use crate::scoring::{calculate_score, ScoreResult};

/// Cell list sized for the whole field
pub type CellList = ArrayVec<(usize, usize), FIELD_SIZE>;

/// Cells of one connected group
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Connection {
    /// Colored cells of the group
    pub colored: CellList,
    /// Garbage cells swept along with the group
    pub garbage: CellList,
}

impl Connection {
    pub fn len(&self) -> usize {
        self.colored.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colored.is_empty() && self.garbage.is_empty()
    }

    /// Whether the group is large enough to pop
    pub fn pops(&self) -> bool {
        self.colored.len() >= POP_THRESHOLD
    }
}

/// One cascade step: groups removed together and the step index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    connections: ArrayVec<(Puyo, usize), MAX_CONNECTIONS>,
    chain_num: u32,
}

impl Chain {
    /// Create an empty step with a 1-based index
    pub fn new(chain_num: u32) -> Self {
        Self {
            connections: ArrayVec::new(),
            chain_num,
        }
    }

    /// Record one popped group
    pub fn push_connection(&mut self, puyo: Puyo, count: usize) {
        assert!(puyo.is_color(), "garbage cannot form a connection");
        assert!(count >= POP_THRESHOLD, "group of {} cannot pop", count);
        self.connections.push((puyo, count));
    }

    pub fn connections(&self) -> &[(Puyo, usize)] {
        &self.connections
    }

    pub fn chain_num(&self) -> u32 {
        self.chain_num
    }

    /// True when nothing popped ("no chain")
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Colored cells removed by this step
    pub fn cells_removed(&self) -> usize {
        self.connections.iter().map(|&(_, count)| count).sum()
    }

    pub fn score_breakdown(&self) -> ScoreResult {
        calculate_score(self.chain_num, &self.connections)
    }

    pub fn score(&self) -> u32 {
        self.score_breakdown().total
    }
}

/// Total score of a cascade
pub fn total_score(chains: &[Chain]) -> u32 {
    chains.iter().map(Chain::score).sum()
}

fn neighbors(x: usize, y: usize) -> ArrayVec<(usize, usize), 4> {
    let mut out = ArrayVec::new();
    if x > 0 {
        out.push((x - 1, y));
    }
    if x + 1 < FIELD_WIDTH {
        out.push((x + 1, y));
    }
    if y > 0 {
        out.push((x, y - 1));
    }
    if y + 1 < FIELD_HEIGHT {
        out.push((x, y + 1));
    }
    out
}

/// Collect the group containing (x, y) without modifying the field
///
/// `visited` is keyed by flat index and is shared across calls so that a
/// colored cell belongs to at most one group. Garbage cells are tracked per
/// group, so one garbage cell can be swept by several groups.
fn collect_connection(field: &Field, x: usize, y: usize, visited: &mut [bool; FIELD_SIZE]) -> Connection {
    let mut conn = Connection::default();
    let Some(seed) = field.get(x, y) else {
        return conn;
    };
    if !seed.is_color() {
        conn.garbage.push((x, y));
        return conn;
    }

    let mut garbage_seen = [false; FIELD_SIZE];
    let mut stack: CellList = ArrayVec::new();
    visited[y * FIELD_WIDTH + x] = true;
    conn.colored.push((x, y));
    stack.push((x, y));

    while let Some((cx, cy)) = stack.pop() {
        for (nx, ny) in neighbors(cx, cy) {
            let idx = ny * FIELD_WIDTH + nx;
            match field.get(nx, ny) {
                Some(p) if p == seed && !visited[idx] => {
                    visited[idx] = true;
                    conn.colored.push((nx, ny));
                    stack.push((nx, ny));
                }
                Some(Puyo::Garbage) if !garbage_seen[idx] => {
                    garbage_seen[idx] = true;
                    conn.garbage.push((nx, ny));
                }
                _ => {}
            }
        }
    }
    conn
}

fn erase(field: &mut Field, conn: &Connection) {
    for &(x, y) in conn.colored.iter().chain(conn.garbage.iter()) {
        field.set(x, y, None);
    }
}

/// Remove the group containing (x, y) regardless of its size
///
/// Returns the removed cells. An empty cell removes nothing and a garbage
/// seed removes only itself.
///
/// # Examples
///
/// ```
/// use puyo_duel_core::{chain::delete_connection, Field};
///
/// let mut field = Field::from_rows(&[
///     "RX....",
///     "RRB...",
/// ]);
/// let conn = delete_connection(&mut field, 0, 0);
/// assert_eq!(conn.colored.len(), 3);
/// assert_eq!(conn.garbage.len(), 1);
/// assert!(field.get(2, 0).is_some());
/// ```
pub fn delete_connection(field: &mut Field, x: usize, y: usize) -> Connection {
    let mut visited = [false; FIELD_SIZE];
    let conn = collect_connection(field, x, y, &mut visited);
    erase(field, &conn);
    conn
}

/// Run one elimination pass
///
/// Every touched colored cell seeds a group; groups are computed on the
/// unmodified field so each one is counted once, then every group of at
/// least [`POP_THRESHOLD`] colored cells is removed together with its
/// garbage. Connections are recorded in scan order, row-major from the floor.
pub fn resolve_step(field: &mut Field, chain_num: u32) -> Chain {
    let mut chain = Chain::new(chain_num);
    let mut visited = [false; FIELD_SIZE];
    let mut popped: ArrayVec<Connection, MAX_CONNECTIONS> = ArrayVec::new();

    for y in 0..FIELD_HEIGHT {
        for x in 0..FIELD_WIDTH {
            if !field.is_touched(x, y) || visited[y * FIELD_WIDTH + x] {
                continue;
            }
            let Some(puyo) = field.get(x, y) else {
                continue;
            };
            if !puyo.is_color() {
                continue;
            }
            let conn = collect_connection(field, x, y, &mut visited);
            if conn.pops() {
                chain.push_connection(puyo, conn.len());
                popped.push(conn);
            }
        }
    }

    for conn in &popped {
        erase(field, conn);
    }
    chain
}

/// Run the full cascade: gravity then a pass, until a pass pops nothing
///
/// Terminates because every non-empty pass removes at least four cells.
pub fn resolve_all(field: &mut Field) -> Vec<Chain> {
    let mut chains = Vec::new();
    loop {
        field.apply_gravity();
        let chain = resolve_step(field, chains.len() as u32 + 1);
        if chain.is_empty() {
            return chains;
        }
        chains.push(chain);
    }
}

/// Cascade depth per cell, indexed `[y][x]`
///
/// For every colored cell, the number of cascade steps that would follow if
/// its group were removed. Empty and garbage cells stay 0. The field is not
/// modified.
pub fn project_chain_depth(field: &Field) -> [[usize; FIELD_WIDTH]; FIELD_HEIGHT] {
    let mut depth = [[0usize; FIELD_WIDTH]; FIELD_HEIGHT];
    let mut done = [false; FIELD_SIZE];

    for y in 0..FIELD_HEIGHT {
        for x in 0..FIELD_WIDTH {
            if done[y * FIELD_WIDTH + x] {
                continue;
            }
            match field.get(x, y) {
                Some(puyo) if puyo.is_color() => {}
                _ => continue,
            }

            let mut scratch = field.clone();
            scratch.clear_touched();
            let seed = delete_connection(&mut scratch, x, y);
            let steps = resolve_all(&mut scratch).len();
            for &(cx, cy) in &seed.colored {
                depth[cy][cx] = steps;
                done[cy * FIELD_WIDTH + cx] = true;
            }
        }
    }
    depth
}
