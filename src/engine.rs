use rand::Rng;
use std::fmt;

/// Board side length. Masks and traversals assume this size.
pub const GRID_SIZE: usize = 4;

/// A direction to move/merge tiles.
///
/// Discriminants fix the direction ordering used everywhere a tie has to
/// break deterministically: `Up = 0`, `Right = 1`, `Down = 2`, `Left = 3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Up = 0,
    Right = 1,
    Down = 2,
    Left = 3,
}

impl Move {
    /// All directions in index order.
    pub const ALL: [Move; 4] = [Move::Up, Move::Right, Move::Down, Move::Left];

    /// Unit `(Δrow, Δcol)` vector for this direction.
    #[inline]
    pub fn vector(self) -> (i32, i32) {
        match self {
            Move::Up => (-1, 0),
            Move::Right => (0, 1),
            Move::Down => (1, 0),
            Move::Left => (0, -1),
        }
    }
}

/// A cell coordinate. Components are signed so a farthest-position scan can
/// step past the edge before `Grid::within_bounds` rejects the step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pos {
    pub row: i32,
    pub col: i32,
}

impl Pos {
    #[inline]
    pub fn new(row: i32, col: i32) -> Self {
        Pos { row, col }
    }

    #[inline]
    fn step(self, vector: (i32, i32)) -> Self {
        Pos::new(self.row + vector.0, self.col + vector.1)
    }
}

/// A placed tile: a power-of-two value at a position.
///
/// `merged_from` records the pair of source values when this tile was
/// produced by a merge during the current move; it gates "at most one merge
/// per tile per move" and is cleared at the start of every move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub pos: Pos,
    pub value: u32,
    pub merged_from: Option<[u32; 2]>,
}

impl Tile {
    /// A fresh (non-merged) tile.
    #[inline]
    pub fn new(pos: Pos, value: u32) -> Self {
        debug_assert!(value >= 2 && value.is_power_of_two(), "tile value must be a power of two >= 2");
        Tile { pos, value, merged_from: None }
    }
}

/// 4x4 tile grid.
///
/// `Copy`: every search branch operates on its own deep copy, so no branch
/// can observe another branch's mutation.
///
/// ```
/// use agent_2048::engine::{Grid, Pos, Tile};
/// let mut grid = Grid::new();
/// grid.insert_tile(Tile::new(Pos::new(0, 0), 2));
/// assert_eq!(grid.available_cells().len(), 15);
/// assert_eq!(grid.cell_at(Pos::new(0, 0)).unwrap().value, 2);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Grid {
    cells: [[Option<Tile>; GRID_SIZE]; GRID_SIZE],
}

impl Grid {
    /// An empty grid.
    pub fn new() -> Self {
        Grid::default()
    }

    #[inline]
    pub fn within_bounds(&self, pos: Pos) -> bool {
        pos.row >= 0 && pos.row < GRID_SIZE as i32 && pos.col >= 0 && pos.col < GRID_SIZE as i32
    }

    /// The tile at `pos`, or `None` if the cell is empty or out of bounds.
    #[inline]
    pub fn cell_at(&self, pos: Pos) -> Option<Tile> {
        if !self.within_bounds(pos) {
            return None;
        }
        self.cells[pos.row as usize][pos.col as usize]
    }

    /// All empty cells in row-major order, so repeated evaluation of the same
    /// grid enumerates chance branches identically.
    pub fn available_cells(&self) -> Vec<Pos> {
        let mut cells = Vec::with_capacity(GRID_SIZE * GRID_SIZE);
        for row in 0..GRID_SIZE {
            for col in 0..GRID_SIZE {
                if self.cells[row][col].is_none() {
                    cells.push(Pos::new(row as i32, col as i32));
                }
            }
        }
        cells
    }

    /// Number of empty cells.
    pub fn count_empty(&self) -> usize {
        self.cells.iter().flatten().filter(|c| c.is_none()).count()
    }

    /// Number of occupied cells.
    pub fn count_occupied(&self) -> usize {
        GRID_SIZE * GRID_SIZE - self.count_empty()
    }

    /// Highest tile value on the grid (0 when empty).
    pub fn highest_tile(&self) -> u32 {
        self.cells.iter().flatten().flatten().map(|t| t.value).max().unwrap_or(0)
    }

    /// Place `tile` at its recorded position. The target cell must be empty.
    pub fn insert_tile(&mut self, tile: Tile) {
        debug_assert!(self.within_bounds(tile.pos), "tile position out of bounds");
        debug_assert!(self.cell_at(tile.pos).is_none(), "insert into occupied cell");
        debug_assert!(tile.value >= 2 && tile.value.is_power_of_two(), "tile value must be a power of two >= 2");
        self.cells[tile.pos.row as usize][tile.pos.col as usize] = Some(tile);
    }

    #[inline]
    fn set(&mut self, pos: Pos, tile: Option<Tile>) {
        debug_assert!(self.within_bounds(pos), "cell position out of bounds");
        self.cells[pos.row as usize][pos.col as usize] = tile;
    }

    fn move_tile(&mut self, from: Pos, to: Pos) {
        let mut tile = self.cells[from.row as usize][from.col as usize]
            .take()
            .expect("moving from an empty cell");
        tile.pos = to;
        debug_assert!(self.cell_at(to).is_none(), "moving onto an occupied cell");
        self.set(to, Some(tile));
    }

    fn clear_merge_markers(&mut self) {
        for tile in self.cells.iter_mut().flatten().flatten() {
            tile.merged_from = None;
        }
    }

    /// Farthest empty position reachable from `start` along `vector`, plus
    /// the first obstacle cell past it (possibly out of bounds).
    fn farthest_position(&self, start: Pos, vector: (i32, i32)) -> (Pos, Pos) {
        let mut farthest = start;
        let mut next = start.step(vector);
        while self.within_bounds(next) && self.cell_at(next).is_none() {
            farthest = next;
            next = next.step(vector);
        }
        (farthest, next)
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let vals: Vec<u32> = self
            .cells
            .iter()
            .flatten()
            .map(|c| c.map_or(0, |t| t.value))
            .collect();
        write!(f, "Grid({:?})", vals)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, row) in self.cells.iter().enumerate() {
            if idx > 0 {
                writeln!(f, "--------------------------------")?;
            }
            let line: Vec<String> = row.iter().map(|c| format_val(c.map_or(0, |t| t.value))).collect();
            writeln!(f, "{}", line.join("|"))?;
        }
        Ok(())
    }
}

fn format_val(val: u32) -> String {
    match val {
        0 => String::from("       "),
        x => {
            let mut s = x.to_string();
            while s.len() < 7 {
                match s.len() {
                    6 => s = format!(" {}", s),
                    _ => s = format!(" {} ", s),
                }
            }
            s
        }
    }
}

/// Private simulation state: a working grid and score, plus the immutable
/// snapshot both were constructed from.
///
/// Never written back to the real game; the search hands out copies and the
/// caller applies the chosen [`Move`] to its own authoritative state.
///
/// ```
/// use agent_2048::engine::{AgentBrain, Grid, Move, Pos, Tile};
/// let mut grid = Grid::new();
/// grid.insert_tile(Tile::new(Pos::new(0, 0), 2));
/// grid.insert_tile(Tile::new(Pos::new(0, 1), 2));
/// let mut brain = AgentBrain::from_snapshot(grid, 0);
/// assert!(brain.apply_move(Move::Left));
/// assert_eq!(brain.score(), 4);
/// assert_eq!(brain.grid().cell_at(Pos::new(0, 0)).unwrap().value, 4);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AgentBrain {
    snapshot: Grid,
    snapshot_score: u64,
    grid: Grid,
    score: u64,
}

impl AgentBrain {
    /// Construct a simulator from an immutable board snapshot.
    pub fn from_snapshot(grid: Grid, score: u64) -> Self {
        AgentBrain { snapshot: grid, snapshot_score: score, grid, score }
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn score(&self) -> u64 {
        self.score
    }

    /// Place a tile into an empty cell of the working grid; the chance layer
    /// uses this for hypothetical spawns.
    #[inline]
    pub fn insert_tile(&mut self, tile: Tile) {
        self.grid.insert_tile(tile);
    }

    /// Restore the working grid and score to the construction snapshot,
    /// dropping any transient merge markers. Lets one simulator be reused
    /// across sibling chance branches without reallocating.
    pub fn reset(&mut self) {
        self.grid = self.snapshot;
        self.score = self.snapshot_score;
    }

    /// Slide and merge tiles in `direction`, mutating this simulator's grid
    /// and score in place.
    ///
    /// Cells are traversed farthest-from-destination first so higher-priority
    /// tiles are handled before the tiles that might merge into them. Each
    /// occupied cell advances along the move vector to the farthest empty
    /// position; an equal-valued obstacle that has not already merged this
    /// move absorbs it instead (new tile = sum, score += sum).
    ///
    /// Returns true iff at least one tile moved or merged; a `false` result
    /// leaves the grid unchanged.
    pub fn apply_move(&mut self, direction: Move) -> bool {
        let vector = direction.vector();
        self.grid.clear_merge_markers();
        let mut moved = false;

        for row in traversal(vector.0) {
            for col in traversal(vector.1) {
                let start = Pos::new(row, col);
                let tile = match self.grid.cell_at(start) {
                    Some(tile) => tile,
                    None => continue,
                };
                let (farthest, next) = self.grid.farthest_position(start, vector);

                let merge_target = self
                    .grid
                    .cell_at(next)
                    .filter(|obstacle| obstacle.value == tile.value && obstacle.merged_from.is_none());

                if let Some(obstacle) = merge_target {
                    let merged = Tile {
                        pos: next,
                        value: tile.value * 2,
                        merged_from: Some([tile.value, obstacle.value]),
                    };
                    self.grid.set(start, None);
                    self.grid.set(next, Some(merged));
                    self.score += u64::from(merged.value);
                    moved = true;
                } else if farthest != start {
                    self.grid.move_tile(start, farthest);
                    moved = true;
                }
            }
        }
        moved
    }

    /// True if no direction changes the grid.
    pub fn is_game_over(&self) -> bool {
        Move::ALL.iter().all(|&direction| {
            let mut probe = *self;
            !probe.apply_move(direction)
        })
    }

    /// Spawn a 2 (90%) or 4 (10%) in a random empty cell, as the real game
    /// does between moves. No-op on a full grid.
    pub fn add_random_tile<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let cells = self.grid.available_cells();
        if cells.is_empty() {
            return;
        }
        let pos = cells[rng.gen_range(0..cells.len())];
        let value = if rng.gen_range(0..10) < 9 { 2 } else { 4 };
        self.grid.insert_tile(Tile::new(pos, value));
    }
}

/// Cell indices along one axis, reversed when the move vector points at the
/// high edge so destination-side tiles are processed first.
fn traversal(delta: i32) -> [i32; GRID_SIZE] {
    let mut order: [i32; GRID_SIZE] = std::array::from_fn(|i| i as i32);
    if delta == 1 {
        order.reverse();
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_from(rows: [[u32; 4]; 4]) -> Grid {
        let mut grid = Grid::new();
        for (r, row) in rows.iter().enumerate() {
            for (c, &val) in row.iter().enumerate() {
                if val != 0 {
                    grid.insert_tile(Tile::new(Pos::new(r as i32, c as i32), val));
                }
            }
        }
        grid
    }

    fn values(grid: &Grid) -> [[u32; 4]; 4] {
        let mut out = [[0u32; 4]; 4];
        for (r, row) in out.iter_mut().enumerate() {
            for (c, slot) in row.iter_mut().enumerate() {
                *slot = grid.cell_at(Pos::new(r as i32, c as i32)).map_or(0, |t| t.value);
            }
        }
        out
    }

    #[test]
    fn traversal_order_follows_vector() {
        assert_eq!(traversal(-1), [0, 1, 2, 3]);
        assert_eq!(traversal(0), [0, 1, 2, 3]);
        assert_eq!(traversal(1), [3, 2, 1, 0]);
    }

    #[test]
    fn noop_move_returns_false_and_leaves_grid_unchanged() {
        let grid = grid_from([[2, 4, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
        let mut brain = AgentBrain::from_snapshot(grid, 10);
        assert!(!brain.apply_move(Move::Left));
        assert_eq!(*brain.grid(), grid);
        assert_eq!(brain.score(), 10);
    }

    #[test]
    fn adjacent_pair_merges_left() {
        let grid = grid_from([[2, 2, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
        let mut brain = AgentBrain::from_snapshot(grid, 0);
        assert!(brain.apply_move(Move::Left));
        assert_eq!(values(brain.grid())[0], [4, 0, 0, 0]);
        assert_eq!(brain.score(), 4);
        assert_eq!(brain.grid().count_occupied(), 1);
    }

    #[test]
    fn merge_conserves_occupancy_and_score() {
        let grid = grid_from([[8, 0, 0, 8], [0, 0, 0, 0], [2, 0, 0, 0], [0, 0, 0, 0]]);
        let mut brain = AgentBrain::from_snapshot(grid, 0);
        let before = brain.grid().count_occupied();
        assert!(brain.apply_move(Move::Right));
        assert_eq!(brain.grid().count_occupied(), before - 1);
        assert_eq!(brain.score(), 16);
        assert_eq!(values(brain.grid())[0], [0, 0, 0, 16]);
    }

    #[test]
    fn three_in_a_row_merges_only_leading_pair() {
        let grid = grid_from([[2, 2, 2, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
        let mut brain = AgentBrain::from_snapshot(grid, 0);
        assert!(brain.apply_move(Move::Left));
        assert_eq!(values(brain.grid())[0], [4, 2, 0, 0]);
        assert_eq!(brain.score(), 4);
    }

    #[test]
    fn full_row_merges_adjacent_pairs_only() {
        let grid = grid_from([[2, 2, 2, 2], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
        let mut brain = AgentBrain::from_snapshot(grid, 0);
        assert!(brain.apply_move(Move::Left));
        assert_eq!(values(brain.grid())[0], [4, 4, 0, 0]);
        assert_eq!(brain.score(), 8);
    }

    #[test]
    fn slide_without_merge_scores_nothing() {
        let grid = grid_from([[0, 0, 0, 2], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
        let mut brain = AgentBrain::from_snapshot(grid, 0);
        assert!(brain.apply_move(Move::Left));
        assert_eq!(values(brain.grid())[0], [2, 0, 0, 0]);
        assert_eq!(brain.score(), 0);
    }

    #[test]
    fn vertical_moves_use_column_traversal() {
        let grid = grid_from([[2, 0, 0, 0], [2, 0, 0, 0], [4, 0, 0, 0], [0, 0, 0, 0]]);
        let mut brain = AgentBrain::from_snapshot(grid, 0);
        assert!(brain.apply_move(Move::Down));
        let vals = values(brain.grid());
        assert_eq!([vals[0][0], vals[1][0], vals[2][0], vals[3][0]], [0, 0, 4, 4]);
        assert_eq!(brain.score(), 4);
    }

    #[test]
    fn available_plus_occupied_covers_grid() {
        let grid = grid_from([[2, 0, 4, 0], [0, 8, 0, 0], [0, 0, 0, 2], [16, 0, 0, 0]]);
        assert_eq!(grid.available_cells().len() + grid.count_occupied(), GRID_SIZE * GRID_SIZE);
        let mut brain = AgentBrain::from_snapshot(grid, 0);
        brain.apply_move(Move::Up);
        let grid = brain.grid();
        assert_eq!(grid.available_cells().len() + grid.count_occupied(), GRID_SIZE * GRID_SIZE);
    }

    #[test]
    fn available_cells_are_row_major() {
        let grid = grid_from([[2, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
        let cells = grid.available_cells();
        assert_eq!(cells[0], Pos::new(0, 1));
        assert_eq!(cells[1], Pos::new(0, 2));
        assert_eq!(*cells.last().unwrap(), Pos::new(3, 3));
    }

    #[test]
    fn cell_at_out_of_bounds_is_none() {
        let grid = grid_from([[2, 2, 2, 2]; 4]);
        assert!(grid.cell_at(Pos::new(-1, 0)).is_none());
        assert!(grid.cell_at(Pos::new(0, 4)).is_none());
        assert!(!grid.within_bounds(Pos::new(4, 0)));
    }

    #[test]
    fn reset_restores_snapshot() {
        let grid = grid_from([[2, 2, 0, 0], [0, 4, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
        let mut brain = AgentBrain::from_snapshot(grid, 20);
        brain.apply_move(Move::Left);
        assert_ne!(*brain.grid(), grid);
        brain.reset();
        assert_eq!(*brain.grid(), grid);
        assert_eq!(brain.score(), 20);
    }

    #[test]
    fn merge_markers_cleared_between_moves() {
        let grid = grid_from([[2, 2, 4, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
        let mut brain = AgentBrain::from_snapshot(grid, 0);
        assert!(brain.apply_move(Move::Left));
        assert_eq!(values(brain.grid())[0], [4, 4, 0, 0]);
        // the 4 produced above must be allowed to merge on the next move
        assert!(brain.apply_move(Move::Left));
        assert_eq!(values(brain.grid())[0], [8, 0, 0, 0]);
        assert_eq!(brain.score(), 4 + 8);
    }

    #[test]
    fn game_over_detection() {
        let blocked = grid_from([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
        assert!(AgentBrain::from_snapshot(blocked, 0).is_game_over());
        let open = grid_from([[2, 2, 4, 8], [4, 8, 16, 2], [2, 4, 8, 16], [4, 2, 4, 2]]);
        assert!(!AgentBrain::from_snapshot(open, 0).is_game_over());
    }

    #[test]
    fn random_tile_fills_an_empty_cell() {
        use rand::{rngs::StdRng, SeedableRng};
        let mut rng = StdRng::seed_from_u64(42);
        let mut brain = AgentBrain::from_snapshot(Grid::new(), 0);
        for _ in 0..16 {
            brain.add_random_tile(&mut rng);
        }
        assert_eq!(brain.grid().count_empty(), 0);
        assert!(brain.grid().highest_tile() <= 4);
        // full grid: spawning is a no-op, not a panic
        brain.add_random_tile(&mut rng);
    }
}
