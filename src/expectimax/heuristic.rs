use std::sync::OnceLock;

use crate::engine::{AgentBrain, Pos, GRID_SIZE};

/// Bonus per empty cell. Dominates the positional term, so keeping the board
/// open is the primary driver at shallow search depth.
pub const EMPTY_CELL_WEIGHT: f64 = 32768.0;

type Mask = [[f64; GRID_SIZE]; GRID_SIZE];

/// Per-mask scale factors applied to the five positional running sums.
///
/// The defaults reproduce the tuned agent: only the snake mask contributes;
/// the four corner-bias masks are computed but scaled to zero. Raising a
/// corner weight re-enables that bias without code changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskWeights {
    pub top_right: f64,
    pub top_left: f64,
    pub bottom_right: f64,
    pub bottom_left: f64,
    pub snake: f64,
}

impl Default for MaskWeights {
    fn default() -> Self {
        Self { top_right: 0.0, top_left: 0.0, bottom_right: 0.0, bottom_left: 0.0, snake: 1.0 }
    }
}

struct Masks {
    top_right: Mask,
    top_left: Mask,
    bottom_right: Mask,
    bottom_left: Mask,
    snake: Mask,
}

/// Monotonic snake ordering: the dominant tile belongs in the top-left,
/// values zig-zagging down by row.
const SNAKE: Mask = [
    [32768.0, 16384.0, 8192.0, 4096.0],
    [256.0, 512.0, 1024.0, 2048.0],
    [128.0, 64.0, 32.0, 16.0],
    [2.0, 2.0, 4.0, 8.0],
];

static MASKS: OnceLock<Masks> = OnceLock::new();

fn masks() -> &'static Masks {
    MASKS.get_or_init(|| Masks {
        top_right: corner_mask(0, GRID_SIZE as i32 - 1),
        top_left: corner_mask(0, 0),
        bottom_right: corner_mask(GRID_SIZE as i32 - 1, GRID_SIZE as i32 - 1),
        bottom_left: corner_mask(GRID_SIZE as i32 - 1, 0),
        snake: SNAKE,
    })
}

/// Corner-bias gradient: 20 on the anchor corner, then 5/2/1 per
/// Chebyshev-distance ring away from it.
fn corner_mask(anchor_row: i32, anchor_col: i32) -> Mask {
    const RINGS: [f64; GRID_SIZE] = [20.0, 5.0, 2.0, 1.0];
    let mut mask = [[0.0; GRID_SIZE]; GRID_SIZE];
    for (row, cols) in mask.iter_mut().enumerate() {
        for (col, cell) in cols.iter_mut().enumerate() {
            let dist = (row as i32 - anchor_row).abs().max((col as i32 - anchor_col).abs());
            *cell = RINGS[dist as usize];
        }
    }
    mask
}

/// Static leaf evaluation.
///
/// For each occupied cell, `log2(value) * mask(row, col)` accumulates into
/// five running sums (four corner biases plus the snake mask), each scaled
/// by its [`MaskWeights`] entry. The result is the best of the five sums,
/// plus the simulated score, plus [`EMPTY_CELL_WEIGHT`] per empty cell.
pub fn evaluate(brain: &AgentBrain, weights: &MaskWeights) -> f64 {
    let masks = masks();
    let terms: [(&Mask, f64); 5] = [
        (&masks.top_right, weights.top_right),
        (&masks.top_left, weights.top_left),
        (&masks.bottom_right, weights.bottom_right),
        (&masks.bottom_left, weights.bottom_left),
        (&masks.snake, weights.snake),
    ];
    let mut sums = [0.0f64; 5];

    for row in 0..GRID_SIZE {
        for col in 0..GRID_SIZE {
            let tile = match brain.grid().cell_at(Pos::new(row as i32, col as i32)) {
                Some(tile) => tile,
                None => continue,
            };
            debug_assert!(
                tile.value >= 2 && tile.value.is_power_of_two(),
                "evaluator requires power-of-two tile values"
            );
            let magnitude = f64::from(tile.value).log2();
            for (sum, (mask, weight)) in sums.iter_mut().zip(terms.iter()) {
                *sum += magnitude * mask[row][col] * weight;
            }
        }
    }

    let positional = sums.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    positional + brain.score() as f64 + EMPTY_CELL_WEIGHT * brain.grid().count_empty() as f64
}
