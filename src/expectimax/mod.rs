//! Expectimax search policy for 2048.
//!
//! [`Expectimax`] alternates a MAX layer (the agent's own next move) with a
//! CHANCE layer (a hypothetical tile spawn averaged over every empty cell),
//! bounded to two move-plies, and scores horizon leaves with the positional
//! heuristic in [`heuristic`]. The search is single-threaded, synchronous,
//! and deterministic; every branch runs on its own copy of the simulation.
//!
//! Quick start
//! ```
//! use agent_2048::engine::{Grid, Pos, Tile};
//! use agent_2048::expectimax::{Expectimax, SearchConfig};
//!
//! let mut grid = Grid::new();
//! grid.insert_tile(Tile::new(Pos::new(0, 0), 2));
//! grid.insert_tile(Tile::new(Pos::new(1, 0), 2));
//!
//! let mut policy = Expectimax::new();
//! let direction = policy.select_move(&grid, 0);
//! assert!(direction.is_some());
//!
//! // same snapshot, same answer
//! assert_eq!(policy.select_move(&grid, 0), direction);
//! ```

pub mod heuristic;
mod search;

pub use heuristic::{evaluate, MaskWeights, EMPTY_CELL_WEIGHT};
pub use search::{Expectimax, SEARCH_DEPTH_LIMIT};

use crate::engine::Move;

/// Configurable knobs for the search. Defaults preserve the tuned agent.
///
/// - `depth_limit`: a node deeper than this is scored statically
///   ([`SEARCH_DEPTH_LIMIT`] plies of the agent's own moves by default).
/// - `node_budget`: optional cap on nodes per decision; past it, nodes fall
///   back to the heuristic value instead of expanding.
/// - `model_four_spawns`: weight chance branches 90/10 over 2-vs-4 spawns
///   instead of sampling only 2s (slower, closer to the real game).
/// - `weights`: per-mask scale factors for the static evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchConfig {
    pub depth_limit: u32,
    pub node_budget: Option<u64>,
    pub model_four_spawns: bool,
    pub weights: MaskWeights,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth_limit: SEARCH_DEPTH_LIMIT,
            node_budget: None,
            model_four_spawns: false,
            weights: MaskWeights::default(),
        }
    }
}

/// Per-direction expected value at the root (no normalization).
///
/// `legal` is false when the direction is a no-op for the snapshot; its `ev`
/// then holds the 0.0 sentinel.
#[derive(Debug, Clone, Copy)]
pub struct BranchEval {
    pub dir: Move,
    pub ev: f64,
    pub legal: bool,
}

/// Basic search stats for a single decision.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchStats {
    pub nodes: u64,
    pub peak_nodes: u64,
}
