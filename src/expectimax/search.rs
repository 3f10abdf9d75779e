use crate::engine::{AgentBrain, Grid, Move, Tile};

use super::heuristic::evaluate;
use super::{BranchEval, SearchConfig, SearchStats};

/// How many of the agent's own moves to look ahead before scoring
/// statically; a node with `depth > SEARCH_DEPTH_LIMIT` is a leaf.
pub const SEARCH_DEPTH_LIMIT: u32 = 1;

/// Expectimax move-selection policy.
///
/// Deterministic: the search only ever samples hypothetical spawns, so two
/// calls on identical snapshots return the same direction.
///
/// ```
/// use agent_2048::engine::{Grid, Move, Pos, Tile};
/// use agent_2048::expectimax::Expectimax;
///
/// let mut grid = Grid::new();
/// grid.insert_tile(Tile::new(Pos::new(0, 0), 2));
/// grid.insert_tile(Tile::new(Pos::new(0, 1), 2));
/// let mut policy = Expectimax::new();
/// assert!(policy.select_move(&grid, 0).is_some());
/// assert!(policy.select_move(&Grid::new(), 0).is_none());
/// ```
pub struct Expectimax {
    cfg: SearchConfig,
    stats: SearchStats,
}

impl Expectimax {
    pub fn new() -> Self {
        Self::with_config(SearchConfig::default())
    }

    pub fn with_config(cfg: SearchConfig) -> Self {
        Self { cfg, stats: SearchStats::default() }
    }

    /// Pick the best direction for `snapshot` at `score`, or `None` when no
    /// direction is legal (terminal board).
    ///
    /// Each direction is tried on its own simulation; a no-op direction keeps
    /// the 0.0 sentinel, a legal one is expanded by the expectimax recursion.
    /// Ties resolve to the lowest direction index (stable first-occurrence
    /// argmax).
    pub fn select_move(&mut self, snapshot: &Grid, score: u64) -> Option<Move> {
        let branches = self.branch_evals(snapshot, score);
        if !branches.iter().any(|b| b.legal) {
            return None;
        }
        let mut best = 0;
        for idx in 1..branches.len() {
            if branches[idx].ev > branches[best].ev {
                best = idx;
            }
        }
        if branches[best].legal {
            Some(branches[best].dir)
        } else {
            // every legal branch valued exactly at the sentinel; still answer
            // with a direction that actually moves something
            branches.iter().find(|b| b.legal).map(|b| b.dir)
        }
    }

    /// Expected value per direction, in index order `[Up, Right, Down, Left]`.
    /// Illegal directions are marked and keep the 0.0 sentinel.
    pub fn branch_evals(&mut self, snapshot: &Grid, score: u64) -> [BranchEval; 4] {
        let brain = AgentBrain::from_snapshot(*snapshot, score);
        let mut nodes = 0u64;
        let out = Move::ALL.map(|direction| {
            let mut sim = brain;
            if sim.apply_move(direction) {
                let ev = self.expectimax(sim, 0, &mut nodes);
                BranchEval { dir: direction, ev, legal: true }
            } else {
                BranchEval { dir: direction, ev: 0.0, legal: false }
            }
        });
        self.stats.nodes = nodes;
        self.stats.peak_nodes = self.stats.peak_nodes.max(nodes);
        out
    }

    /// Expected value of both simulated plies below `brain`.
    ///
    /// MAX layer: legality of all four directions is probed on independent
    /// copies; with no legal move, past the depth bound, or past the node
    /// budget the node is a leaf and scores statically. Otherwise each legal
    /// direction expands a CHANCE layer over the post-move empty cells, and
    /// the best per-direction expectation wins (running optimum starts at 0,
    /// so a degenerate board contributes 0).
    fn expectimax(&self, brain: AgentBrain, depth: u32, nodes: &mut u64) -> f64 {
        *nodes += 1;
        if let Some(budget) = self.cfg.node_budget {
            if *nodes > budget {
                return evaluate(&brain, &self.cfg.weights);
            }
        }

        let mut legal = [false; 4];
        for (idx, &direction) in Move::ALL.iter().enumerate() {
            let mut probe = brain;
            legal[idx] = probe.apply_move(direction);
        }
        if !legal.iter().any(|&l| l) || depth > self.cfg.depth_limit {
            return evaluate(&brain, &self.cfg.weights);
        }

        let mut optimum = 0.0f64;
        for (idx, &direction) in Move::ALL.iter().enumerate() {
            if !legal[idx] {
                continue;
            }
            let mut moved = brain;
            moved.apply_move(direction);
            optimum = optimum.max(self.chance_value(moved, depth, nodes));
        }
        optimum
    }

    /// CHANCE layer: average the MAX value over a hypothetical spawn in every
    /// empty cell of the post-move state, each cell weighted uniformly.
    ///
    /// By default only value-2 spawns are sampled, an approximation that keeps
    /// the tree small; `model_four_spawns` switches to the real 90/10
    /// two-vs-four mix.
    fn chance_value(&self, moved: AgentBrain, depth: u32, nodes: &mut u64) -> f64 {
        let cells = moved.grid().available_cells();
        if cells.is_empty() {
            return 0.0;
        }
        let cell_weight = 1.0 / cells.len() as f64;
        let mut value = 0.0f64;
        for &pos in &cells {
            if self.cfg.model_four_spawns {
                let mut with_two = moved;
                with_two.insert_tile(Tile::new(pos, 2));
                value += self.expectimax(with_two, depth + 1, nodes) * 0.9 * cell_weight;
                let mut with_four = moved;
                with_four.insert_tile(Tile::new(pos, 4));
                value += self.expectimax(with_four, depth + 1, nodes) * 0.1 * cell_weight;
            } else {
                let mut with_two = moved;
                with_two.insert_tile(Tile::new(pos, 2));
                value += self.expectimax(with_two, depth + 1, nodes) * cell_weight;
            }
        }
        value
    }

    /// Stats from the last [`select_move`](Self::select_move) call.
    #[inline]
    pub fn last_stats(&self) -> SearchStats {
        self.stats
    }

    /// Reset accumulated stats to zero.
    #[inline]
    pub fn reset_stats(&mut self) {
        self.stats = SearchStats::default();
    }
}

impl Default for Expectimax {
    fn default() -> Self {
        Self::new()
    }
}
