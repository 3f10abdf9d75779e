//! agent-2048: an expectimax move-selection agent for 2048
//!
//! This crate provides:
//! - A board simulator (`engine` module): `Grid`, `Tile`, and `AgentBrain`,
//!   a copyable simulation that applies directional moves with the real
//!   game's merge rule
//! - An expectimax policy (`expectimax` module): depth-bounded search over
//!   the stochastic game tree with a positional static heuristic at the
//!   horizon
//!
//! The crate never owns the real game. Callers hand in an immutable board
//! snapshot plus the current score and get back one of the four directions
//! (or `None` on a dead board) to apply themselves.
//!
//! Quick start:
//! ```
//! use agent_2048::engine::{AgentBrain, Grid, Move};
//! use agent_2048::expectimax::Expectimax;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! // Deterministic board initialization with a seeded RNG
//! let mut rng = StdRng::seed_from_u64(42);
//! let mut game = AgentBrain::from_snapshot(Grid::new(), 0);
//! game.add_random_tile(&mut rng);
//! game.add_random_tile(&mut rng);
//!
//! let mut policy = Expectimax::new();
//! while let Some(direction) = policy.select_move(game.grid(), game.score()) {
//!     game.apply_move(direction);
//!     game.add_random_tile(&mut rng);
//!     if game.score() > 100 {
//!         break;
//!     }
//! }
//! assert!(game.grid().count_occupied() > 0);
//! ```
pub mod engine;
pub mod expectimax;
