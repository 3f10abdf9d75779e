use agent_2048::engine::{AgentBrain, Grid};
use agent_2048::expectimax::Expectimax;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rayon::prelude::*;

#[derive(Parser)]
#[command(name = "agent-2048", about = "Play 2048 with the expectimax agent")]
struct Args {
    /// Number of games to play; more than one runs games in parallel
    #[arg(long, default_value_t = 1)]
    games: usize,
    /// Seed for tile spawning (random when omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Suppress per-move board printing
    #[arg(long)]
    quiet: bool,
}

struct GameResult {
    score: u64,
    highest: u32,
    moves: u64,
}

fn play_game(seed: u64, verbose: bool) -> GameResult {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut policy = Expectimax::new();
    let mut game = AgentBrain::from_snapshot(Grid::new(), 0);
    game.add_random_tile(&mut rng);
    game.add_random_tile(&mut rng);

    let mut moves = 0u64;
    let mut total_nodes = 0u64;
    if verbose {
        println!("{}", game.grid());
    }
    while let Some(direction) = policy.select_move(game.grid(), game.score()) {
        game.apply_move(direction);
        game.add_random_tile(&mut rng);
        moves += 1;
        total_nodes = total_nodes.saturating_add(policy.last_stats().nodes);
        if verbose {
            println!("{}", game.grid());
        }
    }
    if verbose {
        println!(
            "Moves made: {}, states considered: {}, max states considered for a move: {}",
            moves,
            total_nodes,
            policy.last_stats().peak_nodes
        );
    }
    GameResult { score: game.score(), highest: game.grid().highest_tile(), moves }
}

fn main() {
    let args = Args::parse();
    let base_seed = args.seed.unwrap_or_else(|| rand::thread_rng().gen());

    if args.games <= 1 {
        let result = play_game(base_seed, !args.quiet);
        println!(
            "Seed: {}, score: {}, highest tile: {}, moves: {}",
            base_seed, result.score, result.highest, result.moves
        );
        return;
    }

    let pb = ProgressBar::new(args.games as u64);
    pb.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} games | {elapsed_precise}").unwrap(),
    );
    let results: Vec<GameResult> = (0..args.games as u64)
        .into_par_iter()
        .map(|offset| {
            let result = play_game(base_seed.wrapping_add(offset), false);
            pb.inc(1);
            result
        })
        .collect();
    pb.finish_and_clear();

    let total_moves: u64 = results.iter().map(|r| r.moves).sum();
    let mean_score = results.iter().map(|r| r.score).sum::<u64>() as f64 / results.len() as f64;
    let best = results.iter().max_by_key(|r| r.score).expect("at least one game");
    println!(
        "Games: {}, mean score: {:.1}, best score: {} (highest tile {}), total moves: {}",
        results.len(),
        mean_score,
        best.score,
        best.highest,
        total_moves
    );
}
