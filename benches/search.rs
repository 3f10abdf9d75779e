use agent_2048::engine::{AgentBrain, Grid};
use agent_2048::expectimax::{evaluate, Expectimax, MaskWeights, SearchConfig};
use criterion::{criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, SeedableRng};
use std::hint::black_box;

fn corpus() -> Vec<AgentBrain> {
    let mut rng = StdRng::seed_from_u64(7);
    let mut policy = Expectimax::new();
    let mut game = AgentBrain::from_snapshot(Grid::new(), 0);
    game.add_random_tile(&mut rng);
    game.add_random_tile(&mut rng);
    let mut brains = vec![game];
    // mid-game positions reached by the policy itself
    for _ in 0..30 {
        match policy.select_move(game.grid(), game.score()) {
            Some(dir) => {
                game.apply_move(dir);
                game.add_random_tile(&mut rng);
                brains.push(game);
            }
            None => break,
        }
    }
    brains
}

fn bench_evaluate(c: &mut Criterion) {
    c.bench_function("heuristic/evaluate", |bch| {
        let brains = corpus();
        let weights = MaskWeights::default();
        bch.iter(|| {
            let mut acc = 0.0f64;
            for brain in &brains {
                acc += evaluate(brain, &weights);
            }
            black_box(acc)
        })
    });
}

fn bench_select_move(c: &mut Criterion) {
    c.bench_function("search/select_move", |bch| {
        let brains = corpus();
        let mut policy = Expectimax::new();
        bch.iter(|| {
            let mut legal = 0u32;
            for brain in &brains {
                if policy.select_move(brain.grid(), brain.score()).is_some() {
                    legal += 1;
                }
            }
            black_box(legal)
        })
    });

    c.bench_function("search/select_move_four_spawns", |bch| {
        let brains = corpus();
        let cfg = SearchConfig { model_four_spawns: true, ..SearchConfig::default() };
        let mut policy = Expectimax::with_config(cfg);
        bch.iter(|| {
            let mut legal = 0u32;
            for brain in &brains {
                if policy.select_move(brain.grid(), brain.score()).is_some() {
                    legal += 1;
                }
            }
            black_box(legal)
        })
    });
}

criterion_group!(benches, bench_evaluate, bench_select_move);
criterion_main!(benches);
