use criterion::{Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::hint::black_box;

use roster_rumble::archetypes::{NoOverrides, infer_archetypes};
use roster_rumble::{
    EraStyle, Player, PlayerPool, RumbleBoard, SimulationOptions, TeamId, build_chemistry,
    evaluate_matchup, simulate_series,
};

fn board() -> RumbleBoard {
    let pool = PlayerPool::from_json(POOL_JSON).unwrap();
    RumbleBoard::with_default_presets(&pool)
}

fn untagged(board: &RumbleBoard, team: TeamId) -> Vec<Player> {
    let mut roster = board.roster(team);
    for p in roster.iter_mut() {
        p.archetypes.clear();
    }
    roster
}

fn bench_pool_parse(c: &mut Criterion) {
    c.bench_function("pool_parse", |b| {
        b.iter(|| {
            let pool = PlayerPool::from_json(black_box(POOL_JSON)).unwrap();
            black_box(pool.len());
        })
    });
}

fn bench_archetype_inference(c: &mut Criterion) {
    let roster = untagged(&board(), TeamId::A);
    c.bench_function("archetype_inference", |b| {
        b.iter(|| {
            for p in &roster {
                black_box(infer_archetypes(black_box(p), &NoOverrides));
            }
        })
    });
}

fn bench_chemistry(c: &mut Criterion) {
    let board = board();
    let tagged = board.roster(TeamId::A);
    let bare = untagged(&board, TeamId::A);
    c.bench_function("chemistry_tagged", |b| {
        b.iter(|| black_box(build_chemistry(black_box(&tagged), EraStyle::Nineties)))
    });
    c.bench_function("chemistry_untagged", |b| {
        b.iter(|| black_box(build_chemistry(black_box(&bare), EraStyle::Nineties)))
    });
}

fn bench_matchup(c: &mut Criterion) {
    let board = board();
    let a = board.roster(TeamId::A);
    let b_team = board.roster(TeamId::B);
    c.bench_function("matchup_evaluate", |b| {
        b.iter(|| black_box(evaluate_matchup(black_box(&a), black_box(&b_team), EraStyle::Pre3)))
    });
}

fn bench_series(c: &mut Criterion) {
    let board = board();
    let a = board.roster(TeamId::A);
    let b_team = board.roster(TeamId::B);
    let options = SimulationOptions::new(100, EraStyle::Nineties);
    c.bench_function("series_100", |b| {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        b.iter(|| black_box(simulate_series(&a, &b_team, &options, &mut rng)))
    });
    let options = SimulationOptions::new(10_000, EraStyle::Current);
    c.bench_function("series_10000", |b| {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        b.iter(|| black_box(simulate_series(&a, &b_team, &options, &mut rng)))
    });
}

criterion_group!(
    perf,
    bench_pool_parse,
    bench_archetype_inference,
    bench_chemistry,
    bench_matchup,
    bench_series
);
criterion_main!(perf);

static POOL_JSON: &str = include_str!("../tests/fixtures/pool.json");
