use std::path::PathBuf;

use anyhow::Context;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use roster_rumble::config::{RumbleConfig, init_tracing};
use roster_rumble::era::ERA_STYLE_ORDER;
use roster_rumble::insights::SeriesSummary;
use roster_rumble::{EraStyle, RumbleCase, RumbleError, SimResult, TeamId};

fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = RumbleConfig::from_env();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("tests/fixtures/case.json"));

    let case = RumbleCase::load(&path).with_context(|| format!("loading {}", path.display()))?;
    let pool = case.player_pool(&path).context("loading player pool")?;
    let board = case.board(&pool, &config);
    let options = case.options(&config);
    // Every style replays the same noise stream.
    let seed = case.seed.or(config.seed).unwrap_or_else(rand::random);

    let results: Vec<(EraStyle, SimResult, f64, f64)> = ERA_STYLE_ORDER
        .par_iter()
        .map(|&style| {
            let mut board = board.clone();
            board.style = style;
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let result = board.simulate(&options, &mut rng)?;
            let chem_a = board.chemistry(TeamId::A).score;
            let chem_b = board.chemistry(TeamId::B).score;
            Ok::<_, RumbleError>((style, result, chem_a, chem_b))
        })
        .collect::<roster_rumble::Result<_>>()
        .context("era sweep failed")?;

    println!("seed {seed}, {} games per style", options.games());
    for (style, result, chem_a, chem_b) in results {
        let summary = SeriesSummary::from_result(&result);
        println!(
            "{:<10} A {:>6}  B {:>6}  margin {:>9}  chem {:.1} / {:.1}",
            style.label(),
            summary.win_pct_a,
            summary.win_pct_b,
            summary.avg_margin,
            chem_a,
            chem_b
        );
    }

    Ok(())
}
