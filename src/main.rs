use std::path::PathBuf;

use anyhow::Context;

use roster_rumble::config::{RumbleConfig, init_tracing};
use roster_rumble::insights::{
    DEFAULT_HISTOGRAM_BINS, SeriesSummary, margin_histogram, team_insights,
};
use roster_rumble::{RumbleCase, TeamId};

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
    let mut rng = case.rng(&config);

    let result = board
        .simulate(&options, &mut rng)
        .context("board is not ready")?;
    let summary = SeriesSummary::from_result(&result);
    let matchup = board.matchup();

    println!("Style: {} ({} games)", board.style, result.games());
    if let Some(hint) = board.style.hint() {
        println!("  {hint}");
    }
    println!(
        "Team A {} | Team B {} | avg margin {}",
        summary.win_pct_a, summary.win_pct_b, summary.avg_margin
    );
    println!(
        "Avg score {:.1} - {:.1}",
        result.avg_score_a, result.avg_score_b
    );

    for team in [TeamId::A, TeamId::B] {
        let chemistry = board.chemistry(team);
        let names: Vec<String> = board.roster(team).into_iter().map(|p| p.name).collect();
        println!();
        println!("Team {team}: {}", names.join(", "));
        println!("  chemistry {:.2} ({} edges)", chemistry.score, chemistry.edges.len());
        for line in team_insights(team, &chemistry, &matchup) {
            println!("  - {line}");
        }
    }

    println!();
    println!("Margin distribution (A - B):");
    for bin in margin_histogram(&result.margins, DEFAULT_HISTOGRAM_BINS) {
        println!(
            "  {:>7.1} .. {:>7.1}  {:>4}  {}",
            bin.start,
            bin.end,
            bin.count,
            "#".repeat(bin.count.min(60))
        );
    }

    Ok(())
}
