use std::fs;
use std::path::PathBuf;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use roster_rumble::config::RumbleConfig;
use roster_rumble::insights::{SeriesSummary, team_insights};
use roster_rumble::{
    Archetype, EraStyle, MatchupState, PlayerPool, RumbleBoard, RumbleCase, RumbleError,
    SimulationOptions, TeamId,
};

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn pool() -> PlayerPool {
    let raw = fs::read_to_string(fixture_path("pool.json")).expect("pool fixture should be readable");
    PlayerPool::from_json(&raw).expect("pool fixture should parse")
}

fn ids(board: &RumbleBoard, team: TeamId) -> Vec<String> {
    board.roster(team).into_iter().map(|p| p.id).collect()
}

#[test]
fn pool_fixture_is_indexed_and_tagged() {
    let pool = pool();
    assert_eq!(pool.len(), 11);
    assert_eq!(pool.players()[0].name, "Andre Iguodala");

    let iguodala = pool.get("andre-iguodala").expect("iguodala in pool");
    assert_eq!(
        iguodala.archetypes,
        vec![Archetype::Connector, Archetype::PoaStopper]
    );
    let harper = pool.get("ron-harper").expect("harper in pool");
    assert!(!harper.archetypes.is_empty());
    let russell = pool.get("bill-russell").expect("russell in pool");
    assert!(russell.has(Archetype::RimRunner));
}

#[test]
fn default_presets_fill_both_sides() {
    let board = RumbleBoard::with_default_presets(&pool());
    assert!(board.is_ready());
    assert_eq!(board.style, EraStyle::Current);
    assert_eq!(ids(&board, TeamId::A)[0], "michael-jordan");
    assert_eq!(ids(&board, TeamId::B)[0], "stephen-curry");
}

#[test]
fn restore_ignores_unknown_and_extra_ids() {
    let state = MatchupState {
        a: vec![
            " michael-jordan ".into(),
            "nobody".into(),
            "steve-kerr".into(),
        ],
        b: vec![
            "stephen-curry".into(),
            "kevin-durant".into(),
            "klay-thompson".into(),
            "draymond-green".into(),
            "andre-iguodala".into(),
            "bill-russell".into(),
        ],
        style: None,
        era_norm: Some(true),
    };
    let board = RumbleBoard::restore(&state, &pool());
    assert_eq!(board.style, EraStyle::Nineties);
    assert_eq!(ids(&board, TeamId::A), vec!["michael-jordan", "steve-kerr"]);
    assert!(board.slots(TeamId::A)[1].is_none());
    assert_eq!(board.filled(TeamId::B), 5);
    assert!(!ids(&board, TeamId::B).contains(&"bill-russell".to_string()));
    assert!(!board.is_ready());
}

#[test]
fn state_json_round_trips_through_the_board() {
    let raw = r#"{"a":["michael-jordan","scottie-pippen"],"b":["bill-russell"],"style":"oldschool"}"#;
    let state: MatchupState = serde_json::from_str(raw).expect("state should parse");
    let board = RumbleBoard::restore(&state, &pool());
    let back = board.to_state();
    assert_eq!(back.a, state.a);
    assert_eq!(back.b, state.b);
    assert_eq!(back.style, Some(EraStyle::Oldschool));

    let encoded = serde_json::to_string(&back).expect("state should serialize");
    assert!(!encoded.contains("eraNorm"));
}

#[test]
fn simulate_requires_five_on_five() {
    let pool = pool();
    let mut board = RumbleBoard::with_default_presets(&pool);
    board.set_slot(TeamId::B, 4, None);

    let err = board
        .simulate(&SimulationOptions::default(), &mut ChaCha8Rng::seed_from_u64(1))
        .unwrap_err();
    match err {
        RumbleError::RosterSizeMismatch {
            team,
            expected,
            found,
        } => {
            assert_eq!(team, "B");
            assert_eq!(expected, 5);
            assert_eq!(found, 4);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn swap_teams_mirrors_the_series() {
    let pool = pool();
    let mut board = RumbleBoard::with_default_presets(&pool);
    board.style = EraStyle::Nineties;
    let options = SimulationOptions {
        games: Some(200),
        ..SimulationOptions::default()
    };
    let forward = board
        .simulate(&options, &mut ChaCha8Rng::seed_from_u64(7))
        .expect("board is ready");

    board.swap_teams();
    assert_eq!(ids(&board, TeamId::A)[0], "stephen-curry");
    let swapped = board
        .simulate(&options, &mut ChaCha8Rng::seed_from_u64(7))
        .expect("board is ready");

    assert_eq!(forward.games(), 200);
    assert_eq!(swapped.games(), 200);
    assert!((forward.mean_margin() + swapped.mean_margin()).abs() < 4.0);
}

#[test]
fn board_style_applies_unless_options_override() {
    let pool = pool();
    let mut board = RumbleBoard::with_default_presets(&pool);
    board.style = EraStyle::Oldschool;

    let by_board = board
        .simulate(
            &SimulationOptions {
                games: Some(30),
                ..SimulationOptions::default()
            },
            &mut ChaCha8Rng::seed_from_u64(2),
        )
        .expect("board is ready");
    let explicit = board
        .simulate(
            &SimulationOptions::new(30, EraStyle::Oldschool),
            &mut ChaCha8Rng::seed_from_u64(2),
        )
        .expect("board is ready");
    assert_eq!(by_board, explicit);
}

#[test]
fn case_fixture_runs_end_to_end() {
    let path = fixture_path("case.json");
    let case = RumbleCase::load(&path).expect("case fixture should parse");
    let pool = case.player_pool(&path).expect("pool should load");
    let config = RumbleConfig::default();

    let board = case.board(&pool, &config);
    assert_eq!(board.style, EraStyle::Nineties);
    assert!(board.is_ready());

    let result = board
        .simulate(&case.options(&config), &mut case.rng(&config))
        .expect("board is ready");
    assert_eq!(result.games(), 250);

    let again = board
        .simulate(&case.options(&config), &mut case.rng(&config))
        .expect("board is ready");
    assert_eq!(result, again);

    let summary = SeriesSummary::from_result(&result);
    assert!(summary.win_pct_a.ends_with('%'));
    assert!(summary.avg_margin.ends_with(" pts"));

    let matchup = board.matchup();
    for team in [TeamId::A, TeamId::B] {
        let lines = team_insights(team, &board.chemistry(team), &matchup);
        assert!(!lines.is_empty());
        assert!(lines.len() <= 5);
    }
}
