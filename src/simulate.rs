use std::collections::HashMap;
use std::f64::consts::PI;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::chemistry::{CHEMISTRY_BASELINE, Profile, build_chemistry};
use crate::era::{EraPreset, EraStyle, infer_player_era_style};
use crate::matchup::evaluate_matchup;
use crate::player::{Archetype, Player};

pub const DEFAULT_GAMES: u32 = 100;
/// Upper bound on a single series; larger requests are clamped.
pub const MAX_GAMES: u32 = 1_000_000;
const STRENGTH_BOUND: f64 = 45.0;
const NOISE_SCALE: f64 = 4.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationOptions {
    #[serde(default)]
    pub games: Option<u32>,
    #[serde(default)]
    pub era_style: Option<EraStyle>,
    #[serde(default)]
    pub era_norm: Option<bool>,
}

impl SimulationOptions {
    pub fn new(games: u32, style: EraStyle) -> Self {
        Self {
            games: Some(games),
            era_style: Some(style),
            era_norm: None,
        }
    }

    pub fn games(&self) -> u32 {
        self.games.unwrap_or(DEFAULT_GAMES).clamp(1, MAX_GAMES)
    }

    /// Explicit style first, then the legacy normalization flag.
    pub fn era_style(&self) -> EraStyle {
        match (self.era_style, self.era_norm) {
            (Some(style), _) => style,
            (None, Some(true)) => EraStyle::Nineties,
            _ => EraStyle::Current,
        }
    }
}

/// Fourth argument of the positional call form: a style or the old on/off flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyEra {
    Style(EraStyle),
    Normalized(bool),
}

impl From<EraStyle> for LegacyEra {
    fn from(style: EraStyle) -> Self {
        LegacyEra::Style(style)
    }
}

impl From<bool> for LegacyEra {
    fn from(flag: bool) -> Self {
        LegacyEra::Normalized(flag)
    }
}

impl SimulationOptions {
    pub fn legacy(games: f64, era: impl Into<LegacyEra>) -> Self {
        let mut options = Self {
            games: Some(coerce_games(games)),
            ..Self::default()
        };
        match era.into() {
            LegacyEra::Style(style) => options.era_style = Some(style),
            LegacyEra::Normalized(flag) => options.era_norm = Some(flag),
        }
        options
    }
}

/// Non-finite or non-positive counts run a single game; fractions are floored
/// and the result is capped at [`MAX_GAMES`].
pub fn coerce_games(raw: f64) -> u32 {
    if !raw.is_finite() || raw <= 0.0 {
        return 1;
    }
    (raw.floor().min(MAX_GAMES as f64) as u32).max(1)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimResult {
    pub team_a_wins: u32,
    pub team_b_wins: u32,
    pub avg_score_a: f64,
    pub avg_score_b: f64,
    pub margins: Vec<f64>,
}

impl SimResult {
    pub fn games(&self) -> usize {
        self.margins.len()
    }

    pub fn win_pct_a(&self) -> f64 {
        pct(self.team_a_wins, self.games())
    }

    pub fn win_pct_b(&self) -> f64 {
        pct(self.team_b_wins, self.games())
    }

    pub fn mean_margin(&self) -> f64 {
        self.avg_score_a - self.avg_score_b
    }
}

fn pct(wins: u32, games: usize) -> f64 {
    if games == 0 {
        0.0
    } else {
        wins as f64 / games as f64 * 100.0
    }
}

/// Every additive term of a side's strength before the tanh squash.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StrengthBreakdown {
    pub chemistry: f64,
    pub impact: f64,
    pub pace: f64,
    pub matchup: f64,
    pub spacing: f64,
    pub shooter_edge: f64,
    pub interior: f64,
    pub offensive_rebounding: f64,
    pub handcheck: f64,
    pub era_comfort: f64,
    pub spacing_mismatch: f64,
}

impl StrengthBreakdown {
    pub fn raw(&self) -> f64 {
        self.chemistry
            + self.impact
            + self.pace
            + self.matchup
            + self.spacing
            + self.shooter_edge
            + self.interior
            + self.offensive_rebounding
            + self.handcheck
            + self.era_comfort
            + self.spacing_mismatch
    }

    pub fn total(&self) -> f64 {
        squash(self.raw())
    }
}

fn squash(value: f64) -> f64 {
    if value == 0.0 || !value.is_finite() {
        return 0.0;
    }
    (value / STRENGTH_BOUND).tanh() * STRENGTH_BOUND
}

#[derive(Debug, Clone, Copy, Default)]
struct TraitProfile {
    spacing: f64,
    three: f64,
    pace: f64,
    switching: f64,
    handle: f64,
    post: f64,
    rebound: f64,
    physicality: f64,
}

fn traits(tag: Archetype) -> TraitProfile {
    let none = TraitProfile::default();
    match tag {
        Archetype::Creator => TraitProfile {
            handle: 1.0,
            spacing: 0.2,
            pace: 0.35,
            ..none
        },
        Archetype::Secondary => TraitProfile {
            handle: 0.7,
            spacing: 0.35,
            ..none
        },
        Archetype::OffBallShooter => TraitProfile {
            spacing: 1.0,
            three: 1.0,
            ..none
        },
        Archetype::RimRunner => TraitProfile {
            pace: 0.8,
            post: 0.35,
            rebound: 0.4,
            ..none
        },
        Archetype::StretchBig => TraitProfile {
            spacing: 0.9,
            three: 0.9,
            ..none
        },
        Archetype::SwitchBig => TraitProfile {
            switching: 1.0,
            spacing: 0.3,
            pace: 0.25,
            ..none
        },
        Archetype::PoaStopper => TraitProfile {
            physicality: 0.7,
            ..none
        },
        Archetype::RimProtector => TraitProfile {
            post: 0.8,
            rebound: 0.6,
            physicality: 0.3,
            ..none
        },
        Archetype::Connector => TraitProfile {
            spacing: 0.55,
            pace: 0.45,
            ..none
        },
    }
}

fn is_shooter(p: &Profile<'_>) -> bool {
    p.has_any(&[Archetype::OffBallShooter, Archetype::StretchBig])
        || (p.player.three_pct() >= 36.5 && p.player.three_rate_pct() >= 35.0)
}

fn is_interior(p: &Profile<'_>) -> bool {
    let pos = p.player.position();
    pos.contains('C') || pos.contains('F') || p.is_interior_anchor()
}

fn is_guard_creator(p: &Profile<'_>) -> bool {
    p.player.position().contains('G') && p.has(Archetype::Creator)
}

fn mean(team: &[Profile<'_>], f: impl Fn(&Player) -> f64) -> f64 {
    if team.is_empty() {
        return 0.0;
    }
    team.iter().map(|p| f(p.player)).sum::<f64>() / team.len() as f64
}

fn count(team: &[Profile<'_>], f: impl Fn(&Profile<'_>) -> bool) -> f64 {
    team.iter().filter(|p| f(p)).count() as f64
}

/// Strength terms for `team` facing `opponent` under `style`.
pub fn team_strength(
    team: &[Player],
    opponent: &[Player],
    chemistry_score: f64,
    matchup_advantage: f64,
    style: EraStyle,
) -> StrengthBreakdown {
    let team: Vec<Profile<'_>> = team.iter().map(Profile::new).collect();
    let opponent: Vec<Profile<'_>> = opponent.iter().map(Profile::new).collect();
    strength_terms(&team, &opponent, chemistry_score, matchup_advantage, style)
}

fn strength_terms(
    team: &[Profile<'_>],
    opponent: &[Profile<'_>],
    chemistry_score: f64,
    matchup_advantage: f64,
    style: EraStyle,
) -> StrengthBreakdown {
    if team.is_empty() {
        return StrengthBreakdown::default();
    }
    let preset = style.preset();

    let shooters = count(team, is_shooter);
    let opponent_shooters = count(opponent, is_shooter);
    let interior = count(team, is_interior);
    let stoppers = count(team, |p| p.has(Archetype::PoaStopper));
    let guard_creators = count(team, is_guard_creator);

    StrengthBreakdown {
        chemistry: chemistry_score - CHEMISTRY_BASELINE,
        impact: mean(team, Player::impact_score) * 6.0,
        pace: mean(team, Player::pace) * 4.0,
        matchup: matchup_advantage * (2.0 + preset.handcheck * 0.25),
        spacing: shooters * 4.0 * preset.three_factor,
        shooter_edge: (shooters - opponent_shooters) * 2.5 * preset.three_factor,
        interior: interior * preset.post_boost,
        offensive_rebounding: interior * ((preset.orb - 1.0) * 6.0).max(0.0),
        handcheck: preset.handcheck * (stoppers * 1.5 - guard_creators),
        era_comfort: era_comfort(team, style, preset),
        spacing_mismatch: spacing_mismatch_penalty(team, preset),
    }
}

fn era_comfort(team: &[Profile<'_>], style: EraStyle, preset: &EraPreset) -> f64 {
    let selected = style.modernity() as f64;
    let mut counted = 0usize;
    let mut comfort = 0.0;
    let mut cohorts: HashMap<EraStyle, usize> = HashMap::new();

    for p in team {
        let Some(era) = infer_player_era_style(p.player) else {
            continue;
        };
        counted += 1;
        *cohorts.entry(era).or_default() += 1;
        // positive gap: the player comes from a more modern game than the one being played
        let gap = era.modernity() as f64 - selected;
        comfort += if gap == 0.0 {
            6.0 + preset.handcheck * 0.5 + preset.post_boost * 0.2
        } else if gap > 0.0 {
            4.0 + gap * 1.25 + preset.handcheck * 0.25
        } else {
            gap * 0.75
        };
    }

    if counted == 0 {
        return 0.0;
    }

    let counted_f = counted as f64;
    let matching_share = cohorts.get(&style).copied().unwrap_or(0) as f64 / counted_f;
    let match_bonus = if matching_share > 0.0 {
        ((matching_share - 0.35) * 8.0).max(0.0)
    } else {
        0.0
    };
    let dominant = cohorts.values().copied().max().unwrap_or(0) as f64;
    let cohesion_bonus = if dominant > 0.0 {
        ((dominant / counted_f - 0.5) * 5.0).max(0.0)
    } else {
        0.0
    };

    comfort / counted_f + match_bonus + cohesion_bonus + archetype_era_fit(team, preset)
}

/// Debits spacing/pace-dependent roles in slow, non-shooting eras and credits
/// post, rebounding and physical roles where the era rewards them.
fn archetype_era_fit(team: &[Profile<'_>], preset: &EraPreset) -> f64 {
    let spacing_value = preset.spacing_bonus.clamp(0.0, 1.0);
    let three_value = preset.three_factor.clamp(0.0, 1.0);
    let pace_value = (preset.poss / 100.0).clamp(0.0, 1.0);
    let handcheck_value = (preset.handcheck / 3.0).clamp(0.0, 1.0);
    let post_value = (preset.post_boost / 5.0).clamp(0.0, 1.0);
    let rebound_value = ((preset.orb - 1.0) / 0.2).clamp(0.0, 1.0);

    let spacing_penalty = 1.0 - spacing_value;
    let three_penalty = 1.0 - three_value;
    let pace_penalty = 1.0 - pace_value;
    let switching_penalty = (spacing_penalty * 0.8 + three_penalty * 0.2).clamp(0.0, 1.0);

    let mut total = 0.0;
    for p in team {
        for tag in p.tags.iter() {
            let t = traits(*tag);
            total -= t.spacing * spacing_penalty * 5.0;
            total -= t.three * three_penalty * 6.0;
            total -= t.pace * pace_penalty * 3.5;
            total -= t.switching * switching_penalty * 3.0;
            total -= t.handle * handcheck_value * 2.5;
            total += t.post * post_value * 3.0;
            total += t.rebound * rebound_value * 3.0;
            total += t.physicality * handcheck_value * 2.0;
        }
    }
    total
}

fn spacing_mismatch_penalty(team: &[Profile<'_>], preset: &EraPreset) -> f64 {
    if preset.three_factor >= 0.6 {
        return 0.0;
    }

    let allowance = 0.12 + preset.spacing_bonus * 0.15 + preset.three_factor * 0.2;
    let severity = (1.0 - preset.three_factor.clamp(0.0, 1.0))
        * (1.6 + preset.handcheck * 0.3 + preset.post_boost * 0.25);
    if severity <= 0.0 {
        return 0.0;
    }

    let mut penalty = 0.0;
    for p in team {
        let rate = p.player.three_rate_pct() / 100.0;
        if rate <= allowance {
            continue;
        }
        let mut reliance = rate - allowance;
        if rate >= 0.45 && preset.three_factor == 0.0 {
            reliance += (rate - 0.45) * 0.75;
        }
        let weight = if p.has_any(&[Archetype::OffBallShooter, Archetype::StretchBig]) {
            1.4
        } else if p.has_any(&[Archetype::Creator, Archetype::Secondary]) {
            1.1
        } else {
            1.0
        };
        penalty += reliance * weight;
    }

    if penalty == 0.0 {
        return 0.0;
    }
    -penalty * (8.0 + severity * 2.5)
}

/// Box-Muller; zero draws are rejected so the log stays finite.
fn gaussian_noise<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let mut u = 0.0;
    while u == 0.0 {
        u = rng.r#gen::<f64>();
    }
    let mut v = 0.0;
    while v == 0.0 {
        v = rng.r#gen::<f64>();
    }
    (-2.0 * u.ln()).sqrt() * (2.0 * PI * v).cos()
}

/// Monte Carlo series between two rosters.
///
/// Chemistry and matchup are evaluated once; each game only adds noise to
/// the per-side base score. The RNG is the only source of variation, so a
/// seeded generator reproduces the series exactly.
pub fn simulate_series<R: Rng + ?Sized>(
    team_a: &[Player],
    team_b: &[Player],
    options: &SimulationOptions,
    rng: &mut R,
) -> SimResult {
    let games = options.games();
    let style = options.era_style();
    let preset = style.preset();

    let chemistry_a = build_chemistry(team_a, style);
    let chemistry_b = build_chemistry(team_b, style);
    let matchup = evaluate_matchup(team_a, team_b, style);

    let profiles_a: Vec<Profile<'_>> = team_a.iter().map(Profile::new).collect();
    let profiles_b: Vec<Profile<'_>> = team_b.iter().map(Profile::new).collect();
    let strength_a = strength_terms(
        &profiles_a,
        &profiles_b,
        chemistry_a.score,
        matchup.advantage_a,
        style,
    )
    .total();
    let strength_b = strength_terms(
        &profiles_b,
        &profiles_a,
        chemistry_b.score,
        matchup.advantage_b,
        style,
    )
    .total();

    let poss_scale = preset.poss / 100.0;
    let base_a = 100.0 * poss_scale + (strength_a / 2.0) * poss_scale;
    let base_b = 100.0 * poss_scale + (strength_b / 2.0) * poss_scale;

    let mut result = SimResult {
        margins: Vec::with_capacity(games as usize),
        ..SimResult::default()
    };
    let mut total_a = 0.0;
    let mut total_b = 0.0;

    for _ in 0..games {
        let score_a = base_a + gaussian_noise(rng) * NOISE_SCALE * preset.variance;
        let score_b = base_b + gaussian_noise(rng) * NOISE_SCALE * preset.variance;
        let margin = score_a - score_b;
        if margin >= 0.0 {
            result.team_a_wins += 1;
        } else {
            result.team_b_wins += 1;
        }
        total_a += score_a;
        total_b += score_b;
        result.margins.push(margin);
    }

    let n = result.margins.len().max(1) as f64;
    result.avg_score_a = total_a / n;
    result.avg_score_b = total_b / n;

    tracing::debug!(
        games,
        style = %style,
        strength_a,
        strength_b,
        a_wins = result.team_a_wins,
        b_wins = result.team_b_wins,
        "series simulated"
    );

    result
}

/// Positional form: `(team_a, team_b, games, style_or_flag)`.
pub fn simulate_series_legacy<R: Rng + ?Sized>(
    team_a: &[Player],
    team_b: &[Player],
    games: f64,
    era: impl Into<LegacyEra>,
    rng: &mut R,
) -> SimResult {
    simulate_series(team_a, team_b, &SimulationOptions::legacy(games, era), rng)
}

pub fn simulate_series_with_entropy(
    team_a: &[Player],
    team_b: &[Player],
    options: &SimulationOptions,
) -> SimResult {
    simulate_series(team_a, team_b, options, &mut rand::thread_rng())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn wing(id: &str, era: &str, rate: f64, tags: &[Archetype]) -> Player {
        let mut p = Player::new(id, id);
        p.era = Some(era.to_string());
        p.pos = Some("F".to_string());
        p.three_pa_rate = rate;
        p.impact = 6.0;
        p.archetypes = tags.to_vec();
        p
    }

    #[test]
    fn options_resolve_style_and_games() {
        let opts = SimulationOptions::default();
        assert_eq!(opts.games(), DEFAULT_GAMES);
        assert_eq!(opts.era_style(), EraStyle::Current);

        let opts = SimulationOptions {
            games: Some(0),
            era_style: None,
            era_norm: Some(true),
        };
        assert_eq!(opts.games(), 1);
        assert_eq!(opts.era_style(), EraStyle::Nineties);

        let opts = SimulationOptions {
            games: None,
            era_style: Some(EraStyle::Pre3),
            era_norm: Some(true),
        };
        assert_eq!(opts.era_style(), EraStyle::Pre3);
    }

    #[test]
    fn legacy_games_are_coerced() {
        assert_eq!(coerce_games(3.9), 3);
        assert_eq!(coerce_games(0.4), 1);
        assert_eq!(coerce_games(-5.0), 1);
        assert_eq!(coerce_games(f64::NAN), 1);
        assert_eq!(coerce_games(f64::INFINITY), 1);

        let opts = SimulationOptions::legacy(12.0, false);
        assert_eq!(opts.games(), 12);
        assert_eq!(opts.era_style(), EraStyle::Current);
        assert_eq!(SimulationOptions::legacy(5.0, EraStyle::Oldschool).era_style(), EraStyle::Oldschool);
    }

    #[test]
    fn oversized_game_counts_are_capped() {
        assert_eq!(coerce_games(1e12), MAX_GAMES);
        assert_eq!(coerce_games(f64::MAX), MAX_GAMES);
        assert_eq!(coerce_games(MAX_GAMES as f64 + 0.5), MAX_GAMES);
        assert_eq!(SimulationOptions::legacy(4e9, true).games(), MAX_GAMES);

        let opts = SimulationOptions {
            games: Some(u32::MAX),
            ..SimulationOptions::default()
        };
        assert_eq!(opts.games(), MAX_GAMES);
    }

    #[test]
    fn squash_is_bounded_and_odd() {
        assert_eq!(squash(0.0), 0.0);
        assert!(squash(1e6) <= STRENGTH_BOUND);
        assert!(squash(-1e6) >= -STRENGTH_BOUND);
        assert!((squash(30.0) + squash(-30.0)).abs() < 1e-12);
        assert!(squash(10.0) < 10.0);
    }

    #[test]
    fn gaussian_noise_is_reproducible() {
        let mut a = ChaCha8Rng::seed_from_u64(7);
        let mut b = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..32 {
            let x = gaussian_noise(&mut a);
            assert!(x.is_finite());
            assert_eq!(x, gaussian_noise(&mut b));
        }
    }

    #[test]
    fn empty_team_has_zero_strength() {
        let other = vec![wing("w", "2016", 0.4, &[Archetype::Connector])];
        let s = team_strength(&[], &other, 100.0, 0.0, EraStyle::Nineties);
        assert_eq!(s, StrengthBreakdown::default());
        assert_eq!(s.total(), 0.0);
    }

    #[test]
    fn spacing_mismatch_only_in_low_three_eras() {
        let team = vec![wing("s", "2016", 0.6, &[Archetype::OffBallShooter])];
        let modern = team_strength(&team, &[], 100.0, 0.0, EraStyle::Nineties);
        assert_eq!(modern.spacing_mismatch, 0.0);

        let pre3 = team_strength(&team, &[], 100.0, 0.0, EraStyle::Pre3);
        // allowance 0.165, extra slope above 0.45, shooter weight 1.4, severity 2.9
        let reliance = (0.6 - 0.165) + (0.6 - 0.45) * 0.75;
        let expected = -(reliance * 1.4) * (8.0 + 2.9 * 2.5);
        assert!((pre3.spacing_mismatch - expected).abs() < 1e-9);
    }

    #[test]
    fn non_shooting_roles_escape_the_mismatch_penalty() {
        let team = vec![wing("b", "1980", 0.05, &[Archetype::RimProtector])];
        let s = team_strength(&team, &[], 100.0, 0.0, EraStyle::Oldschool);
        assert_eq!(s.spacing_mismatch, 0.0);
    }

    #[test]
    fn era_comfort_prefers_the_selected_era() {
        let native = vec![wing("n", "1995", 0.2, &[Archetype::Connector])];
        let visitor = vec![wing("v", "1968", 0.2, &[Archetype::Connector])];
        let home = team_strength(&native, &[], 100.0, 0.0, EraStyle::Nineties);
        let away = team_strength(&visitor, &[], 100.0, 0.0, EraStyle::Nineties);
        assert!(home.era_comfort > away.era_comfort);
    }

    #[test]
    fn players_without_eras_add_no_comfort() {
        let team = vec![wing("x", "Modern", 0.2, &[Archetype::Creator])];
        let s = team_strength(&team, &[], 100.0, 0.0, EraStyle::Oldschool);
        assert_eq!(s.era_comfort, 0.0);
    }

    #[test]
    fn native_player_collects_match_and_cohesion_bonuses() {
        let team = vec![wing("n", "1995", 0.2, &[Archetype::Connector])];
        let profiles: Vec<Profile<'_>> = team.iter().map(Profile::new).collect();
        let style = EraStyle::Nineties;
        // base 6 + 2 * 0.5 + 3 * 0.2, match (1 - 0.35) * 8, cohesion (1 - 0.5) * 5
        // connector fit -(0.55 * 0.2 * 5) - (0.45 * 0.12 * 3.5)
        let expected = 7.6 + 5.2 + 2.5 - 0.739;
        assert!((era_comfort(&profiles, style, style.preset()) - expected).abs() < 1e-9);
    }

    #[test]
    fn mixed_cohorts_scale_the_era_bonuses() {
        let team = vec![
            wing("a", "1995", 0.2, &[Archetype::Connector]),
            wing("b", "1992", 0.2, &[Archetype::Connector]),
            wing("c", "1998", 0.2, &[Archetype::Connector]),
            wing("d", "2016", 0.2, &[Archetype::Connector]),
            wing("e", "Modern", 0.2, &[Archetype::Connector]),
        ];
        let profiles: Vec<Profile<'_>> = team.iter().map(Profile::new).collect();
        let preset = EraStyle::Nineties.preset();
        let bonuses = era_comfort(&profiles, EraStyle::Nineties, preset)
            - archetype_era_fit(&profiles, preset);
        // four dated players: three natives at 7.6, one modern visitor at 4 + 1.25 + 0.5
        // match (0.75 - 0.35) * 8, cohesion (0.75 - 0.5) * 5
        let expected = (3.0 * 7.6 + 5.75) / 4.0 + 3.2 + 1.25;
        assert!((bonuses - expected).abs() < 1e-9);
    }

    #[test]
    fn pre3_rewards_bigs_and_taxes_shooters() {
        let team = vec![wing(
            "s",
            "1980",
            0.0,
            &[Archetype::OffBallShooter, Archetype::RimProtector],
        )];
        let profiles: Vec<Profile<'_>> = team.iter().map(Profile::new).collect();
        // shooter: -(1.0 * 0.7 * 5) - (1.0 * 1.0 * 6)
        // rim protector: 0.8 * 0.8 * 3 + 0.6 * 0.75 * 3 + 0.3 * (1 / 3) * 2
        let expected = -9.5 + 3.47;
        let fit = archetype_era_fit(&profiles, EraStyle::Pre3.preset());
        assert!((fit - expected).abs() < 1e-9);

        assert_eq!(archetype_era_fit(&profiles, EraStyle::Current.preset()), 0.0);
    }
}
