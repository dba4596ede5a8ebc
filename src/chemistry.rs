use std::borrow::Cow;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::archetypes::resolved_tags;
use crate::era::{EraStyle, era_style_distance, infer_player_era_style};
use crate::player::{Archetype, Player};

const MAX_POSITIVE_SYNERGIES: usize = 4;
const MAX_TEAM_REASONS: usize = 6;
pub const CHEMISTRY_BASELINE: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChemistryEdge {
    pub source: String,
    pub target: String,
    pub weight: f64,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamChemistry {
    pub score: f64,
    pub edges: Vec<ChemistryEdge>,
    pub reasons: Vec<String>,
}

impl Default for TeamChemistry {
    fn default() -> Self {
        Self {
            score: CHEMISTRY_BASELINE,
            edges: Vec::new(),
            reasons: Vec::new(),
        }
    }
}

/// A player with archetypes resolved, plus the derived role flags every
/// heuristic keys off.
pub(crate) struct Profile<'a> {
    pub player: &'a Player,
    pub tags: Cow<'a, [Archetype]>,
}

impl<'a> Profile<'a> {
    pub fn new(player: &'a Player) -> Self {
        Self {
            player,
            tags: resolved_tags(player),
        }
    }

    pub fn has(&self, tag: Archetype) -> bool {
        self.tags.contains(&tag)
    }

    pub fn has_any(&self, tags: &[Archetype]) -> bool {
        tags.iter().any(|t| self.has(*t))
    }

    pub fn is_playmaker(&self) -> bool {
        self.has_any(&[Archetype::Creator, Archetype::Secondary]) || self.player.assist_pct() >= 22.0
    }

    pub fn is_connector(&self) -> bool {
        self.has(Archetype::Connector)
            || self.player.assist_pct() >= 16.0
            || self.player.impact_score() >= 8.0
    }

    pub fn is_spacing_threat(&self) -> bool {
        self.has_any(&[Archetype::OffBallShooter, Archetype::StretchBig])
            || (self.player.three_pct() >= 36.5 && self.player.three_rate_pct() >= 30.0)
    }

    pub fn is_interior_anchor(&self) -> bool {
        self.has_any(&[
            Archetype::RimRunner,
            Archetype::StretchBig,
            Archetype::SwitchBig,
            Archetype::RimProtector,
        ])
    }

    fn is_rim_anchor(&self) -> bool {
        self.has_any(&[Archetype::RimProtector, Archetype::SwitchBig])
    }

    fn is_initiator(&self) -> bool {
        self.has_any(&[Archetype::Creator, Archetype::Secondary])
    }

    fn is_floor_spacer(&self) -> bool {
        self.has_any(&[Archetype::OffBallShooter, Archetype::StretchBig])
    }

    fn guards_anything(&self) -> bool {
        self.has_any(&[Archetype::PoaStopper, Archetype::RimProtector])
    }
}

#[derive(Debug, Clone, Copy)]
struct Adjustment {
    value: f64,
    reason: &'static str,
    order: usize,
}

#[derive(Default)]
struct PairLedger(Vec<Adjustment>);

impl PairLedger {
    fn add(&mut self, value: f64, reason: &'static str) {
        if !value.is_finite() || value == 0.0 {
            return;
        }
        let order = self.0.len();
        self.0.push(Adjustment {
            value,
            reason,
            order,
        });
    }

    /// Keep every penalty and only the strongest positive synergies.
    fn retained(&self) -> Vec<Adjustment> {
        let mut positive: Vec<&Adjustment> = self.0.iter().filter(|a| a.value > 0.0).collect();
        positive.sort_by(|a, b| {
            b.value
                .abs()
                .total_cmp(&a.value.abs())
                .then(a.order.cmp(&b.order))
        });
        let allowed: HashSet<usize> = positive
            .iter()
            .take(MAX_POSITIVE_SYNERGIES)
            .map(|a| a.order)
            .collect();
        self.0
            .iter()
            .filter(|a| a.value <= 0.0 || allowed.contains(&a.order))
            .copied()
            .collect()
    }
}

fn score_pair(a: &Profile<'_>, b: &Profile<'_>, style: EraStyle) -> PairLedger {
    let preset = style.preset();
    let mut ledger = PairLedger::default();

    let (pa, pb) = (a.player, b.player);
    let playmaker_a = a.is_playmaker();
    let playmaker_b = b.is_playmaker();
    let connector_a = a.is_connector();
    let connector_b = b.is_connector();
    let interior_a = a.is_interior_anchor();
    let interior_b = b.is_interior_anchor();
    let spacing_a = a.is_spacing_threat();
    let spacing_b = b.is_spacing_threat();

    if (pa.pace() - pb.pace()).abs() < 0.5 {
        ledger.add(2.0, "pace fit");
    }

    if (a.is_initiator() && b.is_floor_spacer()) || (b.is_initiator() && a.is_floor_spacer()) {
        ledger.add(3.0 * preset.three_factor, "creator → shooter");
    }

    if pa.three_rate_pct() > 50.0 && pb.three_rate_pct() > 50.0 {
        ledger.add(2.0 * preset.spacing_bonus, "spacing stack");
    }

    if pa.usage_pct() > 28.0
        && pb.usage_pct() > 28.0
        && pa.assist_pct() < 18.0
        && pb.assist_pct() < 18.0
    {
        ledger.add(-5.0, "usage redundancy");
    }

    if (interior_a && playmaker_b) || (interior_b && playmaker_a) {
        ledger.add(2.0 + preset.post_boost * 0.6, "inside-out game");
    }

    if preset.post_boost >= 2.0
        && interior_a
        && interior_b
        && (connector_a || connector_b || spacing_a || spacing_b)
    {
        ledger.add(1.0 + preset.post_boost * 0.5, "hi-lo threats");
    }

    if (connector_a && (playmaker_b || interior_b || spacing_b))
        || (connector_b && (playmaker_a || interior_a || spacing_a))
    {
        ledger.add(
            1.8 + preset.spacing_bonus * 1.2 + preset.post_boost * 0.1,
            "connector boost",
        );
    }

    if (a.has(Archetype::PoaStopper) && b.is_rim_anchor())
        || (b.has(Archetype::PoaStopper) && a.is_rim_anchor())
    {
        ledger.add(1.5 + preset.handcheck * 0.75, "defensive spine");
    }

    if let (Some(fa), Some(fb)) = (pa.franchise.as_deref(), pb.franchise.as_deref()) {
        if !fa.is_empty() && fa == fb {
            ledger.add(1.2 + preset.post_boost * 0.2, "franchise familiarity");
        }
    }

    if let (Some(era_a), Some(era_b)) = (infer_player_era_style(pa), infer_player_era_style(pb)) {
        if era_a == era_b {
            ledger.add(
                1.6 + preset.handcheck * 0.4 + preset.post_boost * 0.2,
                "shared era rhythm",
            );
        } else {
            let gap = era_style_distance(era_a, era_b) as f64;
            if gap >= 2.0 {
                ledger.add(-gap * (1.0 + preset.handcheck * 0.2), "era clash");
            }
        }
    }

    if preset.three_factor <= 0.3 {
        let elite_duo = pa.impact_score() >= 8.5 && pb.impact_score() >= 8.5;
        let balanced = (pa.usage_pct() <= 34.0 || pb.assist_pct() >= 20.0 || connector_b)
            && (pb.usage_pct() <= 34.0 || pa.assist_pct() >= 20.0 || connector_a);
        if elite_duo && balanced {
            ledger.add(2.0 + preset.post_boost * 0.2, "all-time duo versatility");
        }
    }

    if !a.guards_anything() && !b.guards_anything() {
        ledger.add(-6.0, "defensive gaps");
    }

    ledger
}

/// Pairwise synergy graph and aggregate chemistry for one roster.
///
/// Every unordered pair is scored independently; the team score is the
/// baseline plus the sum of edge weights, floored at zero.
pub fn build_chemistry(players: &[Player], style: EraStyle) -> TeamChemistry {
    let profiles: Vec<Profile<'_>> = players.iter().map(Profile::new).collect();

    let mut edges = Vec::new();
    let mut score_delta = 0.0;
    // Insertion-ordered so equal totals keep first-seen order.
    let mut accumulator: Vec<(&'static str, f64)> = Vec::new();

    for (i, a) in profiles.iter().enumerate() {
        for b in &profiles[i + 1..] {
            let retained = score_pair(a, b, style).retained();
            if retained.is_empty() {
                continue;
            }
            let delta: f64 = retained.iter().map(|adj| adj.value).sum();
            if delta == 0.0 || !delta.is_finite() {
                continue;
            }
            score_delta += delta;
            for adj in &retained {
                match accumulator.iter_mut().find(|(reason, _)| *reason == adj.reason) {
                    Some((_, total)) => *total += adj.value,
                    None => accumulator.push((adj.reason, adj.value)),
                }
            }
            edges.push(ChemistryEdge {
                source: a.player.id.clone(),
                target: b.player.id.clone(),
                weight: delta,
                reasons: retained.iter().map(|adj| adj.reason.to_string()).collect(),
            });
        }
    }

    accumulator.sort_by(|x, y| y.1.abs().total_cmp(&x.1.abs()));
    let reasons = accumulator
        .iter()
        .take(MAX_TEAM_REASONS)
        .map(|(reason, weight)| format_reason(reason, *weight))
        .collect();

    let score = (CHEMISTRY_BASELINE + score_delta).max(0.0);
    tracing::debug!(
        players = players.len(),
        edges = edges.len(),
        score,
        style = %style,
        "chemistry built"
    );

    TeamChemistry {
        score,
        edges,
        reasons,
    }
}

fn format_reason(reason: &str, weight: f64) -> String {
    let sign = if weight > 0.0 { "+" } else { "" };
    format!("{reason} ({sign}{weight:.1})")
}
