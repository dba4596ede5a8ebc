use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};

use crate::chemistry::{TeamChemistry, build_chemistry};
use crate::era::EraStyle;
use crate::error::{Result, RumbleError};
use crate::matchup::{MatchupAdjustment, evaluate_matchup};
use crate::player::Player;
use crate::simulate::{SimResult, SimulationOptions, simulate_series};

pub const TEAM_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamId {
    A,
    B,
}

impl TeamId {
    pub fn label(self) -> &'static str {
        match self {
            TeamId::A => "A",
            TeamId::B => "B",
        }
    }

    pub fn other(self) -> Self {
        match self {
            TeamId::A => TeamId::B,
            TeamId::B => TeamId::A,
        }
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TeamId {
    type Err = RumbleError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "a" | "A" => Ok(TeamId::A),
            "b" | "B" => Ok(TeamId::B),
            other => Err(RumbleError::UnknownTeam(other.to_string())),
        }
    }
}

/// Shareable matchup snapshot. Encoding it (URL hash etc.) is up to the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchupState {
    #[serde(default)]
    pub a: Vec<String>,
    #[serde(default)]
    pub b: Vec<String>,
    #[serde(
        default,
        deserialize_with = "lenient_style",
        skip_serializing_if = "Option::is_none"
    )]
    pub style: Option<EraStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub era_norm: Option<bool>,
}

fn lenient_style<'de, D>(deserializer: D) -> std::result::Result<Option<EraStyle>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(|s| s.parse().ok()))
}

pub fn sanitize_ids(ids: &[String]) -> Vec<String> {
    ids.iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

impl MatchupState {
    pub fn resolved_style(&self) -> EraStyle {
        match (self.style, self.era_norm) {
            (Some(style), _) => style,
            (None, Some(true)) => EraStyle::Nineties,
            _ => EraStyle::Current,
        }
    }

    pub fn sanitized(&self) -> Self {
        Self {
            a: sanitize_ids(&self.a),
            b: sanitize_ids(&self.b),
            style: Some(self.resolved_style()),
            era_norm: None,
        }
    }

    pub fn ids(&self, team: TeamId) -> &[String] {
        match team {
            TeamId::A => &self.a,
            TeamId::B => &self.b,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PoolFile {
    Wrapped { players: Vec<Player> },
    Bare(Vec<Player>),
}

/// Id-indexed player list, archetypes filled and sorted by name.
#[derive(Debug, Clone, Default)]
pub struct PlayerPool {
    players: Vec<Player>,
    by_id: HashMap<String, usize>,
}

impl PlayerPool {
    pub fn new(mut players: Vec<Player>) -> Self {
        for p in players.iter_mut() {
            p.ensure_archetypes();
        }
        players.sort_by(|a, b| a.name.cmp(&b.name));

        let mut by_id = HashMap::with_capacity(players.len());
        for (idx, p) in players.iter().enumerate() {
            by_id.entry(p.id.clone()).or_insert(idx);
        }
        tracing::debug!(players = players.len(), "player pool built");
        Self { players, by_id }
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let players = match serde_json::from_str::<PoolFile>(raw)? {
            PoolFile::Wrapped { players } | PoolFile::Bare(players) => players,
        };
        Ok(Self::new(players))
    }

    pub fn get(&self, id: &str) -> Option<&Player> {
        self.by_id.get(id).map(|&idx| &self.players[idx])
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Preset {
    pub name: &'static str,
    pub ids: [&'static str; TEAM_SIZE],
}

pub const DEFAULT_PRESETS: [Preset; 2] = [
    Preset {
        name: "96Bulls",
        ids: [
            "michael-jordan",
            "scottie-pippen",
            "dennis-rodman",
            "ron-harper",
            "steve-kerr",
        ],
    },
    Preset {
        name: "17Warriors",
        ids: [
            "stephen-curry",
            "kevin-durant",
            "klay-thompson",
            "draymond-green",
            "andre-iguodala",
        ],
    },
];

pub fn find_preset(name: &str) -> Option<&'static Preset> {
    DEFAULT_PRESETS
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
}

type Slots = [Option<Player>; TEAM_SIZE];

/// Two five-slot lineups plus the selected era.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RumbleBoard {
    team_a: Slots,
    team_b: Slots,
    pub style: EraStyle,
}

impl RumbleBoard {
    pub fn new(style: EraStyle) -> Self {
        Self {
            style,
            ..Self::default()
        }
    }

    /// Team A gets the first preset, team B the second.
    pub fn with_default_presets(pool: &PlayerPool) -> Self {
        let mut board = Self::default();
        board.load_preset(TeamId::A, &DEFAULT_PRESETS[0].ids, pool);
        board.load_preset(TeamId::B, &DEFAULT_PRESETS[1].ids, pool);
        board
    }

    /// Slots are filled by index; unknown ids leave their slot empty.
    pub fn restore(state: &MatchupState, pool: &PlayerPool) -> Self {
        let mut board = Self::new(state.resolved_style());
        for team in [TeamId::A, TeamId::B] {
            let ids = sanitize_ids(state.ids(team));
            let slots = board.slots_mut(team);
            for (idx, id) in ids.iter().take(TEAM_SIZE).enumerate() {
                match pool.get(id) {
                    Some(p) => slots[idx] = Some(p.clone()),
                    None => tracing::warn!(team = %team, id = %id, "unknown player id in state"),
                }
            }
        }
        board
    }

    /// Replace a lineup with the known ids in order; unknown ids are skipped.
    pub fn load_preset<S: AsRef<str>>(&mut self, team: TeamId, ids: &[S], pool: &PlayerPool) {
        let mut next: Slots = Default::default();
        let mut filled = 0;
        for id in ids {
            if filled == TEAM_SIZE {
                break;
            }
            let id = id.as_ref().trim();
            let Some(p) = pool.get(id) else {
                tracing::warn!(team = %team, id, "preset player missing from pool");
                continue;
            };
            next[filled] = Some(p.clone());
            filled += 1;
        }
        *self.slots_mut(team) = next;
    }

    pub fn load_named_preset(&mut self, team: TeamId, name: &str, pool: &PlayerPool) -> bool {
        let Some(preset) = find_preset(name) else {
            return false;
        };
        self.load_preset(team, &preset.ids, pool);
        true
    }

    pub fn set_slot(&mut self, team: TeamId, idx: usize, player: Option<Player>) {
        if let Some(slot) = self.slots_mut(team).get_mut(idx) {
            *slot = player;
        }
    }

    pub fn clear(&mut self, team: TeamId) {
        *self.slots_mut(team) = Default::default();
    }

    pub fn swap_teams(&mut self) {
        std::mem::swap(&mut self.team_a, &mut self.team_b);
    }

    pub fn slots(&self, team: TeamId) -> &[Option<Player>] {
        match team {
            TeamId::A => &self.team_a,
            TeamId::B => &self.team_b,
        }
    }

    fn slots_mut(&mut self, team: TeamId) -> &mut Slots {
        match team {
            TeamId::A => &mut self.team_a,
            TeamId::B => &mut self.team_b,
        }
    }

    /// Filled slots in slot order.
    pub fn roster(&self, team: TeamId) -> Vec<Player> {
        self.slots(team).iter().flatten().cloned().collect()
    }

    pub fn filled(&self, team: TeamId) -> usize {
        self.slots(team).iter().filter(|s| s.is_some()).count()
    }

    pub fn is_ready(&self) -> bool {
        self.filled(TeamId::A) == TEAM_SIZE && self.filled(TeamId::B) == TEAM_SIZE
    }

    pub fn to_state(&self) -> MatchupState {
        let ids = |team: TeamId| -> Vec<String> {
            self.slots(team)
                .iter()
                .flatten()
                .map(|p| p.id.clone())
                .collect()
        };
        MatchupState {
            a: ids(TeamId::A),
            b: ids(TeamId::B),
            style: Some(self.style),
            era_norm: None,
        }
    }

    pub fn chemistry(&self, team: TeamId) -> TeamChemistry {
        build_chemistry(&self.roster(team), self.style)
    }

    /// Pairs the filled players of each side in order, like [`Self::chemistry`].
    pub fn matchup(&self) -> MatchupAdjustment {
        evaluate_matchup(&self.roster(TeamId::A), &self.roster(TeamId::B), self.style)
    }

    fn require_full(&self, team: TeamId) -> Result<()> {
        let found = self.filled(team);
        if found != TEAM_SIZE {
            return Err(RumbleError::RosterSizeMismatch {
                team: team.label().to_string(),
                expected: TEAM_SIZE,
                found,
            });
        }
        Ok(())
    }

    /// Runs a series at the board's era unless `options` names one.
    pub fn simulate<R: Rng + ?Sized>(
        &self,
        options: &SimulationOptions,
        rng: &mut R,
    ) -> Result<SimResult> {
        self.require_full(TeamId::A)?;
        self.require_full(TeamId::B)?;

        let mut options = *options;
        if options.era_style.is_none() && options.era_norm.is_none() {
            options.era_style = Some(self.style);
        }
        Ok(simulate_series(
            &self.roster(TeamId::A),
            &self.roster(TeamId::B),
            &options,
            rng,
        ))
    }
}
