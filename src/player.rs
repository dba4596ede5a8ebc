use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::archetypes::{NoOverrides, infer_archetypes};
use crate::error::RumbleError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Archetype {
    Creator,
    Secondary,
    #[serde(rename = "Off-ball Shooter")]
    OffBallShooter,
    #[serde(rename = "Rim Runner")]
    RimRunner,
    #[serde(rename = "Stretch Big")]
    StretchBig,
    #[serde(rename = "Switch Big")]
    SwitchBig,
    #[serde(rename = "POA Stopper")]
    PoaStopper,
    #[serde(rename = "Rim Protector")]
    RimProtector,
    Connector,
}

pub const ALL_ARCHETYPES: [Archetype; 9] = [
    Archetype::Creator,
    Archetype::Secondary,
    Archetype::OffBallShooter,
    Archetype::RimRunner,
    Archetype::StretchBig,
    Archetype::SwitchBig,
    Archetype::PoaStopper,
    Archetype::RimProtector,
    Archetype::Connector,
];

impl Archetype {
    pub fn label(self) -> &'static str {
        match self {
            Archetype::Creator => "Creator",
            Archetype::Secondary => "Secondary",
            Archetype::OffBallShooter => "Off-ball Shooter",
            Archetype::RimRunner => "Rim Runner",
            Archetype::StretchBig => "Stretch Big",
            Archetype::SwitchBig => "Switch Big",
            Archetype::PoaStopper => "POA Stopper",
            Archetype::RimProtector => "Rim Protector",
            Archetype::Connector => "Connector",
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Archetype {
    type Err = RumbleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let want = s.trim();
        ALL_ARCHETYPES
            .iter()
            .copied()
            .find(|tag| tag.label().eq_ignore_ascii_case(want))
            .ok_or_else(|| RumbleError::UnknownArchetype(want.to_string()))
    }
}

/// Map a loose scouting label ("glue guy", "stretch five", ...) onto tags.
pub fn parse_archetype_label(raw: &str) -> Vec<Archetype> {
    let s = raw.to_lowercase();
    let mut tags = Vec::new();
    let rules: [(&[&str], Archetype); 9] = [
        (&["creator"], Archetype::Creator),
        (&["shooter"], Archetype::OffBallShooter),
        (&["rim"], Archetype::RimRunner),
        (&["switch"], Archetype::SwitchBig),
        (&["protector"], Archetype::RimProtector),
        (&["connector", "glue"], Archetype::Connector),
        (&["secondary"], Archetype::Secondary),
        (&["stopper"], Archetype::PoaStopper),
        (&["stretch"], Archetype::StretchBig),
    ];
    for (needles, tag) in rules {
        if needles.iter().any(|n| s.contains(n)) && !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

/// Stat feeds serialize NaN as `null`; read it as a missing stat.
fn null_as_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

fn deserialize_archetypes<'de, D>(deserializer: D) -> Result<Vec<Archetype>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<String>> = Option::deserialize(deserializer)?;
    let mut out = Vec::new();
    for label in raw.unwrap_or_default() {
        let tags = match label.parse::<Archetype>() {
            Ok(tag) => vec![tag],
            Err(_) => parse_archetype_label(&label),
        };
        for tag in tags {
            if !out.contains(&tag) {
                out.push(tag);
            }
        }
    }
    Ok(out)
}

/// A historical player as delivered by the enrichment pipeline.
///
/// Rate fields may be fractions or percentages; read them through the
/// `*_pct` accessors, which put everything on a 0-100 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub era: Option<String>,
    #[serde(default)]
    pub pos: Option<String>,
    #[serde(default)]
    pub franchise: Option<String>,
    #[serde(rename = "threeP", default, deserialize_with = "null_as_zero")]
    pub three_p: f64,
    #[serde(rename = "threePA_rate", default, deserialize_with = "null_as_zero")]
    pub three_pa_rate: f64,
    #[serde(rename = "astPct", default, deserialize_with = "null_as_zero")]
    pub ast_pct: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub usg: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub stl: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub blk: f64,
    #[serde(rename = "paceZ", default, deserialize_with = "null_as_zero")]
    pub pace_z: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub impact: f64,
    #[serde(default, deserialize_with = "deserialize_archetypes")]
    pub archetypes: Vec<Archetype>,
}

impl Player {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            era: None,
            pos: None,
            franchise: None,
            three_p: 0.0,
            three_pa_rate: 0.0,
            ast_pct: 0.0,
            usg: 0.0,
            stl: 0.0,
            blk: 0.0,
            pace_z: 0.0,
            impact: 0.0,
            archetypes: Vec::new(),
        }
    }

    /// Fill `archetypes` from stats when the enrichment step left it empty.
    pub fn ensure_archetypes(&mut self) {
        if self.archetypes.is_empty() {
            self.archetypes = infer_archetypes(self, &NoOverrides);
        }
    }

    pub fn has(&self, tag: Archetype) -> bool {
        self.archetypes.contains(&tag)
    }

    pub fn position(&self) -> String {
        self.pos.as_deref().unwrap_or("").to_uppercase()
    }

    pub fn three_pct(&self) -> f64 {
        normalize_percent(self.three_p)
    }

    pub fn three_rate_pct(&self) -> f64 {
        normalize_percent(self.three_pa_rate)
    }

    pub fn assist_pct(&self) -> f64 {
        normalize_percent(self.ast_pct)
    }

    pub fn usage_pct(&self) -> f64 {
        normalize_percent(self.usg)
    }

    pub fn steal_pct(&self) -> f64 {
        normalize_percent(self.stl)
    }

    pub fn block_pct(&self) -> f64 {
        normalize_percent(self.blk)
    }

    pub fn pace(&self) -> f64 {
        finite_or_zero(self.pace_z)
    }

    pub fn impact_score(&self) -> f64 {
        finite_or_zero(self.impact)
    }
}

/// Fractions are scaled to percent; values above 1 are taken as percent already.
pub fn normalize_percent(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    if value > 1.0 {
        value.clamp(0.0, 100.0)
    } else {
        (value * 100.0).clamp(0.0, 100.0)
    }
}

pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_percent_handles_both_scales() {
        assert!((normalize_percent(0.37) - 37.0).abs() < 1e-9);
        assert!((normalize_percent(28.5) - 28.5).abs() < 1e-9);
        assert_eq!(normalize_percent(f64::NAN), 0.0);
        assert_eq!(normalize_percent(-0.2), 0.0);
        assert_eq!(normalize_percent(140.0), 100.0);
    }

    #[test]
    fn archetype_labels_round_trip_through_from_str() {
        for tag in ALL_ARCHETYPES {
            assert_eq!(tag.label().parse::<Archetype>().unwrap(), tag);
        }
        assert!("Point God".parse::<Archetype>().is_err());
    }

    #[test]
    fn loose_labels_map_to_tags() {
        assert_eq!(
            parse_archetype_label("Stretch glue big"),
            vec![Archetype::Connector, Archetype::StretchBig]
        );
        assert_eq!(
            parse_archetype_label("Rim protector"),
            vec![Archetype::RimRunner, Archetype::RimProtector]
        );
        assert!(parse_archetype_label("").is_empty());
    }

    #[test]
    fn player_deserializes_enrichment_shape() {
        let raw = r#"{
            "id": "michael-jordan",
            "name": "Michael Jordan",
            "era": "1980s–1990s",
            "pos": "G",
            "franchise": "CHI",
            "threeP": 0.327,
            "threePA_rate": 0.09,
            "astPct": 24.9,
            "usg": 33.3,
            "stl": 0.064,
            "blk": 0.02,
            "paceZ": -0.3,
            "impact": 12.4,
            "archetypes": ["Creator", "lockdown stopper"]
        }"#;
        let player: Player = serde_json::from_str(raw).unwrap();
        assert_eq!(player.franchise.as_deref(), Some("CHI"));
        assert_eq!(
            player.archetypes,
            vec![Archetype::Creator, Archetype::PoaStopper]
        );
        assert!((player.assist_pct() - 24.9).abs() < 1e-9);
        assert!((player.three_rate_pct() - 9.0).abs() < 1e-9);
    }

    #[test]
    fn missing_fields_default_to_zero() {
        let player: Player = serde_json::from_str(r#"{"id":"x","name":"X"}"#).unwrap();
        assert_eq!(player.impact_score(), 0.0);
        assert!(player.archetypes.is_empty());
        assert_eq!(player.position(), "");
    }

    #[test]
    fn null_stats_read_as_zero() {
        let raw = r#"{"id":"x","name":"X","threeP":null,"usg":null,"paceZ":null,"impact":7}"#;
        let player: Player = serde_json::from_str(raw).unwrap();
        assert_eq!(player.three_p, 0.0);
        assert_eq!(player.usage_pct(), 0.0);
        assert_eq!(player.pace(), 0.0);
        assert_eq!(player.impact_score(), 7.0);
    }
}
