use serde::{Deserialize, Serialize};

use crate::chemistry::Profile;
use crate::era::{EraPreset, EraStyle};
use crate::player::{Archetype, Player};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchupAdjustment {
    #[serde(rename = "advantageA")]
    pub advantage_a: f64,
    #[serde(rename = "advantageB")]
    pub advantage_b: f64,
    #[serde(rename = "reasonsA")]
    pub reasons_a: Vec<String>,
    #[serde(rename = "reasonsB")]
    pub reasons_b: Vec<String>,
}

#[derive(Debug, Default)]
struct SlotComparison {
    advantage: f64,
    reasons: Vec<&'static str>,
}

fn compare_slot(attacker: &Profile<'_>, defender: &Profile<'_>, preset: &EraPreset) -> SlotComparison {
    let mut out = SlotComparison::default();

    if attacker.has(Archetype::PoaStopper) && defender.has(Archetype::Creator) {
        out.advantage += 3.0 + preset.handcheck;
        out.reasons.push("POA vs Creator");
    }
    if attacker.has(Archetype::RimProtector) && defender.has(Archetype::RimRunner) {
        out.advantage += 2.0 + preset.post_boost * 0.3;
        out.reasons.push("Rim protection");
    }
    if attacker.has(Archetype::OffBallShooter) && !defender.has(Archetype::SwitchBig) {
        out.advantage += 2.0 * preset.three_factor;
        out.reasons.push("Spacing advantage");
    }

    out
}

/// Slot-by-slot positional edges between two rosters, paired by array index.
pub fn evaluate_matchup(team_a: &[Player], team_b: &[Player], style: EraStyle) -> MatchupAdjustment {
    let slots_a: Vec<Option<&Player>> = team_a.iter().map(Some).collect();
    let slots_b: Vec<Option<&Player>> = team_b.iter().map(Some).collect();
    evaluate_slots(&slots_a, &slots_b, style)
}

/// Same as [`evaluate_matchup`] but tolerates empty slots, which are skipped.
pub fn evaluate_slots(
    team_a: &[Option<&Player>],
    team_b: &[Option<&Player>],
    style: EraStyle,
) -> MatchupAdjustment {
    let preset = style.preset();
    let mut out = MatchupAdjustment::default();

    for (slot_a, slot_b) in team_a.iter().zip(team_b) {
        let (Some(player_a), Some(player_b)) = (*slot_a, *slot_b) else {
            continue;
        };
        let a = Profile::new(player_a);
        let b = Profile::new(player_b);

        let forward = compare_slot(&a, &b, preset);
        if forward.advantage != 0.0 {
            out.advantage_a += forward.advantage;
            out.reasons_a
                .push(format!("{}: {}", player_a.name, forward.reasons.join(", ")));
        }
        let reverse = compare_slot(&b, &a, preset);
        if reverse.advantage != 0.0 {
            out.advantage_b += reverse.advantage;
            out.reasons_b
                .push(format!("{}: {}", player_b.name, reverse.reasons.join(", ")));
        }
    }

    out
}
