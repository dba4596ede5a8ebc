use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

use crate::player::{Archetype, Player};

/// Caller-supplied per-player archetype overrides, keyed by player id.
pub trait ArchetypeLookup {
    fn archetypes_for(&self, id: &str) -> Option<&[Archetype]>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoOverrides;

impl ArchetypeLookup for NoOverrides {
    fn archetypes_for(&self, _id: &str) -> Option<&[Archetype]> {
        None
    }
}

impl ArchetypeLookup for HashMap<String, Vec<Archetype>> {
    fn archetypes_for(&self, id: &str) -> Option<&[Archetype]> {
        self.get(id).map(Vec::as_slice)
    }
}

impl ArchetypeLookup for BTreeMap<String, Vec<Archetype>> {
    fn archetypes_for(&self, id: &str) -> Option<&[Archetype]> {
        self.get(id).map(Vec::as_slice)
    }
}

type Resolver = fn(&Player, &dyn ArchetypeLookup) -> Vec<Archetype>;

/// Highest priority first. The first non-empty answer wins.
const RESOLVERS: [(&str, Resolver); 4] = [
    ("override", from_override),
    ("provided", from_provided),
    ("stats", from_stats),
    ("position", from_position),
];

pub fn infer_archetypes(player: &Player, overrides: &dyn ArchetypeLookup) -> Vec<Archetype> {
    for (source, resolve) in RESOLVERS {
        let tags = resolve(player, overrides);
        if !tags.is_empty() {
            tracing::trace!(player = %player.id, source, count = tags.len(), "archetypes resolved");
            return tags;
        }
    }
    vec![Archetype::Connector]
}

/// Tags for read-only heuristics: borrowed when already populated.
pub(crate) fn resolved_tags(player: &Player) -> Cow<'_, [Archetype]> {
    if player.archetypes.is_empty() {
        Cow::Owned(infer_archetypes(player, &NoOverrides))
    } else {
        Cow::Borrowed(player.archetypes.as_slice())
    }
}

fn dedup(tags: &[Archetype]) -> Vec<Archetype> {
    let mut out = Vec::with_capacity(tags.len());
    for tag in tags {
        if !out.contains(tag) {
            out.push(*tag);
        }
    }
    out
}

fn from_override(player: &Player, overrides: &dyn ArchetypeLookup) -> Vec<Archetype> {
    overrides
        .archetypes_for(&player.id)
        .map(dedup)
        .unwrap_or_default()
}

fn from_provided(player: &Player, _: &dyn ArchetypeLookup) -> Vec<Archetype> {
    dedup(&player.archetypes)
}

fn from_stats(player: &Player, _: &dyn ArchetypeLookup) -> Vec<Archetype> {
    derive_from_stats(player)
}

fn from_position(player: &Player, _: &dyn ArchetypeLookup) -> Vec<Archetype> {
    derive_from_position(player)
}

#[derive(Default)]
struct TagSet(Vec<Archetype>);

impl TagSet {
    fn add(&mut self, tag: Archetype) {
        if !self.0.contains(&tag) {
            self.0.push(tag);
        }
    }

    fn has(&self, tag: Archetype) -> bool {
        self.0.contains(&tag)
    }
}

pub fn derive_from_stats(player: &Player) -> Vec<Archetype> {
    let mut tags = TagSet::default();
    let three_rate = player.three_rate_pct();
    let three_pct = player.three_pct();
    let usage = player.usage_pct();
    let playmaking = player.assist_pct();
    let steals = player.steal_pct();
    let blocks = player.block_pct();
    let pace = player.pace();
    let impact = player.impact_score();
    let position = player.position();
    let frontcourt = position.contains('F') || position.contains('C');

    if playmaking >= 28.0 || (usage >= 28.0 && playmaking >= 18.0) {
        tags.add(Archetype::Creator);
    }
    if !tags.has(Archetype::Creator) && (playmaking >= 20.0 || usage >= 24.0) {
        tags.add(Archetype::Secondary);
    }

    if three_rate >= 45.0 && three_pct >= 36.0 {
        tags.add(Archetype::OffBallShooter);
    } else if three_rate >= 36.0 && three_pct >= 34.0 {
        tags.add(Archetype::Connector);
    }

    if frontcourt && pace >= 0.2 && impact >= 5.0 {
        tags.add(Archetype::SwitchBig);
    }
    if frontcourt && blocks >= 4.0 {
        tags.add(Archetype::RimProtector);
    }
    if frontcourt && pace >= 0.3 && impact >= 3.0 {
        tags.add(Archetype::RimRunner);
    }

    if three_pct >= 35.0 && three_rate >= 30.0 && playmaking >= 12.0 && usage <= 24.0 {
        tags.add(Archetype::Connector);
    }
    if steals >= 3.2 && pace >= 0.0 {
        tags.add(Archetype::PoaStopper);
    }
    if impact >= 6.0 && playmaking >= 16.0 && usage <= 22.0 {
        tags.add(Archetype::Connector);
    }
    if tags.0.is_empty() && impact >= 8.0 {
        tags.add(Archetype::Connector);
    }

    tags.0
}

pub fn derive_from_position(player: &Player) -> Vec<Archetype> {
    let position = player.position();
    if position.trim().is_empty() {
        return Vec::new();
    }

    let mut tags = TagSet::default();
    let assist = player.assist_pct();
    let usage = player.usage_pct();
    let pace = player.pace();
    let impact = player.impact_score();
    let three_rate = player.three_rate_pct();
    let three_pct = player.three_pct();

    if position.contains('G') {
        if assist >= 22.0 || usage >= 26.0 {
            tags.add(Archetype::Creator);
        } else if assist >= 16.0 || usage >= 22.0 {
            tags.add(Archetype::Secondary);
        }
        tags.add(Archetype::Connector);
    }

    if position.contains('C') {
        tags.add(Archetype::RimProtector);
        if pace >= 0.2 || impact >= 6.0 {
            tags.add(Archetype::RimRunner);
        }
        if three_rate >= 30.0 && three_pct >= 35.0 {
            tags.add(Archetype::StretchBig);
        }
        if assist >= 14.0 || three_rate >= 25.0 {
            tags.add(Archetype::Connector);
        }
    } else if position.contains('F') {
        tags.add(Archetype::Connector);
        if pace >= 0.25 && impact >= 4.0 {
            tags.add(Archetype::SwitchBig);
        }
    }

    tags.0
}
