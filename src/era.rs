use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RumbleError;
use crate::player::Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EraStyle {
    #[default]
    Current,
    Nineties,
    Pre3,
    Oldschool,
}

pub const ERA_STYLE_VALUES: [EraStyle; 4] = [
    EraStyle::Current,
    EraStyle::Nineties,
    EraStyle::Pre3,
    EraStyle::Oldschool,
];

/// Oldest first; index differences are era distances.
pub const ERA_STYLE_ORDER: [EraStyle; 4] = [
    EraStyle::Oldschool,
    EraStyle::Pre3,
    EraStyle::Nineties,
    EraStyle::Current,
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EraPreset {
    pub poss: f64,
    pub three_factor: f64,
    pub spacing_bonus: f64,
    pub post_boost: f64,
    pub handcheck: f64,
    pub orb: f64,
    pub variance: f64,
}

const CURRENT: EraPreset = EraPreset {
    poss: 100.0,
    three_factor: 1.0,
    spacing_bonus: 1.0,
    post_boost: 0.0,
    handcheck: 0.0,
    orb: 1.0,
    variance: 1.0,
};

const NINETIES: EraPreset = EraPreset {
    poss: 88.0,
    three_factor: 0.7,
    spacing_bonus: 0.8,
    post_boost: 3.0,
    handcheck: 2.0,
    orb: 1.1,
    variance: 1.05,
};

const PRE3: EraPreset = EraPreset {
    poss: 96.0,
    three_factor: 0.0,
    spacing_bonus: 0.3,
    post_boost: 4.0,
    handcheck: 1.0,
    orb: 1.15,
    variance: 1.1,
};

const OLDSCHOOL: EraPreset = EraPreset {
    poss: 70.0,
    three_factor: 0.0,
    spacing_bonus: 0.0,
    post_boost: 5.0,
    handcheck: 3.0,
    orb: 1.2,
    variance: 1.2,
};

impl EraStyle {
    pub fn preset(self) -> &'static EraPreset {
        match self {
            EraStyle::Current => &CURRENT,
            EraStyle::Nineties => &NINETIES,
            EraStyle::Pre3 => &PRE3,
            EraStyle::Oldschool => &OLDSCHOOL,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EraStyle::Current => "current",
            EraStyle::Nineties => "nineties",
            EraStyle::Pre3 => "pre3",
            EraStyle::Oldschool => "oldschool",
        }
    }

    /// Position in `ERA_STYLE_ORDER`; higher is more modern.
    pub fn modernity(self) -> usize {
        match self {
            EraStyle::Oldschool => 0,
            EraStyle::Pre3 => 1,
            EraStyle::Nineties => 2,
            EraStyle::Current => 3,
        }
    }

    pub fn hint(self) -> Option<&'static str> {
        match self {
            EraStyle::Nineties => Some("Post-ups and POA defense boosted; 3s devalued."),
            EraStyle::Pre3 => Some("No 3s; spacing bonuses reduced; interior play rewarded."),
            EraStyle::Oldschool => Some("Few possessions; size, ORB, and defense prioritized."),
            EraStyle::Current => None,
        }
    }

    pub fn from_year(year: i64) -> Self {
        if year >= 2005 {
            EraStyle::Current
        } else if year >= 1990 {
            EraStyle::Nineties
        } else if year >= 1975 {
            EraStyle::Pre3
        } else {
            EraStyle::Oldschool
        }
    }
}

impl fmt::Display for EraStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EraStyle {
    type Err = RumbleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let want = s.trim();
        ERA_STYLE_VALUES
            .iter()
            .copied()
            .find(|style| style.label().eq_ignore_ascii_case(want))
            .ok_or_else(|| RumbleError::UnknownEraStyle(want.to_string()))
    }
}

pub fn era_style_distance(a: EraStyle, b: EraStyle) -> usize {
    a.modernity().abs_diff(b.modernity())
}

/// Average of every 4-digit run in an era label, rounded to a whole year.
pub fn parse_era_year(label: &str) -> Option<i64> {
    let mut years = Vec::new();
    let mut run = String::new();
    for ch in label.chars().chain(std::iter::once(' ')) {
        if ch.is_ascii_digit() {
            run.push(ch);
            continue;
        }
        let digits = run.as_bytes();
        for chunk in digits.chunks_exact(4) {
            if let Some(year) = std::str::from_utf8(chunk).ok().and_then(|s| s.parse::<i64>().ok()) {
                years.push(year);
            }
        }
        run.clear();
    }
    if years.is_empty() {
        return None;
    }
    let mean = years.iter().sum::<i64>() as f64 / years.len() as f64;
    Some(mean.round() as i64)
}

pub fn infer_player_era_style(player: &Player) -> Option<EraStyle> {
    player
        .era
        .as_deref()
        .and_then(parse_era_year)
        .map(EraStyle::from_year)
}
