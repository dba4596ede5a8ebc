use serde::Serialize;

use crate::chemistry::TeamChemistry;
use crate::matchup::MatchupAdjustment;
use crate::simulate::SimResult;
use crate::state::TeamId;

const CHEMISTRY_LINES: usize = 3;
const MATCHUP_LINES: usize = 2;
pub const DEFAULT_HISTOGRAM_BINS: usize = 12;

fn placeholder(team: TeamId) -> &'static str {
    match team {
        TeamId::A => "Build a lineup to surface strengths.",
        TeamId::B => "Add opponents to reveal weaknesses.",
    }
}

pub fn team_insights(
    team: TeamId,
    chemistry: &TeamChemistry,
    matchup: &MatchupAdjustment,
) -> Vec<String> {
    let matchup_reasons = match team {
        TeamId::A => &matchup.reasons_a,
        TeamId::B => &matchup.reasons_b,
    };
    let lines: Vec<String> = chemistry
        .reasons
        .iter()
        .take(CHEMISTRY_LINES)
        .chain(matchup_reasons.iter().take(MATCHUP_LINES))
        .cloned()
        .collect();
    if lines.is_empty() {
        vec![placeholder(team).to_string()]
    } else {
        lines
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub win_pct_a: String,
    pub win_pct_b: String,
    pub avg_margin: String,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// `"62.5%"`; whole numbers drop the decimal.
pub fn format_percent(value: f64) -> String {
    format!("{}%", round1(value))
}

impl SeriesSummary {
    pub fn from_result(result: &SimResult) -> Self {
        Self {
            win_pct_a: format_percent(result.win_pct_a()),
            win_pct_b: format_percent(result.win_pct_b()),
            avg_margin: format!("{:.1} pts", result.mean_margin()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Equal-width bins spanning the observed margins.
pub fn margin_histogram(margins: &[f64], bins: usize) -> Vec<HistogramBin> {
    let finite: Vec<f64> = margins.iter().copied().filter(|m| m.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }
    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    let width = if span > 0.0 { span / bins as f64 } else { 1.0 };

    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            start: min + width * i as f64,
            end: min + width * (i + 1) as f64,
            count: 0,
        })
        .collect();
    for m in finite {
        let idx = (((m - min) / width).floor() as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}
