pub mod archetypes;
pub mod case;
pub mod chemistry;
pub mod config;
pub mod era;
pub mod error;
pub mod insights;
pub mod matchup;
pub mod player;
pub mod simulate;
pub mod state;

pub use archetypes::{ArchetypeLookup, NoOverrides, infer_archetypes};
pub use case::RumbleCase;
pub use chemistry::{ChemistryEdge, TeamChemistry, build_chemistry};
pub use config::RumbleConfig;
pub use era::{EraPreset, EraStyle, era_style_distance, infer_player_era_style};
pub use error::{Result, RumbleError};
pub use matchup::{MatchupAdjustment, evaluate_matchup};
pub use player::{Archetype, Player};
pub use simulate::{
    LegacyEra, MAX_GAMES, SimResult, SimulationOptions, simulate_series, simulate_series_legacy,
    simulate_series_with_entropy,
};
pub use state::{MatchupState, PlayerPool, RumbleBoard, TeamId};
