use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RumbleError {
    #[error("team {team} has {found} players, expected {expected}")]
    RosterSizeMismatch {
        team: String,
        expected: usize,
        found: usize,
    },
    #[error("unknown era style: {0}")]
    UnknownEraStyle(String),
    #[error("unknown archetype: {0}")]
    UnknownArchetype(String),
    #[error("unknown team: {0}")]
    UnknownTeam(String),
    #[error("player pool parse failed: {0}")]
    PoolParse(#[from] serde_json::Error),
    #[error("case file parse failed: {0}")]
    CaseParse(#[source] serde_json::Error),
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, RumbleError>;
