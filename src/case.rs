use std::fs;
use std::path::{Path, PathBuf};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;

use crate::config::RumbleConfig;
use crate::error::{Result, RumbleError};
use crate::player::Player;
use crate::simulate::SimulationOptions;
use crate::state::{MatchupState, PlayerPool, RumbleBoard};

/// A matchup to run from the command line.
///
/// `pool` is resolved relative to the case file; inline `players` are
/// merged into it. Without a `state` the default presets are loaded.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RumbleCase {
    #[serde(default)]
    pub pool: Option<PathBuf>,
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub state: Option<MatchupState>,
    #[serde(default)]
    pub games: Option<u32>,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl RumbleCase {
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(RumbleError::CaseParse)
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_json(&read(path)?)
    }

    pub fn player_pool(&self, case_path: &Path) -> Result<PlayerPool> {
        let mut players = match &self.pool {
            Some(rel) => {
                let base = case_path.parent().unwrap_or_else(|| Path::new("."));
                let pool = PlayerPool::from_json(&read(&base.join(rel))?)?;
                pool.players().to_vec()
            }
            None => Vec::new(),
        };
        players.extend(self.players.iter().cloned());
        Ok(PlayerPool::new(players))
    }

    /// Case values win over the environment.
    pub fn board(&self, pool: &PlayerPool, config: &RumbleConfig) -> RumbleBoard {
        match &self.state {
            Some(state) => {
                let mut board = RumbleBoard::restore(state, pool);
                if state.style.is_none() && state.era_norm.is_none() {
                    board.style = config.style;
                }
                board
            }
            None => {
                let mut board = RumbleBoard::with_default_presets(pool);
                board.style = config.style;
                board
            }
        }
    }

    pub fn options(&self, config: &RumbleConfig) -> SimulationOptions {
        SimulationOptions {
            games: Some(self.games.unwrap_or(config.games)),
            ..SimulationOptions::default()
        }
    }

    pub fn rng(&self, config: &RumbleConfig) -> ChaCha8Rng {
        match self.seed.or(config.seed) {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        }
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| RumbleError::Read {
        path: path.to_path_buf(),
        source,
    })
}
