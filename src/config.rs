use std::sync::Once;

use tracing_subscriber::EnvFilter;

use crate::era::EraStyle;
use crate::simulate::{DEFAULT_GAMES, MAX_GAMES};

pub const LOG_ENV: &str = "RUMBLE_LOG";
const DEFAULT_LOG_FILTER: &str = "roster_rumble=info";

/// Runtime knobs read from the environment (after `.env.local` / `.env`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RumbleConfig {
    pub games: u32,
    pub seed: Option<u64>,
    pub style: EraStyle,
}

impl Default for RumbleConfig {
    fn default() -> Self {
        Self {
            games: DEFAULT_GAMES,
            seed: None,
            style: EraStyle::Current,
        }
    }
}

impl RumbleConfig {
    pub fn from_env() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Unparseable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let games = lookup("RUMBLE_GAMES")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .unwrap_or(DEFAULT_GAMES)
            .clamp(1, MAX_GAMES);
        let seed = lookup("RUMBLE_SEED").and_then(|v| v.trim().parse::<u64>().ok());
        let style = lookup("RUMBLE_STYLE")
            .and_then(|v| v.parse::<EraStyle>().ok())
            .unwrap_or_default();
        Self { games, seed, style }
    }
}

static TRACING: Once = Once::new();

pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}
