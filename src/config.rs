//! Runtime configuration

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 6574;
pub const DEFAULT_QUESTIONS_PATH: &str = "data/questions.json";
pub const DEFAULT_STATIC_DIR: &str = "static";

/// Tunables of the game store, identical on every replica
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub team_count: u32,
    pub default_timer_seconds: u32,
    /// Delay before a round change stops hiding the previous round's content
    pub transition_settle_delay: Duration,
    /// How long the Dave's Dozen incorrect indicator stays up
    pub incorrect_flash: Duration,
    pub team_time_up_debounce: Duration,
    pub only_connect_reveal_debounce: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            team_count: 3,
            default_timer_seconds: 60,
            transition_settle_delay: Duration::from_millis(100),
            incorrect_flash: Duration::from_secs(2),
            team_time_up_debounce: Duration::from_secs(1),
            only_connect_reveal_debounce: Duration::from_millis(500),
        }
    }
}

/// Server settings read from the environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Optional rounds file; the built-in catalog is used when unset
    pub rounds_path: Option<PathBuf>,
    pub questions_path: PathBuf,
    pub static_dir: PathBuf,
    /// Token the co-host must present (None = co-host auth disabled)
    pub cohost_token: Option<String>,
    pub store: StoreConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            rounds_path: None,
            questions_path: PathBuf::from(DEFAULT_QUESTIONS_PATH),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            cohost_token: None,
            store: StoreConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load config from QUIZ_PORT, QUIZ_ROUNDS_PATH, QUIZ_QUESTIONS_PATH,
    /// QUIZ_STATIC_DIR and COHOST_TOKEN
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = match env_value("QUIZ_PORT") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!("Invalid QUIZ_PORT '{}', using {}", raw, DEFAULT_PORT);
                DEFAULT_PORT
            }),
            None => defaults.port,
        };

        Self {
            port,
            rounds_path: env_value("QUIZ_ROUNDS_PATH").map(PathBuf::from),
            questions_path: env_value("QUIZ_QUESTIONS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.questions_path),
            static_dir: env_value("QUIZ_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            cohost_token: env_value("COHOST_TOKEN"),
            store: defaults.store,
        }
    }
}

/// Trimmed, non-empty env var
fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
