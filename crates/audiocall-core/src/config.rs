//! Quiz configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::progression::Thresholds;
use crate::scoring::BASE_POINTS;

/// Top-level audiocall configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizConfig {
    /// Pause between an answer and the next round, in milliseconds.
    #[serde(default = "default_reveal_delay")]
    pub reveal_delay_ms: u64,
    /// Points for a correct answer at multiplier 1.0.
    #[serde(default = "default_base_points")]
    pub base_points: f64,
    /// Correct streak that promotes a new word to learned.
    #[serde(default = "default_new_word_threshold")]
    pub new_word_threshold: u32,
    /// Correct streak that promotes a hard word to learned.
    #[serde(default = "default_hard_word_threshold")]
    pub hard_word_threshold: u32,
    /// Submit "no answer" automatically after this many seconds.
    #[serde(default)]
    pub answer_time_limit_secs: Option<u64>,
    /// Whether progress is recorded for the signed-in user.
    #[serde(default = "default_true")]
    pub authenticated: bool,
    /// Where the local word store keeps progress.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
    /// How long the end of a session waits for queued progress writes.
    #[serde(default = "default_store_flush_timeout")]
    pub store_flush_timeout_ms: u64,
}

fn default_reveal_delay() -> u64 {
    2000
}
fn default_base_points() -> f64 {
    BASE_POINTS
}
fn default_new_word_threshold() -> u32 {
    3
}
fn default_hard_word_threshold() -> u32 {
    5
}
fn default_true() -> bool {
    true
}
fn default_store_flush_timeout() -> u64 {
    5000
}
fn default_store_path() -> PathBuf {
    PathBuf::from("audiocall-progress.json")
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            reveal_delay_ms: default_reveal_delay(),
            base_points: default_base_points(),
            new_word_threshold: default_new_word_threshold(),
            hard_word_threshold: default_hard_word_threshold(),
            answer_time_limit_secs: None,
            authenticated: true,
            store_path: default_store_path(),
            store_flush_timeout_ms: default_store_flush_timeout(),
        }
    }
}

impl QuizConfig {
    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }

    pub fn store_flush_timeout(&self) -> Duration {
        Duration::from_millis(self.store_flush_timeout_ms)
    }

    pub fn answer_time_limit(&self) -> Option<Duration> {
        self.answer_time_limit_secs.map(Duration::from_secs)
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            new_word: self.new_word_threshold,
            hard: self.hard_word_threshold,
        }
    }

    /// Reject values the quiz cannot run with.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.base_points.is_finite() && self.base_points >= 0.0,
            "base_points must be a non-negative number"
        );
        anyhow::ensure!(
            self.new_word_threshold >= 1 && self.hard_word_threshold >= 1,
            "promotion thresholds must be at least 1"
        );
        anyhow::ensure!(
            self.answer_time_limit_secs != Some(0),
            "answer_time_limit_secs must be positive"
        );
        Ok(())
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `audiocall.toml` in the current directory
/// 2. `~/.config/audiocall/config.toml`
///
/// Environment variable overrides: `AUDIOCALL_REVEAL_DELAY_MS`, `AUDIOCALL_STORE`.
pub fn load_config() -> Result<QuizConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("audiocall.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<QuizConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizConfig::default(),
    };

    if let Ok(delay) = std::env::var("AUDIOCALL_REVEAL_DELAY_MS") {
        config.reveal_delay_ms = delay
            .parse()
            .with_context(|| format!("invalid AUDIOCALL_REVEAL_DELAY_MS: {delay}"))?;
    }
    if let Ok(store) = std::env::var("AUDIOCALL_STORE") {
        config.store_path = PathBuf::from(store);
    }

    config.validate()?;
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("audiocall"))
}
