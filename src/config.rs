//! Configuration management for Tacet
//!
//! Provides persistent settings storage with schema versioning and migrations.
//! Configuration is stored in `~/.tacet/config.json`. It is loaded once at
//! start-up and handed to whatever needs it; there is no global copy.

use crate::audio::RecordingProfile;
use crate::recording::{DEFAULT_MIN_TAGS_FOR_UPLOAD, MAX_TAGS};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Current config schema version
pub const CURRENT_VERSION: u32 = 1;

/// Shortest interval timer the recording flow accepts, in milliseconds
const MIN_TIMER_INTERVAL_MS: u64 = 10;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Schema version for migrations
    pub version: u32,
    /// Microphone and encoding settings
    pub audio: AudioConfig,
    /// Recording flow settings
    pub recording: RecordingConfig,
    /// Player settings
    pub playback: PlaybackConfig,
    /// Recordings service settings
    pub api: ApiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            audio: AudioConfig::default(),
            recording: RecordingConfig::default(),
            playback: PlaybackConfig::default(),
            api: ApiConfig::default(),
        }
    }
}

/// Audio recording configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Input device name (None for system default)
    pub device_name: Option<String>,
    /// High fidelity WAV or the compressed encoding list
    pub profile: RecordingProfile,
}

/// Recording flow configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingConfig {
    /// Tags a draft needs before it can be uploaded
    pub min_tags_for_upload: usize,
    /// How often the elapsed timer fires while recording
    pub timer_interval_ms: u64,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            min_tags_for_upload: DEFAULT_MIN_TAGS_FOR_UPLOAD,
            timer_interval_ms: 100,
        }
    }
}

impl RecordingConfig {
    pub fn timer_interval(&self) -> Duration {
        Duration::from_millis(self.timer_interval_ms)
    }
}

/// Player configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Step of the simulated playback timer; each tick advances this much
    pub simulation_tick_ms: u64,
    /// `previous` restarts the current item past this many seconds
    pub restart_threshold_seconds: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            simulation_tick_ms: 100,
            restart_threshold_seconds: 3.0,
        }
    }
}

impl PlaybackConfig {
    pub fn simulation_tick(&self) -> Duration {
        Duration::from_millis(self.simulation_tick_ms)
    }
}

/// Recordings service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the REST API
    pub base_url: String,
    /// Bearer token sent with authenticated requests
    pub auth_token: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".to_string(),
            auth_token: None,
            timeout_secs: 30,
        }
    }
}

/// Directory holding config and logs
pub fn config_dir() -> PathBuf {
    home_dir_or_fallback().join(".tacet")
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

pub fn log_dir() -> PathBuf {
    config_dir().join("logs")
}

fn home_dir_or_fallback() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| {
        tracing::error!("Could not determine home directory, using /tmp");
        PathBuf::from("/tmp")
    })
}

impl Config {
    /// Load from `~/.tacet/config.json`
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    /// Load from `path`, using defaults if the file does not exist
    ///
    /// Older schema versions are migrated and written back.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("Config file not found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;

        let original_version = config.version;
        let config = migrate_config(config)?;
        if config.version != original_version {
            tracing::info!(
                "Migrated config from version {} to {}",
                original_version,
                config.version
            );
            config.save_to(path)?;
        }

        let config = config.sanitised();
        tracing::info!(
            "Config loaded: device={:?}, profile={:?}, api={}",
            config.audio.device_name,
            config.audio.profile,
            config.api.base_url
        );
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&config_path())
    }

    /// Write pretty-printed JSON to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory {}", dir.display()))?;
        }

        let mut config = self.clone();
        config.version = CURRENT_VERSION;
        let contents =
            serde_json::to_string_pretty(&config).context("Failed to serialise config")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;

        tracing::info!("Config saved to {}", path.display());
        Ok(())
    }

    /// Pull out-of-range values back to something the app can run with
    pub fn sanitised(mut self) -> Self {
        if self.recording.min_tags_for_upload > MAX_TAGS {
            tracing::warn!(
                "min_tags_for_upload={} exceeds the tag limit, using {}",
                self.recording.min_tags_for_upload,
                MAX_TAGS
            );
            self.recording.min_tags_for_upload = MAX_TAGS;
        }
        if self.recording.timer_interval_ms < MIN_TIMER_INTERVAL_MS {
            tracing::warn!(
                "timer_interval_ms={} too small, using {}",
                self.recording.timer_interval_ms,
                MIN_TIMER_INTERVAL_MS
            );
            self.recording.timer_interval_ms = MIN_TIMER_INTERVAL_MS;
        }
        if self.playback.simulation_tick_ms == 0 {
            self.playback.simulation_tick_ms = PlaybackConfig::default().simulation_tick_ms;
        }
        if !self.playback.restart_threshold_seconds.is_finite()
            || self.playback.restart_threshold_seconds < 0.0
        {
            self.playback.restart_threshold_seconds =
                PlaybackConfig::default().restart_threshold_seconds;
        }
        self
    }
}

fn migrate_config(mut config: Config) -> Result<Config> {
    // Apply migrations sequentially
    while config.version < CURRENT_VERSION {
        config = apply_migration(config)?;
    }
    if config.version > CURRENT_VERSION {
        bail!(
            "Config version {} is newer than this build supports ({})",
            config.version,
            CURRENT_VERSION
        );
    }
    Ok(config)
}

fn apply_migration(config: Config) -> Result<Config> {
    match config.version {
        // Version 0 -> 1: files written before versioning
        0 => {
            let mut migrated = config;
            migrated.version = 1;
            Ok(migrated)
        }
        v => bail!("Unknown config version: {}", v),
    }
}
