//! Publisher configuration.
//!
//! Resolution order: environment variables → config file → defaults.
//!
//! Config file location:
//!   1. $GELF_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/gelf/config.toml
//!   3. ~/.config/gelf/config.toml
//!
//! The publisher never reads the environment itself; only `load()` does.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::wire::DEFAULT_PORT;

/// Chunk size presets, in payload bytes per datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkProfile {
    /// Fits under common internet path MTUs.
    Wan,
    /// Jumbo-ish datagrams for a local network.
    Lan,
}

impl ChunkProfile {
    pub const fn chunk_size(self) -> usize {
        match self {
            ChunkProfile::Wan => 1420,
            ChunkProfile::Lan => 8154,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "wan" => Some(ChunkProfile::Wan),
            "lan" => Some(ChunkProfile::Lan),
            _ => None,
        }
    }
}

/// What to do with a payload that already fits in one chunk.
///
/// The UDP write path this protocol grew up on only reported a failed
/// send on every second write, so a lone datagram could vanish without an
/// error. Splitting the payload in two guarantees at least one write whose
/// failure is observed. Transports with reliable write confirmation can
/// switch to `SendWhole`; receivers accept both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmallPayloadPolicy {
    #[default]
    SplitInTwo,
    SendWhole,
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    /// Collector hostname or address. Required.
    pub host: String,
    /// Collector UDP port.
    pub port: u16,
    /// Maximum payload bytes per chunk, excluding the 12-byte header.
    pub chunk_size: usize,
    pub small_payload: SmallPayloadPolicy,
    /// Sleep after each successful publish, in microseconds.
    pub pacing_micros: u64,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_PORT,
            chunk_size: ChunkProfile::Wan.chunk_size(),
            small_payload: SmallPayloadPolicy::default(),
            pacing_micros: 20,
        }
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
        .join("gelf")
}

fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("hostname must not be blank")]
    BlankHost,
    #[error("invalid port {0:?}: expected a number in 1..=65535")]
    InvalidPort(String),
    #[error("invalid chunk size {0:?}: expected a positive number")]
    InvalidChunkSize(String),
    #[error("unknown chunk profile {0:?}: expected \"wan\" or \"lan\"")]
    UnknownProfile(String),
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
}

// ── Construction ──────────────────────────────────────────────────────────────

impl PublisherConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// Build from untyped inputs such as CLI arguments or form fields.
    pub fn from_parts(host: &str, port: &str, chunk_size: &str) -> Result<Self, ConfigError> {
        let config = Self {
            host: host.to_string(),
            port: parse_port(port)?,
            chunk_size: parse_chunk_size(chunk_size)?,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_profile(self, profile: ChunkProfile) -> Self {
        self.with_chunk_size(profile.chunk_size())
    }

    pub fn with_small_payload(mut self, policy: SmallPayloadPolicy) -> Self {
        self.small_payload = policy;
        self
    }

    /// Stored in whole microseconds, rounded up so a nonzero delay stays
    /// nonzero.
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing_micros = u64::try_from(pacing.as_nanos().div_ceil(1_000)).unwrap_or(u64::MAX);
        self
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_micros(self.pacing_micros)
    }

    /// Reject settings the publisher cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::BlankHost);
        }
        if self.port == 0 {
            return Err(ConfigError::InvalidPort(self.port.to_string()));
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::InvalidChunkSize(self.chunk_size.to_string()));
        }
        Ok(())
    }
}

fn parse_port(s: &str) -> Result<u16, ConfigError> {
    match s.trim().parse::<u16>() {
        Ok(p) if p != 0 => Ok(p),
        _ => Err(ConfigError::InvalidPort(s.to_string())),
    }
}

fn parse_chunk_size(s: &str) -> Result<usize, ConfigError> {
    match s.trim().parse::<usize>() {
        Ok(n) if n != 0 => Ok(n),
        _ => Err(ConfigError::InvalidChunkSize(s.to_string())),
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl PublisherConfig {
    /// Load config: env vars → file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::file_path();
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadFailed(path.clone(), e))?;
            toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(path.clone(), e))?
        } else {
            PublisherConfig::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("GELF_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Apply GELF_* overrides from `lookup`. A profile is applied before an
    /// explicit chunk size, so GELF_CHUNK_SIZE wins when both are set.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("GELF_HOST") {
            self.host = v;
        }
        if let Some(v) = lookup("GELF_PORT") {
            self.port = parse_port(&v)?;
        }
        if let Some(v) = lookup("GELF_CHUNK_PROFILE") {
            let profile = ChunkProfile::parse(&v).ok_or(ConfigError::UnknownProfile(v))?;
            self.chunk_size = profile.chunk_size();
        }
        if let Some(v) = lookup("GELF_CHUNK_SIZE") {
            self.chunk_size = parse_chunk_size(&v)?;
        }
        Ok(())
    }
}
