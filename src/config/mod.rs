use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

const DEFAULT_PORT: u16 = 4310;
const DEFAULT_MAX_COUNT: i64 = 1000;
const DEFAULT_DATE_START_YEAR: i32 = 2020;
const DEFAULT_DATE_END_YEAR: i32 = 2024;
const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 30;
const DEFAULT_REMOTE_BASE_URL: &str = "https://integrate.api.nvidia.com/v1";
const DEFAULT_REMOTE_MODEL: &str = "meta/llama-3.1-8b-instruct";
/// Development-only fallback. A real deployment sets `jwt_secret` in
/// synthd.toml or `SYNTHD_JWT_SECRET`.
const DEV_JWT_SECRET: &str = "synthd-dev-secret";

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

// ─── GenerationConfig ─────────────────────────────────────────────────────────

/// Synthesizer limits (`[generation]` in synthd.toml).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Upper bound on records per request. One bound everywhere: the HTTP
    /// layer accepts 1..=max_count, the core accepts 0..=max_count.
    pub max_count: i64,
    /// Synthetic dates fall between Jan 1 of this year…
    pub date_start_year: i32,
    /// …and Dec 31 of this year, inclusive.
    pub date_end_year: i32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_count: DEFAULT_MAX_COUNT,
            date_start_year: DEFAULT_DATE_START_YEAR,
            date_end_year: DEFAULT_DATE_END_YEAR,
        }
    }
}

// ─── ProviderConfig ───────────────────────────────────────────────────────────

/// Which generation backend serves requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Offline interpreter + synthesizer. No network, never unavailable.
    #[default]
    Local,
    /// Hosted chat-completion endpoint.
    Remote,
}

/// Generation provider configuration (`[provider]` in synthd.toml).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    /// Base URL of an OpenAI-compatible completion API.
    pub base_url: String,
    /// Bearer token for the remote endpoint. Usually supplied via
    /// `SYNTHD_API_KEY` rather than the config file.
    pub api_key: Option<String>,
    pub model: String,
    /// Request timeout for the remote call, in seconds.
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Local,
            base_url: DEFAULT_REMOTE_BASE_URL.to_string(),
            api_key: None,
            model: DEFAULT_REMOTE_MODEL.to_string(),
            timeout_secs: DEFAULT_PROVIDER_TIMEOUT_SECS,
        }
    }
}

// ─── SynthdConfig ─────────────────────────────────────────────────────────────

/// Top-level service configuration: synthd.toml in the data directory,
/// overlaid with environment variables and CLI flags.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SynthdConfig {
    pub port: u16,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Data directory for the SQLite database and config file.
    pub data_dir: PathBuf,
    /// Log level filter (trace, debug, info, warn, error).
    pub log: String,
    /// Write logs to this file (rotated daily) in addition to stdout.
    pub log_file: Option<PathBuf>,
    /// "compact" or "json".
    pub log_format: String,
    /// HS256 signing secret for auth tokens.
    pub jwt_secret: String,
    pub generation: GenerationConfig,
    pub provider: ProviderConfig,
}

impl Default for SynthdConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind_address: default_bind_address(),
            data_dir: PathBuf::from(".synthd"),
            log: "info".to_string(),
            log_file: None,
            log_format: "compact".to_string(),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            generation: GenerationConfig::default(),
            provider: ProviderConfig::default(),
        }
    }
}

impl SynthdConfig {
    /// Load synthd.toml from the data directory, falling back to defaults
    /// when the file is missing or unreadable. Environment variables
    /// `SYNTHD_JWT_SECRET` and `SYNTHD_API_KEY` override the file.
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join("synthd.toml");
        let mut cfg = match std::fs::read_to_string(&path) {
            Ok(text) => match toml::from_str::<SynthdConfig>(&text) {
                Ok(cfg) => cfg,
                Err(e) => {
                    warn!("invalid config file {}: {e} — using defaults", path.display());
                    SynthdConfig::default()
                }
            },
            Err(_) => SynthdConfig::default(),
        };
        cfg.data_dir = data_dir.to_path_buf();

        if let Ok(secret) = std::env::var("SYNTHD_JWT_SECRET") {
            if !secret.is_empty() {
                cfg.jwt_secret = secret;
            }
        }
        if let Ok(key) = std::env::var("SYNTHD_API_KEY") {
            if !key.is_empty() {
                cfg.provider.api_key = Some(key);
            }
        }

        cfg
    }

    /// Clamp nonsensical values back to defaults rather than failing startup.
    /// Called after logging is initialized so the warnings are visible.
    pub fn sanitize(&mut self) {
        if self.generation.max_count < 1 {
            warn!(
                "generation.max_count {} is not usable — using {DEFAULT_MAX_COUNT}",
                self.generation.max_count
            );
            self.generation.max_count = DEFAULT_MAX_COUNT;
        }
        if self.generation.date_start_year > self.generation.date_end_year {
            warn!(
                "generation date range {}..{} is inverted — using defaults",
                self.generation.date_start_year, self.generation.date_end_year
            );
            self.generation.date_start_year = DEFAULT_DATE_START_YEAR;
            self.generation.date_end_year = DEFAULT_DATE_END_YEAR;
        }
        if self.jwt_secret == DEV_JWT_SECRET {
            warn!("using the built-in development JWT secret — set SYNTHD_JWT_SECRET in production");
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
