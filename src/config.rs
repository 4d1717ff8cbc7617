// src/config.rs
//! Client configuration: AtomPub endpoint, WSSE identity and shared secret.
//!
//! Sources, first hit wins in `load_default`:
//! 1) `$ENTRY_RESOLVER_CONFIG` (TOML or JSON file)
//! 2) `config/entry_resolver.toml`
//! 3) `config/entry_resolver.json`
//! 4) `ENTRY_RESOLVER_*` environment variables

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ResolveError, Result};

pub const ENV_CONFIG_PATH: &str = "ENTRY_RESOLVER_CONFIG";
pub const ENV_ENDPOINT: &str = "ENTRY_RESOLVER_ENDPOINT";
pub const ENV_IDENTITY: &str = "ENTRY_RESOLVER_IDENTITY";
pub const ENV_SECRET: &str = "ENTRY_RESOLVER_SECRET";
pub const ENV_TIMEOUT_SECS: &str = "ENTRY_RESOLVER_TIMEOUT_SECS";
pub const ENV_DEADLINE_SECS: &str = "ENTRY_RESOLVER_DEADLINE_SECS";

pub const DEFAULT_CONFIG_TOML: &str = "config/entry_resolver.toml";
pub const DEFAULT_CONFIG_JSON: &str = "config/entry_resolver.json";

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// AtomPub collection URL, e.g. `https://blog.hatena.ne.jp/<id>/<blog>/atom/entry`.
    pub endpoint: String,
    /// WSSE username.
    pub identity: String,
    /// Shared API key. `"ENV"` in a file means: read `ENTRY_RESOLVER_SECRET`.
    pub secret: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Wall-clock bound for one whole resolution; unbounded when absent.
    #[serde(default)]
    pub deadline_secs: Option<u64>,
}

// Never print the secret.
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("identity", &self.identity)
            .field("secret", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .field("deadline_secs", &self.deadline_secs)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(
        endpoint: impl Into<String>,
        identity: impl Into<String>,
        secret: impl Into<String>,
    ) -> Result<Self> {
        let cfg = Self {
            endpoint: endpoint.into(),
            identity: identity.into(),
            secret: secret.into(),
            timeout_secs: default_timeout_secs(),
            deadline_secs: None,
        };
        cfg.validated()
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_deadline_secs(mut self, secs: u64) -> Self {
        self.deadline_secs = Some(secs);
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }

    /// Normalize the endpoint and fail fast on unusable values.
    pub fn validated(mut self) -> Result<Self> {
        self.endpoint = self.endpoint.trim().trim_end_matches('/').to_string();
        self.identity = self.identity.trim().to_string();

        if self.secret.trim().is_empty() {
            return Err(ResolveError::Configuration(
                "shared secret is missing or empty".into(),
            ));
        }
        if self.identity.is_empty() {
            return Err(ResolveError::Configuration("identity is empty".into()));
        }
        if !(self.endpoint.starts_with("https://") || self.endpoint.starts_with("http://")) {
            return Err(ResolveError::Configuration(format!(
                "endpoint must be an http(s) URL, got '{}'",
                self.endpoint
            )));
        }
        Ok(self)
    }

    /// Build from `ENTRY_RESOLVER_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let endpoint = required_env(ENV_ENDPOINT)?;
        let identity = required_env(ENV_IDENTITY)?;
        let secret = std::env::var(ENV_SECRET).unwrap_or_default();

        let mut cfg = Self {
            endpoint,
            identity,
            secret,
            timeout_secs: default_timeout_secs(),
            deadline_secs: None,
        };
        if let Some(secs) = parse_secs_env(ENV_TIMEOUT_SECS)? {
            cfg.timeout_secs = secs;
        }
        cfg.deadline_secs = parse_secs_env(ENV_DEADLINE_SECS)?;
        cfg.validated()
    }

    /// Load from an explicit TOML or JSON file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ResolveError::Configuration(format!("reading {}: {e}", path.display()))
        })?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let mut cfg = parse_config(&content, &ext)?;
        if cfg.secret.trim().eq_ignore_ascii_case("env") {
            cfg.secret = std::env::var(ENV_SECRET).map_err(|_| {
                ResolveError::Configuration(format!("{ENV_SECRET} is not set"))
            })?;
        }
        cfg.validated()
    }

    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(ResolveError::Configuration(format!(
                    "{ENV_CONFIG_PATH} points to non-existent path {}",
                    pb.display()
                )));
            }
            return Self::load_from(&pb);
        }
        for candidate in [DEFAULT_CONFIG_TOML, DEFAULT_CONFIG_JSON] {
            let pb = PathBuf::from(candidate);
            if pb.exists() {
                return Self::load_from(&pb);
            }
        }
        Self::from_env()
    }
}

fn required_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ResolveError::Configuration(format!("{name} is not set"))),
    }
}

fn parse_secs_env(name: &str) -> Result<Option<u64>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ResolveError::Configuration(format!("{name} must be whole seconds"))),
        Err(_) => Ok(None),
    }
}

fn parse_config(s: &str, hint_ext: &str) -> Result<ClientConfig> {
    let try_toml_first = hint_ext == "toml" || !s.trim_start().starts_with('{');
    if try_toml_first {
        if let Ok(cfg) = toml::from_str::<ClientConfig>(s) {
            return Ok(cfg);
        }
    }
    if let Ok(cfg) = serde_json::from_str::<ClientConfig>(s) {
        return Ok(cfg);
    }
    if !try_toml_first {
        if let Ok(cfg) = toml::from_str::<ClientConfig>(s) {
            return Ok(cfg);
        }
    }
    Err(ResolveError::Configuration(
        "unsupported or incomplete config format".into(),
    ))
}
