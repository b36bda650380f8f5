//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.askgate/config.json`) and environment.
//! Upstream credentials come from `DATABRICKS_ENDPOINT_URL` / `DATABRICKS_TOKEN` when set.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Env var that overrides `upstream.endpointUrl`.
pub const ENDPOINT_URL_ENV: &str = "DATABRICKS_ENDPOINT_URL";

/// Env var that overrides `upstream.token`.
pub const TOKEN_ENV: &str = "DATABRICKS_TOKEN";

/// Canned message sent by the connection check.
pub const DEFAULT_HEALTH_PROMPT: &str = "Compare Equity vs Loan investment across industries.";

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Remote inference endpoint settings.
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

/// Gateway bind, port, and CORS settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Port for HTTP (default 8000).
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bind address (default "0.0.0.0").
    #[serde(default = "default_gateway_bind")]
    pub bind: String,

    #[serde(default)]
    pub cors: CorsConfig,
}

/// Browser CORS policy. `"*"` in methods or headers means "whatever the preflight asks for".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorsConfig {
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    #[serde(default = "wildcard")]
    pub allowed_methods: Vec<String>,

    #[serde(default = "wildcard")]
    pub allowed_headers: Vec<String>,

    #[serde(default = "default_true")]
    pub allow_credentials: bool,

    /// How long browsers may cache a preflight response. 0 disables the header.
    #[serde(default = "default_max_age_seconds")]
    pub max_age_seconds: u64,
}

/// Remote inference endpoint: URL, bearer token, timeouts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamConfig {
    /// Target URL for every outbound call. Overridden by DATABRICKS_ENDPOINT_URL env.
    pub endpoint_url: Option<String>,

    /// Bearer token. Overridden by DATABRICKS_TOKEN env.
    pub token: Option<String>,

    /// Timeout for `/ask` forwards (default 300).
    #[serde(default = "default_ask_timeout_secs")]
    pub ask_timeout_secs: u64,

    /// Timeout for the connection check (default 30).
    #[serde(default = "default_health_timeout_secs")]
    pub health_timeout_secs: u64,

    /// Message sent by the connection check.
    #[serde(default = "default_health_prompt")]
    pub health_prompt: String,
}

fn default_gateway_port() -> u16 {
    8000
}

fn default_gateway_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "https://agentic-fis.vercel.app".to_string(),
        "http://localhost:5174".to_string(),
    ]
}

fn wildcard() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_true() -> bool {
    true
}

fn default_max_age_seconds() -> u64 {
    3600
}

fn default_ask_timeout_secs() -> u64 {
    300
}

fn default_health_timeout_secs() -> u64 {
    30
}

fn default_health_prompt() -> String {
    DEFAULT_HEALTH_PROMPT.to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            bind: default_gateway_bind(),
            cors: CorsConfig::default(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
            allowed_methods: wildcard(),
            allowed_headers: wildcard(),
            allow_credentials: true,
            max_age_seconds: default_max_age_seconds(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            endpoint_url: None,
            token: None,
            ask_timeout_secs: default_ask_timeout_secs(),
            health_timeout_secs: default_health_timeout_secs(),
            health_prompt: default_health_prompt(),
        }
    }
}

/// Upstream settings resolved once at startup and handed to the gateway.
#[derive(Debug, Clone)]
pub struct UpstreamSettings {
    pub endpoint_url: String,
    pub token: Option<String>,
    pub ask_timeout: Duration,
    pub health_timeout: Duration,
    pub health_prompt: String,
}

impl UpstreamSettings {
    /// Resolve from config plus environment. Fails on a zero timeout or when no endpoint URL
    /// is available.
    pub fn resolve(config: &Config) -> Result<Self> {
        if config.upstream.ask_timeout_secs == 0 {
            anyhow::bail!("upstream.askTimeoutSecs must be greater than 0");
        }
        if config.upstream.health_timeout_secs == 0 {
            anyhow::bail!("upstream.healthTimeoutSecs must be greater than 0");
        }
        let endpoint_url = resolve_endpoint_url(config).with_context(|| {
            format!(
                "no upstream endpoint configured (set {} or upstream.endpointUrl)",
                ENDPOINT_URL_ENV
            )
        })?;
        Ok(Self {
            endpoint_url,
            token: resolve_upstream_token(config),
            ask_timeout: Duration::from_secs(config.upstream.ask_timeout_secs),
            health_timeout: Duration::from_secs(config.upstream.health_timeout_secs),
            health_prompt: config.upstream.health_prompt.clone(),
        })
    }
}

/// Trimmed, non-empty env value if set.
fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(non_empty)
}

fn non_empty(s: String) -> Option<String> {
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

/// Env value wins over the configured one; blanks count as unset.
fn prefer_env(env: Option<String>, configured: Option<&String>) -> Option<String> {
    env.and_then(non_empty)
        .or_else(|| configured.cloned().and_then(non_empty))
}

/// Resolve the upstream URL: env DATABRICKS_ENDPOINT_URL overrides config.
pub fn resolve_endpoint_url(config: &Config) -> Option<String> {
    prefer_env(
        env_value(ENDPOINT_URL_ENV),
        config.upstream.endpoint_url.as_ref(),
    )
}

/// Resolve the upstream bearer token: env DATABRICKS_TOKEN overrides config.
pub fn resolve_upstream_token(config: &Config) -> Option<String> {
    prefer_env(env_value(TOKEN_ENV), config.upstream.token.as_ref())
}

/// Load `KEY=value` pairs from a dotenv file into the process environment; variables that are
/// already set win. `None` reads `.env` from the working directory or its parents.
/// Returns the file that was loaded, or `None` when there is no such file.
pub fn load_env_file(path: Option<&Path>) -> Result<Option<PathBuf>> {
    let loaded = match path {
        Some(p) => dotenvy::from_path(p).map(|()| p.to_path_buf()),
        None => dotenvy::dotenv(),
    };
    match loaded {
        Ok(p) => {
            log::debug!("loaded environment from {}", p.display());
            Ok(Some(p))
        }
        Err(e) if e.not_found() => {
            log::debug!("no .env file found");
            Ok(None)
        }
        Err(e) => Err(e).context("reading .env file"),
    }
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("ASKGATE_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".askgate").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the given path, ASKGATE_CONFIG_PATH, or the default. Missing file => default config.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}

/// Address a local client should dial for this gateway (wildcard binds map to loopback).
pub fn local_base_url(gateway: &GatewayConfig) -> String {
    let host = match gateway.bind.trim() {
        "0.0.0.0" | "" => "127.0.0.1",
        "::" => "[::1]",
        other => other,
    };
    format!("http://{}:{}", host, gateway.port)
}
