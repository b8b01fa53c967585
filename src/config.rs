//! Startup configuration, read from the environment (and `.env`, loaded by
//! `main`). Every setting has a default matching the public Claila deployment.
use std::time::Duration;

use anyhow::{Context, anyhow, bail};

use crate::services::models::Model;
use crate::services::shaping::ResponseShape;

pub const DEFAULT_PORT: u16 = 7860;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_BASE_URL: &str = "https://app.claila.com/api/v2";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub upstream_base_url: String,
    /// Bound applied to each of the three upstream calls.
    pub upstream_timeout: Duration,
    pub response_shape: ResponseShape,
    pub models: Vec<Model>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            upstream_base_url: DEFAULT_BASE_URL.to_string(),
            upstream_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            response_shape: ResponseShape::default(),
            models: Model::ALL.to_vec(),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset or blank keys take defaults.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Config::default();

        if let Some(host) = get("RELAY_HOST") {
            config.host = host.trim().to_string();
        }
        if let Some(port) = get("RELAY_PORT") {
            config.port = port
                .trim()
                .parse()
                .with_context(|| format!("RELAY_PORT '{port}' is not a valid port"))?;
        }
        if let Some(url) = get("CLAILA_BASE_URL") {
            config.upstream_base_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(secs) = get("RELAY_UPSTREAM_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .with_context(|| format!("RELAY_UPSTREAM_TIMEOUT_SECS '{secs}' is not a number"))?;
            config.upstream_timeout = Duration::from_secs(secs);
        }
        if let Some(shape) = get("RELAY_RESPONSE_SHAPE") {
            config.response_shape = shape.parse().map_err(|e: String| anyhow!(e))?;
        }
        if let Some(models) = get("RELAY_MODELS") {
            config.models = parse_models(&models)?;
        }

        config.validate()
    }

    pub fn validate(self) -> anyhow::Result<Self> {
        let url = reqwest::Url::parse(&self.upstream_base_url)
            .with_context(|| format!("CLAILA_BASE_URL '{}' is not a URL", self.upstream_base_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("CLAILA_BASE_URL must be http or https, got '{}'", url.scheme());
        }
        if self.upstream_timeout.is_zero() {
            bail!("RELAY_UPSTREAM_TIMEOUT_SECS must be greater than zero");
        }
        if self.models.is_empty() {
            bail!("RELAY_MODELS must name at least one model");
        }
        Ok(self)
    }

    /// Host and port for `TcpListener::bind`; the host may be a name or an IP.
    pub fn bind_addr(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

fn parse_models(list: &str) -> anyhow::Result<Vec<Model>> {
    let mut models = Vec::new();
    for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let model = Model::from_route(&name.to_ascii_lowercase())
            .ok_or_else(|| anyhow!("RELAY_MODELS: unknown model '{name}'"))?;
        if !models.contains(&model) {
            models.push(model);
        }
    }
    Ok(models)
}
