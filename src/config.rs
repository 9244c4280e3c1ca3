//! Application configuration, loaded from TOML.

use anyhow::{bail, Context, Result};
use axum::http::HeaderName;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::server::API_ROUTES;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub middleware: MiddlewareConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Prefix for the API routes
    pub base_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            base_path: "/api".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiddlewareConfig {
    /// Header carrying the request correlator
    pub correlator_header: String,
    /// Permissive CORS on every route
    pub cors: bool,
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            correlator_header: "unica-correlator".into(),
            cors: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Prometheus scrape route
    pub path: String,
    /// Narrow `Accept` to OpenMetrics 1.0.0 when a request mentions it
    pub force_openmetrics: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            path: "/actuator/prometheus".into(),
            force_openmetrics: true,
        }
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;
    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    for candidate in ["./almaraz.toml", "./config.toml"] {
        let path = Path::new(candidate);
        if path.exists() {
            tracing::info!("Loading config from {}", path.display());
            return load_config(path);
        }
    }

    Ok(Config::default())
}

pub fn validate_config(config: &Config) -> Result<()> {
    validate_route("server.base_path", &config.server.base_path)?;
    validate_route("metrics.path", &config.metrics.path)?;
    if config.metrics.path == "/" {
        bail!("metrics.path must not be the root route");
    }
    let prefix = config.server.base_path.trim_end_matches('/');
    for route in API_ROUTES {
        if config.metrics.path == format!("{prefix}{route}") {
            bail!(
                "metrics.path {:?} collides with an API route under server.base_path",
                config.metrics.path
            );
        }
    }

    let header = &config.middleware.correlator_header;
    if header.is_empty() {
        bail!("middleware.correlator_header must not be empty");
    }
    HeaderName::from_bytes(header.as_bytes())
        .with_context(|| format!("middleware.correlator_header is not a header name: {header:?}"))?;

    Ok(())
}

fn validate_route(field: &str, route: &str) -> Result<()> {
    if !route.starts_with('/') {
        bail!("{field} must start with '/': {route:?}");
    }
    if route.len() > 1 && route.ends_with('/') {
        bail!("{field} must not end with '/': {route:?}");
    }
    Ok(())
}
