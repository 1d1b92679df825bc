// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon.
//!
//! Everything is read once at startup by [`Config::load`]. A `.env` file is
//! not consulted.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;
use tb_adapters::http::normalize_base_url;
use tb_adapters::BusEndpoint;
use tb_engine::{OrchestratorConfig, ServiceKey};
use thiserror::Error;

/// Errors from reading the environment
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{var}={value:?} is invalid: {reason}")]
    Invalid { var: &'static str, value: String, reason: String },
}

/// Daemon configuration
#[derive(Clone)]
pub struct Config {
    /// Broker URL the command queue is consumed from
    pub amqp_url: String,
    /// Management API endpoint events are published through
    pub bus: BusEndpoint,
    pub vault_url: String,
    pub vault_token: String,
    /// Externally reachable UI/API base URL
    pub api_url: String,
    /// Registry host, scheme stripped
    pub registry: String,
    pub public_key_path: Option<PathBuf>,
    pub ui_routing_key: String,
    pub router_routing_key: String,
    pub max_concurrent_builds: usize,
    pub poll_interval: Duration,
    pub log_dir: Option<PathBuf>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("amqp_url", &redact_userinfo(&self.amqp_url))
            .field("bus", &redact_userinfo(&self.bus.url))
            .field("vhost", &self.bus.vhost)
            .field("exchange", &self.bus.exchange)
            .field("queue", &self.bus.queue)
            .field("vault_url", &self.vault_url)
            .field("api_url", &self.api_url)
            .field("registry", &self.registry)
            .field("public_key_path", &self.public_key_path)
            .field("max_concurrent_builds", &self.max_concurrent_builds)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Read the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |var: &'static str| get(var).ok_or(ConfigError::Missing(var));

        let amqp_url = required("AMQP_URL")?;
        let (derived_url, url_vhost) = management_url(&amqp_url)?;
        let bus = BusEndpoint {
            url: get("TB_MANAGEMENT_URL").map(|u| normalize_base_url(&u)).unwrap_or(derived_url),
            vhost: get("TB_VHOST").or(url_vhost).unwrap_or_else(|| "/".to_string()),
            exchange: get("TB_EXCHANGE").unwrap_or_else(|| "pht".to_string()),
            queue: get("TB_QUEUE").unwrap_or_else(|| "tb".to_string()),
        };

        let max_concurrent_builds = match get("TB_MAX_CONCURRENT_BUILDS") {
            Some(v) => parse_number("TB_MAX_CONCURRENT_BUILDS", &v)?,
            None => 1,
        };
        if max_concurrent_builds == 0 {
            return Err(ConfigError::Invalid {
                var: "TB_MAX_CONCURRENT_BUILDS",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        let poll_interval = match get("TB_POLL_INTERVAL_MS") {
            Some(v) => Duration::from_millis(parse_number("TB_POLL_INTERVAL_MS", &v)? as u64),
            None => Duration::from_millis(1000),
        };

        Ok(Self {
            amqp_url,
            bus,
            vault_url: normalize_base_url(&required("VAULT_URL")?),
            vault_token: required("VAULT_TOKEN")?,
            api_url: normalize_base_url(&required("UI_TRAIN_API")?),
            registry: registry_host(&required("HARBOR_URL")?),
            public_key_path: get("TB_PUBLIC_KEY_PATH").map(PathBuf::from),
            ui_routing_key: get("TB_UI_ROUTING_KEY").unwrap_or_else(|| "ui.tb.event".to_string()),
            router_routing_key: get("TB_ROUTER_ROUTING_KEY").unwrap_or_else(|| "tr".to_string()),
            max_concurrent_builds,
            poll_interval,
            log_dir: get("TB_LOG_DIR").map(PathBuf::from),
        })
    }

    /// Orchestrator settings derived from this configuration.
    pub fn orchestrator_config(&self, service_key: Option<ServiceKey>) -> OrchestratorConfig {
        let mut config = OrchestratorConfig::new(&self.registry, &self.api_url);
        config.ui_routing_key = self.ui_routing_key.clone();
        config.router_routing_key = self.router_routing_key.clone();
        config.service_key = service_key;
        config
    }
}

fn parse_number(var: &'static str, value: &str) -> Result<usize, ConfigError> {
    value.parse::<usize>().map_err(|e| ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Registry host for image tags: scheme and trailing slashes removed.
pub fn registry_host(url: &str) -> String {
    let url = url.trim();
    let host = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    host.trim_end_matches('/').to_string()
}

/// Management API URL for an `AMQP_URL`, plus the vhost named in its path.
///
/// The management plugin is assumed on the same host (port 15672, or 15671
/// for TLS) with the same credentials. `TB_MANAGEMENT_URL` overrides this.
pub fn management_url(raw: &str) -> Result<(String, Option<String>), ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        var: "AMQP_URL",
        value: redact_userinfo(raw),
        reason,
    };
    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    let (scheme, port) = match url.scheme() {
        "amqp" => ("http", 15672),
        "amqps" => ("https", 15671),
        other => return Err(invalid(format!("unsupported scheme {}", other))),
    };

    let vhost = url
        .path()
        .strip_prefix('/')
        .filter(|p| !p.is_empty())
        .map(|p| p.replace("%2F", "/").replace("%2f", "/"));
    let rebuilt = format!("{}://{}", scheme, url.host_str().unwrap_or_default());
    let mut mgmt = Url::parse(&rebuilt).map_err(|e| invalid(e.to_string()))?;
    mgmt.set_port(Some(port)).map_err(|_| invalid("cannot set port".to_string()))?;
    mgmt.set_username(url.username()).map_err(|_| invalid("cannot keep user".to_string()))?;
    mgmt.set_password(url.password()).map_err(|_| invalid("cannot keep password".to_string()))?;
    Ok((normalize_base_url(mgmt.as_str()), vhost))
}

/// The URL with any password replaced, for logs and error messages.
fn redact_userinfo(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) if url.password().is_some() => {
            let _ = url.set_password(Some("***"));
            url.to_string()
        }
        Ok(url) => url.to_string(),
        Err(_) => "<unparseable>".to_string(),
    }
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
