// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{ensure, Context, Result};
use std::env;
use std::time::Duration;

const DEFAULT_UPS_SECRET_NAME: &str = "unified-push-server";
const DEFAULT_UPS_API_URL: &str = "http://localhost:8080/rest";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;
const DEFAULT_CONFLICT_RETRIES: u32 = 3;

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Namespace whose Secrets are watched and written
    pub namespace: String,
    /// Name of the bootstrap Secret describing the push application
    pub ups_secret_name: String,
    /// REST base URL of the push server (usually the sidecar)
    pub ups_api_url: String,
    /// Interval between drift reconciliation cycles
    pub poll_interval: Duration,
    /// How often a conflicting write is retried before being dropped
    pub conflict_retries: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let namespace = env::var("NAMESPACE").context("NAMESPACE environment variable not set")?;
        let ups_secret_name =
            env::var("UPS_SECRET_NAME").unwrap_or_else(|_| DEFAULT_UPS_SECRET_NAME.to_string());
        let ups_api_url =
            env::var("UPS_API_URL").unwrap_or_else(|_| DEFAULT_UPS_API_URL.to_string());
        let poll_secs = poll_interval_secs()?;
        let conflict_retries = parse_or_default("CONFLICT_RETRIES", DEFAULT_CONFLICT_RETRIES)?;

        Ok(Config {
            namespace,
            ups_secret_name,
            ups_api_url,
            poll_interval: Duration::from_secs(poll_secs),
            conflict_retries,
        })
    }
}

fn poll_interval_secs() -> Result<u64> {
    let secs = parse_or_default("UPS_POLL_INTERVAL_SECS", DEFAULT_POLL_INTERVAL_SECS)?;
    ensure!(secs > 0, "UPS_POLL_INTERVAL_SECS must be greater than zero");
    Ok(secs)
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(value) => value
            .parse()
            .with_context(|| format!("{} has an invalid value '{}'", key, value)),
        Err(_) => Ok(default),
    }
}
