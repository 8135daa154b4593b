// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Connection Configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::retry::RetryPolicy;

/// Environment variable holding the socket URL.
pub const ENV_URL: &str = "WIRELINK_URL";
/// Comma-separated subprotocol list.
pub const ENV_PROTOCOLS: &str = "WIRELINK_PROTOCOLS";
/// Heartbeat period in milliseconds (`0` disables).
pub const ENV_HEARTBEAT_MS: &str = "WIRELINK_HEARTBEAT_MS";
/// Dial timeout in milliseconds.
pub const ENV_CONNECT_TIMEOUT_MS: &str = "WIRELINK_CONNECT_TIMEOUT_MS";
/// JSON `RetryPolicy`, or `none` to disable reconnects.
pub const ENV_RETRY: &str = "WIRELINK_RETRY";

/// Configuration errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Invalid retry policy: {0}")]
    InvalidRetry(String),
}

/// Settings for one resilient connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// `ws://` or `wss://` URL.
    pub url: String,
    /// WebSocket subprotocols offered during the handshake.
    pub protocols: Vec<String>,
    /// Heartbeat period while open; `0` disables heartbeats.
    pub heartbeat_interval_ms: u64,
    /// Time allowed for a dial to reach the open state.
    pub connect_timeout_ms: u64,
    /// Tag attached to every log line of this connection.
    pub tag: String,
    /// Reconnect policy; `None` means a lost connection is not retried.
    pub retry: Option<RetryPolicy>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        ConnectionConfig {
            url: String::new(),
            protocols: Vec::new(),
            heartbeat_interval_ms: 5_000,
            connect_timeout_ms: 10_000,
            tag: "wirelink".to_string(),
            retry: Some(RetryPolicy::default()),
        }
    }
}

impl ConnectionConfig {
    /// Default settings for `url`.
    pub fn new(url: impl Into<String>) -> Self {
        ConnectionConfig {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_protocols<I, S>(mut self, protocols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.protocols = protocols.into_iter().map(Into::into).collect();
        self
    }

    /// Sub-millisecond periods round up to 1 ms; only `Duration::ZERO`
    /// disables heartbeats.
    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval_ms = millis_rounded_up(interval);
        self
    }

    pub fn without_heartbeat(mut self) -> Self {
        self.heartbeat_interval_ms = 0;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = millis_rounded_up(timeout);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    pub fn without_retry(mut self) -> Self {
        self.retry = None;
        self
    }

    pub fn heartbeat_interval(&self) -> Option<Duration> {
        (self.heartbeat_interval_ms > 0).then(|| Duration::from_millis(self.heartbeat_interval_ms))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Reads settings from `WIRELINK_*` environment variables on top of the
    /// defaults. `WIRELINK_URL` is required.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup(ENV_URL)
            .filter(|u| !u.trim().is_empty())
            .ok_or(ConfigError::Missing(ENV_URL))?;
        let mut config = ConnectionConfig::new(url.trim());

        if let Some(protocols) = lookup(ENV_PROTOCOLS) {
            config.protocols = protocols
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(raw) = lookup(ENV_HEARTBEAT_MS) {
            config.heartbeat_interval_ms = parse_millis(ENV_HEARTBEAT_MS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_CONNECT_TIMEOUT_MS) {
            config.connect_timeout_ms = parse_millis(ENV_CONNECT_TIMEOUT_MS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_RETRY) {
            config.retry = parse_retry(&raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks the URL scheme and the retry policy.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.url.starts_with("ws://") || self.url.starts_with("wss://")) {
            return Err(ConfigError::InvalidValue {
                key: ENV_URL,
                value: self.url.clone(),
            });
        }
        if let Some(policy) = &self.retry {
            policy
                .build()
                .map_err(|e| ConfigError::InvalidRetry(e.to_string()))?;
        }
        Ok(())
    }
}

/// Whole milliseconds, saturating, never rounding a non-zero duration to 0.
fn millis_rounded_up(duration: Duration) -> u64 {
    let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
    if millis == 0 && !duration.is_zero() {
        1
    } else {
        millis
    }
}

fn parse_millis(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
    })
}

fn parse_retry(raw: &str) -> Result<Option<RetryPolicy>, ConfigError> {
    if raw.trim().eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    serde_json::from_str(raw)
        .map(Some)
        .map_err(|e| ConfigError::InvalidRetry(e.to_string()))
}
