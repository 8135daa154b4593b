// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Logging bootstrap.
//!
//! The library only emits `tracing` events; applications install a
//! subscriber once at startup, either their own or this one.

use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

/// Directive used when the caller has no preference.
pub const DEFAULT_DIRECTIVE: &str = "wirelink_core=info";

/// Logging setup errors.
#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Invalid filter directive: {0}")]
    Directive(#[from] ParseError),

    #[error("A global subscriber is already installed: {0}")]
    AlreadyInstalled(String),
}

/// Builds the filter: `RUST_LOG` plus `default_directive`.
pub fn env_filter(default_directive: &str) -> Result<EnvFilter, LoggingError> {
    Ok(EnvFilter::from_default_env().add_directive(default_directive.parse()?))
}

/// Installs a formatting subscriber filtered by `RUST_LOG` plus
/// `default_directive` (e.g. `"wirelink_core=debug"`).
///
/// Fails instead of panicking when a subscriber is already installed.
pub fn init_logging(default_directive: &str) -> Result<(), LoggingError> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_directive)?)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInstalled(e.to_string()))
}
