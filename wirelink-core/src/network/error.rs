// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Network Error Types
//!
//! Errors surfaced by the socket layer. Connection lifecycle failures are not
//! errors: they are reported through `ConnectionHandler::on_dead`.

use thiserror::Error;

/// Network and transport error types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Connection timeout")]
    Timeout,

    #[error("Message send failed: {0}")]
    SendFailed(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Connection task has stopped")]
    ActorStopped,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let errors = vec![
            (
                NetworkError::ConnectionFailed("refused".into()),
                "Connection failed: refused",
            ),
            (NetworkError::ConnectionClosed, "Connection closed"),
            (NetworkError::Timeout, "Connection timeout"),
            (
                NetworkError::InvalidUrl("ftp://x".into()),
                "Invalid URL: ftp://x",
            ),
            (NetworkError::ActorStopped, "Connection task has stopped"),
        ];

        for (error, expected) in errors {
            assert_eq!(error.to_string(), expected);
        }
    }
}
