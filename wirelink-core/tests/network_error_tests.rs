// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for network errors and configuration failures

use wirelink_core::network::*;

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
            NetworkError::SendFailed("broken pipe".into()),
            "Message send failed: broken pipe",
        ),
    ];

    for (error, expected) in errors {
        assert_eq!(error.to_string(), expected);
    }
}

#[test]
fn test_error_clone() {
    let error = NetworkError::ConnectionFailed("test".into());
    let cloned = error.clone();
    assert_eq!(error, cloned);
}

#[test]
fn test_config_error_messages() {
    assert_eq!(
        ConfigError::Missing(ENV_URL).to_string(),
        "Missing required setting: WIRELINK_URL"
    );
    assert_eq!(
        ConfigError::InvalidValue {
            key: ENV_HEARTBEAT_MS,
            value: "soon".into()
        }
        .to_string(),
        "Invalid value for WIRELINK_HEARTBEAT_MS: soon"
    );
}

#[test]
fn test_dead_reason_display() {
    assert_eq!(DeadReason::HandshakeFailed.to_string(), "handshake failed");
    assert_eq!(DeadReason::ConnectionLost.to_string(), "connection lost");
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

#[test]
fn test_handle_reports_stopped_task() {
    let rt = runtime();
    let handle = rt.block_on(async {
        Connection::spawn(
            ConnectionConfig::new("ws://x").without_retry(),
            MockDialer::new(),
            Hooks::new(|_| {}),
        )
        .unwrap()
    });
    // Dropping the runtime drops the connection task with it.
    drop(rt);

    assert_eq!(handle.connect(), Err(NetworkError::ActorStopped));
    assert_eq!(
        runtime().block_on(handle.wait_for(ConnectionState::is_open)),
        Err(NetworkError::ActorStopped)
    );
}
