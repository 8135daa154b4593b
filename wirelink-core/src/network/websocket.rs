// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! WebSocket Dialer
//!
//! Real sockets on top of tokio-tungstenite. Each dial spawns one pump task
//! that owns the stream and bridges it to the connection task's channels.
//! Supports both native-tls and rustls TLS backends via crate features.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn, Instrument, Span};

use super::config::ConnectionConfig;
use super::error::NetworkError;
use super::transport::{
    Dialer, Frame, SocketCommand, SocketDriver, SocketEvent, SocketHandle, ABNORMAL_CLOSE_CODE,
};

/// Close code reported when the peer's close frame carried no status.
const NO_STATUS_CLOSE_CODE: u16 = 1005;

/// How long to wait for the peer to drop the stream after a close exchange.
const CLOSE_LINGER: Duration = Duration::from_secs(2);

/// Dials `ws://` and `wss://` URLs.
///
/// # Example
///
/// ```ignore
/// use wirelink_core::network::{Connection, ConnectionConfig, WebSocketDialer};
///
/// let config = ConnectionConfig::new("wss://relay.example.com/ws");
/// let handle = Connection::spawn(config, WebSocketDialer::new(), handler);
/// handle.connect()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct WebSocketDialer;

impl WebSocketDialer {
    pub fn new() -> Self {
        WebSocketDialer
    }
}

impl Dialer for WebSocketDialer {
    fn dial(&mut self, config: &ConnectionConfig) -> SocketHandle {
        let (handle, driver) = SocketHandle::pair();

        match build_request(config) {
            Ok(request) => {
                let timeout = config.connect_timeout();
                tokio::spawn(pump(request, timeout, driver).instrument(Span::current()));
            }
            Err(err) => {
                warn!(error = %err, "Refusing to dial");
                driver.emit(SocketEvent::Error(err.to_string()));
                driver.close(ABNORMAL_CLOSE_CODE, &err.to_string());
            }
        }

        handle
    }
}

/// Builds the handshake request, offering the configured subprotocols.
fn build_request(config: &ConnectionConfig) -> Result<Request, NetworkError> {
    if !(config.url.starts_with("ws://") || config.url.starts_with("wss://")) {
        return Err(NetworkError::InvalidUrl(format!(
            "{} (expected ws:// or wss://)",
            config.url
        )));
    }

    let mut request = config
        .url
        .as_str()
        .into_client_request()
        .map_err(|e| NetworkError::InvalidUrl(format!("{}: {}", config.url, e)))?;

    if !config.protocols.is_empty() {
        let offered = HeaderValue::from_str(&config.protocols.join(", "))
            .map_err(|e| NetworkError::InvalidUrl(format!("bad subprotocol list: {}", e)))?;
        request
            .headers_mut()
            .insert("Sec-WebSocket-Protocol", offered);
    }

    Ok(request)
}

fn to_message(frame: Frame) -> Message {
    match frame {
        Frame::Binary(bytes) => Message::Binary(bytes),
        Frame::Text(text) => Message::Text(text),
    }
}

/// Owns one socket for its whole life. Ends after emitting `Closed`, or
/// silently when the connection task drops the handle.
async fn pump(request: Request, connect_timeout: Duration, driver: SocketDriver) {
    let SocketDriver {
        events,
        mut commands,
    } = driver;

    let mut stream = match tokio::time::timeout(connect_timeout, connect_async(request)).await {
        Ok(Ok((stream, _response))) => stream,
        Ok(Err(e)) => {
            let err = NetworkError::ConnectionFailed(e.to_string());
            debug!(error = %err, "Dial failed");
            let _ = events.send(SocketEvent::Error(err.to_string()));
            let _ = events.send(SocketEvent::Closed {
                code: ABNORMAL_CLOSE_CODE,
                reason: err.to_string(),
            });
            return;
        }
        Err(_) => {
            debug!(timeout_ms = connect_timeout.as_millis() as u64, "Dial timed out");
            let _ = events.send(SocketEvent::Error(NetworkError::Timeout.to_string()));
            let _ = events.send(SocketEvent::Closed {
                code: ABNORMAL_CLOSE_CODE,
                reason: NetworkError::Timeout.to_string(),
            });
            return;
        }
    };

    if events.send(SocketEvent::Opened).is_err() {
        // Connection task gave up while dialing; honour a pending close request.
        let frame = queued_close(&mut commands);
        if let Err(e) = stream.close(frame).await {
            debug!(error = %e, "Close after abandoned dial failed");
        }
        return;
    }

    let (mut write, mut read) = stream.split();

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(SocketCommand::Send(frame)) => {
                    if let Err(e) = write.send(to_message(frame)).await {
                        let err = NetworkError::SendFailed(e.to_string());
                        let _ = events.send(SocketEvent::Error(err.to_string()));
                    }
                }
                Some(SocketCommand::Close { code, reason }) => {
                    // Keep reading: the peer's close echo ends the loop.
                    if let Err(e) = write.send(Message::Close(Some(close_frame(code, reason)))).await {
                        debug!(error = %e, "Close frame not sent");
                    }
                }
                None => {
                    let _ = write.close().await;
                    return;
                }
            },
            message = read.next() => match message {
                Some(Ok(Message::Binary(bytes))) => {
                    let _ = events.send(SocketEvent::Message(Frame::Binary(bytes)));
                }
                Some(Ok(Message::Text(text))) => {
                    let _ = events.send(SocketEvent::Message(Frame::Text(text)));
                }
                Some(Ok(Message::Close(frame))) => {
                    let (code, reason) = frame
                        .map(|f| (u16::from(f.code), f.reason.into_owned()))
                        .unwrap_or((NO_STATUS_CLOSE_CODE, String::new()));
                    // tungstenite queues the close reply; it only reaches the
                    // peer once the stream is flushed or polled again.
                    if let Err(e) = write.flush().await {
                        debug!(error = %e, "Close reply not flushed");
                    }
                    let drain = async { while let Some(Ok(_)) = read.next().await {} };
                    if tokio::time::timeout(CLOSE_LINGER, drain).await.is_err() {
                        debug!("Peer kept the stream open after closing");
                    }
                    let _ = events.send(SocketEvent::Closed { code, reason });
                    return;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    let _ = events.send(SocketEvent::Error(e.to_string()));
                    let _ = events.send(SocketEvent::Closed {
                        code: ABNORMAL_CLOSE_CODE,
                        reason: e.to_string(),
                    });
                    return;
                }
                None => {
                    let _ = events.send(SocketEvent::Closed {
                        code: ABNORMAL_CLOSE_CODE,
                        reason: NetworkError::ConnectionClosed.to_string(),
                    });
                    return;
                }
            },
        }
    }
}

fn close_frame(code: u16, reason: String) -> CloseFrame<'static> {
    CloseFrame {
        code: CloseCode::from(code),
        reason: reason.into(),
    }
}

/// First close request still queued by the connection task, if any.
fn queued_close(
    commands: &mut mpsc::UnboundedReceiver<SocketCommand>,
) -> Option<CloseFrame<'static>> {
    while let Ok(command) = commands.try_recv() {
        if let SocketCommand::Close { code, reason } = command {
            return Some(close_frame(code, reason));
        }
    }
    None
}
