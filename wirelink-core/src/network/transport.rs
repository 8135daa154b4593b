// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Socket Abstraction
//!
//! A [`Dialer`] produces a [`SocketHandle`]: two channels connecting the
//! connection task to whatever owns the real socket. The socket side reports
//! [`SocketEvent`]s and obeys [`SocketCommand`]s.

use std::fmt;
use std::time::Duration;

use tokio::sync::mpsc;

use super::config::ConnectionConfig;

/// Close codes treated as a normal, final closure (RFC 6455 1000..=1003).
pub const NORMAL_CLOSE_CODES: [u16; 4] = [1000, 1001, 1002, 1003];

/// Close code sent by `ConnectionHandle::close`.
pub const CLIENT_CLOSE_CODE: u16 = 1000;
/// Close reason sent by `ConnectionHandle::close`.
pub const CLIENT_CLOSE_REASON: &str = "closeByClient";
/// Close code reported when the socket vanished without a close frame.
pub const ABNORMAL_CLOSE_CODE: u16 = 1006;

/// Returns true for close codes that end the connection for good.
pub fn is_normal_close(code: u16) -> bool {
    NORMAL_CLOSE_CODES.contains(&code)
}

/// One WebSocket message.
#[derive(Clone, PartialEq, Eq)]
pub enum Frame {
    Binary(Vec<u8>),
    Text(String),
}

impl Frame {
    pub fn len(&self) -> usize {
        match self {
            Frame::Binary(b) => b.len(),
            Frame::Text(t) => t.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Frame::Binary(b) => b,
            Frame::Text(t) => t.as_bytes(),
        }
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Binary(b) => write!(f, "Binary({} bytes)", b.len()),
            Frame::Text(t) => write!(f, "Text({:?})", t),
        }
    }
}

impl From<Vec<u8>> for Frame {
    fn from(bytes: Vec<u8>) -> Self {
        Frame::Binary(bytes)
    }
}

impl From<&[u8]> for Frame {
    fn from(bytes: &[u8]) -> Self {
        Frame::Binary(bytes.to_vec())
    }
}

impl From<String> for Frame {
    fn from(text: String) -> Self {
        Frame::Text(text)
    }
}

impl From<&str> for Frame {
    fn from(text: &str) -> Self {
        Frame::Text(text.to_string())
    }
}

/// Reported by the socket side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEvent {
    /// Handshake finished; frames may be sent.
    Opened,
    Message(Frame),
    /// Non-fatal error; a `Closed` event follows if the socket is gone.
    Error(String),
    /// Always the last event of a socket.
    Closed { code: u16, reason: String },
}

/// Sent to the socket side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketCommand {
    Send(Frame),
    Close { code: u16, reason: String },
}

/// Connection task's end of a socket.
#[derive(Debug)]
pub struct SocketHandle {
    pub events: mpsc::UnboundedReceiver<SocketEvent>,
    pub commands: mpsc::UnboundedSender<SocketCommand>,
}

/// Socket owner's end of a socket.
#[derive(Debug)]
pub struct SocketDriver {
    pub events: mpsc::UnboundedSender<SocketEvent>,
    pub commands: mpsc::UnboundedReceiver<SocketCommand>,
}

impl SocketHandle {
    /// Creates a connected handle/driver pair.
    pub fn pair() -> (SocketHandle, SocketDriver) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        (
            SocketHandle {
                events: event_rx,
                commands: command_tx,
            },
            SocketDriver {
                events: event_tx,
                commands: command_rx,
            },
        )
    }
}

impl SocketDriver {
    /// Reports an event; false if the connection task dropped the socket.
    pub fn emit(&self, event: SocketEvent) -> bool {
        self.events.send(event).is_ok()
    }

    pub fn open(&self) -> bool {
        self.emit(SocketEvent::Opened)
    }

    pub fn deliver(&self, frame: impl Into<Frame>) -> bool {
        self.emit(SocketEvent::Message(frame.into()))
    }

    pub fn close(&self, code: u16, reason: &str) -> bool {
        self.emit(SocketEvent::Closed {
            code,
            reason: reason.to_string(),
        })
    }

    /// Takes every command queued so far without waiting.
    pub fn drain_commands(&mut self) -> Vec<SocketCommand> {
        let mut drained = Vec::new();
        while let Ok(command) = self.commands.try_recv() {
            drained.push(command);
        }
        drained
    }
}

/// Opens sockets.
///
/// `dial` must return immediately; progress is reported through the handle's
/// event channel.
pub trait Dialer: Send + 'static {
    fn dial(&mut self, config: &ConnectionConfig) -> SocketHandle;
}

/// Why a connection stopped for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeadReason {
    /// Closed before ever reaching the open state.
    HandshakeFailed,
    /// The retry strategy gave up.
    ReachMaxRetries,
    /// Closed by either peer with a normal code, or by `close()`.
    NormalClose,
    /// Lost while no retry strategy was configured.
    ConnectionLost,
}

impl fmt::Display for DeadReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DeadReason::HandshakeFailed => "handshake failed",
            DeadReason::ReachMaxRetries => "reached max retries",
            DeadReason::NormalClose => "normal close",
            DeadReason::ConnectionLost => "connection lost",
        };
        f.write_str(text)
    }
}

/// Lifecycle of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Never connected.
    Idle,
    /// Dial in progress.
    Connecting,
    /// Frames flow.
    Open,
    /// Close requested, waiting for the socket to confirm. Sends are buffered.
    Closing,
    /// Waiting `delay` before dial attempt number `attempt`.
    Reconnecting { attempt: u32, delay: Duration },
    Dead(DeadReason),
}

impl ConnectionState {
    pub fn is_open(&self) -> bool {
        matches!(self, ConnectionState::Open)
    }

    pub fn is_dead(&self) -> bool {
        matches!(self, ConnectionState::Dead(_))
    }

    /// WebSocket-style ready state: 0 connecting, 1 open, 2 closing, 3 closed.
    pub fn ready_state(&self) -> u8 {
        match self {
            ConnectionState::Connecting | ConnectionState::Reconnecting { .. } => 0,
            ConnectionState::Open => 1,
            ConnectionState::Closing => 2,
            ConnectionState::Idle | ConnectionState::Dead(_) => 3,
        }
    }
}
