// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Network Layer
//!
//! A self-healing duplex socket: dials, buffers outbound frames while down,
//! sends heartbeats while up, and reconnects according to a retry strategy.
//!
//! # Architecture
//!
//! - **Dialer trait**: opens sockets; [`WebSocketDialer`] for real ones,
//!   [`MockDialer`] for tests
//! - **Connection task**: owns the state machine and the socket
//! - **ConnectionHandle**: cloneable command/state handle held by callers
//! - **ConnectionHandler**: lifecycle hooks, or [`PacketHandler`] to decode
//!   packet responses
//!
//! # Example
//!
//! ```ignore
//! use wirelink_core::network::{Connection, ConnectionConfig, Hooks, WebSocketDialer};
//!
//! let config = ConnectionConfig::new("wss://relay.example.com/ws");
//! let hooks = Hooks::new(|frame| println!("got {:?}", frame))
//!     .with_dead(|reason| eprintln!("connection dead: {}", reason));
//!
//! let handle = Connection::spawn(config, WebSocketDialer::new(), hooks)?;
//! handle.send(b"buffered until open".to_vec())?;
//! handle.connect()?;
//! ```

mod config;
mod connection;
mod error;
mod handler;
mod mock;
mod transport;
mod websocket;

pub use config::{
    ConfigError, ConnectionConfig, ENV_CONNECT_TIMEOUT_MS, ENV_HEARTBEAT_MS, ENV_PROTOCOLS,
    ENV_RETRY, ENV_URL,
};
pub use connection::{Connection, ConnectionHandle};
pub use error::NetworkError;
pub use handler::{ConnectionHandler, Hooks, PacketHandler};
pub use mock::MockDialer;
pub use transport::{
    is_normal_close, ConnectionState, DeadReason, Dialer, Frame, SocketCommand, SocketDriver,
    SocketEvent, SocketHandle, ABNORMAL_CLOSE_CODE, CLIENT_CLOSE_CODE, CLIENT_CLOSE_REASON,
    NORMAL_CLOSE_CODES,
};
pub use websocket::WebSocketDialer;
