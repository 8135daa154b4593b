// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Connection Hooks
//!
//! The connection task calls into a [`ConnectionHandler`] on every lifecycle
//! event. All hooks run on the connection task, one at a time, so a handler
//! needs no locking of its own but must not block.

use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::transport::{DeadReason, Frame};
use crate::marshal::Marshaler;
use crate::packet::{PacketProtocol, ProtocolError, ResponsePacket};

/// Lifecycle callbacks. Only [`on_data`](Self::on_data) is required.
pub trait ConnectionHandler: Send + 'static {
    /// The socket opened and buffered frames have been flushed.
    fn on_connected(&mut self) {}

    /// Called every heartbeat period while open. A returned frame is sent.
    fn on_heartbeat_tick(&mut self) -> Option<Frame> {
        None
    }

    /// A socket error. The connection state is not changed by errors alone.
    fn on_error(&mut self, _error: &str) {}

    /// The connection stopped for good.
    fn on_dead(&mut self, _reason: DeadReason) {}

    /// A reconnect is scheduled after `delay`.
    fn on_will_reconnect(&mut self, _delay: Duration) {}

    /// The connection was closed normally and its resources released.
    fn on_dispose(&mut self) {}

    /// An inbound frame.
    fn on_data(&mut self, frame: Frame);
}

type Callback<A> = Box<dyn FnMut(A) + Send>;

/// Closure-based [`ConnectionHandler`].
///
/// ```ignore
/// let hooks = Hooks::new(|frame| println!("{:?}", frame))
///     .with_connected(|| println!("up"))
///     .with_dead(|reason| println!("gone: {}", reason));
/// ```
pub struct Hooks {
    data: Callback<Frame>,
    connected: Option<Callback<()>>,
    heartbeat: Option<Box<dyn FnMut() -> Option<Frame> + Send>>,
    error: Option<Callback<String>>,
    dead: Option<Callback<DeadReason>>,
    will_reconnect: Option<Callback<Duration>>,
    dispose: Option<Callback<()>>,
}

impl Hooks {
    pub fn new(on_data: impl FnMut(Frame) + Send + 'static) -> Self {
        Hooks {
            data: Box::new(on_data),
            connected: None,
            heartbeat: None,
            error: None,
            dead: None,
            will_reconnect: None,
            dispose: None,
        }
    }

    pub fn with_connected(mut self, mut f: impl FnMut() + Send + 'static) -> Self {
        self.connected = Some(Box::new(move |()| f()));
        self
    }

    pub fn with_heartbeat(mut self, f: impl FnMut() -> Option<Frame> + Send + 'static) -> Self {
        self.heartbeat = Some(Box::new(f));
        self
    }

    pub fn with_error(mut self, f: impl FnMut(String) + Send + 'static) -> Self {
        self.error = Some(Box::new(f));
        self
    }

    pub fn with_dead(mut self, f: impl FnMut(DeadReason) + Send + 'static) -> Self {
        self.dead = Some(Box::new(f));
        self
    }

    pub fn with_will_reconnect(mut self, f: impl FnMut(Duration) + Send + 'static) -> Self {
        self.will_reconnect = Some(Box::new(f));
        self
    }

    pub fn with_dispose(mut self, mut f: impl FnMut() + Send + 'static) -> Self {
        self.dispose = Some(Box::new(move |()| f()));
        self
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("connected", &self.connected.is_some())
            .field("heartbeat", &self.heartbeat.is_some())
            .field("error", &self.error.is_some())
            .field("dead", &self.dead.is_some())
            .field("will_reconnect", &self.will_reconnect.is_some())
            .field("dispose", &self.dispose.is_some())
            .finish()
    }
}

impl ConnectionHandler for Hooks {
    fn on_connected(&mut self) {
        if let Some(f) = self.connected.as_mut() {
            f(());
        }
    }

    fn on_heartbeat_tick(&mut self) -> Option<Frame> {
        self.heartbeat.as_mut().and_then(|f| f())
    }

    fn on_error(&mut self, error: &str) {
        if let Some(f) = self.error.as_mut() {
            f(error.to_string());
        }
    }

    fn on_dead(&mut self, reason: DeadReason) {
        if let Some(f) = self.dead.as_mut() {
            f(reason);
        }
    }

    fn on_will_reconnect(&mut self, delay: Duration) {
        if let Some(f) = self.will_reconnect.as_mut() {
            f(delay);
        }
    }

    fn on_dispose(&mut self) {
        if let Some(f) = self.dispose.as_mut() {
            f(());
        }
    }

    fn on_data(&mut self, frame: Frame) {
        (self.data)(frame)
    }
}

/// Decodes binary frames as responses and hands them to a dispatcher.
///
/// Decode failures are dispatched too, so the caller decides whether an
/// untrusted frame is worth more than a log line. Text frames are ignored.
pub struct PacketHandler<M, T, F> {
    protocol: PacketProtocol<M>,
    dispatch: F,
    heartbeat: Option<Box<dyn FnMut(&PacketProtocol<M>) -> Option<Vec<u8>> + Send>>,
    _payload: PhantomData<fn() -> T>,
}

impl<M, T, F> PacketHandler<M, T, F>
where
    M: Marshaler + Send + 'static,
    T: DeserializeOwned + 'static,
    F: FnMut(Result<ResponsePacket<T>, ProtocolError>) + Send + 'static,
{
    pub fn new(protocol: PacketProtocol<M>, dispatch: F) -> Self {
        PacketHandler {
            protocol,
            dispatch,
            heartbeat: None,
            _payload: PhantomData,
        }
    }

    /// Sends the frame built by `f` on every heartbeat tick.
    pub fn with_heartbeat(
        mut self,
        f: impl FnMut(&PacketProtocol<M>) -> Option<Vec<u8>> + Send + 'static,
    ) -> Self {
        self.heartbeat = Some(Box::new(f));
        self
    }

    pub fn protocol(&self) -> &PacketProtocol<M> {
        &self.protocol
    }
}

impl<M, T, F> ConnectionHandler for PacketHandler<M, T, F>
where
    M: Marshaler + Send + 'static,
    T: DeserializeOwned + 'static,
    F: FnMut(Result<ResponsePacket<T>, ProtocolError>) + Send + 'static,
{
    fn on_heartbeat_tick(&mut self) -> Option<Frame> {
        let protocol = &self.protocol;
        self.heartbeat
            .as_mut()
            .and_then(|f| f(protocol))
            .map(Frame::Binary)
    }

    fn on_error(&mut self, error: &str) {
        warn!(error, "Socket error");
    }

    fn on_dead(&mut self, reason: DeadReason) {
        info!(%reason, "Connection dead");
    }

    fn on_data(&mut self, frame: Frame) {
        match frame {
            Frame::Binary(bytes) => (self.dispatch)(self.protocol.decode_resp(&bytes)),
            Frame::Text(text) => debug!(len = text.len(), "Ignoring text frame"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marshal::JsonMarshaler;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_hooks_default_to_noop() {
        let mut hooks = Hooks::new(|_| {});
        hooks.on_connected();
        hooks.on_dispose();
        assert!(hooks.on_heartbeat_tick().is_none());
    }

    #[test]
    fn test_hooks_forward_arguments() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let data_seen = seen.clone();
        let dead_seen = seen.clone();
        let mut hooks = Hooks::new(move |frame| data_seen.lock().unwrap().push(format!("{:?}", frame)))
            .with_dead(move |reason| dead_seen.lock().unwrap().push(reason.to_string()))
            .with_heartbeat(|| Some(Frame::from("ping")));

        hooks.on_data(Frame::from("hi"));
        hooks.on_dead(DeadReason::ReachMaxRetries);

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["Text(\"hi\")".to_string(), "reached max retries".to_string()]
        );
        assert_eq!(hooks.on_heartbeat_tick(), Some(Frame::from("ping")));
    }

    #[test]
    fn test_packet_handler_dispatches_decoded_responses() {
        let protocol = PacketProtocol::new(JsonMarshaler);
        let frame = protocol
            .encode_resp_at(4, 77, 10, 0, Some(&"pong"))
            .unwrap();

        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        let mut handler = PacketHandler::new(protocol, move |result: Result<ResponsePacket<String>, _>| {
            sink.lock().unwrap().push(result.map(|p| (p.request_id, p.payload)).ok());
        });

        handler.on_data(Frame::Binary(frame));
        handler.on_data(Frame::Binary(vec![1, 2]));
        handler.on_data(Frame::from("ignored"));

        assert_eq!(
            *received.lock().unwrap(),
            vec![Some((77, Some("pong".to_string()))), None]
        );
    }
}
