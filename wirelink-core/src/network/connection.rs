// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Resilient Connection
//!
//! One task owns each connection. Caller commands, socket events, heartbeat
//! ticks and the reconnect timer all funnel through a single `select!` loop,
//! so the state machine below never needs a lock.
//!
//! ```text
//! Idle ──connect──▶ Connecting ──opened──▶ Open
//!                      │  ▲                 │ abnormal close
//!        closed before │  └──timer/connect──┤
//!        first open    ▼                    ▼
//!              Dead(HandshakeFailed)   Reconnecting ──should_abort──▶ Dead(ReachMaxRetries)
//!
//! Open ──close()──▶ Closing ──closed──▶ Dead(NormalClose)
//! ```

use std::collections::VecDeque;
use std::future::pending;
use std::pin::Pin;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{interval_at, sleep, Instant, Interval, MissedTickBehavior, Sleep};
use tracing::{debug, info, info_span, warn, Instrument};

use super::config::{ConfigError, ConnectionConfig};
use super::error::NetworkError;
use super::handler::ConnectionHandler;
use super::transport::{
    is_normal_close, ConnectionState, DeadReason, Dialer, Frame, SocketCommand, SocketEvent,
    SocketHandle, ABNORMAL_CLOSE_CODE, CLIENT_CLOSE_CODE, CLIENT_CLOSE_REASON,
};
use crate::retry::RetryStrategy;

#[derive(Debug)]
enum Command {
    Connect,
    Send(Frame),
    Close,
}

/// Cloneable handle to a running connection.
///
/// Dropping the last handle stops the connection task and closes its socket.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<ConnectionState>,
}

impl ConnectionHandle {
    /// Starts connecting. Ignored while connecting or open; skips the wait
    /// while a reconnect is pending.
    pub fn connect(&self) -> Result<(), NetworkError> {
        self.command(Command::Connect)
    }

    /// Sends a frame now, or buffers it until the next open.
    pub fn send(&self, frame: impl Into<Frame>) -> Result<(), NetworkError> {
        self.command(Command::Send(frame.into()))
    }

    /// Closes the connection for good.
    pub fn close(&self) -> Result<(), NetworkError> {
        self.command(Command::Close)
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn is_open(&self) -> bool {
        self.state().is_open()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Waits until the state satisfies `predicate` and returns that state.
    pub async fn wait_for<P>(&self, mut predicate: P) -> Result<ConnectionState, NetworkError>
    where
        P: FnMut(&ConnectionState) -> bool,
    {
        let mut state = self.state.clone();
        let matched = state
            .wait_for(|s| predicate(s))
            .await
            .map_err(|_| NetworkError::ActorStopped)?;
        Ok(*matched)
    }

    fn command(&self, command: Command) -> Result<(), NetworkError> {
        self.commands
            .send(command)
            .map_err(|_| NetworkError::ActorStopped)
    }
}

/// The connection task.
pub struct Connection<D, H> {
    config: ConnectionConfig,
    dialer: D,
    handler: H,
    strategy: Option<Box<dyn RetryStrategy>>,
    state: watch::Sender<ConnectionState>,
    socket: Option<SocketHandle>,
    heartbeat: Option<Interval>,
    reconnect: Option<Pin<Box<Sleep>>>,
    buffer: VecDeque<Frame>,
    close_normally: bool,
    open_count: u32,
    attempt: u32,
}

impl<D: Dialer, H: ConnectionHandler> Connection<D, H> {
    /// Spawns a connection task using the retry policy from `config`.
    ///
    /// Must be called inside a tokio runtime. The connection stays `Idle`
    /// until [`ConnectionHandle::connect`] is called.
    pub fn spawn(
        config: ConnectionConfig,
        dialer: D,
        handler: H,
    ) -> Result<ConnectionHandle, ConfigError> {
        config.validate()?;
        let strategy = match &config.retry {
            Some(policy) => Some(
                policy
                    .build()
                    .map_err(|e| ConfigError::InvalidRetry(e.to_string()))?,
            ),
            None => None,
        };
        Ok(Self::spawn_with_strategy(config, dialer, handler, strategy))
    }

    /// Spawns a connection task with an explicit retry strategy, ignoring
    /// `config.retry`.
    pub fn spawn_with_strategy(
        config: ConnectionConfig,
        dialer: D,
        handler: H,
        strategy: Option<Box<dyn RetryStrategy>>,
    ) -> ConnectionHandle {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Idle);
        let span = info_span!("connection", tag = %config.tag, url = %config.url);

        let connection = Connection {
            config,
            dialer,
            handler,
            strategy,
            state: state_tx,
            socket: None,
            heartbeat: None,
            reconnect: None,
            buffer: VecDeque::new(),
            close_normally: false,
            open_count: 0,
            attempt: 0,
        };
        tokio::spawn(connection.run(command_rx).instrument(span));

        ConnectionHandle {
            commands: command_tx,
            state: state_rx,
        }
    }

    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                event = next_event(&mut self.socket) => self.handle_event(event),
                _ = next_tick(&mut self.heartbeat) => self.heartbeat_tick(),
                _ = reconnect_due(&mut self.reconnect) => {
                    self.reconnect = None;
                    self.dial();
                }
            }
        }

        debug!("All handles dropped, shutting down");
        self.request_close();
    }

    fn current(&self) -> ConnectionState {
        *self.state.borrow()
    }

    fn set_state(&self, state: ConnectionState) {
        debug!(?state, "State changed");
        self.state.send_replace(state);
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Connect => self.connect(),
            Command::Send(frame) => self.send(frame),
            Command::Close => self.close(),
        }
    }

    fn connect(&mut self) {
        match self.current() {
            ConnectionState::Idle | ConnectionState::Dead(_) => {
                self.close_normally = false;
                self.open_count = 0;
                self.attempt = 0;
                self.reset_strategy();
                self.dial();
            }
            ConnectionState::Reconnecting { .. } => {
                self.reconnect = None;
                self.dial();
            }
            ConnectionState::Connecting | ConnectionState::Open | ConnectionState::Closing => {
                debug!("Connect ignored, already active");
            }
        }
    }

    fn dial(&mut self) {
        info!(attempt = self.attempt, "Dialing");
        self.set_state(ConnectionState::Connecting);
        // Replacing the handle drops any superseded socket.
        self.socket = Some(self.dialer.dial(&self.config));
    }

    fn send(&mut self, frame: Frame) {
        if !self.current().is_open() {
            debug!(len = frame.len(), buffered = self.buffer.len() + 1, "Buffering frame");
            self.buffer.push_back(frame);
            return;
        }
        if let Some(frame) = self.write(frame) {
            self.buffer.push_back(frame);
        }
    }

    /// Hands a frame to the socket; gives it back if the socket is gone.
    fn write(&mut self, frame: Frame) -> Option<Frame> {
        let Some(socket) = self.socket.as_ref() else {
            return Some(frame);
        };
        match socket.commands.send(SocketCommand::Send(frame)) {
            Ok(()) => None,
            Err(mpsc::error::SendError(SocketCommand::Send(frame))) => Some(frame),
            Err(_) => None,
        }
    }

    fn flush(&mut self) {
        let pending = self.buffer.len();
        while let Some(frame) = self.buffer.pop_front() {
            if let Some(frame) = self.write(frame) {
                self.buffer.push_front(frame);
                break;
            }
        }
        if pending > 0 {
            debug!(flushed = pending - self.buffer.len(), "Flushed buffered frames");
        }
    }

    fn close(&mut self) {
        self.close_normally = true;
        match self.current() {
            ConnectionState::Dead(_) | ConnectionState::Closing => {}
            ConnectionState::Open => {
                if !self.request_close() {
                    self.dispose();
                    return;
                }
                info!("Closing");
                self.heartbeat = None;
                self.set_state(ConnectionState::Closing);
            }
            // A socket still dialing is told to close before it is dropped.
            _ => {
                self.request_close();
                self.dispose();
            }
        }
    }

    /// Asks the current socket for a normal closure. False without a live socket.
    fn request_close(&self) -> bool {
        self.socket.as_ref().is_some_and(|socket| {
            socket
                .commands
                .send(SocketCommand::Close {
                    code: CLIENT_CLOSE_CODE,
                    reason: CLIENT_CLOSE_REASON.to_string(),
                })
                .is_ok()
        })
    }

    fn handle_event(&mut self, event: SocketEvent) {
        match event {
            SocketEvent::Opened => self.on_opened(),
            SocketEvent::Message(frame) => self.handler.on_data(frame),
            SocketEvent::Error(error) => {
                warn!(%error, "Socket error");
                self.handler.on_error(&error);
            }
            SocketEvent::Closed { code, reason } => self.on_closed(code, &reason),
        }
    }

    fn on_opened(&mut self) {
        self.open_count += 1;
        self.attempt = 0;
        self.reset_strategy();
        info!(open_count = self.open_count, "Connection open");
        self.set_state(ConnectionState::Open);

        self.heartbeat = self.config.heartbeat_interval().map(|period| {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

        self.flush();
        self.handler.on_connected();
    }

    fn on_closed(&mut self, code: u16, reason: &str) {
        self.socket = None;
        self.cancel_timers();

        if self.open_count == 0 {
            warn!(code, reason, "Closed before opening");
            self.die(DeadReason::HandshakeFailed);
            return;
        }

        if is_normal_close(code) {
            info!(code, reason, "Closed normally");
            self.open_count = 0;
            self.reset_strategy();
            self.dispose();
            return;
        }

        if self.close_normally {
            self.dispose();
            return;
        }

        warn!(code, reason, "Connection lost");
        let Some(strategy) = self.strategy.as_mut() else {
            self.die(DeadReason::ConnectionLost);
            return;
        };
        if strategy.should_abort() {
            self.die(DeadReason::ReachMaxRetries);
            return;
        }

        let delay = strategy.next();
        self.attempt += 1;
        self.reconnect = Some(Box::pin(sleep(delay)));
        info!(attempt = self.attempt, delay_ms = delay.as_millis() as u64, "Reconnect scheduled");
        self.set_state(ConnectionState::Reconnecting {
            attempt: self.attempt,
            delay,
        });
        self.handler.on_will_reconnect(delay);
    }

    fn heartbeat_tick(&mut self) {
        let Some(frame) = self.handler.on_heartbeat_tick() else {
            return;
        };
        if self.write(frame).is_some() {
            debug!("Heartbeat frame dropped, socket gone");
        }
    }

    /// Terminal normal closure.
    fn dispose(&mut self) {
        self.socket = None;
        self.die(DeadReason::NormalClose);
        self.handler.on_dispose();
    }

    fn die(&mut self, reason: DeadReason) {
        self.cancel_timers();
        info!(%reason, buffered = self.buffer.len(), "Connection dead");
        self.set_state(ConnectionState::Dead(reason));
        self.handler.on_dead(reason);
    }

    fn cancel_timers(&mut self) {
        self.heartbeat = None;
        self.reconnect = None;
    }

    fn reset_strategy(&mut self) {
        if let Some(strategy) = self.strategy.as_mut() {
            strategy.reset();
        }
    }
}

/// Next event of the current socket; pending forever without one. A socket
/// that vanished without reporting `Closed` counts as an abnormal close.
async fn next_event(socket: &mut Option<SocketHandle>) -> SocketEvent {
    match socket {
        Some(socket) => socket.events.recv().await.unwrap_or(SocketEvent::Closed {
            code: ABNORMAL_CLOSE_CODE,
            reason: NetworkError::ConnectionClosed.to_string(),
        }),
        None => pending().await,
    }
}

async fn next_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => pending().await,
    }
}

async fn reconnect_due(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(timer) => timer.as_mut().await,
        None => pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::handler::Hooks;
    use crate::network::mock::MockDialer;

    fn config() -> ConnectionConfig {
        ConnectionConfig::new("ws://mock").without_retry().without_heartbeat()
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_starts_idle() {
        let handle = Connection::spawn(config(), MockDialer::new(), Hooks::new(|_| {})).unwrap();
        assert_eq!(handle.state(), ConnectionState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_while_idle_is_normal_close() {
        let handle = Connection::spawn(config(), MockDialer::new(), Hooks::new(|_| {})).unwrap();
        handle.close().unwrap();
        let state = handle.wait_for(ConnectionState::is_dead).await.unwrap();
        assert_eq!(state, ConnectionState::Dead(DeadReason::NormalClose));
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_ignored_while_connecting() {
        let dialer = MockDialer::new();
        let handle = Connection::spawn(config(), dialer.clone(), Hooks::new(|_| {})).unwrap();
        handle.connect().unwrap();
        handle.connect().unwrap();
        settle().await;
        assert_eq!(dialer.dial_count(), 1);
        assert_eq!(handle.state(), ConnectionState::Connecting);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawn_rejects_invalid_config() {
        let result = Connection::spawn(
            ConnectionConfig::new("http://nope"),
            MockDialer::new(),
            Hooks::new(|_| {}),
        );
        assert!(result.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handles_stops_task() {
        let dialer = MockDialer::new().with_auto_open();
        let handle = Connection::spawn(config(), dialer.clone(), Hooks::new(|_| {})).unwrap();
        handle.connect().unwrap();
        handle.wait_for(ConnectionState::is_open).await.unwrap();
        let mut socket = dialer.next_socket().unwrap();

        drop(handle);
        settle().await;

        assert_eq!(
            socket.drain_commands(),
            vec![SocketCommand::Close {
                code: CLIENT_CLOSE_CODE,
                reason: CLIENT_CLOSE_REASON.to_string()
            }]
        );
    }
}
