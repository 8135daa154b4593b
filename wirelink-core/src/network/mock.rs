// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Mock Dialer
//!
//! In-memory sockets for driving a connection from tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use super::config::ConnectionConfig;
use super::transport::{Dialer, SocketDriver, SocketHandle};

#[derive(Debug, Default)]
struct MockState {
    dialed: Vec<String>,
    pending: VecDeque<SocketDriver>,
    auto_open: bool,
}

/// Dialer whose sockets are driven by the test.
///
/// Clones share state, so a test keeps one clone and gives the other to the
/// connection.
///
/// # Example
///
/// ```ignore
/// let dialer = MockDialer::new();
/// let handle = Connection::spawn(config, dialer.clone(), handler);
/// handle.connect()?;
///
/// let mut socket = dialer.next_socket().unwrap();
/// socket.open();
/// socket.deliver(vec![1, 2, 3]);
/// assert_eq!(socket.drain_commands(), vec![]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockDialer {
    state: Arc<Mutex<MockState>>,
}

impl MockDialer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every dialed socket reports `Opened` right away.
    pub fn with_auto_open(self) -> Self {
        self.lock().auto_open = true;
        self
    }

    /// Number of dials so far.
    pub fn dial_count(&self) -> usize {
        self.lock().dialed.len()
    }

    /// URLs of every dial, in order.
    pub fn dialed_urls(&self) -> Vec<String> {
        self.lock().dialed.clone()
    }

    /// Socket side of the oldest dial not yet taken.
    pub fn next_socket(&self) -> Option<SocketDriver> {
        self.lock().pending.pop_front()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Dialer for MockDialer {
    fn dial(&mut self, config: &ConnectionConfig) -> SocketHandle {
        let (handle, driver) = SocketHandle::pair();
        let mut state = self.lock();
        if state.auto_open {
            driver.open();
        }
        state.dialed.push(config.url.clone());
        state.pending.push_back(driver);
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::transport::SocketEvent;

    #[test]
    fn test_records_dials_in_order() {
        let dialer = MockDialer::new();
        let mut connection_side = dialer.clone();
        let _first = connection_side.dial(&ConnectionConfig::new("ws://a"));
        let _second = connection_side.dial(&ConnectionConfig::new("ws://b"));

        assert_eq!(dialer.dial_count(), 2);
        assert_eq!(dialer.dialed_urls(), vec!["ws://a", "ws://b"]);
        assert!(dialer.next_socket().is_some());
        assert!(dialer.next_socket().is_some());
        assert!(dialer.next_socket().is_none());
    }

    #[test]
    fn test_auto_open() {
        let mut dialer = MockDialer::new().with_auto_open();
        let mut handle = dialer.dial(&ConnectionConfig::new("ws://a"));
        assert_eq!(handle.events.try_recv(), Ok(SocketEvent::Opened));
    }
}
