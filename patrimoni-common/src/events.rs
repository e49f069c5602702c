//! Session signals
//!
//! Login and logout transitions are broadcast on a [`SessionBus`] so every
//! session-dependent component reacts to the same transition.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogoutReason {
    /// Credential cleared by the user or the application
    Manual,
    /// The server rejected the credential on an authenticated request
    TokenInvalidOrExpired,
}

/// Session transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// A credential was stored; subscribers refetch the current user
    Login,
    /// The credential was cleared; subscribers drop the current user
    Logout { reason: LogoutReason },
}

/// Broadcast channel for [`SessionEvent`]s
///
/// Uses tokio::broadcast internally:
/// - Non-blocking publish (slow subscribers don't block the client)
/// - Multiple concurrent subscribers
/// - Lagged message detection for slow subscribers
///
/// # Examples
///
/// ```
/// use patrimoni_common::events::{SessionBus, SessionEvent};
///
/// let bus = SessionBus::new(16);
/// let mut rx = bus.subscribe();
/// bus.emit_lossy(SessionEvent::Login);
/// assert_eq!(rx.try_recv().unwrap(), SessionEvent::Login);
/// ```
#[derive(Debug, Clone)]
pub struct SessionBus {
    tx: broadcast::Sender<SessionEvent>,
    capacity: usize,
}

impl SessionBus {
    /// Creates a bus buffering `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx, capacity }
    }

    /// Receive every event emitted after this call
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Emit to all subscribers
    ///
    /// Returns `Ok(subscriber_count)`, or `Err` if nobody is listening.
    pub fn emit(
        &self,
        event: SessionEvent,
    ) -> Result<usize, broadcast::error::SendError<SessionEvent>> {
        self.tx.send(event)
    }

    /// Emit, ignoring the no-subscriber case
    pub fn emit_lossy(&self, event: SessionEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for SessionBus {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_EVENT_CAPACITY)
    }
}
