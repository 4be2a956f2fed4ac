//! Connection state of the shared WhatsApp session.
//!
//! The bridge owns the actual connection; this module only tracks what the
//! bridge reported so lookups can fail fast while the session is down.
//! `LoggedOut` is terminal: the session has to be linked again (new QR scan)
//! before any event moves it back.

use crate::utils::error::{CheckerError, Result};
use std::fmt;
use std::sync::{RwLock, RwLockWriteGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected,
    LoggedOut,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionState::Disconnected => "disconnected",
            SessionState::Connecting => "connecting",
            SessionState::Connected => "connected",
            SessionState::LoggedOut => "logged out",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    ConnectRequested,
    Opened,
    Closed { logged_out: bool },
    Relinked,
}

impl SessionState {
    /// Next state for `event`, or `None` when the event does not apply.
    pub fn transition(self, event: SessionEvent) -> Option<SessionState> {
        use SessionEvent::*;
        use SessionState::*;

        match (self, event) {
            (LoggedOut, Relinked) => Some(Disconnected),
            (LoggedOut, _) => None,
            (Disconnected, ConnectRequested) => Some(Connecting),
            (Connecting, Opened) => Some(Connected),
            (_, Closed { logged_out: true }) => Some(LoggedOut),
            // the bridge reconnects on its own unless the account was logged out
            (Connecting | Connected, Closed { logged_out: false }) => Some(Connecting),
            _ => None,
        }
    }
}

/// Shared view of the session state. Transitions are serialized behind the
/// lock; readers only ever see a state reached by a valid transition.
#[derive(Debug)]
pub struct SessionMonitor {
    state: RwLock<SessionState>,
}

impl Default for SessionMonitor {
    fn default() -> Self {
        Self::new(SessionState::Disconnected)
    }
}

impl SessionMonitor {
    pub fn new(initial: SessionState) -> Self {
        Self {
            state: RwLock::new(initial),
        }
    }

    /// A monitor for setups where the bridge manages the session and never
    /// reports state changes.
    pub fn connected() -> Self {
        Self::new(SessionState::Connected)
    }

    pub fn state(&self) -> SessionState {
        match self.state.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Applies `event`. Returns the new state, or the unchanged state when the
    /// event is not valid from there.
    pub fn apply(&self, event: SessionEvent) -> SessionState {
        let mut guard = self.write_guard();
        Self::step(&mut guard, event)
    }

    /// Applies a connection state reported by the bridge. A bridge that
    /// reports an open connection while this side is logged out or idle has
    /// been linked again, so the intermediate events are applied in one go.
    pub fn observe(&self, reported: SessionEvent) -> SessionState {
        use SessionEvent::*;

        let mut guard = self.write_guard();
        let steps: &[SessionEvent] = match (*guard, reported) {
            (SessionState::LoggedOut, Opened) => &[Relinked, ConnectRequested, Opened],
            (SessionState::Disconnected, Opened) => &[ConnectRequested, Opened],
            _ => std::slice::from_ref(&reported),
        };
        for event in steps {
            Self::step(&mut guard, *event);
        }
        *guard
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, SessionState> {
        match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn step(state: &mut SessionState, event: SessionEvent) -> SessionState {
        match state.transition(event) {
            Some(next) => {
                tracing::info!(from = %*state, to = %next, ?event, "Session state changed");
                *state = next;
                next
            }
            None => {
                tracing::debug!(state = %*state, ?event, "Ignoring session event");
                *state
            }
        }
    }

    /// Fails fast unless the session is connected.
    pub fn ensure_available(&self) -> Result<()> {
        match self.state() {
            SessionState::Connected => Ok(()),
            other => Err(CheckerError::SessionUnavailable { state: other }),
        }
    }
}
