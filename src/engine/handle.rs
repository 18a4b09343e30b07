// src/engine/handle.rs

//! Control surface of a running session.

use tokio::sync::{mpsc, oneshot, watch};

use crate::errors::{HotbuildError, Result};
use crate::exec::DispatchOutcome;
use crate::types::RawEvent;

use super::{LastAction, SessionMessage};

/// Cheap, cloneable handle to a running [`WatchSession`](super::WatchSession).
///
/// Every request goes through the session's own channel, so it is ordered
/// with respect to filesystem events that arrived before it.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<SessionMessage>,
    state: watch::Receiver<LastAction>,
}

impl SessionHandle {
    pub(crate) fn new(
        tx: mpsc::UnboundedSender<SessionMessage>,
        state: watch::Receiver<LastAction>,
    ) -> Self {
        Self { tx, state }
    }

    /// Build the whole project and wait for the result.
    pub async fn trigger_build_sync(&self) -> Result<DispatchOutcome> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(SessionMessage::TriggerBuild {
            reply: Some(reply_tx),
        })?;
        reply_rx.await.map_err(|_| HotbuildError::SessionClosed)
    }

    /// Queue a full project build and return immediately.
    pub fn trigger_build_async(&self) -> Result<()> {
        self.send(SessionMessage::TriggerBuild { reply: None })
    }

    /// Feed an event as if the monitor had reported it.
    pub fn inject_event(&self, event: RawEvent) -> Result<()> {
        self.send(SessionMessage::FileEvent(event))
    }

    /// Ask the session to stop. Messages already queued are handled first.
    pub fn shutdown(&self) -> Result<()> {
        self.send(SessionMessage::Shutdown)
    }

    /// The last action the session completed.
    pub fn last_action(&self) -> LastAction {
        self.state.borrow().clone()
    }

    /// Receiver that is notified after every processed message.
    pub fn actions(&self) -> watch::Receiver<LastAction> {
        self.state.clone()
    }

    fn send(&self, message: SessionMessage) -> Result<()> {
        self.tx
            .send(message)
            .map_err(|_| HotbuildError::SessionClosed)
    }
}
