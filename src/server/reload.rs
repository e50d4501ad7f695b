// src/server/reload.rs

//! Fan-out of browser notifications.
//!
//! A single [`ReloadHub`] is created at startup and cloned into every
//! component that reports changes (pipelines, the watch coordinator) and
//! into the dev server, which forwards each message to its websocket
//! clients.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, trace};

const CHANNEL_CAPACITY: usize = 64;

/// Message pushed to connected browsers, serialised as JSON:
/// `{"type":"reload","reason":"..."}` or `{"type":"css","paths":[...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Notification {
    /// Full page reload.
    Reload { reason: String },
    /// Re-fetch these stylesheets (paths relative to the served root).
    Css { paths: Vec<String> },
}

impl Notification {
    pub fn reload(reason: impl Into<String>) -> Self {
        Notification::Reload {
            reason: reason.into(),
        }
    }

    pub fn to_json(&self) -> String {
        // Serialising a plain enum of strings cannot fail.
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"reload","reason":""}"#.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct ReloadHub {
    tx: broadcast::Sender<Notification>,
}

impl Default for ReloadHub {
    fn default() -> Self {
        Self::new()
    }
}

impl ReloadHub {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Push a notification to every subscriber. Returns how many received it.
    ///
    /// Fire-and-forget: with no subscribers the message is dropped.
    pub fn publish(&self, notification: Notification) -> usize {
        match self.tx.send(notification) {
            Ok(n) => {
                debug!(receivers = n, "notification published");
                n
            }
            Err(broadcast::error::SendError(n)) => {
                trace!(notification = ?n, "no subscribers; notification dropped");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
