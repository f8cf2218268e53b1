//! Mirror surface messaging.
//!
//! The prompter can push its state to a secondary display surface (another
//! terminal running in mirror mode, or a future external window). Every
//! message type has an explicit schema; delivery is fire-and-forget over an
//! in-process channel and a missing or closed receiver is a logged no-op,
//! never an error the UI sees.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::warn;

use crate::constants::async_tasks::CHANNEL_BUFFER_SIZE;
use crate::presentation::SettingsSnapshot;

/// Messages pushed to the mirror surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MirrorMessage {
    /// The full script content was replaced (edit commit or project switch).
    ContentReplaced {
        /// Serialized script markup.
        markup: String,
    },
    /// Display parameters changed.
    SettingsChanged {
        /// Full settings snapshot.
        snapshot: SettingsSnapshot,
    },
    /// The current notecard slide changed.
    SlideChanged {
        /// New slide index.
        index: usize,
        /// Total slide count.
        total: usize,
    },
    /// Continuous-mode scroll position changed.
    ScrollTo {
        /// Scroll offset in rows.
        row: f64,
    },
}

/// Fire-and-forget sender half of the mirror channel.
#[derive(Debug, Clone)]
pub struct MirrorLink {
    tx: mpsc::Sender<MirrorMessage>,
}

impl MirrorLink {
    /// Create a connected link/receiver pair.
    pub fn pair() -> (Self, mpsc::Receiver<MirrorMessage>) {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        (Self { tx }, rx)
    }

    /// Push a message to the mirror surface.
    ///
    /// Best effort: a closed or full channel is logged and dropped. The
    /// core never blocks on the mirror and never surfaces its failures.
    pub fn send(&self, message: MirrorMessage) {
        if let Err(e) = self.tx.try_send(message) {
            warn!(error = %e, "mirror unavailable, dropping message");
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;

    #[test]
    fn test_send_delivers_message() {
        let (link, mut rx) = MirrorLink::pair();
        link.send(MirrorMessage::SlideChanged { index: 2, total: 5 });

        let received = rx.try_recv().unwrap();
        assert_eq!(received, MirrorMessage::SlideChanged { index: 2, total: 5 });
    }

    #[test]
    fn test_send_to_closed_receiver_is_noop() {
        let (link, rx) = MirrorLink::pair();
        drop(rx);
        // Must not panic or error.
        link.send(MirrorMessage::ScrollTo { row: 1.5 });
    }

    #[test]
    fn test_message_schema_round_trips() {
        let msg = MirrorMessage::ContentReplaced { markup: "<p>hi</p>".to_string() };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"content_replaced\""));
        let parsed: MirrorMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, msg);
    }
}
