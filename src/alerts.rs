//! User-visible, dismissible notifications.
//!
//! Errors in this client are transient: they are pushed into an alert
//! channel and drained by whatever front surface is attached (the console
//! in the bundled binary). Nothing here is fatal to the process.

use tokio::sync::mpsc;
use tracing::debug;

/// A single dismissible notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub description: String,
}

impl Alert {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Cloneable producer half of the alert channel.
#[derive(Clone)]
pub struct AlertSink {
    tx: mpsc::UnboundedSender<Alert>,
}

impl AlertSink {
    /// Create the sink together with the receiver the presentation layer
    /// drains.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Alert>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Deliver an alert. If the receiving side is gone the alert is
    /// dropped; alerts are advisory and never load-bearing.
    pub fn push(&self, alert: Alert) {
        debug!(title = %alert.title, "alert: {}", alert.description);
        let _ = self.tx.send(alert);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_push_delivers_in_order() {
        let (sink, mut rx) = AlertSink::new();
        sink.push(Alert::new("first", "a"));
        sink.push(Alert::new("second", "b"));

        assert_eq!(rx.recv().await.unwrap().title, "first");
        assert_eq!(rx.recv().await.unwrap().title, "second");
    }

    #[tokio::test]
    async fn test_push_after_receiver_dropped_is_silent() {
        let (sink, rx) = AlertSink::new();
        drop(rx);
        // Must not panic or error
        sink.push(Alert::new("late", "nobody listening"));
    }
}
