//! Bridge from session-level events to UI state and alerts.

use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use super::rtc::SessionEvent;
use crate::alerts::{Alert, AlertSink};

/// Alert title used for local media device failures.
const MEDIA_DEVICES_ALERT_TITLE: &str = "Encountered an error with your media devices";

/// Subscribe to session events for the lifetime of the handle.
///
/// A disconnect, however originated, resets the requested flag; a media
/// device error raises a dismissible alert without touching session
/// state. The task ends when the event sender is dropped, which pairs
/// teardown with the handle's own lifetime.
pub(crate) fn spawn_event_bridge(
    mut events: broadcast::Receiver<SessionEvent>,
    requested: watch::Sender<bool>,
    alerts: AlertSink,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(SessionEvent::Disconnected { reason }) => {
                    info!(%reason, "session disconnected");
                    requested.send_replace(false);
                }
                Ok(SessionEvent::MediaDevicesError { kind, message }) => {
                    warn!("media devices error: {kind}: {message}");
                    alerts.push(Alert::new(
                        MEDIA_DEVICES_ALERT_TITLE,
                        format!("{kind}: {message}"),
                    ));
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!("session event bridge lagged, missed {missed} events");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        debug!("session event bridge finished");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disconnected_resets_requested() {
        let (events_tx, events_rx) = broadcast::channel(4);
        let (requested, mut watch_rx) = watch::channel(true);
        let (alerts, _alerts_rx) = AlertSink::new();

        let bridge = spawn_event_bridge(events_rx, requested, alerts);

        events_tx
            .send(SessionEvent::Disconnected {
                reason: "server closed".to_string(),
            })
            .unwrap();

        watch_rx.changed().await.unwrap();
        assert!(!*watch_rx.borrow());

        drop(events_tx);
        bridge.await.unwrap();
    }

    #[tokio::test]
    async fn test_media_devices_error_alerts_without_state_change() {
        let (events_tx, events_rx) = broadcast::channel(4);
        let (requested, watch_rx) = watch::channel(true);
        let (alerts, mut alerts_rx) = AlertSink::new();

        let bridge = spawn_event_bridge(events_rx, requested, alerts);

        events_tx
            .send(SessionEvent::MediaDevicesError {
                kind: "NotAllowedError".to_string(),
                message: "permission denied".to_string(),
            })
            .unwrap();

        let alert = alerts_rx.recv().await.unwrap();
        assert_eq!(alert.title, MEDIA_DEVICES_ALERT_TITLE);
        assert!(alert.description.contains("NotAllowedError"));
        assert!(alert.description.contains("permission denied"));

        // Requested flag untouched
        assert!(*watch_rx.borrow());

        drop(events_tx);
        bridge.await.unwrap();
    }

    #[tokio::test]
    async fn test_bridge_ends_when_sender_dropped() {
        let (events_tx, events_rx) = broadcast::channel::<SessionEvent>(4);
        let (requested, _watch_rx) = watch::channel(false);
        let (alerts, _alerts_rx) = AlertSink::new();

        let bridge = spawn_event_bridge(events_rx, requested, alerts);
        drop(events_tx);
        bridge.await.unwrap();
    }
}
