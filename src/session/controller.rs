//! Session lifecycle controller.
//!
//! Owns the "session requested" flag and the selected language, and runs
//! the connection attempt: microphone enablement and fetch-then-connect
//! are issued together and joined, and exactly one metadata push with the
//! language current at connect-resolution time follows a successful
//! connect.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::events;
use super::rtc::{RtcSession, SessionState};
use crate::alerts::{Alert, AlertSink};
use crate::connection::ConnectionDetailsProvider;
use crate::errors::AppError;
use crate::language::Language;

/// Alert title used when a connection attempt fails.
const CONNECT_ALERT_TITLE: &str = "There was an error connecting to the agent";

struct Attempt {
    aborted: Arc<AtomicBool>,
    task: tokio::task::JoinHandle<()>,
}

/// Owns the session handle and the connected/disconnected lifecycle.
///
/// Created once at application start; presentation code observes it
/// through [`SessionController::watch_requested`] and never holds the
/// session directly.
pub struct SessionController {
    session: Arc<dyn RtcSession>,
    details: Arc<dyn ConnectionDetailsProvider>,
    alerts: AlertSink,
    requested: watch::Sender<bool>,
    language: Arc<parking_lot::Mutex<Language>>,
    pre_connect_buffer: bool,
    attempt: parking_lot::Mutex<Option<Attempt>>,
    bridge: parking_lot::Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl SessionController {
    /// Wire the controller to a session handle and details provider and
    /// subscribe the event bridge. The bridge subscription lives until
    /// [`SessionController::shutdown`] or drop.
    pub fn new(
        session: Arc<dyn RtcSession>,
        details: Arc<dyn ConnectionDetailsProvider>,
        alerts: AlertSink,
        pre_connect_buffer: bool,
    ) -> Self {
        let (requested, _) = watch::channel(false);
        let bridge = events::spawn_event_bridge(
            session.subscribe(),
            requested.clone(),
            alerts.clone(),
        );

        Self {
            session,
            details,
            alerts,
            requested,
            language: Arc::new(parking_lot::Mutex::new(Language::default())),
            pre_connect_buffer,
            attempt: parking_lot::Mutex::new(None),
            bridge: parking_lot::Mutex::new(Some(bridge)),
        }
    }

    /// Whether a session has been requested by the user.
    pub fn requested(&self) -> bool {
        *self.requested.borrow()
    }

    /// Watch the requested flag; the presentation shell drives off this.
    pub fn watch_requested(&self) -> watch::Receiver<bool> {
        self.requested.subscribe()
    }

    /// Current state of the underlying session.
    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    /// The currently selected spoken language.
    pub fn language(&self) -> Language {
        *self.language.lock()
    }

    /// Update the selected language. The selection changes synchronously;
    /// if the session is connected an immediate metadata push is
    /// attempted, and a push failure is logged but never alters the held
    /// selection or the session.
    pub async fn select_language(&self, language: Language) {
        *self.language.lock() = language;
        debug!(%language, "language selected");

        if self.session.state() == SessionState::Connected
            && let Err(e) = self
                .session
                .set_local_metadata(language.metadata())
                .await
        {
            warn!("metadata push after language change failed: {e}");
        }
    }

    /// Request a session. Idempotent: a second start without an
    /// intervening disconnect is a no-op, as is starting while the
    /// underlying session is not idle.
    pub async fn start(&self) {
        let was_requested = self.requested.send_replace(true);
        if was_requested {
            debug!("session already requested, ignoring start");
            return;
        }
        if self.session.state() != SessionState::Disconnected {
            debug!("session not idle, ignoring start");
            return;
        }

        info!("starting session");
        let aborted = Arc::new(AtomicBool::new(false));
        let task = tokio::spawn(run_attempt(
            Arc::clone(&self.session),
            Arc::clone(&self.details),
            self.alerts.clone(),
            Arc::clone(&self.language),
            self.pre_connect_buffer,
            Arc::clone(&aborted),
        ));
        *self.attempt.lock() = Some(Attempt { aborted, task });
    }

    /// Tear the session down. The in-flight attempt, if any, is marked
    /// aborted so a late failure is not surfaced, and the session is
    /// disconnected unconditionally.
    pub async fn stop(&self) {
        self.requested.send_replace(false);

        let attempt = self.attempt.lock().take();
        if let Some(attempt) = attempt {
            attempt.aborted.store(true, Ordering::Release);
        }

        self.session.disconnect().await;
    }

    /// Stop the session and release the event bridge subscription.
    pub async fn shutdown(&self) {
        self.stop().await;
        if let Some(bridge) = self.bridge.lock().take() {
            bridge.abort();
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        // Symmetric teardown of the bridge subscription on every exit
        // path; the session itself is disconnected by shutdown/stop.
        if let Some(bridge) = self.bridge.lock().take() {
            bridge.abort();
        }
        if let Some(attempt) = self.attempt.lock().take() {
            attempt.aborted.store(true, Ordering::Release);
            attempt.task.abort();
        }
    }
}

/// One connection attempt: microphone enablement and
/// fetch-details-then-connect run concurrently and both must succeed.
/// The metadata push after connect picks up the language current at that
/// moment, which covers selections made while the connection was in
/// flight.
async fn run_attempt(
    session: Arc<dyn RtcSession>,
    details: Arc<dyn ConnectionDetailsProvider>,
    alerts: AlertSink,
    language: Arc<parking_lot::Mutex<Language>>,
    pre_connect_buffer: bool,
    aborted: Arc<AtomicBool>,
) {
    let language_at_start = *language.lock();

    let connect = async {
        let details = details.fetch(language_at_start).await?;
        session
            .connect(&details.server_url, &details.participant_token)
            .await?;

        let current = *language.lock();
        if let Err(e) = session.set_local_metadata(current.metadata()).await {
            warn!("post-connect metadata push failed: {e}");
        }
        Ok::<(), AppError>(())
    };

    let (mic_result, connect_result) =
        tokio::join!(session.enable_microphone(pre_connect_buffer), connect);

    if let Err(e) = mic_result.and(connect_result) {
        if aborted.load(Ordering::Acquire) {
            debug!("connect attempt abandoned, suppressing error: {e}");
            return;
        }
        // Alerts carry the error kind next to its message, mirroring the
        // `{kind}: {message}` shape media-device alerts use.
        let description = format!("{}: {}", e.kind(), e);
        warn!("connection attempt failed: {description}");
        alerts.push(Alert::new(CONNECT_ALERT_TITLE, description));
    }
}
