//! The seam between the lifecycle controller and the real-time SDK.
//!
//! Only two states are modeled because that is all the controller reacts
//! to; intermediate SDK states (connecting, reconnecting) are deliberately
//! not exposed here.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::errors::AppResult;

/// Connection state as seen by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connected,
}

/// Session-level events the controller and event bridge react to.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The session ended, whoever initiated it (user, server, network).
    Disconnected { reason: String },
    /// A local media device failed. Non-fatal; the session continues.
    MediaDevicesError { kind: String, message: String },
}

/// Handle to a real-time connection with the remote agent.
///
/// One instance exists per running application and is owned by the
/// `SessionController`; presentation code sees it only by reference.
#[async_trait]
pub trait RtcSession: Send + Sync {
    /// Current connection state.
    fn state(&self) -> SessionState;

    /// Subscribe to session events. May be called before `connect`; the
    /// subscription lives for the lifetime of the handle.
    fn subscribe(&self) -> broadcast::Receiver<SessionEvent>;

    /// Enable local microphone capture. With `pre_connect_buffer` set,
    /// audio recorded before the connection is established is retained and
    /// delivered once the track is published.
    async fn enable_microphone(&self, pre_connect_buffer: bool) -> AppResult<()>;

    /// Open the connection with per-attempt credentials.
    async fn connect(&self, server_url: &str, token: &str) -> AppResult<()>;

    /// Tear the connection down. Safe to call at any time, including while
    /// already disconnected.
    async fn disconnect(&self);

    /// Attach an opaque metadata payload to the local participant.
    async fn set_local_metadata(&self, metadata: String) -> AppResult<()>;
}
