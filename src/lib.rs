//! # Voicelink
//!
//! Native client for a real-time voice-AI chat session. The crate wires a
//! small amount of lifecycle logic around the LiveKit Rust SDK: it fetches
//! short-lived connection details from a backend endpoint, opens an audio
//! session with a remote agent, keeps the selected spoken language attached
//! to the local participant as metadata, and drives a two-view presentation
//! shell (welcome / live) off the session state.
//!
//! Media transport, signaling, and room replication are entirely delegated
//! to LiveKit; everything here is event wiring around that capability
//! surface.

pub mod alerts;
pub mod config;
pub mod connection;
pub mod errors;
pub mod language;
pub mod session;
pub mod shell;

// Re-export commonly used items for convenience
pub use alerts::{Alert, AlertSink};
pub use config::AppConfig;
pub use connection::{ConnectionDetails, ConnectionDetailsProvider};
pub use errors::app_error::{AppError, AppResult};
pub use language::Language;
pub use session::{RtcSession, SessionController, SessionEvent, SessionState};
