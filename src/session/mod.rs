//! Session lifecycle: the one non-trivial contract in this client.
//!
//! `SessionController` owns the "session requested" flag and drives the
//! paired microphone-enable and fetch-then-connect tasks. `RtcSession` is
//! the seam over the LiveKit SDK; `LiveKitSession` is the production
//! implementation. The event bridge maps session-level events to UI state
//! changes and alerts.

mod capture;
mod controller;
mod events;
mod livekit;
mod rtc;

pub use capture::{CaptureConfig, MicCapture};
pub use controller::SessionController;
pub use livekit::LiveKitSession;
pub use rtc::{RtcSession, SessionEvent, SessionState};
