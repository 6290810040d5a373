//! Configuration for the Voicelink client.
//!
//! Everything is environment-driven (a `.env` file is honored via
//! `dotenvy`); there is no on-disk config format. The only required
//! override is the connection-details endpoint, which falls back to the
//! conventional local development path when absent.

mod env;
mod utils;

use crate::session::CaptureConfig;

/// Default connection-details endpoint used when `CONN_DETAILS_ENDPOINT`
/// is not set.
pub const DEFAULT_CONN_DETAILS_ENDPOINT: &str = "http://localhost:3001/api/connection-details";

/// Client configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Endpoint returning `{serverUrl, participantToken}` per attempt.
    pub conn_details_endpoint: String,
    /// Retain microphone audio captured before the connection is
    /// established so early speech is not lost.
    pub pre_connect_buffer: bool,
    /// Label for the start action on the welcome surface.
    pub start_button_text: String,
    /// Microphone capture sample rate in Hz.
    pub sample_rate: u32,
    /// Microphone capture channel count.
    pub channels: u16,
}

impl AppConfig {
    /// Capture parameters for the microphone pipeline.
    pub fn capture_config(&self) -> CaptureConfig {
        CaptureConfig {
            sample_rate: self.sample_rate,
            channels: self.channels,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            conn_details_endpoint: DEFAULT_CONN_DETAILS_ENDPOINT.to_string(),
            pre_connect_buffer: true,
            start_button_text: "Start call".to_string(),
            sample_rate: 48_000,
            channels: 1,
        }
    }
}
