//! Microphone capture via CPAL.
//!
//! The CPAL stream is `!Send`, so it lives on a dedicated thread that
//! forwards converted i16 frames into an async channel. Runtime stream
//! errors are reported as `MediaDevicesError` session events; failures to
//! open the device fail the enable call itself.

use std::sync::mpsc as std_mpsc;
use std::thread;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, SampleRate, StreamConfig};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use super::rtc::SessionEvent;
use crate::errors::{AppError, AppResult};

/// Microphone capture parameters.
#[derive(Debug, Clone, Copy)]
pub struct CaptureConfig {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count (1 for mono).
    pub channels: u16,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            channels: 1,
        }
    }
}

/// Running microphone capture. Dropping it stops the stream.
pub struct MicCapture {
    stop_tx: Option<std_mpsc::Sender<()>>,
    thread: Option<thread::JoinHandle<()>>,
}

impl MicCapture {
    /// Open the default input device and start streaming frames into
    /// `frame_tx`. Stream errors after startup go to `events`.
    pub fn start(
        config: CaptureConfig,
        frame_tx: mpsc::UnboundedSender<Vec<i16>>,
        events: broadcast::Sender<SessionEvent>,
    ) -> AppResult<Self> {
        let (ready_tx, ready_rx) = std_mpsc::channel();
        let (stop_tx, stop_rx) = std_mpsc::channel::<()>();

        let thread = thread::Builder::new()
            .name("mic-capture".to_string())
            .spawn(move || match build_stream(config, frame_tx, events) {
                Ok(stream) => {
                    let _ = ready_tx.send(Ok(()));
                    // Keep the stream alive until stop is requested or the
                    // capture handle is dropped.
                    let _ = stop_rx.recv();
                    drop(stream);
                    debug!("microphone capture stream stopped");
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                }
            })
            .map_err(|e| AppError::MediaDevice {
                kind: "CaptureThreadError".to_string(),
                message: e.to_string(),
            })?;

        match ready_rx.recv_timeout(Duration::from_secs(5)) {
            Ok(Ok(())) => {
                info!(
                    sample_rate = config.sample_rate,
                    channels = config.channels,
                    "microphone capture started"
                );
                Ok(Self {
                    stop_tx: Some(stop_tx),
                    thread: Some(thread),
                })
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(AppError::MediaDevice {
                kind: "CaptureTimeout".to_string(),
                message: "microphone did not start within 5s".to_string(),
            }),
        }
    }

    /// Stop the capture stream and join the thread.
    pub fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            warn!("microphone capture thread panicked");
        }
    }
}

impl Drop for MicCapture {
    fn drop(&mut self) {
        self.stop();
    }
}

fn build_stream(
    config: CaptureConfig,
    frame_tx: mpsc::UnboundedSender<Vec<i16>>,
    events: broadcast::Sender<SessionEvent>,
) -> AppResult<cpal::Stream> {
    let device = cpal::default_host()
        .default_input_device()
        .ok_or_else(|| AppError::MediaDevice {
            kind: "NotFoundError".to_string(),
            message: "no input device available".to_string(),
        })?;

    debug!(
        "using input device: {}",
        device.name().unwrap_or_else(|_| "unknown".to_string())
    );

    let stream_config = StreamConfig {
        channels: config.channels,
        sample_rate: SampleRate(config.sample_rate),
        buffer_size: BufferSize::Default,
    };

    let stream = device
        .build_input_stream(
            &stream_config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let samples: Vec<i16> = data
                    .iter()
                    .map(|s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
                    .collect();
                let _ = frame_tx.send(samples);
            },
            move |err| {
                warn!("microphone stream error: {err}");
                let _ = events.send(SessionEvent::MediaDevicesError {
                    kind: "AudioStreamError".to_string(),
                    message: err.to_string(),
                });
            },
            None,
        )
        .map_err(|e| AppError::MediaDevice {
            kind: "BuildStreamError".to_string(),
            message: e.to_string(),
        })?;

    stream.play().map_err(|e| AppError::MediaDevice {
        kind: "PlayStreamError".to_string(),
        message: e.to_string(),
    })?;

    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_config_default() {
        let config = CaptureConfig::default();
        assert_eq!(config.sample_rate, 48_000);
        assert_eq!(config.channels, 1);
    }
}
