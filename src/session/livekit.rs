//! Production `RtcSession` backed by the LiveKit Rust SDK.
//!
//! Connectivity, media transport, and room replication all belong to the
//! SDK; this wrapper only adapts its surface to the `RtcSession` seam and
//! feeds captured microphone audio into the published track. Frames that
//! arrive before the track exists are held in a bounded queue when
//! pre-connection buffering is requested, then drained once publishing
//! completes, so no early speech is lost.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use livekit::options::TrackPublishOptions;
use livekit::prelude::{Room, RoomEvent, RoomOptions};
use livekit::track::{LocalAudioTrack, LocalTrack, TrackSource};
use livekit::webrtc::audio_source::native::NativeAudioSource;
use livekit::webrtc::prelude::{AudioFrame, AudioSourceOptions, RtcAudioSource};
use tokio::sync::{Mutex, broadcast, mpsc};
use tracing::{debug, info, warn};

use super::capture::{CaptureConfig, MicCapture};
use super::rtc::{RtcSession, SessionEvent, SessionState};
use crate::errors::{AppError, AppResult};

/// Upper bound on frames held before the track is published (~10s of
/// audio at the default callback cadence). Oldest frames are dropped
/// first once full.
const MAX_PENDING_FRAMES: usize = 1000;

/// Session handle over a LiveKit room. One instance per application.
pub struct LiveKitSession {
    capture: CaptureConfig,
    room: Mutex<Option<Room>>,
    connected: Arc<AtomicBool>,
    events_tx: broadcast::Sender<SessionEvent>,
    audio_source: Arc<Mutex<Option<Arc<NativeAudioSource>>>>,
    pending_frames: Arc<Mutex<VecDeque<Vec<i16>>>>,
    mic: parking_lot::Mutex<Option<MicCapture>>,
    pump_handle: parking_lot::Mutex<Option<tokio::task::JoinHandle<()>>>,
    forward_handle: parking_lot::Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl LiveKitSession {
    pub fn new(capture: CaptureConfig) -> Self {
        let (events_tx, _) = broadcast::channel(16);
        Self {
            capture,
            room: Mutex::new(None),
            connected: Arc::new(AtomicBool::new(false)),
            events_tx,
            audio_source: Arc::new(Mutex::new(None)),
            pending_frames: Arc::new(Mutex::new(VecDeque::new())),
            mic: parking_lot::Mutex::new(None),
            pump_handle: parking_lot::Mutex::new(None),
            forward_handle: parking_lot::Mutex::new(None),
        }
    }

    /// Create the local audio source, wrap it in a track, and publish it
    /// as the microphone. Called from whichever of connect/enable resolves
    /// second. Holding the source slot for the whole publish serializes
    /// concurrent callers, so the track is published at most once.
    async fn publish_mic_track(&self) -> AppResult<()> {
        let mut source_slot = self.audio_source.lock().await;
        if source_slot.is_some() {
            debug!("microphone track already published");
            return Ok(());
        }

        // Clone the participant out so the room lock is not held across
        // the publish round trip.
        let participant = {
            let room_guard = self.room.lock().await;
            match room_guard.as_ref() {
                Some(room) => room.local_participant().clone(),
                None => return Err(AppError::NotConnected),
            }
        };

        let source_options = AudioSourceOptions {
            echo_cancellation: true,
            noise_suppression: true,
            auto_gain_control: true,
        };

        let samples_per_frame = (self.capture.sample_rate * 10) / 1000;
        let source = Arc::new(NativeAudioSource::new(
            source_options,
            self.capture.sample_rate,
            self.capture.channels as u32,
            samples_per_frame,
        ));

        let track = LocalAudioTrack::create_audio_track(
            "microphone",
            RtcAudioSource::Native((*source).clone()),
        );

        let options = TrackPublishOptions {
            source: TrackSource::Microphone,
            ..Default::default()
        };

        participant
            .publish_track(LocalTrack::Audio(track), options)
            .await
            .map_err(|e| AppError::Connect {
                kind: "PublishTrackError".to_string(),
                message: format!("{e:?}"),
            })?;

        *source_slot = Some(source);
        info!("published microphone track");
        Ok(())
    }

    /// Tear connection state back down after a half-completed connect, so
    /// a publish failure never leaves the session reporting connected
    /// without a usable room.
    async fn unwind_connect(&self) {
        self.connected.store(false, Ordering::Release);
        let room = self.room.lock().await.take();
        if let Some(room) = room
            && let Err(e) = room.close().await
        {
            warn!("error closing room during connect unwind: {e:?}");
        }
    }
}

#[async_trait]
impl RtcSession for LiveKitSession {
    fn state(&self) -> SessionState {
        if self.connected.load(Ordering::Acquire) {
            SessionState::Connected
        } else {
            SessionState::Disconnected
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events_tx.subscribe()
    }

    async fn enable_microphone(&self, pre_connect_buffer: bool) -> AppResult<()> {
        if self.mic.lock().is_some() {
            debug!("microphone already enabled");
            return Ok(());
        }

        let (frame_tx, frame_rx) = mpsc::unbounded_channel();

        // Device probing blocks; keep it off the runtime threads.
        let capture = self.capture;
        let events = self.events_tx.clone();
        let mic = tokio::task::spawn_blocking(move || MicCapture::start(capture, frame_tx, events))
            .await
            .map_err(|e| AppError::MediaDevice {
                kind: "CaptureThreadError".to_string(),
                message: e.to_string(),
            })??;
        *self.mic.lock() = Some(mic);

        let pump = tokio::spawn(run_audio_pump(
            frame_rx,
            Arc::clone(&self.audio_source),
            Arc::clone(&self.pending_frames),
            pre_connect_buffer,
            self.capture,
        ));
        *self.pump_handle.lock() = Some(pump);

        // Connect may already have resolved; in that case the track is
        // published here instead of there.
        if self.connected.load(Ordering::Acquire) {
            self.publish_mic_track().await?;
        }

        Ok(())
    }

    async fn connect(&self, server_url: &str, token: &str) -> AppResult<()> {
        info!(%server_url, "connecting to session");

        match Room::connect(server_url, token, RoomOptions::default()).await {
            Ok((room, room_events)) => {
                *self.room.lock().await = Some(room);
                self.connected.store(true, Ordering::Release);

                // Publish the microphone if capture is already running.
                // Read the flag into a local first: the guard must not
                // live across the publish await.
                let mic_enabled = self.mic.lock().is_some();
                if mic_enabled && let Err(e) = self.publish_mic_track().await {
                    self.unwind_connect().await;
                    return Err(e);
                }

                let forward = tokio::spawn(forward_room_events(
                    room_events,
                    self.events_tx.clone(),
                    Arc::clone(&self.connected),
                ));
                *self.forward_handle.lock() = Some(forward);

                info!("connected to session");
                Ok(())
            }
            Err(e) => {
                self.connected.store(false, Ordering::Release);
                Err(AppError::Connect {
                    kind: "RoomError".to_string(),
                    message: format!("{e:?}"),
                })
            }
        }
    }

    async fn disconnect(&self) {
        info!("disconnecting from session");
        self.connected.store(false, Ordering::Release);

        if let Some(mut mic) = self.mic.lock().take() {
            mic.stop();
        }
        if let Some(handle) = self.pump_handle.lock().take() {
            handle.abort();
        }
        if let Some(handle) = self.forward_handle.lock().take() {
            handle.abort();
        }

        *self.audio_source.lock().await = None;
        self.pending_frames.lock().await.clear();

        let room = self.room.lock().await.take();
        if let Some(room) = room
            && let Err(e) = room.close().await
        {
            warn!("error closing room: {e:?}");
        }

        let _ = self.events_tx.send(SessionEvent::Disconnected {
            reason: "client disconnect".to_string(),
        });
        info!("disconnected from session");
    }

    async fn set_local_metadata(&self, metadata: String) -> AppResult<()> {
        // Clone the participant out so the room lock is not held across
        // the signaling round trip.
        let participant = {
            let room_guard = self.room.lock().await;
            match room_guard.as_ref() {
                Some(room) => room.local_participant().clone(),
                None => return Err(AppError::NotConnected),
            }
        };

        participant
            .set_metadata(metadata)
            .await
            .map_err(|e| AppError::MetadataPush(format!("{e:?}")))
    }
}

impl Drop for LiveKitSession {
    fn drop(&mut self) {
        if self.connected.load(Ordering::Acquire) {
            warn!("LiveKitSession dropped without explicit disconnect call");
        }
    }
}

async fn forward_room_events(
    mut room_events: mpsc::UnboundedReceiver<RoomEvent>,
    events_tx: broadcast::Sender<SessionEvent>,
    connected: Arc<AtomicBool>,
) {
    while let Some(event) = room_events.recv().await {
        match event {
            RoomEvent::Disconnected { reason } => {
                warn!("room disconnected: {reason:?}");
                connected.store(false, Ordering::Release);
                let _ = events_tx.send(SessionEvent::Disconnected {
                    reason: format!("{reason:?}"),
                });
            }
            other => {
                debug!("room event: {other:?}");
            }
        }
    }
    debug!("room event forwarder finished");
}

async fn run_audio_pump(
    mut frame_rx: mpsc::UnboundedReceiver<Vec<i16>>,
    audio_source: Arc<Mutex<Option<Arc<NativeAudioSource>>>>,
    pending_frames: Arc<Mutex<VecDeque<Vec<i16>>>>,
    pre_connect_buffer: bool,
    capture: CaptureConfig,
) {
    while let Some(samples) = frame_rx.recv().await {
        // Clone the source out of the mutex so no lock is held while
        // capturing frames.
        let source = { audio_source.lock().await.as_ref().cloned() };

        match source {
            Some(source) => {
                // Drain anything buffered before the track existed, in
                // capture order, ahead of the current frame.
                let buffered: Vec<Vec<i16>> = {
                    let mut queue = pending_frames.lock().await;
                    if !queue.is_empty() {
                        info!("draining {} buffered pre-connect frames", queue.len());
                    }
                    queue.drain(..).collect()
                };
                for queued in buffered {
                    push_frame(&source, queued, capture).await;
                }
                push_frame(&source, samples, capture).await;
            }
            None => {
                if pre_connect_buffer {
                    let mut queue = pending_frames.lock().await;
                    if queue.len() >= MAX_PENDING_FRAMES {
                        queue.pop_front();
                    }
                    queue.push_back(samples);
                }
            }
        }
    }
    debug!("audio pump finished");
}

async fn push_frame(source: &NativeAudioSource, samples: Vec<i16>, capture: CaptureConfig) {
    let channels = capture.channels as usize;
    if samples.is_empty() || !samples.len().is_multiple_of(channels) {
        return;
    }
    let samples_per_channel = (samples.len() / channels) as u32;

    let frame = AudioFrame {
        data: samples.into(),
        sample_rate: capture.sample_rate,
        num_channels: capture.channels as u32,
        samples_per_channel,
    };

    if let Err(e) = source.capture_frame(&frame).await {
        warn!("failed to capture audio frame: {e:?}");
    }
}
