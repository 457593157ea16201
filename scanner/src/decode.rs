//! QR decoding adapter.
//!
//! Wraps a camera feed (`FrameSource`) and a decode library (`FrameDecoder`)
//! behind a start/stop pair. The first non-empty decoded payload stops the
//! sampling loop *before* it is delivered, so a burst of identical frames
//! cannot fire twice. Per-frame decode misses are swallowed. Manual text
//! entry feeds the same delivery path for the no-camera fallback.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tokio::sync::mpsc;

/// An enumerated camera device.
#[derive(Debug, Clone)]
pub struct CameraInfo {
    pub id: String,
    pub label: String,
}

/// Picks the camera to scan with: prefer a label that indicates a
/// rear-facing device, otherwise the first enumerated one.
pub fn pick_camera(devices: &[CameraInfo]) -> Option<&CameraInfo> {
    devices
        .iter()
        .find(|d| {
            let label = d.label.to_lowercase();
            label.contains("back") || label.contains("environment")
        })
        .or_else(|| devices.first())
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Scanner is already running")]
    AlreadyRunning,
}

/// A camera feed yielding raw frames; `None` when the feed ends.
#[async_trait]
pub trait FrameSource: Send + 'static {
    async fn next_frame(&mut self) -> Option<Vec<u8>>;
}

/// The decode-library seam: a frame either contains a payload or it doesn't.
pub trait FrameDecoder: Send + 'static {
    fn decode(&mut self, frame: &[u8]) -> Option<String>;
}

/// Receiving side of a scanner's emissions.
pub struct ScanResults {
    rx: mpsc::UnboundedReceiver<String>,
}

impl ScanResults {
    /// Waits for the next scanned or manually entered payload.
    pub async fn recv(&mut self) -> Option<String> {
        self.rx.recv().await
    }
}

/// Start/stop handle over the sampling loop.
///
/// The camera is held exclusively between `start` and `stop`; starting a
/// running scanner is an error rather than a second acquisition.
pub struct QrScanner {
    running: Arc<AtomicBool>,
    tx: mpsc::UnboundedSender<String>,
}

impl QrScanner {
    pub fn new() -> (Self, ScanResults) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                running: Arc::new(AtomicBool::new(false)),
                tx,
            },
            ScanResults { rx },
        )
    }

    /// Spawns the sampling loop over the given source and decoder.
    pub fn start<S, D>(&self, mut source: S, mut decoder: D) -> Result<(), ScanError>
    where
        S: FrameSource,
        D: FrameDecoder,
    {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(ScanError::AlreadyRunning);
        }

        let running = self.running.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            while running.load(Ordering::SeqCst) {
                let Some(frame) = source.next_frame().await else {
                    break;
                };
                match decoder.decode(&frame) {
                    Some(payload) if !payload.is_empty() => {
                        // Stop decoding before the payload is delivered so
                        // the same scan burst cannot double-fire.
                        running.store(false, Ordering::SeqCst);
                        if tx.send(payload).is_err() {
                            tracing::debug!("scan result dropped: receiver gone");
                        }
                        return;
                    }
                    // Frames without a decodable code are expected; keep
                    // sampling.
                    _ => {}
                }
            }
            running.store(false, Ordering::SeqCst);
        });

        Ok(())
    }

    /// Releases the camera. Safe to call repeatedly.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Manual text-entry fallback; feeds the same delivery path as a
    /// decoded frame.
    pub fn submit_manual(&self, payload: &str) {
        let trimmed = payload.trim();
        if trimmed.is_empty() {
            return;
        }
        if self.tx.send(trimmed.to_string()).is_err() {
            tracing::debug!("manual entry dropped: receiver gone");
        }
    }
}
