//! Threaded recording with a readiness handshake.
//!
//! [`Recorder::start`] moves a sink onto an encoder thread and returns immediately. The thread
//! calls `begin` and then reports through the ready signal; callers block on
//! [`Recorder::wait_ready`] with a timeout before rendering their first frame. Frames travel
//! over a bounded channel, so a slow encoder throttles the renderer.

use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{RevealError, RevealResult};
use crate::render::compositor::FrameRgba;

/// Grace period callers use when they have no better timeout.
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of waiting for the encoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Readiness {
    /// `begin` succeeded.
    Ready,
    /// No answer within the timeout; recording proceeds anyway.
    TimedOut,
}

/// Finished recording.
#[derive(Debug)]
pub struct Recording<S> {
    /// Sink, after `end`.
    pub sink: S,
    /// Frames delivered to the sink.
    pub frames: u64,
}

/// Handle to a running encoder thread.
pub struct Recorder<S: FrameSink + 'static> {
    tx: Option<mpsc::SyncSender<FrameRgba>>,
    ready_rx: mpsc::Receiver<RevealResult<()>>,
    ready: Option<Readiness>,
    handle: Option<JoinHandle<RevealResult<Recording<S>>>>,
    sent: u64,
}

impl<S: FrameSink + 'static> Recorder<S> {
    /// Spawn the encoder thread for `sink`.
    #[tracing::instrument(skip(sink), fields(width = cfg.width, height = cfg.height))]
    pub fn start(mut sink: S, cfg: SinkConfig, channel_capacity: usize) -> RevealResult<Self> {
        let (tx, rx) = mpsc::sync_channel::<FrameRgba>(channel_capacity.max(1));
        let (ready_tx, ready_rx) = mpsc::channel::<RevealResult<()>>();

        let handle = std::thread::Builder::new()
            .name("puzzle-reveal-encoder".to_owned())
            .spawn(move || -> RevealResult<Recording<S>> {
                if let Err(e) = sink.begin(cfg) {
                    let msg = e.to_string();
                    let _ = ready_tx.send(Err(e));
                    return Err(RevealError::encode(format!("sink failed to start: {msg}")));
                }
                let _ = ready_tx.send(Ok(()));

                let mut frames = 0u64;
                while let Ok(frame) = rx.recv() {
                    sink.push_frame(FrameIndex(frames), &frame)?;
                    frames += 1;
                }
                sink.end()?;
                Ok(Recording { sink, frames })
            })
            .map_err(|e| RevealError::encode(format!("failed to spawn encoder thread: {e}")))?;

        Ok(Self {
            tx: Some(tx),
            ready_rx,
            ready: None,
            handle: Some(handle),
            sent: 0,
        })
    }

    /// Block until the sink has started or `timeout` elapses.
    ///
    /// A timeout is logged and treated as ready; a failed `begin` is returned as an error.
    pub fn wait_ready(&mut self, timeout: Duration) -> RevealResult<Readiness> {
        if let Some(r) = self.ready {
            return Ok(r);
        }
        let r = match self.ready_rx.recv_timeout(timeout) {
            Ok(Ok(())) => Readiness::Ready,
            Ok(Err(e)) => return Err(e),
            Err(mpsc::RecvTimeoutError::Timeout) => {
                tracing::warn!(?timeout, "recorder not ready in time, starting anyway");
                Readiness::TimedOut
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                return Err(RevealError::encode("encoder thread exited before it was ready"));
            }
        };
        self.ready = Some(r);
        Ok(r)
    }

    /// Queue a frame, blocking while the channel is full.
    pub fn push_frame(&mut self, frame: FrameRgba) -> RevealResult<()> {
        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| RevealError::encode("recorder already stopped"))?;
        tx.send(frame)
            .map_err(|_| RevealError::encode("encoder thread is not accepting frames"))?;
        self.sent += 1;
        Ok(())
    }

    /// Frames queued so far.
    pub fn frames_sent(&self) -> u64 {
        self.sent
    }

    /// Close the channel, let the sink finish and hand it back.
    #[tracing::instrument(skip(self), fields(sent = self.sent))]
    pub fn stop(mut self) -> RevealResult<Recording<S>> {
        drop(self.tx.take());
        let handle = self
            .handle
            .take()
            .ok_or_else(|| RevealError::encode("recorder already stopped"))?;
        let recording = handle
            .join()
            .map_err(|_| RevealError::encode("encoder thread panicked"))??;
        tracing::debug!(frames = recording.frames, "recording finished");
        Ok(recording)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/recorder.rs"]
mod tests;
