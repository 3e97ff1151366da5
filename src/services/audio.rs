//! Audio cue capability.
//!
//! Sessions announce events (a piece snapping in, the explosion, ...) through [`AudioCues`].
//! [`SilentAudio`] discards them; [`CueTrack`] records them on a timeline and mixes synthesized
//! tones into an interleaved `f32le` file that the encoder muxes next to the video.

use std::f64::consts::TAU;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::encode::sink::AudioInputConfig;
use crate::foundation::error::{RevealError, RevealResult};

/// Default mix sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;
/// Fade applied to the tail of a mix when recording stops.
pub const STOP_FADE_MS: f64 = 600.0;

/// Sound effects the reveal can trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioCue {
    /// A piece reached its slot.
    Snap,
    /// Assembly started.
    Whoosh,
    /// Physics explosion.
    Boom,
    /// Outro card appeared.
    Chime,
}

impl AudioCue {
    /// Length of the synthesized sound in ms.
    pub fn duration_ms(self) -> f64 {
        match self {
            Self::Snap => 45.0,
            Self::Whoosh => 700.0,
            Self::Boom => 1100.0,
            Self::Chime => 1400.0,
        }
    }

    /// Mono sample at `t` seconds into the cue; `noise` is uniform in `[-1, 1]`.
    fn sample(self, t: f64, noise: f64) -> f64 {
        match self {
            Self::Snap => (TAU * 1800.0 * t).sin() * (-t * 90.0).exp() * 0.6,
            Self::Whoosh => {
                let d = self.duration_ms() / 1000.0;
                noise * (t / d * std::f64::consts::PI).sin().powi(2) * 0.35
            }
            Self::Boom => {
                let body = (TAU * (55.0 - 20.0 * t) * t).sin() * (-t * 3.5).exp();
                let crack = noise * (-t * 18.0).exp() * 0.5;
                (body + crack) * 0.8
            }
            Self::Chime => {
                let env = (-t * 2.6).exp();
                ((TAU * 880.0 * t).sin() + 0.5 * (TAU * 1320.0 * t).sin()) * env * 0.3
            }
        }
    }
}

/// Injected audio playback.
pub trait AudioCues: Send {
    /// Play `cue` at `volume` in `[0, 1]`.
    fn play(&mut self, cue: AudioCue, volume: f32);

    /// Timeline position for subsequent cues, for offline recorders.
    fn set_position_ms(&mut self, _t_ms: f64) {}

    /// Audio stream the encoder should mux, if any.
    fn output(&self) -> Option<AudioInputConfig>;
}

/// Discards every cue.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentAudio;

impl AudioCues for SilentAudio {
    fn play(&mut self, _cue: AudioCue, _volume: f32) {}

    fn output(&self) -> Option<AudioInputConfig> {
        None
    }
}

/// One recorded cue.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct CueEvent {
    /// Sound.
    pub cue: AudioCue,
    /// Timeline position.
    pub at_ms: f64,
    /// Gain.
    pub volume: f32,
}

/// Offline cue recorder and mixer.
#[derive(Clone, Debug)]
pub struct CueTrack {
    sample_rate: u32,
    channels: u16,
    position_ms: f64,
    events: Vec<CueEvent>,
    seed: u64,
    written: Option<PathBuf>,
}

impl CueTrack {
    /// Stereo track at [`DEFAULT_SAMPLE_RATE`].
    pub fn new(seed: u64) -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: 2,
            position_ms: 0.0,
            events: Vec::new(),
            seed,
            written: None,
        }
    }

    /// Recorded cues in trigger order.
    pub fn events(&self) -> &[CueEvent] {
        &self.events
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Interleaved PCM covering `duration_ms`, with the last [`STOP_FADE_MS`] faded out.
    pub fn mix(&self, duration_ms: f64) -> Vec<f32> {
        let frames = ms_to_samples(duration_ms, self.sample_rate);
        let ch = usize::from(self.channels);
        let mut out = vec![0.0f32; frames * ch];
        let mut rng = StdRng::seed_from_u64(self.seed);

        for ev in &self.events {
            let start = ms_to_samples(ev.at_ms, self.sample_rate);
            let len = ms_to_samples(ev.cue.duration_ms(), self.sample_rate);
            for i in 0..len {
                let frame = start + i;
                if frame >= frames {
                    break;
                }
                let t = i as f64 / f64::from(self.sample_rate);
                let v = (ev.cue.sample(t, rng.random_range(-1.0..=1.0)) as f32) * ev.volume;
                for c in 0..ch {
                    out[frame * ch + c] += v;
                }
            }
        }

        let fade = ms_to_samples(STOP_FADE_MS, self.sample_rate).min(frames);
        for frame in frames - fade..frames {
            let gain = ((frames - frame) as f32 / fade as f32).clamp(0.0, 1.0);
            for c in 0..ch {
                out[frame * ch + c] *= gain;
            }
        }
        for s in &mut out {
            *s = s.clamp(-1.0, 1.0);
        }
        out
    }

    /// Mix `duration_ms` and write it to `path` as raw little-endian `f32`.
    ///
    /// After this, [`AudioCues::output`] points at the file.
    pub fn write_f32le(&mut self, path: &Path, duration_ms: f64) -> RevealResult<AudioInputConfig> {
        let samples = self.mix(duration_ms);
        write_f32le_file(&samples, path)?;
        self.written = Some(path.to_path_buf());
        tracing::debug!(path = %path.display(), cues = self.events.len(), "wrote cue track");
        Ok(self.config_for(path.to_path_buf()))
    }

    fn config_for(&self, path: PathBuf) -> AudioInputConfig {
        AudioInputConfig {
            path,
            sample_rate: self.sample_rate,
            channels: self.channels,
        }
    }
}

impl AudioCues for CueTrack {
    fn play(&mut self, cue: AudioCue, volume: f32) {
        self.events.push(CueEvent {
            cue,
            at_ms: self.position_ms,
            volume: volume.clamp(0.0, 1.0),
        });
    }

    fn set_position_ms(&mut self, t_ms: f64) {
        if t_ms.is_finite() {
            self.position_ms = t_ms.max(0.0);
        }
    }

    fn output(&self) -> Option<AudioInputConfig> {
        self.written.clone().map(|p| self.config_for(p))
    }
}

fn ms_to_samples(ms: f64, sample_rate: u32) -> usize {
    if !ms.is_finite() || ms <= 0.0 {
        return 0;
    }
    (ms * f64::from(sample_rate) / 1000.0).round() as usize
}

fn write_f32le_file(samples: &[f32], path: &Path) -> RevealResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            RevealError::encode(format!(
                "failed to create audio output directory '{}': {e}",
                parent.display()
            ))
        })?;
    }
    let mut bytes = Vec::<u8>::with_capacity(samples.len() * 4);
    for &s in samples {
        bytes.extend_from_slice(&s.to_le_bytes());
    }
    std::fs::write(path, bytes).map_err(|e| {
        RevealError::encode(format!(
            "failed to write audio file '{}': {e}",
            path.display()
        ))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/services/audio.rs"]
mod tests;
