use std::collections::{HashMap, HashSet};
use std::time::Duration;

use smallvec::SmallVec;

use crate::animation::timeline::AssemblyTimeline;
use crate::config::RevealConfig;
use crate::encode::recorder::{Recorder, Recording};
use crate::encode::sink::{AudioInputConfig, FrameSink, SinkConfig};
use crate::finale::phase::{FINISH_MS, FinalePhase, FinaleState};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{RevealError, RevealResult};
use crate::physics::bridge::{EXPLOSION_PARTICIPATION_RATIO, PhysicsBridge};
use crate::physics::engine::BodyPose;
use crate::pieces::builder::{BuildOpts, PieceBuilder};
use crate::pieces::piece::PieceSet;
use crate::raster::image::{ImageToken, SourceImage};
use crate::render::compositor::{FrameCompositor, FrameInputs, FrameRgba, FrameStats};
use crate::render::narrative::NarrativeContent;
use crate::render::outro::OutroRenderer;
use crate::render::text::TextRenderer;
use crate::services::audio::{AudioCue, AudioCues, SilentAudio};

/// Largest physics step taken for one frame; longer gaps are clamped.
const MAX_FRAME_STEP_MS: f64 = 100.0;

const SNAP_VOLUME: f32 = 0.35;
const WHOOSH_VOLUME: f32 = 0.6;
const BOOM_VOLUME: f32 = 1.0;
const CHIME_VOLUME: f32 = 0.7;

/// Frames the recorder may buffer ahead of the encoder.
const RECORDER_CHANNEL_CAPACITY: usize = 4;

/// Proof that a build was requested for a particular image load.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuildTicket {
    /// Image the build samples.
    pub token: ImageToken,
    /// Load generation at request time.
    pub generation: u64,
    /// First piece id the build may use.
    pub id_base: u32,
}

/// What happened while rendering one frame.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct FrameReport {
    /// Elapsed time the frame was rendered at.
    pub elapsed_ms: f64,
    /// Phase at that time.
    pub phase: FinalePhase,
    /// Compositor counts.
    pub stats: FrameStats,
    /// Pieces that completed since the previous frame.
    pub newly_snapped: usize,
    /// Bodies created by the explosion this frame.
    pub exploded: usize,
    /// Whether the finished callback fired on this frame.
    pub finished: bool,
}

/// Per-playback cue latches and the set of pieces already announced as snapped.
#[derive(Debug, Default)]
struct CueState {
    snapped: HashSet<u32>,
    whooshed: bool,
    boomed: bool,
    chimed: bool,
}

impl CueState {
    /// Cues for one frame. At most one snap cue is emitted however many pieces land.
    fn advance(
        &mut self,
        pieces: Option<&PieceSet>,
        timeline: &AssemblyTimeline,
        finale: &FinaleState,
        elapsed: f64,
        exploded: bool,
    ) -> (usize, SmallVec<[(AudioCue, f32); 4]>) {
        let mut cues = SmallVec::new();
        let Some(set) = pieces else {
            return (0, cues);
        };
        if !self.whooshed {
            self.whooshed = true;
            cues.push((AudioCue::Whoosh, WHOOSH_VOLUME));
        }
        let mut newly = 0;
        for p in set.pieces() {
            if timeline.progress(p.assembly_order, elapsed) >= 1.0 && self.snapped.insert(p.id) {
                newly += 1;
            }
        }
        if newly > 0 {
            cues.push((AudioCue::Snap, SNAP_VOLUME));
        }
        if exploded && !self.boomed {
            self.boomed = true;
            cues.push((AudioCue::Boom, BOOM_VOLUME));
        }
        if finale.outro_elapsed().is_some() && !self.chimed {
            self.chimed = true;
            cues.push((AudioCue::Chime, CHIME_VOLUME));
        }
        (newly, cues)
    }

    /// Re-seed after a backward seek: pieces complete at `elapsed` count as already snapped.
    fn rewind(&mut self, pieces: Option<&PieceSet>, timeline: &AssemblyTimeline, elapsed: f64) {
        let finale = FinaleState::at(elapsed, timeline.total_ms);
        *self = Self {
            whooshed: pieces.is_some() && elapsed > 0.0,
            boomed: finale.explosion_due(),
            chimed: finale.outro_elapsed().is_some(),
            snapped: pieces
                .map(|set| {
                    set.pieces()
                        .iter()
                        .filter(|p| timeline.progress(p.assembly_order, elapsed) >= 1.0)
                        .map(|p| p.id)
                        .collect()
                })
                .unwrap_or_default(),
        };
    }
}

/// Callback fired once when a playback reaches [`FinalePhase::Finished`].
pub type FinishedCallback = Box<dyn FnMut() + Send>;

/// One reveal from image load to finished video.
pub struct RevealSession {
    config: RevealConfig,
    image: Option<SourceImage>,
    pieces: Option<PieceSet>,
    generation: u64,
    next_piece_id: u32,
    compositor: FrameCompositor,
    physics: PhysicsBridge,
    audio: Box<dyn AudioCues>,
    narrative: NarrativeContent,
    cues: CueState,
    on_finished: Option<FinishedCallback>,
    finished_fired: bool,
    last_elapsed: Option<f64>,
}

impl std::fmt::Debug for RevealSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevealSession")
            .field("generation", &self.generation)
            .field("has_image", &self.image.is_some())
            .field("pieces", &self.pieces.as_ref().map(PieceSet::len))
            .field("physics", &self.physics)
            .field("finished_fired", &self.finished_fired)
            .finish()
    }
}

impl RevealSession {
    /// Session with injected physics and audio.
    pub fn new(
        config: RevealConfig,
        physics: PhysicsBridge,
        audio: Box<dyn AudioCues>,
    ) -> RevealResult<Self> {
        config.validate()?;
        let text = TextRenderer::discover(config.font_path.as_deref());
        let outro = OutroRenderer::new(config.branding.clone());
        let compositor = FrameCompositor::new(config.canvas()?, text, outro, config.seed)?;
        let narrative = config.narrative();
        Ok(Self {
            config,
            image: None,
            pieces: None,
            generation: 0,
            next_piece_id: 0,
            compositor,
            physics,
            audio,
            narrative,
            cues: CueState::default(),
            on_finished: None,
            finished_fired: false,
            last_elapsed: None,
        })
    }

    /// Session with a rapier world and no audio.
    pub fn with_defaults(config: RevealConfig) -> RevealResult<Self> {
        let seed = config.seed;
        Self::new(config, PhysicsBridge::with_rapier(seed), Box::new(SilentAudio))
    }

    /// Active configuration.
    pub fn config(&self) -> &RevealConfig {
        &self.config
    }

    /// Current image.
    pub fn image(&self) -> Option<&SourceImage> {
        self.image.as_ref()
    }

    /// Installed pieces.
    pub fn pieces(&self) -> Option<&PieceSet> {
        self.pieces.as_ref()
    }

    /// Whether a piece set is installed.
    pub fn is_ready(&self) -> bool {
        self.pieces.is_some()
    }

    /// Physics state.
    pub fn physics(&self) -> &PhysicsBridge {
        &self.physics
    }

    /// Compositor and its caches.
    pub fn compositor(&self) -> &FrameCompositor {
        &self.compositor
    }

    /// Replace the caption source.
    pub fn set_narrative(&mut self, narrative: NarrativeContent) {
        self.narrative = narrative;
    }

    /// Register the callback fired when the finale finishes.
    pub fn set_on_finished(&mut self, cb: impl FnMut() + Send + 'static) {
        self.on_finished = Some(Box::new(cb));
    }

    /// Assembly schedule for the installed pieces.
    pub fn timeline(&self) -> AssemblyTimeline {
        self.config
            .timeline(self.pieces.as_ref().map_or(0, PieceSet::len))
    }

    /// Assembly plus the whole finale, in ms.
    pub fn duration_ms(&self) -> f64 {
        self.config.total_duration_ms + FINISH_MS
    }

    /// Replace the image. Pieces, trails, physics and caches from the old one are dropped.
    pub fn load_image(&mut self, image: SourceImage) {
        self.generation += 1;
        tracing::debug!(generation = self.generation, token = ?image.token(), "image loaded");
        self.image = Some(image);
        self.pieces = None;
        self.reset_playback();
    }

    /// Ticket for a build of the current image.
    pub fn begin_build(&self) -> RevealResult<BuildTicket> {
        let image = self
            .image
            .as_ref()
            .ok_or_else(|| RevealError::validation("no image loaded"))?;
        Ok(BuildTicket {
            token: image.token(),
            generation: self.generation,
            id_base: self.next_piece_id,
        })
    }

    /// Install a finished build, unless a newer image or another install superseded it.
    ///
    /// Piece ids are never reused within a session: each install moves the next free id past
    /// the installed set.
    pub fn install(&mut self, ticket: BuildTicket, set: PieceSet) -> RevealResult<()> {
        let current = self.begin_build()?;
        if ticket != current || set.token() != current.token {
            tracing::warn!(
                ticket_generation = ticket.generation,
                current_generation = current.generation,
                "discarding stale piece build"
            );
            return Err(RevealError::validation("piece build is stale"));
        }
        if set.pieces().iter().any(|p| p.id < ticket.id_base) {
            return Err(RevealError::validation(format!(
                "piece build reuses ids below {}",
                ticket.id_base
            )));
        }
        self.next_piece_id = set
            .pieces()
            .iter()
            .map(|p| p.id.saturating_add(1))
            .max()
            .unwrap_or(ticket.id_base);
        tracing::debug!(
            pieces = set.len(),
            renderable = set.renderable_count(),
            "piece set installed"
        );
        self.pieces = Some(set);
        self.reset_playback();
        Ok(())
    }

    /// Build and install pieces for the current image on this thread.
    pub fn build_pieces(&mut self, progress: &mut dyn FnMut(f32)) -> RevealResult<()> {
        let ticket = self.begin_build()?;
        let image = self
            .image
            .clone()
            .ok_or_else(|| RevealError::validation("no image loaded"))?;
        let opts = BuildOpts {
            id_base: ticket.id_base,
            ..self.config.build_opts()
        };
        let set = PieceBuilder::new().build(&image, &opts, progress)?;
        self.install(ticket, set)
    }

    fn reset_playback(&mut self) {
        self.compositor.reset();
        self.physics.reset();
        self.cues = CueState::default();
        self.finished_fired = false;
        self.last_elapsed = None;
    }

    /// Render the frame at `elapsed_ms`. Never fails.
    ///
    /// Rendering earlier than the previous frame is treated as a seek: physics is rewound and
    /// cues already passed are not replayed.
    pub fn render_at(&mut self, elapsed_ms: f64) -> FrameReport {
        let elapsed = if elapsed_ms.is_finite() {
            elapsed_ms.max(0.0)
        } else {
            0.0
        };
        let timeline = self.timeline();
        let finale = FinaleState::at(elapsed, timeline.total_ms);

        let dt = match self.last_elapsed {
            Some(last) if elapsed < last => {
                self.physics.reset();
                self.cues.rewind(self.pieces.as_ref(), &timeline, elapsed);
                0.0
            }
            Some(last) => (elapsed - last).min(MAX_FRAME_STEP_MS),
            None => 0.0,
        };
        self.last_elapsed = Some(elapsed);

        let mut exploded = 0;
        if finale.explosion_due()
            && !self.physics.is_activated()
            && let Some(set) = self.pieces.as_ref()
        {
            exploded = self.physics.activate(
                set.pieces()
                    .iter()
                    .filter(|p| p.is_renderable() && timeline.progress(p.assembly_order, elapsed) >= 1.0),
            );
        } else {
            self.physics.advance(dt);
        }

        self.audio.set_position_ms(elapsed);
        let (newly_snapped, cues) = self.cues.advance(
            self.pieces.as_ref(),
            &timeline,
            &finale,
            elapsed,
            exploded > 0,
        );
        for (cue, volume) in cues {
            self.audio.play(cue, volume);
        }

        let poses: Option<HashMap<u32, BodyPose>> =
            (self.physics.body_count() > 0).then(|| self.physics.read_positions());
        let stats = self.compositor.render_frame(&FrameInputs {
            image: self.image.as_ref(),
            pieces: self.pieces.as_ref(),
            elapsed_ms: elapsed,
            timeline,
            profile: self.config.motion,
            physics: poses.as_ref(),
            narrative: Some(&self.narrative),
        });

        let mut finished = false;
        if finale.phase == FinalePhase::Finished && !self.finished_fired {
            self.finished_fired = true;
            finished = true;
            tracing::debug!(elapsed, "reveal finished");
            if let Some(cb) = self.on_finished.as_mut() {
                cb();
            }
        }

        FrameReport {
            elapsed_ms: elapsed,
            phase: finale.phase,
            stats,
            newly_snapped,
            exploded,
            finished,
        }
    }

    /// Copy of the last rendered frame.
    pub fn frame(&self) -> FrameRgba {
        self.compositor.frame()
    }

    /// Feed every cue of a full playback at the configured fps into `audio`, without drawing.
    ///
    /// Lets an offline mixer prepare the soundtrack before the encoder starts.
    pub fn record_cues(&self, audio: &mut dyn AudioCues) -> RevealResult<()> {
        let fps = self.config.frame_rate()?;
        let timeline = self.timeline();
        let explodes = self.physics.is_available()
            && self.pieces.as_ref().is_some_and(|s| {
                (s.renderable_count() as f64 * EXPLOSION_PARTICIPATION_RATIO).floor() >= 1.0
            });
        let mut cues = CueState::default();
        let frames = fps.frames_for_ms(self.duration_ms()) + 1;
        for f in 0..frames {
            let t = fps.frame_to_ms(FrameIndex(f));
            let finale = FinaleState::at(t, timeline.total_ms);
            let boom = explodes && finale.explosion_due();
            let (_, list) = cues.advance(self.pieces.as_ref(), &timeline, &finale, t, boom);
            audio.set_position_ms(t);
            for (cue, volume) in list {
                audio.play(cue, volume);
            }
        }
        Ok(())
    }

    /// Render the whole reveal at the configured fps into `sink` on a recorder thread.
    ///
    /// `audio` overrides the injected capability's output. Waits up to `ready_timeout` for the
    /// sink before the first frame and proceeds with a warning when it is slow.
    #[tracing::instrument(skip(self, sink, audio))]
    pub fn render_video<S: FrameSink + 'static>(
        &mut self,
        sink: S,
        audio: Option<AudioInputConfig>,
        ready_timeout: Duration,
    ) -> RevealResult<Recording<S>> {
        if self.pieces.is_none() {
            return Err(RevealError::validation("no piece set installed"));
        }
        let fps = self.config.frame_rate()?;
        let canvas = self.compositor.canvas();
        let cfg = SinkConfig {
            width: canvas.width,
            height: canvas.height,
            fps,
            audio: audio.or_else(|| self.audio.output()),
        };

        let mut recorder = Recorder::start(sink, cfg, RECORDER_CHANNEL_CAPACITY)?;
        recorder.wait_ready(ready_timeout)?;

        self.reset_playback();
        let frames = fps.frames_for_ms(self.duration_ms()) + 1;
        for f in 0..frames {
            let report = self.render_at(fps.frame_to_ms(FrameIndex(f)));
            recorder.push_frame(self.compositor.frame())?;
            if report.finished {
                break;
            }
        }
        recorder.stop()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/playback.rs"]
mod tests;
