//! JSON-facing reveal configuration.
//!
//! Every field has a default, so `{}` is a valid config. [`RevealConfig::validate`] runs before a
//! session is created.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::animation::motion::MotionProfile;
use crate::animation::timeline::{AssemblyTimeline, PIECE_ANIM_MS};
use crate::encode::export::VideoMetadata;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{RevealError, RevealResult};
use crate::geometry::shape::PieceShape;
use crate::pieces::builder::{BuildOpts, MAX_PIECES};
use crate::raster::material::Material;
use crate::render::narrative::NarrativeContent;
use crate::render::outro::ChannelBranding;
use crate::services::content::StoryArc;

/// Largest render scale; 2.0 is a 2160x4560 frame.
pub const MAX_SCALE: f64 = 2.0;

/// Everything a reveal needs besides the image.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RevealConfig {
    /// Requested number of pieces.
    pub piece_count: u32,
    /// Cut style.
    pub shape: PieceShape,
    /// Surface texture.
    pub material: Material,
    /// Kinetic style of every piece.
    pub motion: MotionProfile,
    /// Assembly window in ms; the finale follows it.
    pub total_duration_ms: f64,
    /// Flight time of one piece in ms.
    pub piece_anim_ms: f64,
    /// Output frames per second.
    pub fps: u32,
    /// Output pixels per virtual unit.
    pub scale: f64,
    /// RNG seed.
    pub seed: u64,
    /// Font for captions and the outro; system fonts are searched when unset.
    pub font_path: Option<PathBuf>,
    /// Outro card identity.
    pub branding: ChannelBranding,
    /// Subject of the picture, for fallback captions.
    pub topic: String,
    /// Story arc shown during assembly.
    pub story: Option<StoryArc>,
    /// Fact snippets shown when there is no story.
    pub facts: Vec<String>,
    /// Video title.
    pub title: String,
    /// Video description.
    pub description: String,
    /// Hashtags.
    pub tags: Vec<String>,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            piece_count: 500,
            shape: PieceShape::default(),
            material: Material::default(),
            motion: MotionProfile::default(),
            total_duration_ms: 60_000.0,
            piece_anim_ms: PIECE_ANIM_MS,
            fps: 30,
            scale: 0.5,
            seed: 0,
            font_path: None,
            branding: ChannelBranding::default(),
            topic: String::new(),
            story: None,
            facts: Vec::new(),
            title: "Puzzle Reveal".to_owned(),
            description: String::new(),
            tags: vec!["puzzle".to_owned(), "satisfying".to_owned()],
        }
    }
}

impl RevealConfig {
    /// Parse a config from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> RevealResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| RevealError::validation(format!("parse reveal config JSON: {e}")))
    }

    /// Parse a config from a JSON string.
    pub fn from_json_str(s: &str) -> RevealResult<Self> {
        Self::from_reader(s.as_bytes())
    }

    /// Parse a config from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> RevealResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            RevealError::validation(format!("open reveal config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Reject values no session can run with.
    pub fn validate(&self) -> RevealResult<()> {
        if self.piece_count == 0 || self.piece_count > MAX_PIECES {
            return Err(RevealError::validation(format!(
                "piece_count must be in 1..={MAX_PIECES}, got {}",
                self.piece_count
            )));
        }
        if !self.piece_anim_ms.is_finite() || self.piece_anim_ms <= 0.0 {
            return Err(RevealError::validation("piece_anim_ms must be > 0"));
        }
        if !self.total_duration_ms.is_finite() || self.total_duration_ms <= 0.0 {
            return Err(RevealError::validation("total_duration_ms must be > 0"));
        }
        if self.total_duration_ms < self.piece_anim_ms {
            return Err(RevealError::validation(format!(
                "total_duration_ms ({}) is shorter than one piece animation ({})",
                self.total_duration_ms, self.piece_anim_ms
            )));
        }
        if self.fps == 0 {
            return Err(RevealError::validation("fps must be > 0"));
        }
        if !self.scale.is_finite() || self.scale <= 0.0 || self.scale > MAX_SCALE {
            return Err(RevealError::validation(format!(
                "scale must be in (0, {MAX_SCALE}], got {}",
                self.scale
            )));
        }
        Ok(())
    }

    /// Piece build parameters.
    pub fn build_opts(&self) -> BuildOpts {
        BuildOpts {
            piece_count: self.piece_count,
            shape: self.shape,
            material: self.material,
            scale: self.scale,
            seed: self.seed,
            id_base: 0,
        }
    }

    /// Output frame rate.
    pub fn frame_rate(&self) -> RevealResult<Fps> {
        Fps::new(self.fps, 1)
    }

    /// Output frame size.
    pub fn canvas(&self) -> RevealResult<Canvas> {
        Canvas::for_scale(self.scale)
    }

    /// Stagger schedule for `piece_count` built pieces.
    pub fn timeline(&self, piece_count: usize) -> AssemblyTimeline {
        AssemblyTimeline::new(self.total_duration_ms, self.piece_anim_ms, piece_count)
    }

    /// Caption source.
    pub fn narrative(&self) -> NarrativeContent {
        NarrativeContent {
            story: self.story.clone(),
            facts: self.facts.clone(),
        }
    }

    /// Metadata file contents, with render facts appended.
    pub fn metadata(&self, rendered_pieces: usize) -> VideoMetadata {
        VideoMetadata {
            title: self.title.clone(),
            description: self.description.clone(),
            tags: self.tags.clone(),
            facts: vec![
                ("pieces".to_owned(), rendered_pieces.to_string()),
                ("shape".to_owned(), self.shape.name().to_owned()),
                ("material".to_owned(), self.material.name().to_owned()),
                ("motion".to_owned(), self.motion.name().to_owned()),
                ("seed".to_owned(), self.seed.to_string()),
            ],
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
