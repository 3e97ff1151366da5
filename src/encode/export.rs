use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use image::ImageEncoder as _;

use crate::encode::ffmpeg::ensure_parent_dir;
use crate::foundation::error::{RevealError, RevealResult};
use crate::render::compositor::FrameRgba;

/// Longest sanitized title kept in file names.
pub const MAX_TITLE_CHARS: usize = 60;
/// Title used when sanitizing leaves nothing.
pub const FALLBACK_TITLE: &str = "puzzle-reveal";

/// Lowercase `title`, collapse everything but ASCII letters and digits to single dashes and
/// cap the length.
pub fn sanitize_title(title: &str) -> String {
    let mut out = String::with_capacity(title.len().min(MAX_TITLE_CHARS));
    let mut dash = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if dash && !out.is_empty() {
                out.push('-');
            }
            dash = false;
            out.push(c.to_ascii_lowercase());
        } else {
            dash = true;
        }
        if out.len() >= MAX_TITLE_CHARS {
            break;
        }
    }
    out.truncate(MAX_TITLE_CHARS);
    while out.ends_with('-') {
        out.pop();
    }
    if out.is_empty() {
        FALLBACK_TITLE.to_owned()
    } else {
        out
    }
}

/// File names of one export: `YYYY-MM-DD_<title>` plus a suffix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputNames {
    stem: String,
}

impl OutputNames {
    /// Names for `title` exported on `date`.
    pub fn new(date: chrono::NaiveDate, title: &str) -> Self {
        Self {
            stem: format!("{}_{}", date.format("%Y-%m-%d"), sanitize_title(title)),
        }
    }

    /// Names dated today, local time.
    pub fn today(title: &str) -> Self {
        Self::new(chrono::Local::now().date_naive(), title)
    }

    /// Shared prefix.
    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// Video file name with `extension`.
    pub fn video(&self, extension: &str) -> String {
        format!("{}.{extension}", self.stem)
    }

    /// Thumbnail file name.
    pub fn thumbnail(&self) -> String {
        format!("{}_thumbnail.jpg", self.stem)
    }

    /// Metadata text file name.
    pub fn metadata(&self) -> String {
        format!("{}_metadata.txt", self.stem)
    }

    /// Raw cue-track file name.
    pub fn audio(&self) -> String {
        format!("{}_audio.f32le", self.stem)
    }

    /// `name` inside `dir`.
    pub fn in_dir(dir: &Path, name: &str) -> PathBuf {
        dir.join(name)
    }
}

/// Text written next to the video.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct VideoMetadata {
    /// Video title.
    pub title: String,
    /// Description body.
    pub description: String,
    /// Hashtags without the leading `#`.
    pub tags: Vec<String>,
    /// Extra `key: value` lines describing the render.
    pub facts: Vec<(String, String)>,
}

impl VideoMetadata {
    /// Plain-text rendering.
    pub fn to_text(&self) -> String {
        let mut s = String::new();
        let _ = writeln!(s, "TITLE\n{}\n", self.title.trim());
        let _ = writeln!(s, "DESCRIPTION\n{}\n", self.description.trim());
        let tags: Vec<String> = self
            .tags
            .iter()
            .map(|t| t.trim().trim_start_matches('#'))
            .filter(|t| !t.is_empty())
            .map(|t| format!("#{t}"))
            .collect();
        let _ = writeln!(s, "TAGS\n{}", tags.join(" "));
        if !self.facts.is_empty() {
            let _ = writeln!(s, "\nRENDER");
            for (k, v) in &self.facts {
                let _ = writeln!(s, "{k}: {v}");
            }
        }
        s
    }
}

/// Encode `frame` as a JPEG at `path`.
pub fn write_thumbnail(frame: &FrameRgba, path: &Path, quality: u8) -> RevealResult<()> {
    let expected = (frame.width as usize) * (frame.height as usize) * 4;
    if frame.width == 0 || frame.height == 0 || frame.data.len() != expected {
        return Err(RevealError::validation("thumbnail frame has no pixels"));
    }
    ensure_parent_dir(path)?;
    let rgb: Vec<u8> = frame
        .to_opaque_rgba8()
        .chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();
    let file = std::fs::File::create(path)
        .with_context(|| format!("create thumbnail '{}'", path.display()))?;
    let enc = image::codecs::jpeg::JpegEncoder::new_with_quality(
        std::io::BufWriter::new(file),
        quality.clamp(1, 100),
    );
    enc.write_image(&rgb, frame.width, frame.height, image::ExtendedColorType::Rgb8)
        .with_context(|| format!("encode thumbnail '{}'", path.display()))?;
    Ok(())
}

/// Write `meta` as plain text at `path`.
pub fn write_metadata(meta: &VideoMetadata, path: &Path) -> RevealResult<()> {
    ensure_parent_dir(path)?;
    std::fs::write(path, meta.to_text())
        .with_context(|| format!("write metadata '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/export.rs"]
mod tests;
