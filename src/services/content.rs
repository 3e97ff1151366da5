use crate::foundation::error::{RevealError, RevealResult};

/// Attempts made by [`generate_image_with_retry`] before giving up.
pub const IMAGE_RETRY_ATTEMPTS: u32 = 3;

/// Narrative overlay text: a hook, three buildup beats, a climax and the reveal.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StoryArc {
    /// Opening question.
    pub hook: String,
    /// Buildup beats, normally three.
    pub buildup: Vec<String>,
    /// Tension peak.
    pub climax: String,
    /// Final answer.
    pub reveal: String,
}

impl StoryArc {
    /// Generic arc used when story generation fails.
    pub fn fallback(topic: &str) -> Self {
        let topic = match topic.trim() {
            "" => "this picture",
            t => t,
        };
        Self {
            hook: format!("Can you guess what {topic} is hiding?"),
            buildup: vec![
                "Piece by piece, the shapes start to make sense.".to_owned(),
                "Look at the colors. Do you see it yet?".to_owned(),
                "Only a few pieces left now.".to_owned(),
            ],
            climax: "Here it comes...".to_owned(),
            reveal: format!("Behold: {topic}."),
        }
    }
}

/// Result of an image generation request.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GeneratedImage {
    /// Where the image can be fetched.
    pub url: String,
}

/// Background music suggestion.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MusicTrack {
    /// Track title.
    pub title: String,
    /// Playable location.
    pub url: String,
    /// Catalogue the track came from.
    pub source: String,
}

/// AI content generation, consumed as opaque calls.
pub trait ContentService {
    /// Synthesize an image for a style and subject prompt.
    fn generate_image(&self, style: &str, subject: &str) -> RevealResult<GeneratedImage>;

    /// Write a story arc about `topic` through `lens`.
    fn generate_story_arc(&self, topic: &str, lens: &str) -> RevealResult<StoryArc>;

    /// Look up a track for `mood`; `Ok(None)` means nothing matched.
    fn find_music_track(&self, mood: &str, topic: &str) -> RevealResult<Option<MusicTrack>>;
}

/// Generate an image, retrying up to [`IMAGE_RETRY_ATTEMPTS`] times.
///
/// The last failure is surfaced as [`RevealError::Service`].
#[tracing::instrument(skip(service))]
pub fn generate_image_with_retry(
    service: &dyn ContentService,
    style: &str,
    subject: &str,
) -> RevealResult<GeneratedImage> {
    let mut last = None;
    for attempt in 1..=IMAGE_RETRY_ATTEMPTS {
        match service.generate_image(style, subject) {
            Ok(img) => return Ok(img),
            Err(e) => {
                tracing::warn!(attempt, error = %e, "image generation failed");
                last = Some(e);
            }
        }
    }
    Err(RevealError::service(match last {
        Some(e) => format!("image generation failed after {IMAGE_RETRY_ATTEMPTS} attempts: {e}"),
        None => "image generation was not attempted".to_owned(),
    }))
}

/// Story arc for `topic`, or [`StoryArc::fallback`] when the service fails.
pub fn story_arc_or_fallback(service: &dyn ContentService, topic: &str, lens: &str) -> StoryArc {
    match service.generate_story_arc(topic, lens) {
        Ok(arc) if arc.buildup.len() >= 3 => arc,
        Ok(_) => {
            tracing::warn!(topic, "story arc is missing buildup beats, using fallback");
            StoryArc::fallback(topic)
        }
        Err(e) => {
            tracing::warn!(topic, error = %e, "story generation failed, using fallback");
            StoryArc::fallback(topic)
        }
    }
}

/// Music for `mood`, with service errors treated like "nothing found".
pub fn find_music_or_none(
    service: &dyn ContentService,
    mood: &str,
    topic: &str,
) -> Option<MusicTrack> {
    service
        .find_music_track(mood, topic)
        .unwrap_or_else(|e| {
            tracing::warn!(mood, error = %e, "music lookup failed");
            None
        })
}

#[cfg(test)]
#[path = "../../tests/unit/services/content.rs"]
mod tests;
