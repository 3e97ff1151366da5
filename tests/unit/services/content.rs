use std::cell::Cell;

use super::*;

#[derive(Default)]
struct Flaky {
    image_failures: u32,
    image_calls: Cell<u32>,
    story: Option<StoryArc>,
    music: Option<RevealResult<Option<MusicTrack>>>,
}

impl ContentService for Flaky {
    fn generate_image(&self, _style: &str, subject: &str) -> RevealResult<GeneratedImage> {
        let n = self.image_calls.get() + 1;
        self.image_calls.set(n);
        if n <= self.image_failures {
            return Err(RevealError::service(format!("attempt {n} timed out")));
        }
        Ok(GeneratedImage {
            url: format!("https://img.invalid/{subject}.png"),
        })
    }

    fn generate_story_arc(&self, _topic: &str, _lens: &str) -> RevealResult<StoryArc> {
        self.story
            .clone()
            .ok_or_else(|| RevealError::service("story backend down"))
    }

    fn find_music_track(&self, _mood: &str, _topic: &str) -> RevealResult<Option<MusicTrack>> {
        match &self.music {
            Some(Ok(t)) => Ok(t.clone()),
            Some(Err(_)) => Err(RevealError::service("music backend down")),
            None => Ok(None),
        }
    }
}

#[test]
fn image_retry_recovers_from_transient_failures() {
    let svc = Flaky {
        image_failures: 2,
        ..Flaky::default()
    };
    let img = generate_image_with_retry(&svc, "oil", "owl").unwrap();
    assert_eq!(img.url, "https://img.invalid/owl.png");
    assert_eq!(svc.image_calls.get(), 3);
}

#[test]
fn image_retry_surfaces_last_error() {
    let svc = Flaky {
        image_failures: 10,
        ..Flaky::default()
    };
    let err = generate_image_with_retry(&svc, "oil", "owl").unwrap_err();
    assert!(matches!(err, RevealError::Service(_)));
    assert!(err.to_string().contains("attempt 3"));
    assert_eq!(svc.image_calls.get(), IMAGE_RETRY_ATTEMPTS);
}

#[test]
fn story_failure_falls_back() {
    let svc = Flaky::default();
    let arc = story_arc_or_fallback(&svc, "the moon", "history");
    assert_eq!(arc, StoryArc::fallback("the moon"));
    assert_eq!(arc.buildup.len(), 3);
    assert!(arc.hook.contains("the moon"));
}

#[test]
fn short_story_falls_back() {
    let svc = Flaky {
        story: Some(StoryArc {
            hook: "h".into(),
            buildup: vec!["only one".into()],
            climax: "c".into(),
            reveal: "r".into(),
        }),
        ..Flaky::default()
    };
    assert_eq!(story_arc_or_fallback(&svc, "", "x"), StoryArc::fallback(""));
    assert!(StoryArc::fallback("  ").hook.contains("this picture"));
}

#[test]
fn generated_story_passes_through() {
    let arc = StoryArc::fallback("owls");
    let svc = Flaky {
        story: Some(StoryArc {
            reveal: "An owl!".into(),
            ..arc.clone()
        }),
        ..Flaky::default()
    };
    assert_eq!(story_arc_or_fallback(&svc, "owls", "x").reveal, "An owl!");
}

#[test]
fn music_errors_become_none() {
    let track = MusicTrack {
        title: "Calm".into(),
        url: "https://music.invalid/calm".into(),
        source: "library".into(),
    };
    let found = Flaky {
        music: Some(Ok(Some(track.clone()))),
        ..Flaky::default()
    };
    assert_eq!(find_music_or_none(&found, "calm", "sea"), Some(track));

    let broken = Flaky {
        music: Some(Err(RevealError::service("x"))),
        ..Flaky::default()
    };
    assert_eq!(find_music_or_none(&broken, "calm", "sea"), None);
    assert_eq!(find_music_or_none(&Flaky::default(), "calm", "sea"), None);
}

#[test]
fn story_arc_reads_from_json() {
    let arc: StoryArc = serde_json::from_str(
        r#"{"hook":"h","buildup":["a","b","c"],"climax":"c","reveal":"r"}"#,
    )
    .unwrap();
    assert_eq!(arc.buildup, vec!["a", "b", "c"]);
}
