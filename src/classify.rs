//! Track-or-not classification of fetched metadata.
//!
//! Likes pages mix actual tracks with podcasts, DJ mixes, and multi-hour
//! live sets. The classifier is a pure predicate over item metadata; it is
//! re-evaluated on every run since platform metadata can change.

/// Metadata of a candidate item, as reported by the fetch backend.
#[derive(Clone, Debug, Default)]
pub struct TrackMeta {
    pub id: String,
    pub extractor: String,
    pub title: String,
    pub description: String,
    pub uploader: String,
    /// Seconds; `None` when the platform did not report one.
    pub duration: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Verdict {
    Accept,
    Reject(String),
}

/// Default denylist, matched as substrings of title+description+uploader.
/// Substring (not word-boundary) matching is intended: it over-rejects on
/// embedded words, which is preferred over letting hour-long mixes through.
const KEYWORDS: [&str; 29] = [
    "podcast",
    "mix",
    "radio",
    "live",
    "set",
    "essential mix",
    "episode",
    "show",
    "ra.",
    "resident advisor",
    "boiler room",
    "b2b",
    "back to back",
    "dj set",
    "dj mix",
    "mixcloud",
    "soundcloud radio",
    "guest mix",
    "live set",
    "recorded at",
    "session",
    "liveset",
    "dj-set",
    "podcast episode",
    "tracklist",
    "full mix",
    "compilation",
    "full stream",
    "full album",
];

/// Default duration cap: anything longer than 15 minutes is not a track.
pub const MAX_TRACK_DURATION: f64 = 900.0;

pub fn default_keywords() -> Vec<String> {
    KEYWORDS.iter().map(|s| s.to_string()).collect()
}

pub struct Classifier {
    keywords: Vec<String>,
    max_duration: Option<f64>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(default_keywords(), Some(MAX_TRACK_DURATION))
    }
}

impl Classifier {
    /// `max_duration: None` disables the duration rule entirely.
    pub fn new(keywords: Vec<String>, max_duration: Option<f64>) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            max_duration,
        }
    }

    /// Decide whether `meta` describes a track worth downloading.
    ///
    /// Rules, first match wins:
    /// 1. any denylist keyword appears in the lower-cased
    ///    title+description+uploader text -> `Reject("keyword:<kw>")`
    /// 2. known duration exceeds the cap -> `Reject("duration>max")`
    /// 3. otherwise `Accept`
    ///
    /// A missing duration never rejects; there is nothing to reject on.
    pub fn classify(&self, meta: &TrackMeta) -> Verdict {
        let text = format!(
            "{} {} {}",
            meta.title.to_lowercase(),
            meta.description.to_lowercase(),
            meta.uploader.to_lowercase()
        );

        for keyword in &self.keywords {
            if text.contains(keyword.as_str()) {
                return Verdict::Reject(format!("keyword:{}", keyword));
            }
        }

        if let (Some(duration), Some(max)) = (meta.duration, self.max_duration) {
            if duration > max {
                return Verdict::Reject(String::from("duration>max"));
            }
        }

        Verdict::Accept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(title: &str, duration: Option<f64>) -> TrackMeta {
        TrackMeta {
            title: String::from(title),
            duration,
            ..Default::default()
        }
    }

    #[test]
    fn accepts_plain_track() {
        let c = Classifier::default();
        assert_eq!(c.classify(&meta("Artist - Song", Some(240.0))), Verdict::Accept);
    }

    #[test]
    fn rejects_on_keyword() {
        let c = Classifier::default();
        assert_eq!(
            c.classify(&meta("Artist - Essential Mix 2024", Some(3600.0))),
            Verdict::Reject(String::from("keyword:mix"))
        );
    }

    #[test]
    fn rejects_keyword_in_uploader() {
        let c = Classifier::default();
        let mut m = meta("Some Song", Some(180.0));
        m.uploader = String::from("Boiler Room");
        assert_eq!(
            c.classify(&m),
            Verdict::Reject(String::from("keyword:boiler room"))
        );
    }

    #[test]
    fn keyword_takes_precedence_over_duration() {
        // Short item with a banned keyword: the reason must be the keyword.
        let c = Classifier::default();
        assert_eq!(
            c.classify(&meta("Tiny Podcast Jingle", Some(30.0))),
            Verdict::Reject(String::from("keyword:podcast"))
        );
    }

    #[test]
    fn rejects_on_duration() {
        let c = Classifier::default();
        assert_eq!(
            c.classify(&meta("Artist - Song", Some(901.0))),
            Verdict::Reject(String::from("duration>max"))
        );
        assert_eq!(c.classify(&meta("Artist - Song", Some(900.0))), Verdict::Accept);
    }

    #[test]
    fn unknown_duration_never_rejects() {
        let c = Classifier::default();
        assert_eq!(c.classify(&meta("Artist - Song", None)), Verdict::Accept);

        let c = Classifier::new(vec![], Some(1.0));
        assert_eq!(c.classify(&meta("Anything at all", None)), Verdict::Accept);
    }

    #[test]
    fn substring_match_is_intended() {
        // "set" matches inside "sunset"; accepted behavior, not a bug.
        let c = Classifier::default();
        assert_eq!(
            c.classify(&meta("Sunset Drive", Some(200.0))),
            Verdict::Reject(String::from("keyword:set"))
        );
    }

    #[test]
    fn is_deterministic() {
        let c = Classifier::default();
        let m = meta("Artist - Live at the Warehouse", Some(5000.0));
        let first = c.classify(&m);
        for _ in 0..3 {
            assert_eq!(c.classify(&m), first);
        }
    }
}
