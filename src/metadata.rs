//! Display metadata extraction from downloaded audio files.

use audiotags::Tag;
use std::path::Path;

#[derive(Clone, Debug, PartialEq)]
pub struct TrackTags {
    pub title: String,
    pub artist: String,
    /// Whole seconds; 0 when unknown.
    pub duration: u32,
}

/// Read title/artist/duration from `path`, falling back to filename-derived
/// values when tags are missing or the file cannot be parsed at all.
pub fn read(path: &Path) -> TrackTags {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    match Tag::new().read_from_path(path) {
        Ok(tag) => {
            let duration = tag
                .duration()
                .filter(|d| *d > 0.0)
                .map(|d| d.floor() as u32)
                .unwrap_or(0);
            let (title, artist) = resolve(
                tag.title().map(String::from),
                tag.artist().map(String::from),
                tag.album_artist().map(String::from),
                &stem,
            );
            TrackTags {
                title,
                artist,
                duration,
            }
        }
        Err(_) => {
            let (title, artist) = resolve(None, None, None, &stem);
            TrackTags {
                title,
                artist,
                duration: 0,
            }
        }
    }
}

/// Resolve display title and artist from tag values and the filename stem.
///
/// Artist fallback order: artist tag, album-artist tag, the left half of an
/// `Artist - Title` filename, then "Unknown Artist". When the artist comes
/// from the filename split and no title tag exists, the right half becomes
/// the title; otherwise a missing title falls back to the whole stem.
fn resolve(
    title: Option<String>,
    artist: Option<String>,
    album_artist: Option<String>,
    stem: &str,
) -> (String, String) {
    let mut title = title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
    let mut artist = artist
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .or_else(|| {
            album_artist
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
        });

    if artist.is_none() {
        let basis = title.clone().unwrap_or_else(|| String::from(stem));
        if let Some((left, right)) = basis.split_once(" - ") {
            if !left.trim().is_empty() {
                artist = Some(left.trim().to_string());
                if title.is_none() {
                    title = Some(right.trim().to_string());
                }
            }
        }
    }

    (
        title.unwrap_or_else(|| String::from(stem)),
        artist.unwrap_or_else(|| String::from("Unknown Artist")),
    )
}
