//! Playlist generation over the resolved downloads directory.
//!
//! Two consumers: the bundled web player reads `playlist.json`, local
//! players read the M3U. Both reference audio and cover files through
//! paths relative to the playlist's own directory.

use crate::metadata::{self, TrackTags};
use crate::types;
use crate::util;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const COVER_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

#[derive(Clone, Debug, PartialEq)]
pub enum SortOrder {
    Title,
    Artist,
    None,
}

impl SortOrder {
    /// Check a configured sort order value, returning it unchanged.
    pub fn validate(s: &str) -> types::StringResult {
        match s {
            "title" | "artist" | "none" => Ok(String::from(s)),
            _ => Err(format!("Invalid sort_order: {} (title/artist/none)", s).into()),
        }
    }

    fn parse(s: &str) -> SortOrder {
        match s {
            "artist" => SortOrder::Artist,
            "none" => SortOrder::None,
            _ => SortOrder::Title,
        }
    }
}

/// One audio file found in the downloads directory.
pub struct TrackEntry {
    pub path: PathBuf,
    pub cover: Option<PathBuf>,
    pub tags: TrackTags,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaylistTrack {
    pub title: String,
    pub artist: String,
    pub src: String,
    pub cover: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

#[derive(Serialize, Deserialize)]
pub struct Playlist {
    pub tracks: Vec<PlaylistTrack>,
}

/// Scan `downloads_dir` for mp3 files (ignoring partial downloads),
/// reading tags and looking for a same-stem cover image. Entries come back
/// in filename order.
pub fn scan(downloads_dir: &Path) -> Result<Vec<TrackEntry>, Box<dyn std::error::Error>> {
    let mut paths: Vec<PathBuf> = util::filepaths_in(downloads_dir)?
        .into_iter()
        .filter(|p| {
            // yt-dlp partials carry a trailing .part, so they fail this too
            let name = p.file_name().map(|n| n.to_string_lossy().to_lowercase());
            name.as_ref().is_some_and(|n| n.ends_with(".mp3"))
        })
        .collect();
    paths.sort();

    Ok(paths
        .into_iter()
        .map(|path| {
            let cover = find_cover(&path);
            let tags = metadata::read(&path);
            TrackEntry { path, cover, tags }
        })
        .collect())
}

fn find_cover(mp3: &Path) -> Option<PathBuf> {
    COVER_EXTENSIONS
        .iter()
        .map(|ext| mp3.with_extension(ext))
        .find(|p| p.exists())
}

/// Turn scanned entries into playlist tracks with paths relative to
/// `playlist_dir`, sorted per `sort_order` (case-insensitive for title and
/// artist; "none" keeps the scan order).
pub fn build(
    entries: &[TrackEntry],
    playlist_dir: &Path,
    sort_order: &str,
    include_duration: bool,
) -> Vec<PlaylistTrack> {
    let mut tracks: Vec<PlaylistTrack> = entries
        .iter()
        .map(|entry| PlaylistTrack {
            title: entry.tags.title.clone(),
            artist: entry.tags.artist.clone(),
            src: util::relative_to(&entry.path, playlist_dir),
            cover: entry
                .cover
                .as_ref()
                .map(|c| util::relative_to(c, playlist_dir))
                .unwrap_or_default(),
            duration: if include_duration {
                Some(entry.tags.duration)
            } else {
                None
            },
        })
        .collect();

    match SortOrder::parse(sort_order) {
        SortOrder::Title => tracks.sort_by_key(|t| t.title.to_lowercase()),
        SortOrder::Artist => tracks.sort_by_key(|t| t.artist.to_lowercase()),
        SortOrder::None => {}
    }
    tracks
}

/// Write the web player's `playlist.json`. Written even when empty, so a
/// cleaned-out library empties the player too.
pub fn write_json(
    path: &Path,
    entries: &[TrackEntry],
    sort_order: &str,
    include_duration: bool,
) -> types::UnitResult {
    let playlist_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let tracks = build(entries, playlist_dir, sort_order, include_duration);
    let count = tracks.len();

    util::guarantee_dir_path(playlist_dir.to_path_buf())?;
    let json = serde_json::to_string_pretty(&Playlist { tracks })?;
    fs::write(path, json)?;
    println!("Playlist JSON saved: {} ({} tracks)", path.display(), count);
    Ok(())
}

/// Write the M3U playlist in filename order. Skipped when there is nothing
/// to reference.
pub fn write_m3u(path: &Path, entries: &[TrackEntry]) -> types::UnitResult {
    if entries.is_empty() {
        println!("No mp3 files found, M3U playlist not created");
        return Ok(());
    }

    let playlist_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut out = String::from("#EXTM3U\n");
    for entry in entries {
        out.push_str(&extinf(&entry.tags));
        out.push('\n');
        out.push_str(&util::relative_to(&entry.path, playlist_dir));
        out.push('\n');
    }

    util::guarantee_dir_path(playlist_dir.to_path_buf())?;
    fs::write(path, out)?;
    println!("M3U playlist saved: {} ({} tracks)", path.display(), entries.len());
    Ok(())
}

fn extinf(tags: &TrackTags) -> String {
    let duration = if tags.duration > 0 {
        tags.duration as i64
    } else {
        -1
    };
    format!("#EXTINF:{},{} - {}", duration, tags.artist, tags.title)
}
