//! Download every stored link and refresh the playlists.

use crate::classify::Classifier;
use crate::fetch::{self, YtDlp};
use crate::playlist;
use crate::progress::Console;
use crate::store;
use crate::types;
use crate::util;
use crate::Config;
use std::collections::HashSet;
use std::fs;

pub fn run(config: &Config) -> types::UnitResult {
    if !config.skip_download {
        download_links(config)?;
    } else {
        println!("Skipping downloads, only regenerating playlists");
    }

    refresh_playlists(config)
}

fn download_links(config: &Config) -> types::UnitResult {
    let csv_path = config.csv_path.clone().unwrap();
    if fs::metadata(&csv_path).is_err() {
        return Err(format!(
            "Link table not found: {}. Run 'collect' first. See 'help'",
            csv_path.display()
        )
        .into());
    }

    let records = store::load(&csv_path).map_err(|e| e.to_string())?;
    let links = unique_links(&records);
    if links.is_empty() {
        println!("Link table is empty, nothing to download");
        return Ok(());
    }
    println!("Found {} unique links", links.len());

    let classifier = Classifier::new(config.keywords.clone(), config.max_duration);
    // Backend init failure aborts the whole run; per-link failures do not.
    let mut backend = YtDlp::new(
        config.downloads_dir.clone().unwrap(),
        config.archive_path.clone().unwrap(),
        classifier,
        config.mp3_quality.clone(),
        config.embed_thumbnail,
        config.write_metadata,
        config.verbose,
    )?;
    let mut observer = Console {
        verbose: config.verbose,
    };

    let (resolved, tally) = fetch::fetch_all(&mut backend, &links, &mut observer);
    fetch::report(&tally);
    println!("  resolved files: {}", resolved.len());

    if config.cleanup_thumbnails {
        cleanup_thumbnails(config)?;
    }

    Ok(())
}

/// Preserve input order while dropping duplicate links.
fn unique_links(records: &[store::LinkRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|r| seen.insert(r.link.clone()))
        .map(|r| r.link.clone())
        .collect()
}

/// Remove leftover thumbnail images once they are embedded in the mp3s.
/// Off by default: the web player uses them as covers.
fn cleanup_thumbnails(config: &Config) -> types::UnitResult {
    let downloads = config.downloads_dir.clone().unwrap();
    let mut removed = 0;
    for path in util::filepaths_in(&downloads)? {
        let is_image = path.extension().is_some_and(|e| {
            matches!(
                e.to_string_lossy().to_lowercase().as_str(),
                "jpg" | "jpeg" | "png" | "webp"
            )
        });
        if is_image && fs::remove_file(&path).is_ok() {
            removed += 1;
        }
    }
    if removed > 0 {
        println!("Removed {} thumbnail files", removed);
    }
    Ok(())
}

fn refresh_playlists(config: &Config) -> types::UnitResult {
    let downloads = util::guarantee_dir_path(config.downloads_dir.clone().unwrap())?;
    let entries = playlist::scan(&downloads)?;

    playlist::write_json(
        &config.playlist_json_path.clone().unwrap(),
        &entries,
        &config.sort_order,
        config.include_duration,
    )?;
    playlist::write_m3u(&config.playlist_m3u_path.clone().unwrap(), &entries)
}
