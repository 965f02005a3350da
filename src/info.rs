//! Informational functions.

use crate::archive::Archive;
use crate::store;
use crate::types;
use crate::Config;
use std::fs;
use std::path::PathBuf;

/// Show the profile's files and what they contain.
pub fn show(config: &Config) -> types::UnitResult {
    let profile_path = config.profile_path.clone().unwrap();
    if fs::metadata(&profile_path).is_err() {
        return Err(format!("Profile not found: {}", profile_path.display()).into());
    }

    println!("PROFILE: {}", config.profile.clone().unwrap());

    let conf_path = config.conf_path.clone().unwrap();
    if fs::metadata(&conf_path).is_ok() {
        println!("  liker.conf [OK]");
    } else {
        println!("  liker.conf [NOT FOUND]");
    }

    let csv_path = config.csv_path.clone().unwrap();
    match store::load(&csv_path) {
        Ok(records) if fs::metadata(&csv_path).is_ok() => {
            println!("  liked_tracks.csv [OK] ({} links)", records.len());
        }
        Ok(_) => println!("  liked_tracks.csv [NOT FOUND]"),
        Err(e) => println!("  liked_tracks.csv [UNREADABLE: {}]", e),
    }

    let archive = Archive::load(&config.archive_path.clone().unwrap());
    println!("  downloaded.txt: {} archived ids", archive.len());

    let downloads = config.downloads_dir.clone().unwrap();
    let mp3s = crate::util::filepaths_in(&downloads)
        .map(|files| {
            files
                .iter()
                .filter(|p| {
                    p.extension()
                        .is_some_and(|e| e.to_string_lossy().to_lowercase() == "mp3")
                })
                .count()
        })
        .unwrap_or(0);
    println!("  downloads/: {} mp3 files", mp3s);

    Ok(())
}

/// Print the list of profiles discovered in the liker config directory.
pub fn list() -> types::UnitResult {
    let conf_path = PathBuf::from(dirs::config_dir().unwrap()).join("liker");
    let profiles = fs::read_dir(&conf_path);
    if profiles.is_err() {
        return Ok(()); // No need to fail when no profiles exist yet
    }

    profiles
        .unwrap()
        .map(|p| p.unwrap())
        .filter(|p| p.path().is_dir())
        .for_each(|p| println!("{}", p.file_name().to_str().unwrap()));

    Ok(())
}

pub fn help() {
    println!(
        "\
liker - collect, filter, and download liked tracks

COMMANDS
    help
        Show this help message

    list
        List all profiles

    show PROFILE
        Show information about the PROFILE

    collect PROFILE USERNAME [OPTIONS]
        Scrape the likes page of soundcloud.com/USERNAME and merge the
        found links into ~/.config/liker/PROFILE/liked_tracks.csv.
        Links already present keep their place; re-seen links take the
        freshly scraped title.

        OPTIONS
        -w SECS     Pause after each scroll (default 2.0)
        -n CHECKS   Consecutive unchanged-height checks that end the
                    scroll (default 3)
        -m MAX      Stop after MAX links (default 0 = unbounded)

    download PROFILE [OPTIONS]
        Download each stored link as mp3 via yt-dlp, skipping podcasts,
        mixes, live sets (keyword/duration filter) and anything already in
        the download archive. Afterwards, regenerate both playlists:
        web_player/playlist.json and liked_playlist.m3u.

        OPTIONS
        -s      Skip the download phase, only regenerate playlists

GENERAL OPTIONS
    The options from ~/.config/liker/PROFILE/liker.conf are loaded first.
    Setting a CLI option will override its value in the conf file.

    -v      Verbosely show what is being processed

CONF OPTIONS (option=value lines, '#' comments)
    verbose, scroll_wait, stability_checks, max_tracks, max_duration,
    keywords (comma-separated denylist), mp3_quality, embed_thumbnail,
    write_metadata, cleanup_thumbnails, sort_order (title/artist/none),
    include_duration

EXAMPLE
    liker collect mine some-user -m 200
    liker download mine
    liker download mine -s    # playlists only
"
    );
}
