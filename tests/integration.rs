mod common;

use common::*;
use liker::store::{self, LinkRecord};

#[test]
fn shows_help() {
    run(setup(vec!["help"]).unwrap()).unwrap();
}

#[test]
fn shows_list() {
    run(setup(vec!["list"]).unwrap()).unwrap();
}

#[test]
fn fails_without_command() {
    assert!(setup(vec![]).is_err());
}

#[test]
fn fails_on_unrecognized_command() {
    assert!(setup(vec!["frobnicate"]).is_err());
}

#[test]
fn fails_without_profile() {
    for cmd in ["show", "collect", "download"] {
        assert!(setup(vec![cmd]).is_err());
    }
}

#[test]
fn collect_fails_without_username() {
    assert!(setup(vec!["collect", "lk-test-no-user"]).is_err());
    assert!(setup(vec!["collect", "lk-test-no-user", "  "]).is_err());
}

#[test]
fn show_fails_with_non_existing_profile() {
    assert!(run(setup(vec!["show", "lk-test-unexist"]).unwrap()).is_err());
}

#[test]
fn shows_profile() {
    let profile = create_profile("lk-test-show");
    run(setup(vec!["show", "lk-test-show"]).unwrap()).unwrap();
    destroy(profile);
}

#[test]
fn conf_options_override_defaults() {
    let profile = create_profile("lk-test-conf");
    write(
        profile.join("liker.conf"),
        String::from(
            "# comment\n\
             verbose=true\n\
             scroll_wait=4.5\n\
             stability_checks=5\n\
             max_tracks=100\n\
             max_duration=600\n\
             mp3_quality=320\n\
             embed_thumbnail=false\n\
             sort_order=artist\n\
             include_duration=false\n",
        ),
    );

    let config = setup(vec!["download", "lk-test-conf"]).unwrap();
    assert!(config.verbose);
    assert_eq!(config.scroll_wait, 4.5);
    assert_eq!(config.stability_checks, 5);
    assert_eq!(config.max_tracks, 100);
    assert_eq!(config.max_duration, Some(600.0));
    assert_eq!(config.mp3_quality, "320");
    assert!(!config.embed_thumbnail);
    assert_eq!(config.sort_order, "artist");
    assert!(!config.include_duration);

    destroy(profile);
}

#[test]
fn cli_options_override_conf() {
    let profile = create_profile("lk-test-cli");
    write(
        profile.join("liker.conf"),
        String::from("max_tracks=100\nscroll_wait=4\n"),
    );

    let config = setup(vec![
        "collect",
        "lk-test-cli",
        "someone",
        "-v",
        "-m",
        "50",
        "-w",
        "1.5",
        "-n",
        "6",
    ])
    .unwrap();
    assert!(config.verbose);
    assert_eq!(config.max_tracks, 50);
    assert_eq!(config.scroll_wait, 1.5);
    assert_eq!(config.stability_checks, 6);
    assert_eq!(config.username.as_deref(), Some("someone"));

    destroy(profile);
}

#[test]
fn zero_max_duration_disables_the_duration_rule() {
    let profile = create_profile("lk-test-nodur");
    write(profile.join("liker.conf"), String::from("max_duration=0\n"));
    let config = setup(vec!["download", "lk-test-nodur"]).unwrap();
    assert_eq!(config.max_duration, None);
    destroy(profile);
}

#[test]
fn fails_on_invalid_conf() {
    let profile = create_profile("lk-test-badconf");

    write(profile.join("liker.conf"), String::from("not a valid line\n"));
    assert!(setup(vec!["download", "lk-test-badconf"]).is_err());

    write(profile.join("liker.conf"), String::from("no_such_option=1\n"));
    assert!(setup(vec!["download", "lk-test-badconf"]).is_err());

    write(profile.join("liker.conf"), String::from("sort_order=upside-down\n"));
    assert!(setup(vec!["download", "lk-test-badconf"]).is_err());

    destroy(profile);
}

#[test]
fn fails_on_unknown_cli_option() {
    assert!(setup(vec!["download", "lk-test-x", "-q"]).is_err());
    // collect-only options are invalid for download
    assert!(setup(vec!["download", "lk-test-x", "-m", "5"]).is_err());
}

#[test]
fn download_fails_without_link_table() {
    let profile = create_profile("lk-test-dl-notable");
    assert!(run(setup(vec!["download", "lk-test-dl-notable"]).unwrap()).is_err());
    destroy(profile);
}

#[test]
fn link_table_round_trips_through_disk() {
    let profile = create_profile("lk-test-store");
    let csv = profile.join("liked_tracks.csv");

    let records = vec![
        LinkRecord::new("Plain Title", "https://x/1"),
        LinkRecord::new("With, comma", "https://x/2"),
        LinkRecord::new("With \"quotes\"", "https://x/3"),
    ];
    store::save(&csv, &records).unwrap();
    assert_eq!(store::load(&csv).unwrap(), records);

    // Merge against freshly scraped data and persist again.
    let fresh = vec![
        LinkRecord::new("Renamed", "https://x/2"),
        LinkRecord::new("Brand New", "https://x/4"),
    ];
    let (merged, added) = store::merge(&records, &fresh);
    assert_eq!(added, 1);
    store::save(&csv, &merged).unwrap();

    let reloaded = store::load(&csv).unwrap();
    assert_eq!(reloaded.len(), 4);
    assert_eq!(reloaded[1], LinkRecord::new("Renamed", "https://x/2"));

    destroy(profile);
}

#[test]
fn corrupt_link_table_is_a_read_fault() {
    let profile = create_profile("lk-test-corrupt");
    let csv = profile.join("liked_tracks.csv");

    write(csv.clone(), String::from("Title,Link\n\"unterminated,https://x/1\n"));
    assert!(store::load(&csv).is_err());

    write(csv.clone(), String::from("Something,Else\nA,https://x/1\n"));
    assert!(store::load(&csv).is_err());

    destroy(profile);
}

#[test]
fn missing_link_table_is_an_empty_prior() {
    let profile = create_profile("lk-test-missing");
    assert!(store::load(&profile.join("liked_tracks.csv"))
        .unwrap()
        .is_empty());
    destroy(profile);
}

#[test]
fn skip_download_only_regenerates_playlists() {
    let profile = create_profile("lk-test-skip");

    run(setup(vec!["download", "lk-test-skip", "-s"]).unwrap()).unwrap();

    // JSON is written even when empty; M3U is skipped.
    let json = read(profile.join("web_player").join("playlist.json"));
    let playlist: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(playlist["tracks"].as_array().unwrap().len(), 0);
    assert!(std::fs::metadata(profile.join("liked_playlist.m3u")).is_err());

    destroy(profile);
}
