//! Per-link fetching through an external download backend.
//!
//! The orchestrator walks the links strictly in input order, one at a time;
//! a single link's failure never aborts the batch. The backend resolves
//! each link into exactly one [`FetchResult`] variant, so outcome handling
//! happens once, here, instead of being scattered over loosely-typed
//! metadata lookups.

use crate::archive::{self, Archive};
use crate::classify::{Classifier, TrackMeta, Verdict};
use crate::progress::{Observer, ProgressEvent};
use crate::util;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use url::Url;

#[derive(Clone, Debug, PartialEq)]
pub enum FetchErrorKind {
    /// The link does not parse as a URL.
    InvalidLink,
    /// Metadata lookup or the download itself failed (network, removed
    /// or private track).
    Fetch,
    /// The download ran but the expected audio file never appeared.
    PostProcess,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FetchResult {
    Downloaded { path: PathBuf, title: String },
    /// Archive hit. `path` is the pre-existing local file when it could be
    /// found; the archive claiming a file that is gone from disk is
    /// tolerated, not corrected.
    Archived { path: Option<PathBuf>, title: String },
    Filtered { reason: String },
    Error { kind: FetchErrorKind, detail: String },
}

pub trait FetchBackend {
    fn fetch(&mut self, link: &str) -> FetchResult;
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tally {
    pub success: usize,
    pub skipped: usize,
    pub error: usize,
}

/// Fetch every link in order, returning resolved local paths and tallies.
pub fn fetch_all(
    backend: &mut dyn FetchBackend,
    links: &[String],
    observer: &mut dyn Observer,
) -> (Vec<PathBuf>, Tally) {
    let mut resolved: Vec<PathBuf> = Vec::new();
    let mut tally = Tally::default();

    for (i, link) in links.iter().enumerate() {
        observer.notify(ProgressEvent::Caption(format!(
            "{}/{}: {}",
            i + 1,
            links.len(),
            link
        )));

        match backend.fetch(link) {
            FetchResult::Downloaded { path, title } => {
                tally.success += 1;
                resolved.push(settle_filename(path, &title, observer));
            }
            FetchResult::Archived { path, title } => {
                tally.skipped += 1;
                match path {
                    Some(path) => {
                        observer.notify(ProgressEvent::Status(format!(
                            "Already archived: {}",
                            title
                        )));
                        resolved.push(path);
                    }
                    None => observer.notify(ProgressEvent::Status(format!(
                        "Warning: {} is archived but its file was not found",
                        title
                    ))),
                }
            }
            FetchResult::Filtered { reason } => {
                tally.skipped += 1;
                observer.notify(ProgressEvent::Status(format!(
                    "Skipped by filter: {} ({})",
                    link, reason
                )));
            }
            FetchResult::Error { kind, detail } => {
                tally.error += 1;
                observer.notify(ProgressEvent::Status(format!(
                    "Error ({:?}): {} - {}",
                    kind, link, detail
                )));
            }
        }
        observer.notify(ProgressEvent::Progress(i + 1));
    }

    (resolved, tally)
}

/// Rename a fresh download to its filename-safe form. An existing file
/// under the safe name is never overwritten; the backend's name is kept
/// with a warning instead.
fn settle_filename(path: PathBuf, title: &str, observer: &mut dyn Observer) -> PathBuf {
    let safe = path.with_file_name(format!("{}.mp3", util::safe_filename(title)));
    if safe == path {
        observer.notify(ProgressEvent::Status(format!("Downloaded: {}", title)));
        return path;
    }
    if safe.exists() {
        observer.notify(ProgressEvent::Status(format!(
            "Warning: {} already exists, keeping {}",
            safe.display(),
            path.display()
        )));
        return path;
    }
    match fs::rename(&path, &safe) {
        Ok(()) => {
            observer.notify(ProgressEvent::Status(format!("Downloaded: {}", title)));
            safe
        }
        Err(e) => {
            observer.notify(ProgressEvent::Status(format!(
                "Warning: could not rename {}: {}",
                path.display(),
                e
            )));
            path
        }
    }
}

/// Download backend shelling out to yt-dlp.
///
/// yt-dlp cannot call back into this process, so the pre-download filter is
/// applied here between a metadata-only fetch (`-j --no-download`) and the
/// actual download. The archive file is shared with yt-dlp via
/// `--download-archive`.
pub struct YtDlp {
    downloads_dir: PathBuf,
    archive_path: PathBuf,
    archive: Archive,
    classifier: Classifier,
    quality: String,
    embed_thumbnail: bool,
    write_metadata: bool,
    verbose: bool,
}

impl YtDlp {
    /// Set up the backend, verifying that yt-dlp is runnable. A failure
    /// here aborts the whole run before any link is processed.
    pub fn new(
        downloads_dir: PathBuf,
        archive_path: PathBuf,
        classifier: Classifier,
        quality: String,
        embed_thumbnail: bool,
        write_metadata: bool,
        verbose: bool,
    ) -> Result<YtDlp, Box<dyn std::error::Error>> {
        let check = Command::new("yt-dlp")
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        match check {
            Ok(status) if status.success() => {}
            Ok(_) => return Err("yt-dlp is installed but not functional".into()),
            Err(_) => return Err("yt-dlp not found. Install it and retry".into()),
        }

        let downloads_dir = util::guarantee_dir_path(downloads_dir)?;
        let archive = Archive::load(&archive_path);

        Ok(YtDlp {
            downloads_dir,
            archive_path,
            archive,
            classifier,
            quality,
            embed_thumbnail,
            write_metadata,
            verbose,
        })
    }

    fn metadata(&self, link: &str) -> Result<TrackMeta, FetchResult> {
        let output = Command::new("yt-dlp")
            .args(["-j", "--no-download", "--no-warnings", "--no-playlist"])
            .arg(link)
            .output()
            .map_err(|e| FetchResult::Error {
                kind: FetchErrorKind::Fetch,
                detail: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FetchResult::Error {
                kind: FetchErrorKind::Fetch,
                detail: stderr.trim().lines().last().unwrap_or("").to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let json: serde_json::Value = stdout
            .lines()
            .find_map(|line| serde_json::from_str(line).ok())
            .ok_or_else(|| FetchResult::Error {
                kind: FetchErrorKind::Fetch,
                detail: String::from("no metadata returned"),
            })?;

        Ok(TrackMeta {
            id: text_field(&json, "id"),
            extractor: text_field(&json, "extractor"),
            title: text_field(&json, "title"),
            description: text_field(&json, "description"),
            uploader: text_field(&json, "uploader"),
            duration: json.get("duration").and_then(|v| v.as_f64()),
        })
    }

    /// Best-effort resolution of a previously downloaded file: probe the
    /// safe and raw title forms in the downloads directory.
    fn existing_path(&self, title: &str) -> Option<PathBuf> {
        let candidates = [
            self.downloads_dir
                .join(format!("{}.mp3", util::safe_filename(title))),
            self.downloads_dir.join(format!("{}.mp3", title)),
        ];
        candidates.into_iter().find(|p| p.exists())
    }

    fn mp3s_in_downloads(&self) -> Vec<PathBuf> {
        util::filepaths_in(&self.downloads_dir)
            .unwrap_or_default()
            .into_iter()
            .filter(|p| {
                p.extension()
                    .is_some_and(|e| e.to_string_lossy().to_lowercase() == "mp3")
            })
            .collect()
    }

    fn download(&mut self, link: &str, meta: &TrackMeta) -> FetchResult {
        let before = self.mp3s_in_downloads();

        let mut command = Command::new("yt-dlp");
        command
            .args(["-x", "--audio-format", "mp3", "--audio-quality"])
            .arg(&self.quality)
            .args(["--no-playlist", "--no-warnings", "--download-archive"])
            .arg(&self.archive_path)
            .arg("-o")
            .arg(self.downloads_dir.join("%(title)s.%(ext)s"));
        if self.embed_thumbnail {
            command.arg("--embed-thumbnail");
        }
        if self.write_metadata {
            command.arg("--embed-metadata");
        }
        // stderr is dropped rather than piped: an unread pipe can fill up
        // and stall yt-dlp while stdout is being drained.
        command.arg(link).stdout(Stdio::piped()).stderr(Stdio::null());

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                return FetchResult::Error {
                    kind: FetchErrorKind::Fetch,
                    detail: e.to_string(),
                }
            }
        };

        if let Some(stdout) = child.stdout.take() {
            for line in BufReader::new(stdout).lines().map_while(Result::ok) {
                if self.verbose {
                    println!("{}", line);
                }
            }
        }

        let status = match child.wait() {
            Ok(status) => status,
            Err(e) => {
                return FetchResult::Error {
                    kind: FetchErrorKind::Fetch,
                    detail: e.to_string(),
                }
            }
        };
        if !status.success() {
            return FetchResult::Error {
                kind: FetchErrorKind::Fetch,
                detail: format!("yt-dlp exited with {}", status),
            };
        }

        // yt-dlp appended to the archive file itself; pick that up. An
        // interrupted postprocessor can leave the entry missing, so write
        // it ourselves when it is not there.
        self.archive.reload();
        if !meta.extractor.is_empty() && !meta.id.is_empty() {
            let key = archive::key(&meta.extractor, &meta.id);
            if !self.archive.has(&key) {
                if let Err(e) = self.archive.record(&key) {
                    println!("Warning: could not update archive: {}", e);
                }
            }
        }

        let fresh = self
            .mp3s_in_downloads()
            .into_iter()
            .find(|p| !before.contains(p));
        match fresh {
            Some(path) => FetchResult::Downloaded {
                path,
                title: meta.title.clone(),
            },
            None => FetchResult::Error {
                kind: FetchErrorKind::PostProcess,
                detail: format!("no mp3 produced for {}", meta.title),
            },
        }
    }
}

impl FetchBackend for YtDlp {
    fn fetch(&mut self, link: &str) -> FetchResult {
        if Url::parse(link).is_err() {
            return FetchResult::Error {
                kind: FetchErrorKind::InvalidLink,
                detail: String::from("not a URL"),
            };
        }

        let meta = match self.metadata(link) {
            Ok(meta) => meta,
            Err(error) => return error,
        };

        if let Verdict::Reject(reason) = self.classifier.classify(&meta) {
            return FetchResult::Filtered { reason };
        }

        if !meta.extractor.is_empty()
            && !meta.id.is_empty()
            && self.archive.has(&archive::key(&meta.extractor, &meta.id))
        {
            return FetchResult::Archived {
                path: self.existing_path(&meta.title),
                title: meta.title,
            };
        }

        self.download(link, &meta)
    }
}

fn text_field(json: &serde_json::Value, name: &str) -> String {
    match json.get(name) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Print the run summary every termination path must produce.
pub fn report(tally: &Tally) {
    println!("--- Download summary ---");
    println!("  downloaded: {}", tally.success);
    println!("  skipped (filter/archive): {}", tally.skipped);
    println!("  errors: {}", tally.error);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::Silent;
    use std::collections::VecDeque;

    struct FakeBackend {
        results: VecDeque<FetchResult>,
    }

    impl FetchBackend for FakeBackend {
        fn fetch(&mut self, _link: &str) -> FetchResult {
            self.results.pop_front().expect("unexpected fetch")
        }
    }

    fn links(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn tallies_archive_hit_and_filter_reject() {
        // A downloads, B is archived but its file is gone, C is filtered.
        let dir = tempfile::tempdir().unwrap();
        let a_path = dir.path().join("A.mp3");
        std::fs::write(&a_path, b"x").unwrap();

        let mut backend = FakeBackend {
            results: VecDeque::from(vec![
                FetchResult::Downloaded {
                    path: a_path.clone(),
                    title: String::from("A"),
                },
                FetchResult::Archived {
                    path: None,
                    title: String::from("B"),
                },
                FetchResult::Filtered {
                    reason: String::from("duration>max"),
                },
            ]),
        };

        let (resolved, tally) =
            fetch_all(&mut backend, &links(&["A", "B", "C"]), &mut Silent);
        assert_eq!(
            tally,
            Tally {
                success: 1,
                skipped: 2,
                error: 0
            }
        );
        assert_eq!(resolved, vec![a_path]);
    }

    #[test]
    fn renames_to_safe_filename() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("Song？.mp3");
        std::fs::write(&raw, b"x").unwrap();

        let mut backend = FakeBackend {
            results: VecDeque::from(vec![FetchResult::Downloaded {
                path: raw.clone(),
                title: String::from("Song: Reprise?"),
            }]),
        };

        let (resolved, tally) = fetch_all(&mut backend, &links(&["A"]), &mut Silent);
        assert_eq!(tally.success, 1);
        assert_eq!(resolved, vec![dir.path().join("Song Reprise.mp3")]);
        assert!(!raw.exists());
        assert!(resolved[0].exists());
    }

    #[test]
    fn collision_keeps_backend_name() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("Song (1).mp3");
        let occupied = dir.path().join("Song.mp3");
        std::fs::write(&raw, b"new").unwrap();
        std::fs::write(&occupied, b"old").unwrap();

        let mut backend = FakeBackend {
            results: VecDeque::from(vec![FetchResult::Downloaded {
                path: raw.clone(),
                title: String::from("Song"),
            }]),
        };

        let (resolved, _) = fetch_all(&mut backend, &links(&["A"]), &mut Silent);
        assert_eq!(resolved, vec![raw.clone()]);
        assert!(raw.exists());
        assert_eq!(std::fs::read(&occupied).unwrap(), b"old");
    }

    #[test]
    fn errors_are_isolated_per_link() {
        let dir = tempfile::tempdir().unwrap();
        let ok_path = dir.path().join("Fine.mp3");
        std::fs::write(&ok_path, b"x").unwrap();

        let mut backend = FakeBackend {
            results: VecDeque::from(vec![
                FetchResult::Error {
                    kind: FetchErrorKind::InvalidLink,
                    detail: String::from("not a URL"),
                },
                FetchResult::Error {
                    kind: FetchErrorKind::PostProcess,
                    detail: String::from("no mp3 produced"),
                },
                FetchResult::Downloaded {
                    path: ok_path.clone(),
                    title: String::from("Fine"),
                },
            ]),
        };

        let (resolved, tally) =
            fetch_all(&mut backend, &links(&["bad", "worse", "good"]), &mut Silent);
        assert_eq!(tally.error, 2);
        assert_eq!(tally.success, 1);
        assert_eq!(resolved, vec![ok_path]);
    }

    #[test]
    fn archived_with_known_path_is_resolved() {
        let mut backend = FakeBackend {
            results: VecDeque::from(vec![FetchResult::Archived {
                path: Some(PathBuf::from("/tmp/b.mp3")),
                title: String::from("B"),
            }]),
        };
        let (resolved, tally) = fetch_all(&mut backend, &links(&["B"]), &mut Silent);
        assert_eq!(tally.skipped, 1);
        assert_eq!(resolved, vec![PathBuf::from("/tmp/b.mp3")]);
    }
}
