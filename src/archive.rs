//! The download archive: identifiers of everything fetched before.
//!
//! Shares its on-disk format with yt-dlp's `--download-archive` file, one
//! `"<extractor> <id>"` key per line, so the same file backs both our
//! pre-download check and yt-dlp's own bookkeeping. Append-only; nothing is
//! ever evicted, which is fine at this tool's scale.

use crate::types;
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct Archive {
    path: PathBuf,
    ids: HashSet<String>,
}

/// The archive key for a platform item, matching yt-dlp's line format.
pub fn key(extractor: &str, id: &str) -> String {
    format!("{} {}", extractor.to_lowercase(), id)
}

impl Archive {
    /// Load the archive; a missing file is an empty archive. An unreadable
    /// file is also treated as empty, with a warning, since refusing to run
    /// would only block downloads that the archive exists to speed up.
    pub fn load(path: &Path) -> Archive {
        let ids = match fs::read_to_string(path) {
            Ok(contents) => contents
                .lines()
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())
                .collect(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashSet::new(),
            Err(e) => {
                println!(
                    "Warning: could not read archive {}: {}. Treating as empty.",
                    path.display(),
                    e
                );
                HashSet::new()
            }
        };
        Archive {
            path: path.to_path_buf(),
            ids,
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.ids.contains(key)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Record a completed download, appending to the file immediately.
    pub fn record(&mut self, key: &str) -> types::UnitResult {
        if !self.ids.insert(String::from(key)) {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            crate::util::guarantee_dir_path(parent.to_path_buf())?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", key)?;
        Ok(())
    }

    /// Re-read keys yt-dlp may have appended behind our back.
    pub fn reload(&mut self) {
        let fresh = Archive::load(&self.path);
        self.ids.extend(fresh.ids);
    }
}
