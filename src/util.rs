use crate::types;
use regex::Regex;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Create the directory path if it does not exist, returning the path itself.
pub fn guarantee_dir_path(dir: PathBuf) -> types::PathBufResult {
    if fs::metadata(&dir).is_err() {
        fs::create_dir_all(&dir)?;
    }
    Ok(dir)
}

/// List the files (not directories) directly under `dir`.
pub fn filepaths_in(dir: &Path) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    Ok(fs::read_dir(dir)?
        .filter(|e| {
            e.as_ref()
                .is_ok_and(|t| t.file_type().is_ok_and(|f| f.is_file()))
        })
        .map(|e| e.unwrap().path())
        .collect())
}

/// Turn a track title into a filename that is safe on every filesystem:
/// strip reserved characters, then collapse runs of whitespace/underscores.
pub fn safe_filename(title: &str) -> String {
    let name = sanitize_filename::sanitize(title);
    let re = Regex::new(r"[\s_]+").unwrap();
    re.replace_all(&name, " ").trim().to_string()
}

/// Compute the path of `target` relative to the directory `from`,
/// using forward slashes regardless of platform (for playlist files).
///
/// Both paths are expected to share a common root; when they do not,
/// the target is returned as-is.
pub fn relative_to(target: &Path, from: &Path) -> String {
    let target_comps: Vec<Component> = target.components().collect();
    let from_comps: Vec<Component> = from.components().collect();

    let common = target_comps
        .iter()
        .zip(from_comps.iter())
        .take_while(|(a, b)| a == b)
        .count();
    if common == 0 && target.is_absolute() && from.is_absolute() {
        return slashed(target);
    }

    let mut parts: Vec<String> = Vec::new();
    for _ in common..from_comps.len() {
        parts.push(String::from(".."));
    }
    for comp in &target_comps[common..] {
        parts.push(comp.as_os_str().to_string_lossy().into_owned());
    }
    parts.join("/")
}

fn slashed(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
