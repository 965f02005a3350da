//! Integration testing helper functions.

use liker::Config;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

pub fn setup(mut args: Vec<&str>) -> Result<Config, Box<dyn std::error::Error>> {
    args.insert(0, "liker");
    let args = args.into_iter().map(String::from);
    Config::build(args)
}

pub fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    liker::run(config)
}

pub fn create_profile(name: &str) -> PathBuf {
    let profile = PathBuf::from(dirs::config_dir().unwrap())
        .join("liker")
        .join(name);
    fs::create_dir_all(&profile).unwrap();
    profile
}

/// Remove the profile folder and all its contents.
pub fn destroy(profile: PathBuf) {
    fs::remove_dir_all(profile).unwrap();
}

pub fn read(path: PathBuf) -> String {
    fs::read_to_string(path).unwrap()
}

/// Write the `contents` to the file at `path`. If the file does not exist,
/// it is created; otherwise, it will be overwritten.
pub fn write(path: PathBuf, contents: String) {
    let mut file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
}
