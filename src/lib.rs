pub mod archive;
pub mod classify;
pub mod fetch;
pub mod metadata;
pub mod page;
pub mod playlist;
pub mod progress;
pub mod scrape;
pub mod store;

pub mod command;

mod chrome;
mod collect;
mod download;
mod info;
mod types;
mod util;

use command::Command;
use std::fs;
use std::path::PathBuf;

pub struct Config {
    pub command: Command,
    pub profile: Option<String>,
    pub username: Option<String>,

    // General
    pub verbose: bool,

    // Collect
    pub scroll_wait: f64,
    pub stability_checks: u32,
    pub max_tracks: usize,

    // Filter
    pub keywords: Vec<String>,
    /// Seconds; `None` disables the duration rule.
    pub max_duration: Option<f64>,

    // Download
    pub skip_download: bool,
    pub mp3_quality: String,
    pub embed_thumbnail: bool,
    pub write_metadata: bool,
    pub cleanup_thumbnails: bool,

    // Playlists
    pub sort_order: String,
    pub include_duration: bool,

    // Paths
    pub profile_path: Option<PathBuf>,
    pub conf_path: Option<PathBuf>,
    pub csv_path: Option<PathBuf>,
    pub archive_path: Option<PathBuf>,
    pub downloads_dir: Option<PathBuf>,
    pub playlist_json_path: Option<PathBuf>,
    pub playlist_m3u_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            command: Command::Help,
            profile: None,
            username: None,
            verbose: false,
            scroll_wait: 2.0,
            stability_checks: 3,
            max_tracks: 0,
            keywords: classify::default_keywords(),
            max_duration: Some(classify::MAX_TRACK_DURATION),
            skip_download: false,
            mp3_quality: String::from("192"),
            embed_thumbnail: true,
            write_metadata: true,
            cleanup_thumbnails: false,
            sort_order: String::from("title"),
            include_duration: true,
            profile_path: None,
            conf_path: None,
            csv_path: None,
            archive_path: None,
            downloads_dir: None,
            playlist_json_path: None,
            playlist_m3u_path: None,
        }
    }
}

impl Config {
    fn parse_profile(profile: Option<String>) -> types::StringResult {
        if let Some(profile) = profile {
            Ok(profile)
        } else {
            Err("Profile not specified. See 'help'".into())
        }
    }

    fn setup_profile_paths(&mut self) {
        let profile_path = PathBuf::from(dirs::config_dir().unwrap())
            .join("liker")
            .join(self.profile.clone().unwrap());

        self.conf_path = Some(profile_path.join("liker.conf"));
        self.csv_path = Some(profile_path.join("liked_tracks.csv"));
        self.archive_path = Some(profile_path.join("downloaded.txt"));
        self.downloads_dir = Some(profile_path.join("downloads"));
        self.playlist_json_path = Some(profile_path.join("web_player").join("playlist.json"));
        self.playlist_m3u_path = Some(profile_path.join("liked_playlist.m3u"));
        self.profile_path = Some(profile_path);
    }

    /// Attempt to read in options from liker.conf if it exists.
    /// For any option that is not present in the file, the default is kept.
    ///
    /// # Errors
    /// - If a line does not follow the `option=value` format
    /// - If an option is not recognized or its value does not parse
    fn build_conf_options(&mut self) -> types::UnitResult {
        let contents = fs::read_to_string(self.conf_path.clone().unwrap());
        if contents.is_err() {
            return Ok(()); // Leave defaults when file not present
        }

        for line in contents.unwrap().lines().map(|l| l.trim()) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                match key.to_lowercase().as_str() {
                    // General
                    "verbose" => self.verbose = value.parse::<bool>()?,
                    // Collect
                    "scroll_wait" => self.scroll_wait = parse_wait(value)?,
                    "stability_checks" => self.stability_checks = value.parse::<u32>()?,
                    "max_tracks" => self.max_tracks = value.parse::<usize>()?,
                    // Filter
                    "max_duration" => {
                        let secs = value.parse::<f64>()?;
                        self.max_duration = if secs > 0.0 { Some(secs) } else { None };
                    }
                    "keywords" => {
                        self.keywords = value
                            .split(',')
                            .map(|k| k.trim().to_string())
                            .filter(|k| !k.is_empty())
                            .collect();
                    }
                    // Download
                    "mp3_quality" => self.mp3_quality = String::from(value),
                    "embed_thumbnail" => self.embed_thumbnail = value.parse::<bool>()?,
                    "write_metadata" => self.write_metadata = value.parse::<bool>()?,
                    "cleanup_thumbnails" => self.cleanup_thumbnails = value.parse::<bool>()?,
                    // Playlists
                    "sort_order" => self.sort_order = playlist::SortOrder::validate(value)?,
                    "include_duration" => self.include_duration = value.parse::<bool>()?,
                    _ => return Err(format!("Invalid config option: {}", key).into()),
                }
            } else {
                return Err(format!("Invalid config line: {}", line).into());
            }
        }

        Ok(())
    }

    /// Attempts to override options with CLI options.
    ///
    /// # Errors
    /// - If an option is not recognized for the Config's command
    fn parse_cli_options(&mut self, mut args: impl Iterator<Item = String>) -> types::UnitResult {
        while let Some(arg) = args.next() {
            if !arg.starts_with('-') {
                break; // no (more) options
            }

            for s in arg[1..].chars() {
                match s {
                    'v' => self.verbose = true,
                    's' if self.command == Command::Download => self.skip_download = true,
                    'w' if self.command == Command::Collect => {
                        self.scroll_wait = parse_wait(&next_value(&mut args, 'w')?)?;
                    }
                    'n' if self.command == Command::Collect => {
                        self.stability_checks = next_value(&mut args, 'n')?.parse::<u32>()?;
                    }
                    'm' if self.command == Command::Collect => {
                        self.max_tracks = next_value(&mut args, 'm')?.parse::<usize>()?;
                    }
                    _ => {
                        return Err(format!(
                            "Unrecognized option '{}' for command '{:?}'. See 'help'",
                            s, self.command
                        )
                        .into())
                    }
                };
            }
        }

        Ok(())
    }

    pub fn build(mut args: impl Iterator<Item = String>) -> types::ConfigResult {
        args.next(); // Consume program name

        let command = match args.next() {
            Some(command) => Command::from(&command)?,
            None => return Err("Command not specified. See 'help'".into()),
        };

        let mut config = Config {
            command,
            ..Default::default()
        };

        if config.command.uses_profile() {
            config.profile = Some(Config::parse_profile(args.next())?);
            config.setup_profile_paths();
        }

        if config.command == Command::Collect {
            config.username = match args.next() {
                Some(username) if !username.trim().is_empty() => Some(username),
                _ => return Err("Username not specified. See 'help'".into()),
            };
        }

        if config.command.uses_conf() {
            config.build_conf_options()?; // override defaults with liker.conf
        }
        if config.command.uses_cli() {
            config.parse_cli_options(args)?; // override defaults/conf with CLI
        }

        Ok(config)
    }
}

fn next_value(args: &mut impl Iterator<Item = String>, option: char) -> types::StringResult {
    args.next()
        .filter(|v| !v.starts_with('-'))
        .ok_or_else(|| format!("Option '{}' requires a value. See 'help'", option).into())
}

fn parse_wait(value: &str) -> Result<f64, Box<dyn std::error::Error>> {
    let secs = value.parse::<f64>()?;
    if secs < 0.0 || !secs.is_finite() {
        return Err(format!("Invalid wait time: {}", value).into());
    }
    Ok(secs)
}

pub fn run(config: Config) -> types::UnitResult {
    match config.command {
        Command::Help => {
            info::help();
            Ok(())
        }
        Command::List => info::list(),
        Command::Show => info::show(&config),
        Command::Collect => collect::run(&config),
        Command::Download => download::run(&config),
    }
}
