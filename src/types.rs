use crate::command::Command;
use crate::Config;
use std::error::Error;

pub type CommandResult = Result<Command, Box<dyn Error>>;
pub type ConfigResult = Result<Config, Box<dyn Error>>;
pub type PathBufResult = Result<std::path::PathBuf, Box<dyn Error>>;
pub type StringResult = Result<String, Box<dyn Error>>;
pub type UnitResult = Result<(), Box<dyn Error>>;
