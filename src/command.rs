use crate::types;

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Help,
    List,
    Show,
    Collect,
    Download,
}

impl Command {
    pub fn from(s: &str) -> types::CommandResult {
        match s {
            "help" | "h" | "-h" | "--help" => Ok(Self::Help),
            "list" | "ls" | "l" => Ok(Self::List),
            "show" => Ok(Self::Show),
            "collect" => Ok(Self::Collect),
            "download" => Ok(Self::Download),
            _ => Err(format!("Unrecognized command: {}. See 'help'", s).into()),
        }
    }

    /// Whether the command operates on a profile directory.
    pub fn uses_profile(&self) -> bool {
        match self {
            Self::Show => true,
            Self::Collect => true,
            Self::Download => true,
            _ => false,
        }
    }

    pub fn uses_conf(&self) -> bool {
        match self {
            Self::Collect => true,
            Self::Download => true,
            _ => false,
        }
    }

    pub fn uses_cli(&self) -> bool {
        match self {
            Self::Collect => true,
            Self::Download => true,
            _ => false,
        }
    }
}
