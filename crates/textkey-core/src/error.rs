use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TextkeyError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration not found at: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("no backup configuration available at: {}", .0.display())]
    NoBackup(PathBuf),

    #[error("unknown key: '{0}'")]
    UnknownKey(String),

    #[error("invalid hotkey: {0}")]
    InvalidHotkey(String),

    #[error("invalid abbreviation: {0}")]
    InvalidAbbreviation(String),

    #[error("invalid window filter '{pattern}': {source}")]
    InvalidWindowFilter {
        pattern: String,
        source: regex::Error,
    },

    #[error("the abbreviation '{0}' is already in use")]
    AbbreviationInUse(String),

    #[error("the hotkey '{0}' is already in use")]
    HotkeyInUse(String),

    #[error("parent folder is temporary, so '{0}' must also be created as temporary")]
    TemporaryParent(String),

    #[error("no folder matches the given reference")]
    FolderNotFound,

    #[error("no script with description '{0}' found")]
    ScriptNotFound(String),

    #[error("error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, TextkeyError>;
