use crate::error::Result;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "textkey.json";
pub const CONFIG_BACKUP_FILENAME: &str = "textkey.json~";
pub const DATA_DIRNAME: &str = "data";
pub const DEFAULT_FOLDER_TITLE: &str = "My Phrases";

/// Get the textkey configuration directory
pub fn get_config_dir() -> PathBuf {
    env::var("HOME")
        .map(|home| PathBuf::from(home).join(".textkey"))
        .unwrap_or_else(|_| PathBuf::from(".textkey"))
}

/// Ensure the configuration directory and its data directory exist
pub fn ensure_config_dir(config_dir: &Path) -> Result<()> {
    if !config_dir.exists() {
        fs::create_dir_all(config_dir)?;
    }

    let data_dir = config_dir.join(DATA_DIRNAME);
    if !data_dir.exists() {
        fs::create_dir_all(&data_dir)?;
    }

    Ok(())
}

/// Path of the main configuration document
pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILENAME)
}

/// Path of the sibling backup of the main configuration document
pub fn config_backup_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_BACKUP_FILENAME)
}

/// Directory holding the persisted folder/phrase tree
pub fn data_dir(config_dir: &Path) -> PathBuf {
    config_dir.join(DATA_DIRNAME)
}
