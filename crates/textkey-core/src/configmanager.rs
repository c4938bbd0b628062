use crate::config::{self, DEFAULT_FOLDER_TITLE};
use crate::error::{Result, TextkeyError};
use crate::key::{Hotkey, Key};
use crate::models::{Folder, Item};
use crate::storage;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Global options persisted in the main configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub is_first_run: bool,
    pub prompt_to_save: bool,
    pub undo_using_backspace: bool,
    pub show_tray_icon: bool,
    pub notify_errors: bool,
    /// Global hotkey that pauses/resumes the expansion service.
    pub toggle_service_hotkey: Option<Hotkey>,
    /// Global hotkey that opens the configuration window.
    pub show_config_hotkey: Option<Hotkey>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            is_first_run: true,
            prompt_to_save: false,
            undo_using_backspace: true,
            show_tray_icon: true,
            notify_errors: true,
            toggle_service_hotkey: Hotkey::new(vec![Key::Control, Key::Shift], Key::Char('k'))
                .ok(),
            show_config_hotkey: Hotkey::new(vec![Key::Control, Key::Shift], Key::Char('h')).ok(),
        }
    }
}

/// Owns the folder tree and global settings, and keeps both on disk.
///
/// Settings live in a single JSON document with a sibling `~` backup that
/// is refreshed before every save; folders, phrases and scripts persist as
/// individual JSON documents under the data directory.
pub struct ConfigManager {
    config_dir: PathBuf,
    pub folders: Vec<Folder>,
    pub settings: Settings,
}

impl ConfigManager {
    /// An empty in-memory configuration rooted at `config_dir`. Nothing is
    /// read or written until `load` or one of the persistence calls.
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        ConfigManager {
            config_dir: config_dir.into(),
            folders: Vec::new(),
            settings: Settings::default(),
        }
    }

    /// Load from the default location (`~/.textkey`).
    pub fn load_default() -> Result<Self> {
        Self::load(config::get_config_dir())
    }

    /// Load settings and the folder tree, creating the directory layout and
    /// the default folder on first run. If the main configuration document
    /// cannot be parsed, the sibling backup is restored and parsed instead;
    /// without a backup the original error is surfaced.
    pub fn load(config_dir: impl Into<PathBuf>) -> Result<Self> {
        let config_dir = config_dir.into();
        config::ensure_config_dir(&config_dir)?;

        let mut manager = ConfigManager::new(config_dir);
        manager.settings = manager.load_settings()?;
        manager.folders = storage::load_folders(&manager.data_dir())?;

        if manager.settings.is_first_run {
            manager.settings.is_first_run = false;
            if manager.folders.is_empty() {
                manager.create_default_folder()?;
            }
            manager.save()?;
        }

        Ok(manager)
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_file_path(&self) -> PathBuf {
        config::config_file_path(&self.config_dir)
    }

    pub fn config_backup_path(&self) -> PathBuf {
        config::config_backup_path(&self.config_dir)
    }

    pub fn data_dir(&self) -> PathBuf {
        config::data_dir(&self.config_dir)
    }

    fn load_settings(&self) -> Result<Settings> {
        let path = self.config_file_path();
        if !path.exists() {
            return Ok(Settings::default());
        }

        match read_settings(&path) {
            Ok(settings) => Ok(settings),
            Err(cause) => {
                self.recover_config_backup(cause)?;
                read_settings(&path)
            }
        }
    }

    /// Restore the backup configuration after a failed load. Without a
    /// backup to fall back on, the original failure is returned.
    pub fn recover_config_backup(&self, cause: TextkeyError) -> Result<()> {
        if self.config_backup_path().exists() {
            warn!(
                "configuration file could not be loaded ({}), restoring backup",
                cause
            );
            self.restore_backup_config()
        } else {
            Err(cause)
        }
    }

    /// Copy the main configuration document to its sibling backup path.
    pub fn back_up_config(&self) -> Result<()> {
        let path = self.config_file_path();
        if path.exists() {
            fs::copy(&path, self.config_backup_path())?;
        }
        Ok(())
    }

    /// Copy the backup over the main configuration document.
    pub fn restore_backup_config(&self) -> Result<()> {
        let backup = self.config_backup_path();
        if !backup.exists() {
            return Err(TextkeyError::NoBackup(backup));
        }
        fs::copy(&backup, self.config_file_path())?;
        Ok(())
    }

    /// Persist the settings document, refreshing the backup first.
    pub fn save(&self) -> Result<()> {
        config::ensure_config_dir(&self.config_dir)?;
        self.back_up_config()?;
        let serialized = serde_json::to_string_pretty(&self.settings)?;
        fs::write(self.config_file_path(), serialized)?;
        Ok(())
    }

    /// Called after any change to the tree: rewrite the persisted entities
    /// and, if requested, the global settings document as well.
    pub fn config_altered(&mut self, persist_global: bool) -> Result<()> {
        info!("configuration altered, persisting");
        storage::sync_folders(&self.data_dir(), &self.folders)?;
        if persist_global {
            self.save()?;
        }
        Ok(())
    }

    /// Create and persist the default top-level folder.
    pub fn create_default_folder(&mut self) -> Result<()> {
        info!("creating default folder '{}'", DEFAULT_FOLDER_TITLE);
        let folder = Folder::new(DEFAULT_FOLDER_TITLE);
        storage::save_folder(&self.data_dir(), &folder)?;
        self.folders.push(folder);
        Ok(())
    }

    /// Every folder in the tree, depth first.
    pub fn all_folders(&self) -> Vec<&Folder> {
        let mut out = Vec::new();
        for folder in &self.folders {
            collect_folders(folder, &mut out);
        }
        out
    }

    /// Every item in the tree, depth first.
    pub fn all_items(&self) -> Vec<&Item> {
        self.all_folders()
            .into_iter()
            .flat_map(|f| f.items.iter())
            .collect()
    }

    /// First folder with the given title, depth first.
    pub fn get_folder(&self, title: &str) -> Option<&Folder> {
        self.all_folders().into_iter().find(|f| f.title == title)
    }

    /// True when no other item or folder already uses `abbreviation`.
    /// `ignore` lets an item be re-checked against everything but itself.
    pub fn check_abbreviation_unique(&self, abbreviation: &str, ignore: Option<&Item>) -> bool {
        for folder in self.all_folders() {
            if folder.abbreviations.iter().any(|a| a == abbreviation) {
                return false;
            }
        }
        for item in self.all_items() {
            if let Some(ignored) = ignore {
                if std::ptr::eq(ignored, item) {
                    continue;
                }
            }
            if item.abbreviations().iter().any(|a| a == abbreviation) {
                return false;
            }
        }
        true
    }

    /// True when no item, folder or global binding already uses the given
    /// combination. Modifier order does not matter.
    pub fn check_hotkey_unique(&self, modifiers: &[Key], key: Key, ignore: Option<&Item>) -> bool {
        let globals = [
            self.settings.toggle_service_hotkey.as_ref(),
            self.settings.show_config_hotkey.as_ref(),
        ];
        for hotkey in globals.into_iter().flatten() {
            if hotkey.matches(modifiers, key) {
                return false;
            }
        }
        for folder in self.all_folders() {
            if let Some(hotkey) = &folder.hotkey {
                if hotkey.matches(modifiers, key) {
                    return false;
                }
            }
        }
        for item in self.all_items() {
            if let Some(ignored) = ignore {
                if std::ptr::eq(ignored, item) {
                    continue;
                }
            }
            if Self::item_has_same_hotkey(item, modifiers, key) {
                return false;
            }
        }
        true
    }

    /// First item bound to the given combination, if any.
    pub fn get_item_with_hotkey(&self, modifiers: &[Key], key: Key) -> Option<&Item> {
        self.all_items()
            .into_iter()
            .find(|item| Self::item_has_same_hotkey(item, modifiers, key))
    }

    pub fn item_has_same_hotkey(item: &Item, modifiers: &[Key], key: Key) -> bool {
        item.hotkey()
            .map(|hotkey| hotkey.matches(modifiers, key))
            .unwrap_or(false)
    }

    /// Drop every temporary folder and item from the in-memory tree.
    pub fn remove_all_temporary(&mut self) {
        self.folders.retain(|f| !f.temporary);
        for folder in &mut self.folders {
            strip_temporary(folder);
        }
    }
}

fn collect_folders<'a>(folder: &'a Folder, out: &mut Vec<&'a Folder>) {
    out.push(folder);
    for child in &folder.folders {
        collect_folders(child, out);
    }
}

fn strip_temporary(folder: &mut Folder) {
    folder.items.retain(|i| !i.is_temporary());
    folder.folders.retain(|f| !f.temporary);
    for child in &mut folder.folders {
        strip_temporary(child);
    }
}

fn read_settings(path: &Path) -> Result<Settings> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
