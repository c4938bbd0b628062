//! Core of textkey, a text-expansion and automation utility.
//!
//! Folders hold phrases and scripts; each entity can be triggered by an
//! abbreviation, a hotkey, or a menu entry. This crate owns the data model,
//! the per-entity JSON persistence, and the configuration manager with its
//! backup/restore handling and binding-uniqueness checks.

pub mod config;
pub mod configmanager;
pub mod error;
pub mod key;
pub mod models;
pub mod storage;

// Re-export common items for convenience
pub use config::{get_config_dir, DEFAULT_FOLDER_TITLE};
pub use configmanager::{ConfigManager, Settings};
pub use error::{Result, TextkeyError};
pub use key::{Hotkey, Key};
pub use models::{Folder, Item, Phrase, Script, SendMode, TriggerMode, WindowFilter};
