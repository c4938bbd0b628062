//! The textkey scripting API.
//!
//! `Engine` gives scripts programmatic access to the configuration:
//! creating folders, phrases and hotkeys, running other scripts, and the
//! macro argument/return-value plumbing.

pub mod engine;
pub mod runner;

// Re-export
pub use engine::{Engine, FolderRef, PhraseOptions};
pub use runner::{LogRunner, ScriptRunner};
