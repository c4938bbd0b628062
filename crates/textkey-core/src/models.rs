use crate::error::{Result, TextkeyError};
use crate::key::Hotkey;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// How an item can be triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerMode {
    Abbreviation,
    Hotkey,
    /// Triggered from a menu or tray entry rather than by typing.
    Predefined,
}

/// How phrase contents are delivered to the active window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SendMode {
    #[default]
    #[serde(rename = "kb")]
    Keyboard,
    #[serde(rename = "<ctrl>+v")]
    CbCtrlV,
    #[serde(rename = "<ctrl>+<shift>+v")]
    CbCtrlShiftV,
    #[serde(rename = "<shift>+<insert>")]
    CbShiftInsert,
    #[serde(rename = "selection")]
    Selection,
}

/// Regular-expression filter restricting an item to matching window titles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowFilter {
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub recursive: bool,
}

impl WindowFilter {
    /// Compile the stored pattern. Stored patterns were validated on the
    /// way in, so a compile failure here means the document was hand-edited.
    pub fn regex(&self) -> Option<Regex> {
        self.pattern.as_deref().and_then(|p| Regex::new(p).ok())
    }
}

fn validate_filter_pattern(pattern: &str) -> Result<()> {
    Regex::new(pattern).map(|_| ()).map_err(|source| {
        TextkeyError::InvalidWindowFilter {
            pattern: pattern.to_string(),
            source,
        }
    })
}

fn add_mode(modes: &mut Vec<TriggerMode>, mode: TriggerMode) {
    if !modes.contains(&mode) {
        modes.push(mode);
    }
}

fn remove_mode(modes: &mut Vec<TriggerMode>, mode: TriggerMode) {
    modes.retain(|m| *m != mode);
}

fn add_abbreviation_to(
    abbreviations: &mut Vec<String>,
    modes: &mut Vec<TriggerMode>,
    abbreviation: String,
) -> Result<()> {
    if abbreviation.is_empty() {
        return Err(TextkeyError::InvalidAbbreviation(
            "abbreviation must not be empty".to_string(),
        ));
    }
    if abbreviations.contains(&abbreviation) {
        return Err(TextkeyError::InvalidAbbreviation(format!(
            "'{}' is already assigned to this item",
            abbreviation
        )));
    }
    abbreviations.push(abbreviation);
    add_mode(modes, TriggerMode::Abbreviation);
    Ok(())
}

/// A block of text injected into the active window when triggered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phrase {
    pub description: String,
    pub contents: String,
    #[serde(default)]
    pub modes: Vec<TriggerMode>,
    #[serde(default)]
    pub abbreviations: Vec<String>,
    #[serde(default)]
    pub hotkey: Option<Hotkey>,
    #[serde(default)]
    pub send_mode: SendMode,
    #[serde(default)]
    pub filter: WindowFilter,
    #[serde(default)]
    pub show_in_tray_menu: bool,
    /// Ask for confirmation before every expansion.
    #[serde(default)]
    pub prompt: bool,
    /// Temporary items live only in memory and are never written to disk.
    #[serde(skip)]
    pub temporary: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub modified_at: DateTime<Utc>,
}

impl Phrase {
    pub fn new(description: impl Into<String>, contents: impl Into<String>) -> Self {
        let now = Utc::now();
        Phrase {
            description: description.into(),
            contents: contents.into(),
            modes: Vec::new(),
            abbreviations: Vec::new(),
            hotkey: None,
            send_mode: SendMode::default(),
            filter: WindowFilter::default(),
            show_in_tray_menu: false,
            prompt: false,
            temporary: false,
            created_at: now,
            modified_at: now,
        }
    }

    pub fn set_hotkey(&mut self, hotkey: Hotkey) {
        self.hotkey = Some(hotkey);
        add_mode(&mut self.modes, TriggerMode::Hotkey);
        self.touch();
    }

    pub fn unset_hotkey(&mut self) {
        self.hotkey = None;
        remove_mode(&mut self.modes, TriggerMode::Hotkey);
        self.touch();
    }

    pub fn add_abbreviation(&mut self, abbreviation: impl Into<String>) -> Result<()> {
        add_abbreviation_to(
            &mut self.abbreviations,
            &mut self.modes,
            abbreviation.into(),
        )?;
        self.touch();
        Ok(())
    }

    pub fn add_abbreviations<I, S>(&mut self, abbreviations: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for abbreviation in abbreviations {
            self.add_abbreviation(abbreviation)?;
        }
        Ok(())
    }

    /// Set the window filter, validating the regular expression first.
    pub fn set_window_titles(&mut self, pattern: &str) -> Result<()> {
        validate_filter_pattern(pattern)?;
        self.filter.pattern = Some(pattern.to_string());
        self.touch();
        Ok(())
    }

    pub fn clear_window_titles(&mut self) {
        self.filter.pattern = None;
        self.touch();
    }

    pub fn set_filter_recursive(&mut self, recursive: bool) {
        self.filter.recursive = recursive;
    }

    pub fn touch(&mut self) {
        self.modified_at = Utc::now();
    }
}

/// A user script triggered the same way as a phrase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub description: String,
    pub source: String,
    #[serde(default)]
    pub modes: Vec<TriggerMode>,
    #[serde(default)]
    pub abbreviations: Vec<String>,
    #[serde(default)]
    pub hotkey: Option<Hotkey>,
    #[serde(default)]
    pub filter: WindowFilter,
    #[serde(default)]
    pub show_in_tray_menu: bool,
    #[serde(default)]
    pub prompt: bool,
    #[serde(skip)]
    pub temporary: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub modified_at: DateTime<Utc>,
}

impl Script {
    pub fn new(description: impl Into<String>, source: impl Into<String>) -> Self {
        let now = Utc::now();
        Script {
            description: description.into(),
            source: source.into(),
            modes: Vec::new(),
            abbreviations: Vec::new(),
            hotkey: None,
            filter: WindowFilter::default(),
            show_in_tray_menu: false,
            prompt: false,
            temporary: false,
            created_at: now,
            modified_at: now,
        }
    }

    pub fn set_hotkey(&mut self, hotkey: Hotkey) {
        self.hotkey = Some(hotkey);
        add_mode(&mut self.modes, TriggerMode::Hotkey);
        self.touch();
    }

    pub fn unset_hotkey(&mut self) {
        self.hotkey = None;
        remove_mode(&mut self.modes, TriggerMode::Hotkey);
        self.touch();
    }

    pub fn add_abbreviation(&mut self, abbreviation: impl Into<String>) -> Result<()> {
        add_abbreviation_to(
            &mut self.abbreviations,
            &mut self.modes,
            abbreviation.into(),
        )?;
        self.touch();
        Ok(())
    }

    pub fn set_window_titles(&mut self, pattern: &str) -> Result<()> {
        validate_filter_pattern(pattern)?;
        self.filter.pattern = Some(pattern.to_string());
        self.touch();
        Ok(())
    }

    pub fn clear_window_titles(&mut self) {
        self.filter.pattern = None;
        self.touch();
    }

    pub fn set_filter_recursive(&mut self, recursive: bool) {
        self.filter.recursive = recursive;
    }

    pub fn touch(&mut self) {
        self.modified_at = Utc::now();
    }
}

/// Either kind of configurable item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Item {
    Phrase(Phrase),
    Script(Script),
}

impl Item {
    pub fn description(&self) -> &str {
        match self {
            Item::Phrase(p) => &p.description,
            Item::Script(s) => &s.description,
        }
    }

    pub fn abbreviations(&self) -> &[String] {
        match self {
            Item::Phrase(p) => &p.abbreviations,
            Item::Script(s) => &s.abbreviations,
        }
    }

    pub fn hotkey(&self) -> Option<&Hotkey> {
        match self {
            Item::Phrase(p) => p.hotkey.as_ref(),
            Item::Script(s) => s.hotkey.as_ref(),
        }
    }

    pub fn modes(&self) -> &[TriggerMode] {
        match self {
            Item::Phrase(p) => &p.modes,
            Item::Script(s) => &s.modes,
        }
    }

    pub fn is_temporary(&self) -> bool {
        match self {
            Item::Phrase(p) => p.temporary,
            Item::Script(s) => s.temporary,
        }
    }

    pub fn set_hotkey(&mut self, hotkey: Hotkey) {
        match self {
            Item::Phrase(p) => p.set_hotkey(hotkey),
            Item::Script(s) => s.set_hotkey(hotkey),
        }
    }

    pub fn unset_hotkey(&mut self) {
        match self {
            Item::Phrase(p) => p.unset_hotkey(),
            Item::Script(s) => s.unset_hotkey(),
        }
    }

    pub fn set_window_titles(&mut self, pattern: &str) -> Result<()> {
        match self {
            Item::Phrase(p) => p.set_window_titles(pattern),
            Item::Script(s) => s.set_window_titles(pattern),
        }
    }

    pub fn clear_window_titles(&mut self) {
        match self {
            Item::Phrase(p) => p.clear_window_titles(),
            Item::Script(s) => s.clear_window_titles(),
        }
    }

    pub fn set_filter_recursive(&mut self, recursive: bool) {
        match self {
            Item::Phrase(p) => p.set_filter_recursive(recursive),
            Item::Script(s) => s.set_filter_recursive(recursive),
        }
    }

    pub fn as_script(&self) -> Option<&Script> {
        match self {
            Item::Script(s) => Some(s),
            Item::Phrase(_) => None,
        }
    }
}

/// A folder of items and subfolders. Folders can carry their own trigger
/// surface: triggering a folder shows a popup menu of its contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub title: String,
    #[serde(default)]
    pub modes: Vec<TriggerMode>,
    #[serde(default)]
    pub abbreviations: Vec<String>,
    #[serde(default)]
    pub hotkey: Option<Hotkey>,
    #[serde(default)]
    pub filter: WindowFilter,
    #[serde(default)]
    pub show_in_tray_menu: bool,
    #[serde(skip)]
    pub temporary: bool,
    // Children come from the directory structure, not the folder document.
    #[serde(skip)]
    pub items: Vec<Item>,
    #[serde(skip)]
    pub folders: Vec<Folder>,
}

impl Folder {
    pub fn new(title: impl Into<String>) -> Self {
        Folder {
            title: title.into(),
            modes: Vec::new(),
            abbreviations: Vec::new(),
            hotkey: None,
            filter: WindowFilter::default(),
            show_in_tray_menu: false,
            temporary: false,
            items: Vec::new(),
            folders: Vec::new(),
        }
    }

    pub fn add_item(&mut self, item: Item) {
        self.items.push(item);
    }

    pub fn add_folder(&mut self, folder: Folder) {
        self.folders.push(folder);
    }

    pub fn set_hotkey(&mut self, hotkey: Hotkey) {
        self.hotkey = Some(hotkey);
        add_mode(&mut self.modes, TriggerMode::Hotkey);
    }

    pub fn unset_hotkey(&mut self) {
        self.hotkey = None;
        remove_mode(&mut self.modes, TriggerMode::Hotkey);
    }

    pub fn add_abbreviation(&mut self, abbreviation: impl Into<String>) -> Result<()> {
        add_abbreviation_to(
            &mut self.abbreviations,
            &mut self.modes,
            abbreviation.into(),
        )
    }

    pub fn set_window_titles(&mut self, pattern: &str) -> Result<()> {
        validate_filter_pattern(pattern)?;
        self.filter.pattern = Some(pattern.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Key;

    #[test]
    fn hotkey_tracks_trigger_mode() {
        let mut phrase = Phrase::new("sig", "Regards,\nSam");
        assert!(!phrase.modes.contains(&TriggerMode::Hotkey));

        phrase.set_hotkey(Hotkey::new(vec![Key::Control], Key::Char('s')).unwrap());
        assert!(phrase.modes.contains(&TriggerMode::Hotkey));

        phrase.unset_hotkey();
        assert!(!phrase.modes.contains(&TriggerMode::Hotkey));
        assert!(phrase.hotkey.is_none());
    }

    #[test]
    fn abbreviation_tracks_trigger_mode() {
        let mut phrase = Phrase::new("addr", "12 Example Street");
        phrase.add_abbreviation("adr").unwrap();
        assert!(phrase.modes.contains(&TriggerMode::Abbreviation));
        assert_eq!(phrase.abbreviations, vec!["adr"]);
    }

    #[test]
    fn duplicate_abbreviation_within_item_is_rejected() {
        let mut phrase = Phrase::new("addr", "12 Example Street");
        phrase.add_abbreviation("adr").unwrap();
        assert!(phrase.add_abbreviation("adr").is_err());
    }

    #[test]
    fn empty_abbreviation_is_rejected() {
        let mut phrase = Phrase::new("addr", "12 Example Street");
        assert!(phrase.add_abbreviation("").is_err());
    }

    #[test]
    fn invalid_window_filter_is_rejected() {
        let mut phrase = Phrase::new("term only", "ls -la");
        assert!(phrase.set_window_titles("(unclosed").is_err());
        assert!(phrase.filter.pattern.is_none());

        phrase.set_window_titles(r"konsole\.Konsole").unwrap();
        assert!(phrase.filter.regex().is_some());
    }

    #[test]
    fn item_serde_is_tagged_by_kind() {
        let item = Item::Phrase(Phrase::new("sig", "Regards"));
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains(r#""type":"phrase""#));

        let back: Item = serde_json::from_str(&json).unwrap();
        assert_eq!(back.description(), "sig");
    }

    #[test]
    fn temporary_flag_is_not_persisted() {
        let mut phrase = Phrase::new("tmp", "scratch");
        phrase.temporary = true;
        let json = serde_json::to_string(&phrase).unwrap();
        let back: Phrase = serde_json::from_str(&json).unwrap();
        assert!(!back.temporary);
    }
}
