use crate::runner::ScriptRunner;
use std::collections::HashMap;
use textkey_core::configmanager::ConfigManager;
use textkey_core::error::{Result, TextkeyError};
use textkey_core::key::{Hotkey, Key};
use textkey_core::models::{Folder, Item, Phrase, SendMode};

/// Handle to a folder in the configuration tree.
///
/// Stores the title path from the root and is resolved by traversal on
/// every use, so the tree can change between calls. Where several sibling
/// folders share a title, the first match wins, matching `get_folder`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderRef {
    path: Vec<String>,
}

impl FolderRef {
    fn from_path(path: Vec<String>) -> Self {
        FolderRef { path }
    }

    fn child(&self, title: &str) -> Self {
        let mut path = self.path.clone();
        path.push(title.to_string());
        FolderRef { path }
    }

    /// Title of the referenced folder.
    pub fn title(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or("")
    }
}

/// Optional settings for `Engine::create_phrase`.
#[derive(Debug, Clone, Default)]
pub struct PhraseOptions {
    pub abbreviations: Vec<String>,
    pub hotkey: Option<Hotkey>,
    pub send_mode: SendMode,
    pub window_filter: Option<String>,
    pub show_in_system_tray: bool,
    pub always_prompt: bool,
    pub temporary: bool,
}

impl PhraseOptions {
    pub fn with_abbreviation(mut self, abbreviation: impl Into<String>) -> Self {
        self.abbreviations.push(abbreviation.into());
        self
    }

    pub fn with_abbreviations<I, S>(mut self, abbreviations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.abbreviations
            .extend(abbreviations.into_iter().map(Into::into));
        self
    }

    pub fn with_hotkey(mut self, hotkey: Hotkey) -> Self {
        self.hotkey = Some(hotkey);
        self
    }

    pub fn with_send_mode(mut self, send_mode: SendMode) -> Self {
        self.send_mode = send_mode;
        self
    }

    pub fn with_window_filter(mut self, pattern: impl Into<String>) -> Self {
        self.window_filter = Some(pattern.into());
        self
    }

    pub fn with_show_in_system_tray(mut self, show: bool) -> Self {
        self.show_in_system_tray = show;
        self
    }

    pub fn with_always_prompt(mut self, prompt: bool) -> Self {
        self.always_prompt = prompt;
        self
    }

    pub fn with_temporary(mut self, temporary: bool) -> Self {
        self.temporary = temporary;
        self
    }
}

/// Programmatic access to the configuration: the API scripts are given.
pub struct Engine {
    config: ConfigManager,
    runner: Box<dyn ScriptRunner>,
    macro_args: Vec<String>,
    return_value: String,
    triggered_abbreviation: Option<(String, String)>,
}

impl Engine {
    pub fn new(config: ConfigManager, runner: Box<dyn ScriptRunner>) -> Self {
        Engine {
            config,
            runner,
            macro_args: Vec::new(),
            return_value: String::new(),
            triggered_abbreviation: None,
        }
    }

    pub fn config(&self) -> &ConfigManager {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ConfigManager {
        &mut self.config
    }

    pub fn into_config(self) -> ConfigManager {
        self.config
    }

    /// Retrieve a folder by its title. If more than one folder has the same
    /// title, only the first match is returned.
    pub fn get_folder(&self, title: &str) -> Option<FolderRef> {
        let mut prefix = Vec::new();
        find_path(&self.config.folders, title, &mut prefix).map(FolderRef::from_path)
    }

    /// Create and return a new folder.
    ///
    /// If a folder of that title already exists under the same parent, it
    /// is returned unchanged; its `temporary` flag is not touched so an
    /// existing folder is never accidentally made volatile.
    pub fn create_folder(
        &mut self,
        title: &str,
        parent: Option<&FolderRef>,
        temporary: bool,
    ) -> Result<FolderRef> {
        let (existing, parent_temporary) = match parent {
            None => (
                self.config.folders.iter().any(|f| f.title == title),
                false,
            ),
            Some(parent_ref) => {
                let parent_folder = self
                    .resolve(parent_ref)
                    .ok_or(TextkeyError::FolderNotFound)?;
                (
                    parent_folder.folders.iter().any(|f| f.title == title),
                    parent_folder.temporary,
                )
            }
        };

        let folder_ref = match parent {
            None => FolderRef::from_path(vec![title.to_string()]),
            Some(parent_ref) => parent_ref.child(title),
        };

        if existing {
            return Ok(folder_ref);
        }
        if parent_temporary && !temporary {
            return Err(TextkeyError::TemporaryParent(title.to_string()));
        }

        let mut folder = Folder::new(title);
        folder.temporary = temporary;
        match parent {
            None => self.config.folders.push(folder),
            Some(parent_ref) => {
                self.resolve_mut(parent_ref)
                    .ok_or(TextkeyError::FolderNotFound)?
                    .add_folder(folder);
            }
        }

        if !temporary {
            self.config.config_altered(false)?;
        }
        Ok(folder_ref)
    }

    /// Create a new phrase inside the given folder.
    ///
    /// Validation happens before anything is attached to the tree: shape
    /// checks (abbreviation strings, window-filter regex) first, then
    /// uniqueness of every abbreviation and of the hotkey, then the rule
    /// that items inside a temporary folder must themselves be temporary.
    pub fn create_phrase(
        &mut self,
        folder: &FolderRef,
        name: &str,
        contents: &str,
        options: PhraseOptions,
    ) -> Result<()> {
        let mut phrase = Phrase::new(name, contents);
        phrase.send_mode = options.send_mode;
        phrase.add_abbreviations(options.abbreviations.iter().cloned())?;
        if let Some(pattern) = &options.window_filter {
            phrase.set_window_titles(pattern)?;
        }

        for abbreviation in &options.abbreviations {
            if !self.config.check_abbreviation_unique(abbreviation, None) {
                return Err(TextkeyError::AbbreviationInUse(abbreviation.clone()));
            }
        }
        if let Some(hotkey) = &options.hotkey {
            if !self
                .config
                .check_hotkey_unique(hotkey.modifiers(), hotkey.key(), None)
            {
                return Err(TextkeyError::HotkeyInUse(hotkey.to_string()));
            }
            phrase.set_hotkey(hotkey.clone());
        }

        phrase.show_in_tray_menu = options.show_in_system_tray;
        phrase.prompt = options.always_prompt;
        phrase.temporary = options.temporary;

        let target = self
            .resolve_mut(folder)
            .ok_or(TextkeyError::FolderNotFound)?;
        if target.temporary && !options.temporary {
            return Err(TextkeyError::TemporaryParent(name.to_string()));
        }
        target.add_item(Item::Phrase(phrase));

        self.config.config_altered(false)
    }

    /// Create a phrase triggered by a single abbreviation.
    ///
    /// Convenience wrapper over `create_phrase`.
    pub fn create_abbreviation(
        &mut self,
        folder: &FolderRef,
        description: &str,
        abbreviation: &str,
        contents: &str,
    ) -> Result<()> {
        self.create_phrase(
            folder,
            description,
            contents,
            PhraseOptions::default().with_abbreviation(abbreviation),
        )
    }

    /// Create a phrase triggered by a hotkey.
    ///
    /// Convenience wrapper over `create_phrase`.
    pub fn create_hotkey(
        &mut self,
        folder: &FolderRef,
        description: &str,
        modifiers: Vec<Key>,
        key: Key,
        contents: &str,
    ) -> Result<()> {
        let hotkey = Hotkey::new(modifiers, key)?;
        self.create_phrase(
            folder,
            description,
            contents,
            PhraseOptions::default().with_hotkey(hotkey),
        )
    }

    /// Run an existing script, looked up by its description.
    ///
    /// If several scripts share the description, the last one wins.
    pub fn run_script(&mut self, description: &str) -> Result<()> {
        let script = self
            .config
            .all_items()
            .into_iter()
            .filter_map(Item::as_script)
            .filter(|s| s.description == description)
            .next_back()
            .cloned()
            .ok_or_else(|| TextkeyError::ScriptNotFound(description.to_string()))?;

        let args = self.macro_args.clone();
        self.runner.run(&script, &args)
    }

    /// Used by phrase macros: store the supplied arguments and run the
    /// named script, recording failures as the macro return value.
    pub fn run_script_from_macro(&mut self, args: &HashMap<String, String>) {
        let raw = args.get("args").map(String::as_str).unwrap_or("");
        self.macro_args = if raw.is_empty() {
            Vec::new()
        } else {
            raw.split(',').map(str::to_string).collect()
        };

        let name = args.get("name").map(String::as_str).unwrap_or("");
        if let Err(e) = self.run_script(name) {
            self.set_return_value(format!("{{ERROR: {}}}", e));
        }
    }

    /// Arguments supplied to the current script via its macro.
    pub fn get_macro_arguments(&self) -> &[String] {
        &self.macro_args
    }

    /// Store a return value to be picked up by a phrase macro.
    pub fn set_return_value(&mut self, value: impl Into<String>) {
        self.return_value = value.into();
    }

    /// Take the stored return value, leaving it cleared.
    pub fn take_return_value(&mut self) -> String {
        std::mem::take(&mut self.return_value)
    }

    /// Record the abbreviation (and the character that completed it) that
    /// caused the current script to run.
    pub fn set_triggered_abbreviation(
        &mut self,
        abbreviation: impl Into<String>,
        trigger_character: impl Into<String>,
    ) {
        self.triggered_abbreviation = Some((abbreviation.into(), trigger_character.into()));
    }

    /// The abbreviation that triggered the current script, if any, together
    /// with the trigger character (empty for immediate abbreviations).
    /// `None` when the script was started by a hotkey or menu entry.
    pub fn get_triggered_abbreviation(&self) -> Option<(&str, &str)> {
        self.triggered_abbreviation
            .as_ref()
            .map(|(a, c)| (a.as_str(), c.as_str()))
    }

    /// Drop all temporary folders and items created through this API.
    pub fn remove_all_temporary(&mut self) -> Result<()> {
        self.config.remove_all_temporary();
        self.config.config_altered(false)
    }

    fn resolve(&self, folder: &FolderRef) -> Option<&Folder> {
        resolve_path(&self.config.folders, &folder.path)
    }

    fn resolve_mut(&mut self, folder: &FolderRef) -> Option<&mut Folder> {
        resolve_path_mut(&mut self.config.folders, &folder.path)
    }
}

fn resolve_path<'a>(level: &'a [Folder], path: &[String]) -> Option<&'a Folder> {
    let (first, rest) = path.split_first()?;
    let folder = level.iter().find(|f| &f.title == first)?;
    if rest.is_empty() {
        Some(folder)
    } else {
        resolve_path(&folder.folders, rest)
    }
}

fn resolve_path_mut<'a>(level: &'a mut [Folder], path: &[String]) -> Option<&'a mut Folder> {
    let (first, rest) = path.split_first()?;
    let folder = level.iter_mut().find(|f| &f.title == first)?;
    if rest.is_empty() {
        Some(folder)
    } else {
        resolve_path_mut(&mut folder.folders, rest)
    }
}

// Pre-order search mirroring the all-folders iteration order.
fn find_path(folders: &[Folder], title: &str, prefix: &mut Vec<String>) -> Option<Vec<String>> {
    for folder in folders {
        prefix.push(folder.title.clone());
        if folder.title == title {
            return Some(prefix.clone());
        }
        if let Some(path) = find_path(&folder.folders, title, prefix) {
            return Some(path);
        }
        prefix.pop();
    }
    None
}
