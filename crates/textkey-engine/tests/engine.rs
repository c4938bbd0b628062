use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tempfile::{tempdir, TempDir};
use textkey_core::models::{Item, Script, SendMode, TriggerMode};
use textkey_core::{ConfigManager, Hotkey, Key, Result, TextkeyError, DEFAULT_FOLDER_TITLE};
use textkey_engine::{Engine, LogRunner, PhraseOptions, ScriptRunner};

/// Runner that records every dispatched script for assertions.
#[derive(Default)]
struct RecordingRunner {
    calls: Arc<Mutex<Vec<(String, Vec<String>)>>>,
}

impl ScriptRunner for RecordingRunner {
    fn run(&mut self, script: &Script, args: &[String]) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((script.description.clone(), args.to_vec()));
        Ok(())
    }
}

fn create_engine() -> (TempDir, Engine) {
    let dir = tempdir().unwrap();
    let config = ConfigManager::load(dir.path()).unwrap();
    (dir, Engine::new(config, Box::new(LogRunner)))
}

fn default_folder(engine: &Engine) -> textkey_engine::FolderRef {
    engine.get_folder(DEFAULT_FOLDER_TITLE).unwrap()
}

#[test]
fn create_folder_and_get_folder() {
    let (_dir, mut engine) = create_engine();
    let email = engine.create_folder("Email", None, false).unwrap();
    assert_eq!(email.title(), "Email");
    assert!(engine.get_folder("Email").is_some());
    assert!(engine.get_folder("Missing").is_none());
}

#[test]
fn create_existing_folder_returns_it_unchanged() {
    let (_dir, mut engine) = create_engine();
    engine.create_folder("Email", None, false).unwrap();
    engine.create_folder("Email", None, false).unwrap();
    let top_titles: Vec<_> = engine
        .config()
        .folders
        .iter()
        .map(|f| f.title.as_str())
        .collect();
    assert_eq!(top_titles, vec![DEFAULT_FOLDER_TITLE, "Email"]);
}

#[test]
fn existing_temporary_folder_keeps_its_flag() {
    let (_dir, mut engine) = create_engine();
    engine.create_folder("Scratch", None, true).unwrap();
    // Asking again with temporary=false must not persist the folder.
    engine.create_folder("Scratch", None, false).unwrap();
    assert!(engine.config().get_folder("Scratch").unwrap().temporary);
}

#[test]
fn nested_folders_resolve_through_refs() {
    let (_dir, mut engine) = create_engine();
    let email = engine.create_folder("Email", None, false).unwrap();
    let work = engine.create_folder("Work", Some(&email), false).unwrap();
    engine
        .create_phrase(&work, "standup", "Nothing to report", PhraseOptions::default())
        .unwrap();

    let found = engine.get_folder("Work").unwrap();
    assert_eq!(found, work);
    let folder = engine.config().get_folder("Work").unwrap();
    assert_eq!(folder.items[0].description(), "standup");
}

#[test]
fn non_temporary_folder_under_temporary_parent_is_rejected() {
    let (_dir, mut engine) = create_engine();
    let scratch = engine.create_folder("Scratch", None, true).unwrap();
    let result = engine.create_folder("Inner", Some(&scratch), false);
    assert!(matches!(result, Err(TextkeyError::TemporaryParent(_))));
    // Temporary children are fine.
    engine.create_folder("Inner", Some(&scratch), true).unwrap();
}

#[test]
fn create_phrase_with_all_options() {
    let (dir, mut engine) = create_engine();
    let folder = default_folder(&engine);
    let hotkey = Hotkey::parse(&["<ctrl>", "<alt>"], "9").unwrap();
    engine
        .create_phrase(
            &folder,
            "My new Phrase",
            "This is the Phrase content",
            PhraseOptions::default()
                .with_abbreviations(["abc", "def"])
                .with_hotkey(hotkey.clone())
                .with_send_mode(SendMode::CbCtrlShiftV)
                .with_window_filter(r"konsole\.Konsole")
                .with_show_in_system_tray(true)
                .with_always_prompt(true),
        )
        .unwrap();

    let folder = engine.config().get_folder(DEFAULT_FOLDER_TITLE).unwrap();
    let phrase = match &folder.items[0] {
        Item::Phrase(p) => p,
        other => panic!("expected a phrase, got {:?}", other),
    };
    assert_eq!(phrase.abbreviations, vec!["abc", "def"]);
    assert_eq!(phrase.hotkey.as_ref(), Some(&hotkey));
    assert_eq!(phrase.send_mode, SendMode::CbCtrlShiftV);
    assert!(phrase.show_in_tray_menu);
    assert!(phrase.prompt);
    assert!(phrase.modes.contains(&TriggerMode::Abbreviation));
    assert!(phrase.modes.contains(&TriggerMode::Hotkey));

    // Persisted as an individual document inside the folder's directory.
    let doc = dir
        .path()
        .join("data")
        .join(DEFAULT_FOLDER_TITLE)
        .join("My new Phrase.json");
    assert!(doc.exists());
}

#[test]
fn duplicate_abbreviation_is_rejected() {
    let (_dir, mut engine) = create_engine();
    let folder = default_folder(&engine);
    engine
        .create_abbreviation(&folder, "address", "adr", "12 Example Street")
        .unwrap();

    let result = engine.create_phrase(
        &folder,
        "other",
        "contents",
        PhraseOptions::default().with_abbreviation("adr"),
    );
    assert!(matches!(result, Err(TextkeyError::AbbreviationInUse(a)) if a == "adr"));
}

#[test]
fn duplicate_hotkey_is_rejected_regardless_of_modifier_order() {
    let (_dir, mut engine) = create_engine();
    let folder = default_folder(&engine);
    engine
        .create_hotkey(
            &folder,
            "first",
            vec![Key::Control, Key::Alt],
            Key::Char('9'),
            "one",
        )
        .unwrap();

    let result = engine.create_hotkey(
        &folder,
        "second",
        vec![Key::Alt, Key::Control],
        Key::Char('9'),
        "two",
    );
    assert!(matches!(result, Err(TextkeyError::HotkeyInUse(_))));
}

#[test]
fn global_hotkey_collision_is_rejected() {
    let (_dir, mut engine) = create_engine();
    let folder = default_folder(&engine);
    // <ctrl>+<shift>+k is the default toggle-service binding.
    let result = engine.create_hotkey(
        &folder,
        "clash",
        vec![Key::Control, Key::Shift],
        Key::Char('k'),
        "contents",
    );
    assert!(matches!(result, Err(TextkeyError::HotkeyInUse(_))));
}

#[test]
fn invalid_window_filter_is_rejected() {
    let (_dir, mut engine) = create_engine();
    let folder = default_folder(&engine);
    let result = engine.create_phrase(
        &folder,
        "broken",
        "contents",
        PhraseOptions::default().with_window_filter("(unclosed"),
    );
    assert!(matches!(
        result,
        Err(TextkeyError::InvalidWindowFilter { .. })
    ));
    assert!(engine.config().all_items().is_empty());
}

#[test]
fn empty_abbreviation_is_rejected() {
    let (_dir, mut engine) = create_engine();
    let folder = default_folder(&engine);
    let result = engine.create_phrase(
        &folder,
        "broken",
        "contents",
        PhraseOptions::default().with_abbreviation(""),
    );
    assert!(matches!(result, Err(TextkeyError::InvalidAbbreviation(_))));
}

#[test]
fn non_temporary_phrase_in_temporary_folder_is_rejected() {
    let (_dir, mut engine) = create_engine();
    let scratch = engine.create_folder("Scratch", None, true).unwrap();
    let result = engine.create_phrase(&scratch, "p", "contents", PhraseOptions::default());
    assert!(matches!(result, Err(TextkeyError::TemporaryParent(_))));

    engine
        .create_phrase(
            &scratch,
            "p",
            "contents",
            PhraseOptions::default().with_temporary(true),
        )
        .unwrap();
}

#[test]
fn temporary_phrase_is_not_persisted() {
    let (dir, mut engine) = create_engine();
    let folder = default_folder(&engine);
    engine
        .create_phrase(
            &folder,
            "scratch",
            "gone on reload",
            PhraseOptions::default().with_temporary(true),
        )
        .unwrap();

    let doc = dir
        .path()
        .join("data")
        .join(DEFAULT_FOLDER_TITLE)
        .join("scratch.json");
    assert!(!doc.exists());

    let reloaded = ConfigManager::load(dir.path()).unwrap();
    assert!(reloaded.all_items().is_empty());
}

#[test]
fn remove_all_temporary_clears_scratch_state() {
    let (_dir, mut engine) = create_engine();
    let folder = default_folder(&engine);
    engine.create_folder("Scratch", None, true).unwrap();
    engine
        .create_phrase(
            &folder,
            "tmp",
            "contents",
            PhraseOptions::default().with_temporary(true),
        )
        .unwrap();

    engine.remove_all_temporary().unwrap();
    assert!(engine.get_folder("Scratch").is_none());
    assert!(engine.config().all_items().is_empty());
}

#[test]
fn run_script_dispatches_to_the_runner() {
    let dir = tempdir().unwrap();
    let mut config = ConfigManager::load(dir.path()).unwrap();
    config.folders[0].add_item(Item::Script(Script::new("cleanup", "print('hi')")));

    let runner = RecordingRunner::default();
    let calls = runner.calls.clone();
    let mut engine = Engine::new(config, Box::new(runner));

    engine.run_script("cleanup").unwrap();
    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "cleanup");
    assert!(calls[0].1.is_empty());
}

#[test]
fn run_script_with_unknown_description_fails() {
    let (_dir, mut engine) = create_engine();
    let result = engine.run_script("missing");
    assert!(matches!(result, Err(TextkeyError::ScriptNotFound(d)) if d == "missing"));
}

#[test]
fn run_script_from_macro_passes_arguments() {
    let dir = tempdir().unwrap();
    let mut config = ConfigManager::load(dir.path()).unwrap();
    config.folders[0].add_item(Item::Script(Script::new("greet", "print('hi')")));

    let runner = RecordingRunner::default();
    let calls = runner.calls.clone();
    let mut engine = Engine::new(config, Box::new(runner));

    let mut args = HashMap::new();
    args.insert("name".to_string(), "greet".to_string());
    args.insert("args".to_string(), "one,two".to_string());
    engine.run_script_from_macro(&args);

    assert_eq!(engine.get_macro_arguments(), ["one", "two"]);
    assert_eq!(calls.lock().unwrap()[0].1, vec!["one", "two"]);
    assert_eq!(engine.take_return_value(), "");
}

#[test]
fn run_script_from_macro_records_failures() {
    let (_dir, mut engine) = create_engine();
    let mut args = HashMap::new();
    args.insert("name".to_string(), "missing".to_string());
    args.insert("args".to_string(), String::new());
    engine.run_script_from_macro(&args);

    let value = engine.take_return_value();
    assert!(value.starts_with("{ERROR:"));
    // Taking the value clears it.
    assert_eq!(engine.take_return_value(), "");
}

#[test]
fn triggered_abbreviation_is_reported() {
    let (_dir, mut engine) = create_engine();
    assert!(engine.get_triggered_abbreviation().is_none());

    engine.set_triggered_abbreviation("adr", " ");
    assert_eq!(engine.get_triggered_abbreviation(), Some(("adr", " ")));
}
