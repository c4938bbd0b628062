use std::fs;
use tempfile::tempdir;
use textkey_core::models::{Item, Phrase};
use textkey_core::{ConfigManager, Hotkey, Key, DEFAULT_FOLDER_TITLE};

#[test]
fn configuration_survives_reload() {
    let dir = tempdir().unwrap();
    let mut manager = ConfigManager::load(dir.path()).unwrap();

    let mut phrase = Phrase::new("signature", "Regards,\nSam");
    phrase.add_abbreviation("sig").unwrap();
    phrase.set_hotkey(Hotkey::new(vec![Key::Control], Key::Char('s')).unwrap());
    manager.folders[0].add_item(Item::Phrase(phrase));
    manager.config_altered(true).unwrap();

    let reloaded = ConfigManager::load(dir.path()).unwrap();
    let folder = reloaded.get_folder(DEFAULT_FOLDER_TITLE).unwrap();
    assert_eq!(folder.items.len(), 1);
    assert_eq!(folder.items[0].description(), "signature");
    assert_eq!(folder.items[0].abbreviations(), ["sig"]);
    assert!(reloaded
        .get_item_with_hotkey(&[Key::Control], Key::Char('s'))
        .is_some());
    assert!(!reloaded.check_abbreviation_unique("sig", None));
}

#[test]
fn save_refreshes_backup_with_previous_config() {
    let dir = tempdir().unwrap();
    let mut manager = ConfigManager::load(dir.path()).unwrap();

    manager.settings.prompt_to_save = true;
    manager.save().unwrap();

    // The backup holds the configuration as it was before this save.
    let backup = fs::read_to_string(manager.config_backup_path()).unwrap();
    assert!(backup.contains("\"prompt_to_save\": false"));
    let current = fs::read_to_string(manager.config_file_path()).unwrap();
    assert!(current.contains("\"prompt_to_save\": true"));
}
