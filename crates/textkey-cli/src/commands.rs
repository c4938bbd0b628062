use crate::cli::Commands;
use textkey_core::models::{Folder, Item, Script};
use textkey_core::{ConfigManager, Hotkey, Result, TextkeyError};
use textkey_engine::{Engine, LogRunner, PhraseOptions};

use crate::bridge::hotkey_display;

pub fn handle_command(command: Option<Commands>) -> Result<()> {
    let config = ConfigManager::load_default()?;
    let mut engine = Engine::new(config, Box::new(LogRunner));

    match command {
        Some(command) => handle_subcommand(&mut engine, command),
        // Default: show the configuration tree when no command is given
        None => list_tree(engine.config()),
    }
}

fn handle_subcommand(engine: &mut Engine, command: Commands) -> Result<()> {
    match command {
        Commands::AddFolder { title, parent } => {
            let parent_ref = match parent {
                Some(parent_title) => Some(engine.get_folder(&parent_title).ok_or_else(|| {
                    TextkeyError::Other(format!("no folder titled '{}'", parent_title))
                })?),
                None => None,
            };
            engine.create_folder(&title, parent_ref.as_ref(), false)?;
            println!("Folder '{}' created", title);
            Ok(())
        }
        Commands::AddPhrase {
            folder,
            name,
            contents,
            abbreviation,
            modifier,
            key,
            filter,
            send_mode,
            tray,
            prompt,
        } => {
            let folder_ref = engine
                .get_folder(&folder)
                .ok_or_else(|| TextkeyError::Other(format!("no folder titled '{}'", folder)))?;

            let hotkey = match (modifier.as_slice(), key.as_deref()) {
                ([], None) => None,
                (_, None) => {
                    return Err(TextkeyError::InvalidHotkey(
                        "--modifier given without --key".to_string(),
                    ))
                }
                (modifiers, Some(key)) => {
                    let tokens: Vec<&str> = modifiers.iter().map(String::as_str).collect();
                    Some(Hotkey::parse(&tokens, key)?)
                }
            };

            let mut options = PhraseOptions::default()
                .with_abbreviations(abbreviation)
                .with_send_mode(send_mode.into())
                .with_show_in_system_tray(tray)
                .with_always_prompt(prompt);
            if let Some(hotkey) = hotkey {
                options = options.with_hotkey(hotkey);
            }
            if let Some(pattern) = filter {
                options = options.with_window_filter(pattern);
            }

            engine.create_phrase(&folder_ref, &name, &contents, options)?;
            println!("Phrase '{}' added to '{}'", name, folder);
            Ok(())
        }
        Commands::AddScript {
            folder,
            name,
            source,
        } => {
            let config = engine.config_mut();
            let parent = find_folder_mut(&mut config.folders, &folder)
                .ok_or_else(|| TextkeyError::Other(format!("no folder titled '{}'", folder)))?;
            if parent.temporary {
                return Err(TextkeyError::TemporaryParent(name));
            }
            parent.add_item(Item::Script(Script::new(&name, source)));
            config.config_altered(false)?;
            println!("Script '{}' added to '{}'", name, folder);
            Ok(())
        }
        Commands::Remove { folder, name } => {
            let config = engine.config_mut();
            let target = find_folder_mut(&mut config.folders, &folder)
                .ok_or_else(|| TextkeyError::Other(format!("no folder titled '{}'", folder)))?;
            let before = target.items.len();
            target.items.retain(|item| item.description() != name);
            if target.items.len() == before {
                return Err(TextkeyError::Other(format!(
                    "no item '{}' in folder '{}'",
                    name, folder
                )));
            }
            config.config_altered(false)?;
            println!("Item '{}' deleted from '{}'", name, folder);
            Ok(())
        }
        Commands::Show { folder, name } => show_item(engine.config(), &folder, &name),
        Commands::List => list_tree(engine.config()),
        Commands::RunScript { description } => {
            engine.run_script(&description)?;
            println!("Script '{}' dispatched", description);
            Ok(())
        }
        Commands::Backup => {
            engine.config().back_up_config()?;
            println!(
                "Configuration backed up to {}",
                engine.config().config_backup_path().display()
            );
            Ok(())
        }
        Commands::Restore => {
            engine.config().restore_backup_config()?;
            println!(
                "Configuration restored from {}",
                engine.config().config_backup_path().display()
            );
            Ok(())
        }
        Commands::Paths => {
            let config = engine.config();
            println!("config:  {}", config.config_file_path().display());
            println!("backup:  {}", config.config_backup_path().display());
            println!("data:    {}", config.data_dir().display());
            Ok(())
        }
    }
}

fn find_folder_mut<'a>(folders: &'a mut [Folder], title: &str) -> Option<&'a mut Folder> {
    for folder in folders {
        if folder.title == title {
            return Some(folder);
        }
        if let Some(found) = find_folder_mut(&mut folder.folders, title) {
            return Some(found);
        }
    }
    None
}

fn show_item(config: &ConfigManager, folder_title: &str, name: &str) -> Result<()> {
    let folder = config
        .get_folder(folder_title)
        .ok_or_else(|| TextkeyError::Other(format!("no folder titled '{}'", folder_title)))?;
    let item = folder
        .items
        .iter()
        .find(|item| item.description() == name)
        .ok_or_else(|| {
            TextkeyError::Other(format!("no item '{}' in folder '{}'", name, folder_title))
        })?;

    match item {
        Item::Phrase(phrase) => {
            println!("phrase: {}", phrase.description);
            println!("contents:\n{}", phrase.contents);
            if !phrase.abbreviations.is_empty() {
                println!("abbreviations: {}", phrase.abbreviations.join(", "));
            }
            if let Some(hotkey) = &phrase.hotkey {
                println!("hotkey: {}", hotkey_display(hotkey));
            }
            if let Some(pattern) = &phrase.filter.pattern {
                println!("window filter: {}", pattern);
            }
        }
        Item::Script(script) => {
            println!("script: {}", script.description);
            println!("source:\n{}", script.source);
            if !script.abbreviations.is_empty() {
                println!("abbreviations: {}", script.abbreviations.join(", "));
            }
            if let Some(hotkey) = &script.hotkey {
                println!("hotkey: {}", hotkey_display(hotkey));
            }
        }
    }
    Ok(())
}

fn list_tree(config: &ConfigManager) -> Result<()> {
    if config.folders.is_empty() {
        println!("No folders configured yet. Try 'textkey add-folder <title>'.");
        return Ok(());
    }
    for folder in &config.folders {
        print_folder(folder, 0);
    }
    Ok(())
}

fn print_folder(folder: &Folder, depth: usize) {
    let indent = "  ".repeat(depth);
    println!("{}{}/", indent, folder.title);
    for item in &folder.items {
        let kind = match item {
            Item::Phrase(_) => "phrase",
            Item::Script(_) => "script",
        };
        let mut line = format!("{}  {} ({})", indent, item.description(), kind);
        if !item.abbreviations().is_empty() {
            line.push_str(&format!(" [abbr: {}]", item.abbreviations().join(", ")));
        }
        if let Some(hotkey) = item.hotkey() {
            line.push_str(&format!(" [hotkey: {}]", hotkey_display(hotkey)));
        }
        println!("{}", line);
    }
    for child in &folder.folders {
        print_folder(child, depth + 1);
    }
}
