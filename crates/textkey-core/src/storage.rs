use crate::error::Result;
use crate::models::{Folder, Item};
use log::warn;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Document holding a folder's own settings inside its directory.
pub const FOLDER_FILENAME: &str = ".folder.json";

/// Turn an entity title into a safe file or directory name.
///
/// Path separators and control characters are replaced, a leading dot is
/// escaped so item documents cannot collide with `.folder.json`, and an
/// empty result falls back to a placeholder.
pub fn sanitize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '/' | '\\' => out.push('_'),
            c if c.is_control() => out.push('_'),
            c => out.push(c),
        }
    }
    if let Some(stripped) = out.strip_prefix('.') {
        out = format!("_{}", stripped);
    }
    if out.is_empty() {
        out = "unnamed".to_string();
    }
    out
}

// Picks a name not yet used in this directory scan, suffixing duplicates.
fn unique_name(base: &str, used: &mut HashSet<String>) -> String {
    if used.insert(base.to_string()) {
        return base.to_string();
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}-{}", base, n);
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Write one item as an individual JSON document inside `folder_dir`.
pub fn save_item(folder_dir: &Path, item: &Item) -> Result<PathBuf> {
    let path = item_file_path(folder_dir, item);
    let serialized = serde_json::to_string_pretty(item)?;
    fs::write(&path, serialized)?;
    Ok(path)
}

/// Default document path for an item inside its folder's directory.
pub fn item_file_path(folder_dir: &Path, item: &Item) -> PathBuf {
    folder_dir.join(format!("{}.json", sanitize_name(item.description())))
}

/// Remove the document for an item, if present.
pub fn delete_item_file(folder_dir: &Path, item: &Item) -> Result<()> {
    let path = item_file_path(folder_dir, item);
    if path.exists() {
        fs::remove_file(&path)?;
    }
    Ok(())
}

/// Remove a folder's directory and every document under it, if present.
pub fn delete_folder_dir(base: &Path, folder: &Folder) -> Result<()> {
    let dir = base.join(sanitize_name(&folder.title));
    if dir.exists() {
        fs::remove_dir_all(&dir)?;
    }
    Ok(())
}

/// Write a folder and everything under it beneath `base`, one JSON document
/// per entity. Temporary folders and items are not written.
///
/// Returns the folder's directory path, or `None` if the folder was
/// temporary and nothing was written.
pub fn save_folder(base: &Path, folder: &Folder) -> Result<Option<PathBuf>> {
    let mut used = HashSet::new();
    save_folder_with(base, folder, &mut used)
}

fn save_folder_with(
    base: &Path,
    folder: &Folder,
    sibling_names: &mut HashSet<String>,
) -> Result<Option<PathBuf>> {
    if folder.temporary {
        return Ok(None);
    }

    let dir_name = unique_name(&sanitize_name(&folder.title), sibling_names);
    let dir = base.join(dir_name);
    fs::create_dir_all(&dir)?;

    let serialized = serde_json::to_string_pretty(folder)?;
    fs::write(dir.join(FOLDER_FILENAME), serialized)?;

    let mut used = HashSet::new();
    for item in &folder.items {
        if item.is_temporary() {
            continue;
        }
        let name = unique_name(&sanitize_name(item.description()), &mut used);
        let serialized = serde_json::to_string_pretty(item)?;
        fs::write(dir.join(format!("{}.json", name)), serialized)?;
    }

    for child in &folder.folders {
        save_folder_with(&dir, child, &mut used)?;
    }

    Ok(Some(dir))
}

/// Rewrite the whole data directory so it mirrors the in-memory tree.
///
/// The new tree is built in a sibling staging directory and swapped into
/// place only once every document has been written, so a failure mid-write
/// leaves the previous tree on disk.
pub fn sync_folders(data_dir: &Path, folders: &[Folder]) -> Result<()> {
    let staging = staging_dir(data_dir);
    if staging.exists() {
        fs::remove_dir_all(&staging)?;
    }
    fs::create_dir_all(&staging)?;

    let mut used = HashSet::new();
    for folder in folders {
        save_folder_with(&staging, folder, &mut used)?;
    }

    if data_dir.exists() {
        fs::remove_dir_all(data_dir)?;
    }
    fs::rename(&staging, data_dir)?;
    Ok(())
}

fn staging_dir(data_dir: &Path) -> PathBuf {
    let mut name = data_dir
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".new");
    data_dir.with_file_name(name)
}

/// Load the folder tree from the data directory.
///
/// A directory is a folder iff it contains a `.folder.json` document.
/// Malformed or unreadable documents are logged and skipped rather than
/// aborting the load, so one bad file does not take the whole tree down.
pub fn load_folders(data_dir: &Path) -> Result<Vec<Folder>> {
    if !data_dir.exists() {
        return Ok(Vec::new());
    }

    let mut folders = Vec::new();
    for path in sorted_entries(data_dir)? {
        if path.is_dir() && path.join(FOLDER_FILENAME).exists() {
            if let Some(folder) = load_folder(&path)? {
                folders.push(folder);
            }
        }
    }
    Ok(folders)
}

fn load_folder(dir: &Path) -> Result<Option<Folder>> {
    let folder_doc = dir.join(FOLDER_FILENAME);
    let content = fs::read_to_string(&folder_doc)?;
    let mut folder: Folder = match serde_json::from_str(&content) {
        Ok(folder) => folder,
        Err(e) => {
            warn!("skipping folder document {}: {}", folder_doc.display(), e);
            return Ok(None);
        }
    };

    for path in sorted_entries(dir)? {
        if path.is_dir() {
            if path.join(FOLDER_FILENAME).exists() {
                if let Some(child) = load_folder(&path)? {
                    folder.add_folder(child);
                }
            }
            continue;
        }

        if path.extension().map(|e| e == "json") != Some(true) {
            continue;
        }
        if path.file_name().map(|n| n == FOLDER_FILENAME) == Some(true) {
            continue;
        }

        match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Item>(&content) {
                Ok(item) => folder.add_item(item),
                Err(e) => warn!("skipping item document {}: {}", path.display(), e),
            },
            Err(e) => warn!("skipping unreadable document {}: {}", path.display(), e),
        }
    }

    Ok(Some(folder))
}

// Deterministic directory listing keeps load order stable across platforms.
fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|e| e.path())
        .collect::<Vec<_>>();
    entries.sort();
    Ok(entries)
}
