//! Adapters between front-end dialogs and the configuration layer.
//!
//! Front-ends implement the dialog traits over whatever widgets they use;
//! the functions here move the captured values into an item. The rules come
//! from the desktop front-ends this replaces: an invalid window-filter
//! regex is logged and discarded rather than failing the save, and saving a
//! hotkey without a captured key is an error.

use log::{error, info};
use textkey_core::models::Item;
use textkey_core::{Hotkey, Key, Result, TextkeyError};

/// A window-filter dialog: a pattern field and a "apply recursively" flag.
pub trait FilterDialog {
    fn filter_text(&self) -> String;
    fn is_recursive(&self) -> bool;
}

/// A hotkey-capture dialog: checked modifier boxes and the captured key.
pub trait HotkeyDialog {
    fn active_modifiers(&self) -> Vec<Key>;
    fn captured_key(&self) -> Option<Key>;
}

/// Save the dialog's window filter onto an item.
///
/// Empty dialog text clears any existing filter. An invalid regular
/// expression is discarded without saving; the recursive flag is applied
/// either way.
pub fn save_item_filter(dialog: &impl FilterDialog, item: &mut Item) {
    let pattern = dialog.filter_text();
    if pattern.is_empty() {
        item.clear_window_titles();
    } else if let Err(e) = item.set_window_titles(&pattern) {
        error!(
            "Invalid window filter regex: '{}'. Discarding without saving. ({})",
            pattern, e
        );
    }
    item.set_filter_recursive(dialog.is_recursive());
}

/// Save the dialog's modifier/key combination onto an item.
pub fn save_hotkey_settings(dialog: &impl HotkeyDialog, item: &mut Item) -> Result<()> {
    let key = dialog.captured_key().ok_or_else(|| {
        TextkeyError::InvalidHotkey("attempt to set hotkey with no key".to_string())
    })?;
    let hotkey = Hotkey::new(dialog.active_modifiers(), key)?;
    info!(
        "Item '{}' updated with hotkey {}",
        item.description(),
        hotkey
    );
    item.set_hotkey(hotkey);
    Ok(())
}

/// Human-readable rendering of a hotkey for dialogs and listings,
/// e.g. `Ctrl+Alt+F2`.
pub fn hotkey_display(hotkey: &Hotkey) -> String {
    let mut parts: Vec<String> = hotkey.modifiers().iter().map(|m| key_text(*m)).collect();
    parts.push(key_text(hotkey.key()));
    parts.join("+")
}

fn key_text(key: Key) -> String {
    match key {
        Key::Control => "Ctrl".to_string(),
        Key::Char(c) => c.to_uppercase().to_string(),
        other => {
            // "<page_up>" -> "Page Up"
            let token = other.to_string();
            let inner = token.trim_matches(|c| c == '<' || c == '>');
            inner
                .split('_')
                .map(|word| {
                    let mut chars = word.chars();
                    match chars.next() {
                        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                        None => String::new(),
                    }
                })
                .collect::<Vec<_>>()
                .join(" ")
        }
    }
}
