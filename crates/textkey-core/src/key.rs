use crate::error::{Result, TextkeyError};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single key, named using the angle-bracket notation used in phrase
/// configurations: `"<ctrl>"`, `"<f12>"`, or a plain unshifted character
/// such as `"a"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Key {
    Control,
    Alt,
    Shift,
    Super,
    Hyper,
    Meta,
    Enter,
    Tab,
    Space,
    Backspace,
    Delete,
    Escape,
    Insert,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    NpDivide,
    NpMultiply,
    NpAdd,
    NpSubtract,
    Char(char),
}

/// Name table for every named key, in `<token>` form.
const KEY_NAMES: &[(&str, Key)] = &[
    ("<ctrl>", Key::Control),
    ("<alt>", Key::Alt),
    ("<shift>", Key::Shift),
    ("<super>", Key::Super),
    ("<hyper>", Key::Hyper),
    ("<meta>", Key::Meta),
    ("<enter>", Key::Enter),
    ("<tab>", Key::Tab),
    ("<space>", Key::Space),
    ("<backspace>", Key::Backspace),
    ("<delete>", Key::Delete),
    ("<escape>", Key::Escape),
    ("<insert>", Key::Insert),
    ("<home>", Key::Home),
    ("<end>", Key::End),
    ("<page_up>", Key::PageUp),
    ("<page_down>", Key::PageDown),
    ("<up>", Key::Up),
    ("<down>", Key::Down),
    ("<left>", Key::Left),
    ("<right>", Key::Right),
    ("<f1>", Key::F1),
    ("<f2>", Key::F2),
    ("<f3>", Key::F3),
    ("<f4>", Key::F4),
    ("<f5>", Key::F5),
    ("<f6>", Key::F6),
    ("<f7>", Key::F7),
    ("<f8>", Key::F8),
    ("<f9>", Key::F9),
    ("<f10>", Key::F10),
    ("<f11>", Key::F11),
    ("<f12>", Key::F12),
    ("<np_divide>", Key::NpDivide),
    ("<np_multiply>", Key::NpMultiply),
    ("<np_add>", Key::NpAdd),
    ("<np_subtract>", Key::NpSubtract),
];

impl Key {
    /// True for the keys permitted in a hotkey's modifier list.
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            Key::Control | Key::Alt | Key::Shift | Key::Super | Key::Hyper | Key::Meta
        )
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Key::Char(c) = self {
            return write!(f, "{}", c);
        }
        for (name, key) in KEY_NAMES {
            if key == self {
                return write!(f, "{}", name);
            }
        }
        unreachable!("every named key has a table entry")
    }
}

impl FromStr for Key {
    type Err = TextkeyError;

    fn from_str(s: &str) -> Result<Self> {
        if s.starts_with('<') {
            for (name, key) in KEY_NAMES {
                if *name == s {
                    return Ok(*key);
                }
            }
            return Err(TextkeyError::UnknownKey(s.to_string()));
        }

        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(Key::Char(c)),
            _ => Err(TextkeyError::UnknownKey(s.to_string())),
        }
    }
}

impl TryFrom<String> for Key {
    type Error = TextkeyError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Key> for String {
    fn from(key: Key) -> String {
        key.to_string()
    }
}

/// A modifier-plus-key combination that triggers a phrase or script.
///
/// The modifier list is kept sorted, so two hotkeys given with the same
/// modifiers in a different order compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hotkey {
    modifiers: Vec<Key>,
    key: Key,
}

impl Hotkey {
    /// Build a hotkey, checking its shape: every entry in `modifiers` must
    /// be a modifier key, `key` must not be one, and no modifier may be
    /// given twice.
    pub fn new(mut modifiers: Vec<Key>, key: Key) -> Result<Self> {
        for modifier in &modifiers {
            if !modifier.is_modifier() {
                return Err(TextkeyError::InvalidHotkey(format!(
                    "'{}' is not a modifier key",
                    modifier
                )));
            }
        }
        if key.is_modifier() {
            return Err(TextkeyError::InvalidHotkey(format!(
                "'{}' is a modifier key and cannot be used as the hotkey itself",
                key
            )));
        }

        modifiers.sort();
        let count = modifiers.len();
        modifiers.dedup();
        if modifiers.len() != count {
            return Err(TextkeyError::InvalidHotkey(
                "duplicate modifier in hotkey".to_string(),
            ));
        }

        Ok(Hotkey { modifiers, key })
    }

    /// Build a hotkey from string tokens, e.g. `&["<ctrl>", "<alt>"]` and `"9"`.
    pub fn parse(modifiers: &[&str], key: &str) -> Result<Self> {
        let modifiers = modifiers
            .iter()
            .map(|s| s.parse())
            .collect::<Result<Vec<Key>>>()?;
        Hotkey::new(modifiers, key.parse()?)
    }

    pub fn modifiers(&self) -> &[Key] {
        &self.modifiers
    }

    pub fn key(&self) -> Key {
        self.key
    }

    /// Order-insensitive comparison against a raw modifier list and key.
    pub fn matches(&self, modifiers: &[Key], key: Key) -> bool {
        if self.key != key {
            return false;
        }
        let mut given = modifiers.to_vec();
        given.sort();
        self.modifiers == given
    }
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for modifier in &self.modifiers {
            write!(f, "{}+", modifier)?;
        }
        write!(f, "{}", self.key)
    }
}

// Deserialization goes through the constructor so that hand-edited
// configuration documents cannot smuggle in a malformed combination.
impl<'de> Deserialize<'de> for Hotkey {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct HotkeyDoc {
            modifiers: Vec<Key>,
            key: Key,
        }

        let doc = HotkeyDoc::deserialize(deserializer)?;
        Hotkey::new(doc.modifiers, doc.key).map_err(serde::de::Error::custom)
    }
}
