// Sendkeys Key Code Table
// Maps typed characters to the USB HID key sequences that produce them

use indexmap::IndexMap;
use smallvec::{smallvec, SmallVec};

use crate::key::usage;
use crate::KeyCode;

/// Ordered key codes for one character: a single base key, or the shift
/// modifier followed by a base key.
pub type KeySequence = SmallVec<[KeyCode; 2]>;

/// Unshifted symbol keys paired with the character their shifted form types.
///
/// `\` and `|` use the US backslash key (0x31), not the ISO Non-US key (0x64).
const SYMBOL_KEYS: [(char, char, KeyCode); 11] = [
    ('-', '_', usage::MINUS),
    ('=', '+', usage::EQUAL),
    ('[', '{', usage::LEFT_BRACE),
    (']', '}', usage::RIGHT_BRACE),
    ('\\', '|', usage::BACKSLASH),
    (';', ':', usage::SEMICOLON),
    ('\'', '"', usage::APOSTROPHE),
    (',', '<', usage::COMMA),
    ('.', '>', usage::DOT),
    ('/', '?', usage::SLASH),
    ('`', '~', usage::GRAVE),
];

/// Shifted digit row, in key order 1..9 then 0.
const SHIFTED_DIGITS: [char; 10] = ['!', '@', '#', '$', '%', '^', '&', '*', '(', ')'];

/// Immutable character to key sequence table for a US keyboard layout.
///
/// Built once and handed to the dispatcher by reference. There is no
/// mutation API: two tables built with [`KeyCodeTable::new`] are always
/// equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCodeTable {
    entries: IndexMap<char, KeySequence>,
}

impl KeyCodeTable {
    /// Build the US layout table
    pub fn new() -> Self {
        let shift = usage::LEFT_SHIFT;
        let mut entries: IndexMap<char, KeySequence> = IndexMap::with_capacity(96);

        for (offset, (lower, upper)) in ('a'..='z').zip('A'..='Z').enumerate() {
            let base = KeyCode(usage::KEY_A.code() + offset as u8);
            entries.insert(lower, smallvec![base]);
            entries.insert(upper, smallvec![shift, base]);
        }

        // The HID digit row runs 1..9 then 0, matching SHIFTED_DIGITS.
        for (offset, (digit, symbol)) in "1234567890".chars().zip(SHIFTED_DIGITS).enumerate() {
            let base = KeyCode(usage::KEY_1.code() + offset as u8);
            entries.insert(digit, smallvec![base]);
            entries.insert(symbol, smallvec![shift, base]);
        }

        for (plain, shifted, base) in SYMBOL_KEYS {
            entries.insert(plain, smallvec![base]);
            entries.insert(shifted, smallvec![shift, base]);
        }

        entries.insert(' ', smallvec![usage::SPACE]);
        entries.insert('\n', smallvec![usage::ENTER]);
        entries.insert('\t', smallvec![usage::TAB]);

        Self { entries }
    }

    /// Key sequence for a character, or `None` when it cannot be typed
    pub fn lookup(&self, ch: char) -> Option<&[KeyCode]> {
        self.entries.get(&ch).map(|seq| seq.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in construction order
    pub fn iter(&self) -> impl Iterator<Item = (char, &[KeyCode])> {
        self.entries.iter().map(|(ch, seq)| (*ch, seq.as_slice()))
    }
}

impl Default for KeyCodeTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a sequence the way the debug trace shows it: `0xe1 + 0x0b`
pub fn format_sequence(keys: &[KeyCode]) -> String {
    keys.iter()
        .map(|k| k.to_string())
        .collect::<Vec<_>>()
        .join(" + ")
}

/// Key names for a sequence: `LEFT_SHIFT + H`
pub fn sequence_names(keys: &[KeyCode]) -> String {
    keys.iter()
        .map(|k| k.name())
        .collect::<Vec<_>>()
        .join(" + ")
}
