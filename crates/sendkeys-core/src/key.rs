// Sendkeys Key Type
// Represents a single key code from the USB HID Keyboard/Keypad usage page

use std::fmt;
use std::sync::OnceLock;

include!(concat!(env!("OUT_DIR"), "/key_codes.rs"));

/// Named usage codes referenced by the key code table.
pub mod usage {
    use super::KeyCode;

    pub const KEY_A: KeyCode = KeyCode(0x04);
    pub const KEY_1: KeyCode = KeyCode(0x1e);
    pub const KEY_0: KeyCode = KeyCode(0x27);
    pub const ENTER: KeyCode = KeyCode(0x28);
    pub const TAB: KeyCode = KeyCode(0x2b);
    pub const SPACE: KeyCode = KeyCode(0x2c);
    pub const MINUS: KeyCode = KeyCode(0x2d);
    pub const EQUAL: KeyCode = KeyCode(0x2e);
    pub const LEFT_BRACE: KeyCode = KeyCode(0x2f);
    pub const RIGHT_BRACE: KeyCode = KeyCode(0x30);
    pub const BACKSLASH: KeyCode = KeyCode(0x31);
    pub const SEMICOLON: KeyCode = KeyCode(0x33);
    pub const APOSTROPHE: KeyCode = KeyCode(0x34);
    pub const GRAVE: KeyCode = KeyCode(0x35);
    pub const COMMA: KeyCode = KeyCode(0x36);
    pub const DOT: KeyCode = KeyCode(0x37);
    pub const SLASH: KeyCode = KeyCode(0x38);

    pub const LEFT_SHIFT: KeyCode = KeyCode(0xe1);
}

/// Display name for a usage code produced by the key code table
pub fn key_name(code: u8) -> &'static str {
    static KEY_NAMES: OnceLock<Vec<&'static str>> = OnceLock::new();
    KEY_NAMES
        .get_or_init(|| {
            let mut names = vec!["UNKNOWN"; 0x100];
            const LETTERS: [&str; 26] = [
                "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P",
                "Q", "R", "S", "T", "U", "V", "W", "X", "Y", "Z",
            ];
            for (i, name) in LETTERS.iter().enumerate() {
                names[0x04 + i] = name;
            }
            const DIGITS: [&str; 10] = [
                "KEY_1", "KEY_2", "KEY_3", "KEY_4", "KEY_5", "KEY_6", "KEY_7", "KEY_8", "KEY_9",
                "KEY_0",
            ];
            for (i, name) in DIGITS.iter().enumerate() {
                names[0x1e + i] = name;
            }
            names[0x28] = "ENTER";
            names[0x2b] = "TAB";
            names[0x2c] = "SPACE";
            names[0x2d] = "MINUS";
            names[0x2e] = "EQUAL";
            names[0x2f] = "LEFT_BRACE";
            names[0x30] = "RIGHT_BRACE";
            names[0x31] = "BACKSLASH";
            names[0x33] = "SEMICOLON";
            names[0x34] = "APOSTROPHE";
            names[0x35] = "GRAVE";
            names[0x36] = "COMMA";
            names[0x37] = "DOT";
            names[0x38] = "SLASH";
            names[0xe1] = "LEFT_SHIFT";
            names
        })
        .get(code as usize)
        .copied()
        .unwrap_or("UNKNOWN")
}
