use std::env;
use std::fs::File;
use std::io::Write;
use std::path::Path;

fn main() {
    let out_dir = env::var("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join("key_codes.rs");
    let mut f = File::create(&dest_path).unwrap();

    // Generate the KeyCode newtype wrapper
    writeln!(
        f,
        r#"
/// Represents a single USB HID keyboard usage code.
///
/// This is a newtype wrapper around u8 for type safety.
/// The numeric values match the Keyboard/Keypad page (0x07) of the
/// USB HID Usage Tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct KeyCode(pub u8);

impl KeyCode {{
    /// Get the raw numeric usage value
    pub fn code(self) -> u8 {{
        self.0
    }}

    /// Get the name of this key
    pub fn name(self) -> &'static str {{
        key_name(self.0)
    }}
}}

impl From<u8> for KeyCode {{
    fn from(code: u8) -> Self {{
        KeyCode(code)
    }}
}}

impl From<KeyCode> for u8 {{
    fn from(key: KeyCode) -> Self {{
        key.0
    }}
}}

/// Rendered as the hex token accepted by `virsh send-key` (e.g. `0x04`).
impl fmt::Display for KeyCode {{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {{
        write!(f, "0x{{:02x}}", self.0)
    }}
}}
"#
    )
    .unwrap();

    println!("cargo:rerun-if-changed=build.rs");
}
