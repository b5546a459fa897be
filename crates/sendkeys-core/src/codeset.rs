// Sendkeys Codeset
// Name under which `virsh send-key` interprets keycode tokens

use strum_macros::{AsRefStr, Display};

/// Keycode set passed to `virsh send-key --codeset`.
///
/// The key code table produces USB HID usages, so that is the only set sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Codeset {
    #[default]
    Usb,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usb_is_default() {
        assert_eq!(Codeset::default(), Codeset::Usb);
        assert_eq!(Codeset::Usb.as_ref(), "usb");
        assert_eq!(Codeset::Usb.to_string(), "usb");
    }
}
