// Sendkeys Core Library
// Character to USB HID translation and keystroke dispatch for libvirt domains

pub mod codeset;
pub mod config;
pub mod dispatch;
pub mod key;
pub mod keymap;
pub mod output;
pub mod session;
pub mod target;
pub mod virsh;

#[cfg(feature = "pure-rust")]
pub mod settings;

pub use codeset::Codeset;
pub use config::DispatchConfig;
pub use dispatch::{DispatchOutcome, Dispatcher};
pub use key::KeyCode;
pub use keymap::{KeyCodeTable, KeySequence};
pub use output::{ActuationError, Actuator, VirshActuator};
pub use session::{
    IterLines, LineReport, LineSource, LoopState, Session, SessionError, SessionStats, StdinLines,
};
pub use target::{select_target, SelectionError, TargetError, TargetProvider, VirshTargets};
pub use virsh::VirshCommand;

#[cfg(feature = "pure-rust")]
pub use settings::{Settings, SettingsError};
