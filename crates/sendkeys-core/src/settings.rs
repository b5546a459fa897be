// Sendkeys Settings Module
// Handles user-configurable defaults for timing and the virsh invocation

#![cfg(feature = "pure-rust")]

use std::path::{Path, PathBuf};

use crate::config::{DEFAULT_HOLD_TIME_MS, DEFAULT_PAUSE_AFTER_SPACE_MS};
use crate::virsh::{VirshCommand, DEFAULT_PROGRAM};

/// Settings for virsh-sendkeys
///
/// These settings are loaded from a TOML file (default:
/// ~/.config/virsh-sendkeys/settings.toml) and provide the defaults offered
/// at the interactive prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Default key press hold time
    hold_time_ms: u64,

    /// Default pause after each space
    pause_after_space_ms: u64,

    /// virsh executable
    program: String,

    /// Run virsh through sudo
    use_sudo: bool,

    /// File the settings were loaded from
    source_path: Option<PathBuf>,
}

/// Errors that can occur when loading settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("Invalid setting value: {0}")]
    InvalidValue(String),
}

/// TOML representation for deserializing settings
#[derive(Debug, Clone, serde::Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct SettingsToml {
    #[serde(default)]
    timing: Option<TimingSettings>,

    #[serde(default)]
    virsh: Option<VirshSettings>,
}

#[derive(Debug, Clone, serde::Deserialize, Default)]
struct TimingSettings {
    #[serde(default)]
    hold_time_ms: Option<i64>,
    #[serde(default)]
    pause_after_space_ms: Option<i64>,
}

#[derive(Debug, Clone, serde::Deserialize, Default)]
struct VirshSettings {
    #[serde(default)]
    program: Option<String>,
    #[serde(default)]
    use_sudo: Option<bool>,
}

impl Settings {
    /// Create settings holding the built-in defaults
    pub fn new() -> Self {
        Self {
            hold_time_ms: DEFAULT_HOLD_TIME_MS,
            pause_after_space_ms: DEFAULT_PAUSE_AFTER_SPACE_MS,
            program: DEFAULT_PROGRAM.to_string(),
            use_sudo: true,
            source_path: None,
        }
    }

    /// Load settings from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(&path)?;
        let mut settings = Self::from_toml(&content)?;
        settings.source_path = Some(path.as_ref().to_path_buf());
        Ok(settings)
    }

    /// Load settings from TOML string
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let toml_settings: SettingsToml =
            toml::from_str(content).map_err(|e| SettingsError::TomlParse(e.to_string()))?;

        let mut settings = Self::new();

        if let Some(timing) = toml_settings.timing {
            if let Some(hold) = timing.hold_time_ms {
                settings.hold_time_ms = non_negative_ms("timing.hold_time_ms", hold)?;
            }
            if let Some(pause) = timing.pause_after_space_ms {
                settings.pause_after_space_ms =
                    non_negative_ms("timing.pause_after_space_ms", pause)?;
            }
        }

        if let Some(virsh) = toml_settings.virsh {
            if let Some(program) = virsh.program {
                if program.trim().is_empty() {
                    return Err(SettingsError::InvalidValue(
                        "virsh.program must not be empty".to_string(),
                    ));
                }
                settings.program = program;
            }
            if let Some(use_sudo) = virsh.use_sudo {
                settings.use_sudo = use_sudo;
            }
        }

        Ok(settings)
    }

    /// Get the default settings path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("virsh-sendkeys").join("settings.toml"))
    }

    /// Load from default location (~/.config/virsh-sendkeys/settings.toml)
    pub fn load_default() -> Result<Self, SettingsError> {
        if let Some(path) = Self::default_path() {
            if path.exists() {
                return Self::from_file(path);
            }
        }
        // Return default settings if file doesn't exist
        Ok(Self::new())
    }

    pub fn hold_time_ms(&self) -> u64 {
        self.hold_time_ms
    }

    pub fn pause_after_space_ms(&self) -> u64 {
        self.pause_after_space_ms
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn use_sudo(&self) -> bool {
        self.use_sudo
    }

    pub fn set_use_sudo(&mut self, use_sudo: bool) {
        self.use_sudo = use_sudo;
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// Command builder for the configured virsh
    pub fn virsh_command(&self) -> VirshCommand {
        VirshCommand::new(&self.program, self.use_sudo)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

fn non_negative_ms(name: &str, value: i64) -> Result<u64, SettingsError> {
    u64::try_from(value).map_err(|_| {
        SettingsError::InvalidValue(format!("{} must be >= 0, got {}", name, value))
    })
}

/// Create default settings content for a new installation
pub fn default_settings_content() -> &'static str {
    r#"# virsh-sendkeys Settings
# Place this file at: ~/.config/virsh-sendkeys/settings.toml

[timing]
# Key press hold time, also waited once after every line
hold_time_ms = 100
# Extra pause after each space
pause_after_space_ms = 300

[virsh]
program = "virsh"
use_sudo = true
"#
}
