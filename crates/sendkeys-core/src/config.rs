// Sendkeys Dispatch Configuration
// Per-session target and timing values

use std::time::Duration;

/// Default key press hold time in milliseconds
pub const DEFAULT_HOLD_TIME_MS: u64 = 100;

/// Default extra pause after a space in milliseconds
pub const DEFAULT_PAUSE_AFTER_SPACE_MS: u64 = 300;

/// Target and timing for one typing session.
///
/// Validated by the caller before the session starts and never mutated
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Domain name passed verbatim to every actuation call
    pub target: String,
    /// Key press duration, also used as the trailing delay after each line
    pub hold_time_ms: u64,
    /// Extra settle delay after every space
    pub pause_after_space_ms: u64,
    /// Emit a trace line before each dispatch
    pub debug: bool,
}

impl DispatchConfig {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            hold_time_ms: DEFAULT_HOLD_TIME_MS,
            pause_after_space_ms: DEFAULT_PAUSE_AFTER_SPACE_MS,
            debug: false,
        }
    }

    pub fn with_hold_time_ms(mut self, hold_time_ms: u64) -> Self {
        self.hold_time_ms = hold_time_ms;
        self
    }

    pub fn with_pause_after_space_ms(mut self, pause_after_space_ms: u64) -> Self {
        self.pause_after_space_ms = pause_after_space_ms;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn hold_time(&self) -> Duration {
        Duration::from_millis(self.hold_time_ms)
    }

    pub fn pause_after_space(&self) -> Duration {
        Duration::from_millis(self.pause_after_space_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DispatchConfig::new("vm1");
        assert_eq!(config.target, "vm1");
        assert_eq!(config.hold_time_ms, 100);
        assert_eq!(config.pause_after_space_ms, 300);
        assert!(!config.debug);
    }

    #[test]
    fn test_builder() {
        let config = DispatchConfig::new("win11")
            .with_hold_time_ms(150)
            .with_pause_after_space_ms(500)
            .with_debug(true);
        assert_eq!(config.hold_time(), Duration::from_millis(150));
        assert_eq!(config.pause_after_space(), Duration::from_millis(500));
        assert!(config.debug);
    }
}
