// Sendkeys Dispatcher
// Resolves one character through the key code table and actuates it

use crate::keymap::{format_sequence, sequence_names, KeySequence};
use crate::output::{ActuationError, Actuator};
use crate::{Codeset, KeyCodeTable};

/// What happened to a single character
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Looked up and handed to the actuator
    Sent(KeySequence),
    /// No mapping; nothing was sent
    Skipped,
}

/// Sends characters to a target through an [`Actuator`].
///
/// Holds the table by reference; nothing in here is mutated by a failed
/// actuation, so the next character is dispatched independently.
pub struct Dispatcher<'t, A> {
    table: &'t KeyCodeTable,
    actuator: A,
    debug: bool,
}

impl<'t, A: Actuator> Dispatcher<'t, A> {
    pub fn new(table: &'t KeyCodeTable, actuator: A) -> Self {
        Self {
            table,
            actuator,
            debug: false,
        }
    }

    /// Enable the per-character trace
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn into_actuator(self) -> A {
        self.actuator
    }

    /// Send one character, blocking until the actuator returns.
    ///
    /// Unsupported characters return [`DispatchOutcome::Skipped`] without
    /// calling the actuator.
    pub fn send(
        &mut self,
        target: &str,
        ch: char,
        hold_time_ms: u64,
    ) -> Result<DispatchOutcome, ActuationError> {
        let Some(keys) = self.table.lookup(ch) else {
            if self.debug {
                log::debug!("Unsupported char skipped: {:?}", ch);
            }
            return Ok(DispatchOutcome::Skipped);
        };

        if self.debug {
            log::debug!(
                "Sending key: {:?} -> {} ({})",
                ch,
                format_sequence(keys),
                sequence_names(keys)
            );
        }

        self.actuator.send_keys(target, Codeset::Usb, keys, hold_time_ms)?;
        Ok(DispatchOutcome::Sent(KeySequence::from_slice(keys)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::usage;
    use crate::KeyCode;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<(String, Codeset, Vec<KeyCode>, u64)>,
        fail_on: Option<KeyCode>,
    }

    impl Actuator for Recorder {
        fn send_keys(
            &mut self,
            target: &str,
            codeset: Codeset,
            keys: &[KeyCode],
            hold_time_ms: u64,
        ) -> Result<(), ActuationError> {
            self.calls
                .push((target.to_string(), codeset, keys.to_vec(), hold_time_ms));
            if keys.last() == self.fail_on.as_ref() {
                return Err(ActuationError::ExitStatus {
                    target: target.to_string(),
                    status: "exit status: 1".into(),
                });
            }
            Ok(())
        }
    }

    #[test]
    fn test_send_supported_char() {
        let table = KeyCodeTable::new();
        let mut dispatcher = Dispatcher::new(&table, Recorder::default());

        let outcome = dispatcher.send("vm1", 'H', 150).unwrap();
        assert_eq!(
            outcome,
            DispatchOutcome::Sent(KeySequence::from_slice(&[usage::LEFT_SHIFT, KeyCode(0x0b)]))
        );

        let calls = &dispatcher.actuator().calls;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "vm1");
        assert_eq!(calls[0].1, Codeset::Usb);
        assert_eq!(calls[0].2, vec![usage::LEFT_SHIFT, KeyCode(0x0b)]);
        assert_eq!(calls[0].3, 150);
    }

    #[test]
    fn test_unsupported_char_is_skipped_without_call() {
        let table = KeyCodeTable::new();
        let mut dispatcher = Dispatcher::new(&table, Recorder::default()).with_debug(true);

        let outcome = dispatcher.send("vm1", '€', 100).unwrap();
        assert_eq!(outcome, DispatchOutcome::Skipped);
        assert!(dispatcher.actuator().calls.is_empty());
    }

    #[test]
    fn test_failure_is_returned_and_isolated() {
        let table = KeyCodeTable::new();
        let recorder = Recorder {
            fail_on: Some(usage::KEY_A),
            ..Default::default()
        };
        let mut dispatcher = Dispatcher::new(&table, recorder);

        assert!(dispatcher.send("gone", 'a', 100).is_err());

        let outcome = dispatcher.send("gone", 'b', 100).unwrap();
        assert!(matches!(outcome, DispatchOutcome::Sent(_)));
        assert_eq!(dispatcher.into_actuator().calls.len(), 2);
    }
}
