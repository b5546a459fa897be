// Sendkeys Output Layer
// Actuation interface that delivers key sequences to a target

mod virsh;

pub use virsh::VirshActuator;

use crate::{Codeset, KeyCode};

/// Error types for actuation calls
#[derive(Debug, thiserror::Error)]
pub enum ActuationError {
    #[error("Failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("send-key to '{target}' exited with {status}")]
    ExitStatus { target: String, status: String },

    #[error("Empty key sequence")]
    EmptySequence,
}

/// Delivers one key sequence to one target and blocks until it is done.
///
/// Implementations hold `keys` down together for `hold_time_ms` and release
/// them. A failure only concerns the sequence in flight.
pub trait Actuator {
    fn send_keys(
        &mut self,
        target: &str,
        codeset: Codeset,
        keys: &[KeyCode],
        hold_time_ms: u64,
    ) -> Result<(), ActuationError>;
}

impl<A: Actuator + ?Sized> Actuator for &mut A {
    fn send_keys(
        &mut self,
        target: &str,
        codeset: Codeset,
        keys: &[KeyCode],
        hold_time_ms: u64,
    ) -> Result<(), ActuationError> {
        (**self).send_keys(target, codeset, keys, hold_time_ms)
    }
}

impl<A: Actuator + ?Sized> Actuator for Box<A> {
    fn send_keys(
        &mut self,
        target: &str,
        codeset: Codeset,
        keys: &[KeyCode],
        hold_time_ms: u64,
    ) -> Result<(), ActuationError> {
        (**self).send_keys(target, codeset, keys, hold_time_ms)
    }
}
