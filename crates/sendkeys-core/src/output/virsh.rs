// Sendkeys virsh Output
// Sends key sequences with `virsh send-key`, one process per sequence

use std::process::{Command, Stdio};

use super::{ActuationError, Actuator};
use crate::virsh::VirshCommand;
use crate::{Codeset, KeyCode};

/// Actuator backed by `virsh send-key <domain> --codeset <set> <keys>... --holdtime <ms>`
#[derive(Debug, Clone, Default)]
pub struct VirshActuator {
    virsh: VirshCommand,
}

impl VirshActuator {
    pub fn new(virsh: VirshCommand) -> Self {
        Self { virsh }
    }

    /// Build the full send-key command line without running it
    pub fn build_command(
        &self,
        target: &str,
        codeset: Codeset,
        keys: &[KeyCode],
        hold_time_ms: u64,
    ) -> Command {
        let mut cmd = self.virsh.command("send-key");
        cmd.arg(target).arg("--codeset").arg(codeset.as_ref());
        cmd.args(keys.iter().map(|k| k.to_string()));
        cmd.arg("--holdtime").arg(hold_time_ms.to_string());
        cmd
    }
}

impl Actuator for VirshActuator {
    fn send_keys(
        &mut self,
        target: &str,
        codeset: Codeset,
        keys: &[KeyCode],
        hold_time_ms: u64,
    ) -> Result<(), ActuationError> {
        if keys.is_empty() {
            return Err(ActuationError::EmptySequence);
        }

        let mut cmd = self.build_command(target, codeset, keys, hold_time_ms);
        // virsh chatter would interleave with the input prompt
        cmd.stdout(Stdio::null()).stderr(Stdio::null());
        let status = cmd.status().map_err(|source| ActuationError::Spawn {
            program: cmd.get_program().to_string_lossy().into_owned(),
            source,
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(ActuationError::ExitStatus {
                target: target.to_string(),
                status: status.to_string(),
            })
        }
    }
}
