// Sendkeys virsh Invocation
// Builds `virsh` command lines, optionally through sudo

use std::ffi::OsString;
use std::process::Command;

/// Default program name for the libvirt shell
pub const DEFAULT_PROGRAM: &str = "virsh";

/// How to launch `virsh`: which executable, and whether to go through sudo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirshCommand {
    program: OsString,
    use_sudo: bool,
}

impl VirshCommand {
    pub fn new(program: impl Into<OsString>, use_sudo: bool) -> Self {
        Self {
            program: program.into(),
            use_sudo,
        }
    }

    pub fn program(&self) -> &OsString {
        &self.program
    }

    pub fn use_sudo(&self) -> bool {
        self.use_sudo
    }

    /// Start a command for a virsh subcommand, e.g. `list` or `send-key`
    pub fn command(&self, subcommand: &str) -> Command {
        let mut cmd = if self.use_sudo {
            let mut cmd = Command::new("sudo");
            cmd.arg(&self.program);
            cmd
        } else {
            Command::new(&self.program)
        };
        cmd.arg(subcommand);
        cmd
    }
}

impl Default for VirshCommand {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM, true)
    }
}
