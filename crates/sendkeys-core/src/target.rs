// Target Enumeration
//
// This module lists the virtual machines that can receive keystrokes and
// resolves the operator's numbered choice to a domain name.

use std::fmt;
use std::process::Stdio;

use crate::virsh::VirshCommand;

/// Errors raised while listing targets
#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    #[error("Failed to run virsh list: {0}")]
    Io(#[from] std::io::Error),

    #[error("virsh list exited with {0}")]
    ExitStatus(String),
}

/// Error resolving a numbered selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// Input was not a positive number
    NotANumber(String),

    /// Number outside 1..=count
    OutOfRange { choice: usize, count: usize },

    /// Nothing to choose from
    NoTargets,
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionError::NotANumber(input) => write!(f, "Invalid selection: '{}'", input),
            SelectionError::OutOfRange { choice, count } => {
                write!(f, "Invalid selection: {} (expected 1-{})", choice, count)
            }
            SelectionError::NoTargets => write!(f, "No domains found"),
        }
    }
}

impl std::error::Error for SelectionError {}

/// Source of selectable targets
pub trait TargetProvider {
    /// Ordered list of target identifiers
    fn list_targets(&self) -> Result<Vec<String>, TargetError>;
}

/// Lists libvirt domains with `virsh list --all`
#[derive(Debug, Clone, Default)]
pub struct VirshTargets {
    virsh: VirshCommand,
}

impl VirshTargets {
    pub fn new(virsh: VirshCommand) -> Self {
        Self { virsh }
    }
}

impl TargetProvider for VirshTargets {
    fn list_targets(&self) -> Result<Vec<String>, TargetError> {
        let output = self
            .virsh
            .command("list")
            .arg("--all")
            .stderr(Stdio::null())
            .output()?;

        if !output.status.success() {
            return Err(TargetError::ExitStatus(output.status.to_string()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let domains = parse_domain_list(&stdout);
        log::debug!("virsh list returned {} domain(s)", domains.len());
        Ok(domains)
    }
}

/// Extract domain names from `virsh list --all` output.
///
/// The first two lines are the column header and the dashed rule. Each
/// remaining row is `<id|-> <name> <state...>`; rows with fewer than two
/// columns (such as the trailing blank line) are ignored.
pub fn parse_domain_list(output: &str) -> Vec<String> {
    output
        .lines()
        .skip(2)
        .filter_map(|line| line.split_whitespace().nth(1))
        .map(str::to_string)
        .collect()
}

/// Resolve a 1-based numeric choice against the listed targets
pub fn select_target<'a>(choice: &str, targets: &'a [String]) -> Result<&'a str, SelectionError> {
    if targets.is_empty() {
        return Err(SelectionError::NoTargets);
    }

    let trimmed = choice.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SelectionError::NotANumber(trimmed.to_string()));
    }
    let index: usize = trimmed
        .parse()
        .map_err(|_| SelectionError::NotANumber(trimmed.to_string()))?;

    if index == 0 || index > targets.len() {
        return Err(SelectionError::OutOfRange {
            choice: index,
            count: targets.len(),
        });
    }
    Ok(&targets[index - 1])
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIRSH_LIST: &str = " Id   Name        State
-----------------------------------
 1    win11       running
 -    debian-12   shut off
 -    arch        shut off

";

    fn targets() -> Vec<String> {
        vec!["win11".into(), "debian-12".into(), "arch".into()]
    }

    #[test]
    fn test_parse_domain_list() {
        assert_eq!(parse_domain_list(VIRSH_LIST), targets());
    }

    #[test]
    fn test_parse_empty_list() {
        let output = " Id   Name   State\n--------------------\n\n";
        assert!(parse_domain_list(output).is_empty());
        assert!(parse_domain_list("").is_empty());
    }

    #[test]
    fn test_select_target_valid() {
        let list = targets();
        assert_eq!(select_target("1", &list), Ok("win11"));
        assert_eq!(select_target(" 3 ", &list), Ok("arch"));
    }

    #[test]
    fn test_select_target_out_of_range() {
        let list = targets();
        for (choice, index) in [("0", 0), ("4", 4)] {
            let expected = SelectionError::OutOfRange {
                choice: index,
                count: 3,
            };
            assert_eq!(select_target(choice, &list), Err(expected));
        }
    }

    #[test]
    fn test_select_target_not_a_number() {
        let list = targets();
        assert_eq!(
            select_target("abc", &list),
            Err(SelectionError::NotANumber("abc".into()))
        );
        for choice in ["-1", ""] {
            let err = select_target(choice, &list).unwrap_err();
            assert!(matches!(err, SelectionError::NotANumber(_)), "{:?}", choice);
        }
    }

    #[test]
    fn test_select_target_without_targets() {
        assert_eq!(select_target("1", &[]), Err(SelectionError::NoTargets));
    }

    #[test]
    fn test_selection_error_display() {
        let err = SelectionError::OutOfRange {
            choice: 9,
            count: 2,
        };
        assert_eq!(err.to_string(), "Invalid selection: 9 (expected 1-2)");
    }
}
