// virsh-sendkeys CLI
// Pick a libvirt domain and type text into it as USB HID keystrokes

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;

use sendkeys_core::settings::default_settings_content;
use sendkeys_core::{
    select_target, DispatchConfig, KeyCodeTable, Session, Settings, StdinLines, TargetProvider,
    VirshActuator, VirshTargets,
};

/// Type text into a libvirt virtual machine with `virsh send-key`
#[derive(Parser, Debug)]
#[command(name = "virsh-sendkeys")]
#[command(version)]
#[command(about = "Send typed text to a libvirt domain as USB keystrokes", long_about = None)]
struct Args {
    /// Domain to type into (prompted from `virsh list --all` when omitted)
    #[arg(short, long, value_name = "DOMAIN")]
    domain: Option<String>,

    /// Key press hold time in ms, also waited once after every line
    #[arg(long = "holdtime", value_name = "MS")]
    hold_time_ms: Option<u64>,

    /// Extra pause after each space in ms
    #[arg(long = "pause", value_name = "MS")]
    pause_after_space_ms: Option<u64>,

    /// Print each character and its key codes before sending
    #[arg(long)]
    debug: bool,

    /// Send this text once and exit
    #[arg(short, long, value_name = "TEXT", conflicts_with = "file")]
    text: Option<String>,

    /// Send the contents of this file once and exit
    #[arg(short, long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// List available domains and exit
    #[arg(long)]
    list_domains: bool,

    /// Run virsh directly instead of through sudo
    #[arg(long)]
    no_sudo: bool,

    /// Settings file (default: ~/.config/virsh-sendkeys/settings.toml)
    #[arg(short, long, value_name = "SETTINGS")]
    settings: Option<PathBuf>,

    /// Print a default settings file and exit
    #[arg(long)]
    print_settings: bool,
}

impl Args {
    /// Non-interactive runs never prompt for debug mode
    fn is_batch(&self) -> bool {
        self.text.is_some() || self.file.is_some()
    }
}

/// Main application state
struct Application {
    args: Args,
    settings: Settings,
    /// Cleared to stop the input loop
    running: Arc<AtomicBool>,
}

impl Application {
    fn new(args: Args) -> anyhow::Result<Self> {
        let mut settings = match &args.settings {
            Some(path) => Settings::from_file(path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))?,
            None => Settings::load_default().context("Failed to load settings")?,
        };
        if args.no_sudo {
            settings.set_use_sudo(false);
        }

        Ok(Self {
            args,
            settings,
            running: Arc::new(AtomicBool::new(true)),
        })
    }

    fn targets(&self) -> VirshTargets {
        VirshTargets::new(self.settings.virsh_command())
    }

    fn list_domains(&self) -> anyhow::Result<()> {
        let domains = self.targets().list_targets()?;
        if domains.is_empty() {
            println!("No domains found.");
        }
        for (i, domain) in domains.iter().enumerate() {
            println!("  {}) {}", i + 1, domain);
        }
        Ok(())
    }

    /// Collect the session config from flags, falling back to prompts
    fn resolve_config(&self) -> anyhow::Result<DispatchConfig> {
        let debug = if self.args.debug || self.args.is_batch() {
            self.args.debug
        } else {
            let answer = prompt("\n  <> Enable debug mode? (y/n)\n\n  <> #:", "n")?;
            let debug = parse_yes(&answer);
            println!(
                "\n  <> Debug mode {}.",
                if debug { "enabled" } else { "disabled" }
            );
            debug
        };
        init_logging(debug);

        let target = match &self.args.domain {
            Some(domain) => domain.clone(),
            None => self.prompt_domain()?,
        };

        let hold_time_ms = match self.args.hold_time_ms {
            Some(ms) => ms,
            None => prompt_ms(
                "\n  <> Enter key press hold time in ms",
                self.settings.hold_time_ms(),
            )?,
        };
        let pause_after_space_ms = match self.args.pause_after_space_ms {
            Some(ms) => ms,
            None => prompt_ms(
                "\n  <> Enter pause after space in ms",
                self.settings.pause_after_space_ms(),
            )?,
        };

        Ok(DispatchConfig::new(target)
            .with_hold_time_ms(hold_time_ms)
            .with_pause_after_space_ms(pause_after_space_ms)
            .with_debug(debug))
    }

    fn prompt_domain(&self) -> anyhow::Result<String> {
        let domains = self.targets().list_targets()?;
        if domains.is_empty() {
            bail!("No domains found.");
        }

        clear_screen();
        println!("\n  <> Select a domain:\n");
        for (i, domain) in domains.iter().enumerate() {
            println!("  {}) {}", i + 1, domain);
        }
        let choice = prompt("\n  <> #:", "")?;
        let domain = select_target(&choice, &domains)?.to_string();
        println!("\n  <> Using domain: {}", domain);
        Ok(domain)
    }

    /// Clear `running` on SIGINT/SIGTERM.
    ///
    /// While blocked on the input prompt nothing is in flight, so the
    /// process exits right away; otherwise the loop stops after the
    /// current keystroke. A second signal always exits.
    fn install_signal_handler(&self, reading: Option<Arc<AtomicBool>>) -> anyhow::Result<()> {
        use signal_hook::consts::{SIGINT, SIGTERM};
        use signal_hook::iterator::Signals;

        let mut signals = Signals::new([SIGINT, SIGTERM]).context("Failed to register signals")?;
        let running = self.running.clone();

        std::thread::spawn(move || {
            for _ in signals.forever() {
                let was_running = running.swap(false, Ordering::SeqCst);
                let is_reading = reading.as_ref().is_some_and(|r| r.load(Ordering::SeqCst));
                if was_running {
                    println!("\n  <> Exiting...");
                }
                if exits_on_signal(was_running, is_reading) {
                    std::process::exit(0);
                }
            }
        });
        Ok(())
    }

    fn run(&self) -> anyhow::Result<()> {
        let config = self.resolve_config()?;
        log::info!(
            "Typing into '{}' (hold {}ms, space pause {}ms, sudo {})",
            config.target,
            config.hold_time_ms,
            config.pause_after_space_ms,
            self.settings.use_sudo()
        );
        if let Some(path) = self.settings.source_path() {
            log::debug!("Settings loaded from {}", path.display());
        }
        let table = KeyCodeTable::new();
        let actuator = VirshActuator::new(self.settings.virsh_command());
        let mut session = Session::new(config, &table, actuator)
            .with_running_flag(self.running.clone());

        if let Some(text) = self.batch_text()? {
            self.install_signal_handler(None)?;
            let report = session.send_text(&text);
            if report.failed > 0 {
                bail!("{} keystroke(s) could not be delivered", report.failed);
            }
            return Ok(());
        }

        let mut lines = StdinLines::new("  <> Enter text: ")
            .with_running_flag(self.running.clone());
        self.install_signal_handler(Some(lines.reading_flag()))?;

        let config = session.config();
        clear_screen();
        println!(
            "\n  # [domain: {}] <> [hold/ms: {}] <> [space pause/ms: {}]",
            config.target, config.hold_time_ms, config.pause_after_space_ms
        );
        println!("\n  <> Type text to send. Press Ctrl+C to quit.\n");

        session.run(&mut lines)?;
        Ok(())
    }

    fn batch_text(&self) -> anyhow::Result<Option<String>> {
        if let Some(text) = &self.args.text {
            return Ok(Some(text.clone()));
        }
        match &self.args.file {
            Some(path) => std::fs::read_to_string(path)
                .map(Some)
                .with_context(|| format!("Failed to read {}", path.display())),
            None => Ok(None),
        }
    }
}

/// Whether a stop signal should end the process instead of the loop
fn exits_on_signal(was_running: bool, reading: bool) -> bool {
    reading || !was_running
}

fn init_logging(debug: bool) {
    let default_filter = if debug {
        "warn,sendkeys_core=debug,virsh_sendkeys=debug"
    } else {
        "warn"
    };
    let env = env_logger::Env::default().default_filter_or(default_filter);
    let _ = env_logger::Builder::from_env(env)
        .format(|buf, record| writeln!(buf, "  [{}] {}", record.level(), record.args()))
        .try_init();
}

fn clear_screen() {
    use crossterm::cursor::MoveTo;
    use crossterm::terminal::{Clear, ClearType};

    let mut stdout = io::stdout();
    let _ = crossterm::execute!(stdout, Clear(ClearType::All), MoveTo(0, 0));
}

/// Ask for a value; an empty answer (or end of input) yields `default`
fn prompt(msg: &str, default: &str) -> io::Result<String> {
    let mut stdout = io::stdout();
    write!(stdout, "{} ", msg.trim_end())?;
    stdout.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let value = line.trim();
    Ok(if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    })
}

fn prompt_ms(msg: &str, default: u64) -> anyhow::Result<u64> {
    let answer = prompt(&format!("{} (default {}):", msg, default), "")?;
    parse_ms(&answer, default)
}

/// Parse a millisecond answer; blank means `default`
fn parse_ms(answer: &str, default: u64) -> anyhow::Result<u64> {
    let answer = answer.trim();
    if answer.is_empty() {
        return Ok(default);
    }
    answer
        .parse::<u64>()
        .with_context(|| format!("Invalid duration '{}': expected a whole number of ms", answer))
}

fn parse_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_settings {
        print!("{}", default_settings_content());
        return Ok(());
    }

    let app = Application::new(args)?;

    if app.args.list_domains {
        init_logging(app.args.debug);
        return app.list_domains();
    }

    app.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sendkeys_core::target::parse_domain_list;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["virsh-sendkeys"]);

        assert!(args.domain.is_none());
        assert!(args.hold_time_ms.is_none());
        assert!(args.pause_after_space_ms.is_none());
        assert!(!args.debug);
        assert!(!args.list_domains);
        assert!(!args.no_sudo);
        assert!(!args.is_batch());
    }

    #[test]
    fn test_args_with_options() {
        let args = Args::parse_from([
            "virsh-sendkeys",
            "--domain",
            "win11",
            "--holdtime",
            "150",
            "--pause",
            "500",
            "--debug",
            "--no-sudo",
        ]);

        assert_eq!(args.domain.as_deref(), Some("win11"));
        assert_eq!(args.hold_time_ms, Some(150));
        assert_eq!(args.pause_after_space_ms, Some(500));
        assert!(args.debug);
        assert!(args.no_sudo);
    }

    #[test]
    fn test_args_batch_text() {
        let args = Args::parse_from(["virsh-sendkeys", "-d", "vm1", "--text", "Hi!"]);
        assert_eq!(args.text.as_deref(), Some("Hi!"));
        assert!(args.is_batch());
    }

    #[test]
    fn test_args_text_conflicts_with_file() {
        let argv = ["virsh-sendkeys", "--text", "a", "--file", "/tmp/x.txt"];
        assert!(Args::try_parse_from(argv).is_err());
    }

    #[test]
    fn test_args_reject_negative_holdtime() {
        assert!(Args::try_parse_from(["virsh-sendkeys", "--holdtime", "-5"]).is_err());
    }

    #[test]
    fn test_parse_ms() {
        assert_eq!(parse_ms("", 100).unwrap(), 100);
        assert_eq!(parse_ms(" 250 ", 100).unwrap(), 250);
        assert!(parse_ms("fast", 100).is_err());
        assert!(parse_ms("-1", 100).is_err());
    }

    #[test]
    fn test_parse_yes() {
        assert!(parse_yes("y"));
        assert!(parse_yes(" Yes "));
        assert!(!parse_yes("n"));
        assert!(!parse_yes(""));
    }

    #[test]
    fn test_exits_on_signal() {
        // First signal mid-keystroke: let the loop stop on its own.
        assert!(!exits_on_signal(true, false));
        // Blocked at the prompt, or a repeated signal: exit now.
        assert!(exits_on_signal(true, true));
        assert!(exits_on_signal(false, false));
        assert!(exits_on_signal(false, true));
    }

    #[test]
    fn test_domain_list_parsing_used_by_prompt() {
        let output = " Id   Name   State\n-------------------\n 3    vm1    running\n";
        let domains = parse_domain_list(output);
        assert_eq!(select_target("1", &domains).unwrap(), "vm1");
    }
}
