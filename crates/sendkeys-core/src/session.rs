// Sendkeys Input Loop
// Reads lines from the operator and types them into the target, in order

use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::dispatch::{DispatchOutcome, Dispatcher};
use crate::output::Actuator;
use crate::{DispatchConfig, KeyCodeTable};

/// Longest single sleep between checks of the running flag
const SLEEP_SLICE: Duration = Duration::from_millis(25);

/// Errors that end a session
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Failed to read input: {0}")]
    Io(#[from] io::Error),
}

/// Where the input loop currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    AwaitingLine,
    Dispatching,
    Stopped,
}

/// Supplies one line of operator text at a time.
///
/// `Ok(None)` means the input is exhausted.
pub trait LineSource {
    fn next_line(&mut self) -> io::Result<Option<String>>;
}

/// Prompted lines from standard input, line terminator stripped
pub struct StdinLines {
    prompt: String,
    reading: Arc<AtomicBool>,
    running: Option<Arc<AtomicBool>>,
}

impl StdinLines {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            reading: Arc::new(AtomicBool::new(false)),
            running: None,
        }
    }

    /// Stop handing out lines once `running` is cleared
    pub fn with_running_flag(mut self, running: Arc<AtomicBool>) -> Self {
        self.running = Some(running);
        self
    }

    /// Set while blocked waiting for the operator, so a signal handler can
    /// tell that no keystroke is in flight.
    pub fn reading_flag(&self) -> Arc<AtomicBool> {
        self.reading.clone()
    }

    fn read_from<R: BufRead, W: Write>(
        &self,
        input: &mut R,
        output: &mut W,
    ) -> io::Result<Option<String>> {
        write!(output, "{}", self.prompt)?;
        output.flush()?;

        self.reading.store(true, Ordering::SeqCst);
        // A stop that landed before `reading` was set must not block here.
        if let Some(running) = &self.running {
            if !running.load(Ordering::SeqCst) {
                self.reading.store(false, Ordering::SeqCst);
                return Ok(None);
            }
        }
        let mut line = String::new();
        let read = input.read_line(&mut line);
        self.reading.store(false, Ordering::SeqCst);

        if read? == 0 {
            return Ok(None);
        }
        Ok(Some(strip_line_ending(&line).to_string()))
    }
}

impl LineSource for StdinLines {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        self.read_from(&mut io::stdin().lock(), &mut io::stdout())
    }
}

/// Lines from any iterator; used for scripted input
pub struct IterLines<I>(I);

impl<I: Iterator<Item = String>> IterLines<I> {
    pub fn new(lines: impl IntoIterator<IntoIter = I>) -> Self {
        Self(lines.into_iter())
    }
}

impl<I: Iterator<Item = String>> LineSource for IterLines<I> {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.0.next())
    }
}

fn strip_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Result of typing one line or block of text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineReport {
    pub sent: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Stopped before the last character
    pub interrupted: bool,
}

/// Running totals for a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub lines: usize,
    pub sent: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl SessionStats {
    fn absorb(&mut self, report: &LineReport) {
        self.lines += 1;
        self.sent += report.sent;
        self.skipped += report.skipped;
        self.failed += report.failed;
    }
}

/// Typing session against a single target.
///
/// Runs `AwaitingLine -> Dispatching -> AwaitingLine` until the running flag
/// is cleared or the line source is exhausted.
pub struct Session<'t, A> {
    config: DispatchConfig,
    dispatcher: Dispatcher<'t, A>,
    running: Arc<AtomicBool>,
    state: LoopState,
    stats: SessionStats,
}

impl<'t, A: Actuator> Session<'t, A> {
    pub fn new(config: DispatchConfig, table: &'t KeyCodeTable, actuator: A) -> Self {
        let dispatcher = Dispatcher::new(table, actuator).with_debug(config.debug);
        Self {
            config,
            dispatcher,
            running: Arc::new(AtomicBool::new(true)),
            state: LoopState::AwaitingLine,
            stats: SessionStats::default(),
        }
    }

    /// Share an externally owned running flag (e.g. one cleared by a signal handler)
    pub fn with_running_flag(mut self, running: Arc<AtomicBool>) -> Self {
        self.running = running;
        self
    }

    pub fn running_flag(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn into_actuator(self) -> A {
        self.dispatcher.into_actuator()
    }

    /// Read and type lines until stopped
    pub fn run<L: LineSource + ?Sized>(
        &mut self,
        lines: &mut L,
    ) -> Result<SessionStats, SessionError> {
        while self.is_running() {
            self.state = LoopState::AwaitingLine;
            let line = match lines.next_line() {
                Ok(Some(line)) => line,
                Ok(None) => {
                    log::debug!("Input exhausted");
                    break;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.state = LoopState::Stopped;
                    return Err(e.into());
                }
            };

            if !self.is_running() {
                break;
            }
            self.state = LoopState::Dispatching;
            let report = self.dispatch_line(&line);
            self.stats.absorb(&report);
        }

        self.state = LoopState::Stopped;
        log::info!(
            "Session stopped: {} line(s), {} sent, {} skipped, {} failed",
            self.stats.lines,
            self.stats.sent,
            self.stats.skipped,
            self.stats.failed
        );
        Ok(self.stats)
    }

    /// Type one line in order, then wait one hold time.
    ///
    /// Each space is followed by the pause-after-space delay. Unsupported
    /// characters are dropped and failed keystrokes are logged; neither
    /// stops the rest of the line.
    pub fn dispatch_line(&mut self, line: &str) -> LineReport {
        let mut report = LineReport::default();

        for ch in line.chars() {
            if !self.is_running() {
                report.interrupted = true;
                return report;
            }

            match self.dispatcher.send(&self.config.target, ch, self.config.hold_time_ms) {
                Ok(DispatchOutcome::Sent(_)) => report.sent += 1,
                Ok(DispatchOutcome::Skipped) => report.skipped += 1,
                Err(e) => {
                    log::warn!("Keystroke {:?} not delivered: {}", ch, e);
                    report.failed += 1;
                }
            }

            if ch == ' ' {
                if self.config.debug {
                    log::debug!("Space detected, pausing {}ms", self.config.pause_after_space_ms);
                }
                self.sleep(self.config.pause_after_space());
            }
        }

        self.sleep(self.config.hold_time());
        report
    }

    /// Type a whole block of text once, newlines and tabs included
    pub fn send_text(&mut self, text: &str) -> LineReport {
        let text = text.replace("\r\n", "\n");
        self.state = LoopState::Dispatching;
        let report = self.dispatch_line(&text);
        self.stats.absorb(&report);
        self.state = LoopState::Stopped;
        log::info!(
            "Sent {} key(s), skipped {}, failed {}",
            report.sent,
            report.skipped,
            report.failed
        );
        report
    }

    /// Sleep for `duration`, returning early once the running flag clears
    fn sleep(&self, duration: Duration) {
        let deadline = Instant::now() + duration;
        loop {
            let now = Instant::now();
            if now >= deadline || !self.is_running() {
                return;
            }
            std::thread::sleep((deadline - now).min(SLEEP_SLICE));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::ActuationError;
    use crate::{Codeset, KeyCode};

    #[derive(Default)]
    struct Counter {
        calls: usize,
    }

    impl Actuator for Counter {
        fn send_keys(
            &mut self,
            _target: &str,
            _codeset: Codeset,
            _keys: &[KeyCode],
            _hold_time_ms: u64,
        ) -> Result<(), ActuationError> {
            self.calls += 1;
            Ok(())
        }
    }

    fn quick_config() -> DispatchConfig {
        DispatchConfig::new("vm1")
            .with_hold_time_ms(0)
            .with_pause_after_space_ms(0)
    }

    #[test]
    fn test_strip_line_ending() {
        assert_eq!(strip_line_ending("abc\n"), "abc");
        assert_eq!(strip_line_ending("abc\r\n"), "abc");
        assert_eq!(strip_line_ending("abc"), "abc");
        assert_eq!(strip_line_ending("\n"), "");
    }

    #[test]
    fn test_stdin_lines_reads_and_prompts() {
        let lines = StdinLines::new("> ");
        let mut input = io::Cursor::new("hello\r\nrest\n");
        let mut output = Vec::new();

        let line = lines.read_from(&mut input, &mut output).unwrap();
        assert_eq!(line.as_deref(), Some("hello"));
        assert_eq!(output, b"> ");
        assert!(!lines.reading_flag().load(Ordering::SeqCst));

        let line = lines.read_from(&mut input, &mut output).unwrap();
        assert_eq!(line.as_deref(), Some("rest"));
        assert_eq!(lines.read_from(&mut input, &mut output).unwrap(), None);
    }

    #[test]
    fn test_stdin_lines_stops_without_reading_when_flag_cleared() {
        let running = Arc::new(AtomicBool::new(true));
        let lines = StdinLines::new("> ").with_running_flag(running.clone());
        let mut input = io::Cursor::new("never typed\n");
        let mut output = Vec::new();

        running.store(false, Ordering::SeqCst);
        assert_eq!(lines.read_from(&mut input, &mut output).unwrap(), None);
        assert_eq!(input.position(), 0);
        assert!(!lines.reading_flag().load(Ordering::SeqCst));
    }

    #[test]
    fn test_empty_line_is_noop() {
        let table = KeyCodeTable::new();
        let mut session = Session::new(quick_config(), &table, Counter::default());
        assert_eq!(session.dispatch_line(""), LineReport::default());
        assert_eq!(session.into_actuator().calls, 0);
    }

    #[test]
    fn test_run_stops_at_end_of_input() {
        let table = KeyCodeTable::new();
        let mut session = Session::new(quick_config(), &table, Counter::default());
        let mut lines = IterLines::new(vec!["ab".to_string(), String::new(), "c€".to_string()]);

        let stats = session.run(&mut lines).unwrap();
        let expected = SessionStats {
            lines: 3,
            sent: 3,
            skipped: 1,
            failed: 0,
        };
        assert_eq!(stats, expected);
        assert_eq!(session.state(), LoopState::Stopped);
    }

    #[test]
    fn test_cleared_flag_stops_before_reading() {
        let table = KeyCodeTable::new();
        let running = Arc::new(AtomicBool::new(false));
        let mut session = Session::new(quick_config(), &table, Counter::default())
            .with_running_flag(running);
        let mut lines = IterLines::new(vec!["abc".to_string()]);

        let stats = session.run(&mut lines).unwrap();
        assert_eq!(stats.lines, 0);
        assert_eq!(session.into_actuator().calls, 0);
    }

    #[test]
    fn test_send_text_normalizes_crlf() {
        let table = KeyCodeTable::new();
        let mut session = Session::new(quick_config(), &table, Counter::default());
        let report = session.send_text("a\r\nb\tc");
        assert_eq!(report.sent, 5);
        assert_eq!(report.skipped, 0);
        assert_eq!(session.stats().lines, 1);
    }
}
