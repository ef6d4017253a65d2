use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use realta_core::{ProgressReporter, Verdict};
use std::sync::Mutex;
use std::time::Duration;

/// CLI progress reporter: one spinner per session, cleared when the session
/// completes so CSV on stdout is never interleaved with it.
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn set_bar(&self, pb: ProgressBar) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(old) = guard.take() {
                old.finish_and_clear();
            }
            *guard = Some(pb);
        }
    }

    fn finish_bar(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }

    fn spinner(message: String) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    }
}

impl ProgressReporter for CliReporter {
    fn on_session_start(&self, session: &str, index: usize, total: usize) {
        self.set_bar(Self::spinner(format!(
            "[{}/{}] Reading {}...",
            index, total, session
        )));
    }

    fn on_session_complete(&self, _session: &str) {
        self.finish_bar();
    }

    fn on_verdict(&self, session: &str, tag: &str, verdict: Verdict) {
        if verdict.is_ambiguous() {
            if let Ok(guard) = self.bar.lock() {
                if let Some(pb) = guard.as_ref() {
                    pb.set_message(format!("{}: {} is {}", session, tag, verdict));
                }
            }
        }
    }

    fn on_field_written(&self, session: &str, scan: &str, field: &str, value: &str) {
        eprintln!(
            "  {} {} scan {}: {} = \"{}\"",
            "✓".green(),
            session,
            scan,
            field,
            value
        );
    }

    fn on_run_complete(&self, sessions: usize) {
        self.finish_bar();
        eprintln!("  {} {} sessions processed", "✓".green(), sessions);
    }
}
