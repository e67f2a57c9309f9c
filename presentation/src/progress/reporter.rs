//! Progress reporting while an answer is pending

use crate::output::console::ConsoleFormatter;
use cnxh_application::ConversationObserver;
use cnxh_domain::{FallbackText, MessageId, Sender};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

type Sink = Mutex<Box<dyn Write + Send>>;

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Renders a submission on the terminal
///
/// Shows a spinner while the answer is pending and prints streamed chunks as
/// they arrive, so the answer appears to be typed out. Failures are printed
/// to the error stream; a streamed answer cut short by one is marked as
/// discarded first.
pub struct TerminalObserver {
    out: Sink,
    err: Sink,
    show_progress: bool,
    show_label: bool,
    spinner: Mutex<Option<ProgressBar>>,
    streamed: Mutex<Option<MessageId>>,
    /// Streamed text was printed and its line is not yet terminated
    line_open: Mutex<bool>,
}

impl TerminalObserver {
    /// Observer writing to stdout/stderr with spinner and sender label
    pub fn new() -> Self {
        Self::with_writers(Box::new(io::stdout()), Box::new(io::stderr()))
    }

    /// Observer writing to the given streams (no spinner)
    pub fn with_writers(out: Box<dyn Write + Send>, err: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
            err: Mutex::new(err),
            show_progress: true,
            show_label: true,
            spinner: Mutex::new(None),
            streamed: Mutex::new(None),
            line_open: Mutex::new(false),
        }
    }

    /// Set whether to show the spinner
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Set whether to print the sender label before a streamed answer
    pub fn with_label(mut self, show: bool) -> Self {
        self.show_label = show;
        self
    }

    /// The message whose chunks were printed since the last call, if any
    ///
    /// A streamed answer is already on screen and must not be printed again.
    pub fn take_streamed(&self) -> Option<MessageId> {
        lock(&self.streamed).take()
    }

    /// Mark a partially streamed answer as discarded.
    ///
    /// Ends the open answer line and prints a notice below it, so the broken
    /// text is not mistaken for a complete answer. Does nothing when no chunk
    /// was printed.
    pub fn discard_partial(&self) {
        if lock(&self.streamed).take().is_none() {
            return;
        }
        let mut out = lock(&self.out);
        if std::mem::take(&mut *lock(&self.line_open)) {
            let _ = writeln!(out);
        }
        let _ = writeln!(
            out,
            "{}",
            ConsoleFormatter::notice(FallbackText::partial_discarded())
        );
        let _ = out.flush();
    }

    fn end_line(&self) {
        if std::mem::take(&mut *lock(&self.line_open)) {
            let mut out = lock(&self.out);
            let _ = writeln!(out);
            let _ = out.flush();
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn start_spinner(&self) {
        if !self.show_progress {
            return;
        }
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(Self::spinner_style());
        spinner.set_message("Đang trả lời...");
        spinner.enable_steady_tick(Duration::from_millis(100));
        *lock(&self.spinner) = Some(spinner);
    }

    fn clear_spinner(&self) {
        if let Some(spinner) = lock(&self.spinner).take() {
            spinner.finish_and_clear();
        }
    }
}

impl Default for TerminalObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationObserver for TerminalObserver {
    fn on_loading_changed(&self, loading: bool) {
        if loading {
            *lock(&self.streamed) = None;
            *lock(&self.line_open) = false;
            self.start_spinner();
            return;
        }

        self.clear_spinner();
        self.end_line();
    }

    fn on_chunk(&self, id: MessageId, chunk: &str) {
        let first = {
            let mut streamed = lock(&self.streamed);
            let first = streamed.is_none();
            *streamed = Some(id);
            first
        };

        let mut out = lock(&self.out);
        if first {
            self.clear_spinner();
            if self.show_label {
                let _ = writeln!(out, "{}", ConsoleFormatter::sender_label(Sender::Assistant));
            }
        }
        let _ = write!(out, "{}", chunk);
        let _ = out.flush();
        *lock(&self.line_open) = true;
    }

    fn on_error(&self, message: &str) {
        self.clear_spinner();
        self.discard_partial();
        let mut err = lock(&self.err);
        let _ = writeln!(err, "{}", ConsoleFormatter::error(message));
        let _ = err.flush();
    }
}
