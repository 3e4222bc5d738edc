//! Output context shared by every command
//!
//! Supports console, JSON and quiet output modes, an optional transcript log
//! file, and counts reported errors for the process exit code.

use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Output mode for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Console,
    Json,
    Quiet,
}

/// Events written through the context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutputEvent {
    Line { text: String },
    Verbose { text: String },
    Error { text: String },
}

impl OutputEvent {
    fn text(&self) -> &str {
        match self {
            OutputEvent::Line { text }
            | OutputEvent::Verbose { text }
            | OutputEvent::Error { text } => text,
        }
    }
}

/// Output handler trait
pub trait OutputHandler: Send + Sync {
    /// Emit an event
    fn emit(&self, event: &OutputEvent);
}

/// Plain console output
pub struct ConsoleHandler;

impl OutputHandler for ConsoleHandler {
    fn emit(&self, event: &OutputEvent) {
        match event {
            OutputEvent::Line { text } | OutputEvent::Verbose { text } => println!("{}", text),
            OutputEvent::Error { text } => eprintln!("Error: {}", text),
        }
    }
}

/// JSON-lines output on stdout
pub struct JsonHandler;

impl OutputHandler for JsonHandler {
    fn emit(&self, event: &OutputEvent) {
        if let Ok(s) = serde_json::to_string(event) {
            println!("{}", s);
        }
    }
}

/// Quiet handler that only reports errors
pub struct QuietHandler;

impl OutputHandler for QuietHandler {
    fn emit(&self, event: &OutputEvent) {
        if let OutputEvent::Error { text } = event {
            eprintln!("Error: {}", text);
        }
    }
}

/// Create an output handler based on mode
pub fn create_handler(mode: OutputMode) -> Box<dyn OutputHandler> {
    match mode {
        OutputMode::Console => Box::new(ConsoleHandler),
        OutputMode::Json => Box::new(JsonHandler),
        OutputMode::Quiet => Box::new(QuietHandler),
    }
}

/// Sink for user-facing output plus an error counter
///
/// Owned by the caller of the engine and passed through to every command.
pub struct Context {
    handler: Box<dyn OutputHandler>,
    verbose: bool,
    log: Option<Mutex<File>>,
    errors: AtomicUsize,
}

impl Context {
    /// Create a context writing through `handler`
    pub fn new(handler: Box<dyn OutputHandler>, verbose: bool) -> Self {
        Self {
            handler,
            verbose,
            log: None,
            errors: AtomicUsize::new(0),
        }
    }

    /// Also append every emitted line to a transcript file
    pub fn with_log_file(mut self, path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(
            file,
            "# sbom-tool {} log started {}",
            env!("CARGO_PKG_VERSION"),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        )?;

        self.log = Some(Mutex::new(file));
        Ok(self)
    }

    /// Write a line of normal output
    pub fn write_line(&self, text: impl Into<String>) {
        self.emit(OutputEvent::Line { text: text.into() });
    }

    /// Write a line shown only in verbose mode
    pub fn write_verbose(&self, text: impl Into<String>) {
        if self.verbose {
            self.emit(OutputEvent::Verbose { text: text.into() });
        }
    }

    /// Report an error; counted towards the exit code
    pub fn write_error(&self, text: impl Into<String>) {
        self.errors.fetch_add(1, Ordering::Relaxed);
        self.emit(OutputEvent::Error { text: text.into() });
    }

    /// Number of errors reported so far
    pub fn error_count(&self) -> usize {
        self.errors.load(Ordering::Relaxed)
    }

    fn emit(&self, event: OutputEvent) {
        self.handler.emit(&event);

        if let Some(ref log) = self.log {
            if let Ok(mut file) = log.lock() {
                let prefix = if matches!(event, OutputEvent::Error { .. }) {
                    "Error: "
                } else {
                    ""
                };
                if let Err(e) = writeln!(file, "{}{}", prefix, event.text()) {
                    tracing::warn!(error = %e, "Failed to write log file");
                }
            }
        }
    }
}
