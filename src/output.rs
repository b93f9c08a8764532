use std::path::PathBuf;

use serde::Serialize;

use crate::watcher::event::ChangeKind;

/// Fixed message logged after every successful rebuild.
pub const SUCCESS_MESSAGE: &str = "compiled all templates";

/// One user-visible record emitted by the watch loop.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WatchReport {
    /// The watch is registered and the loop is live.
    Watching {
        root: PathBuf,
        output: PathBuf,
        templates: usize,
    },
    /// A template changed and a rebuild is being launched.
    Changed { path: PathBuf, kind: ChangeKind },
    /// A rebuild finished successfully. `message` is always [`SUCCESS_MESSAGE`].
    Compiled {
        output: PathBuf,
        message: &'static str,
    },
    /// A rebuild failed; the loop keeps going.
    Failed { error: String },
    /// Interrupted; the watch has been released.
    Stopped,
}

impl WatchReport {
    pub fn compiled(output: impl Into<PathBuf>) -> Self {
        WatchReport::Compiled {
            output: output.into(),
            message: SUCCESS_MESSAGE,
        }
    }
}

/// Sink for watch reports. Shared across compile tasks, hence `Send + Sync`.
pub trait Report: Send + Sync {
    fn report(&self, report: WatchReport);
}

/// Writes reports to the console.
///
/// - `json = false`: human-readable lines through `tracing` (stderr).
/// - `json = true`: one JSON object per line on **stdout**, so the stream
///   stays clean for downstream consumers while diagnostics keep going to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter {
    pub json: bool,
}

impl ConsoleReporter {
    pub fn new(json: bool) -> Self {
        Self { json }
    }
}

impl Report for ConsoleReporter {
    fn report(&self, report: WatchReport) {
        if self.json {
            match serde_json::to_string(&report) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::error!(error = %e, "error serialising report"),
            }
            return;
        }

        match report {
            WatchReport::Watching {
                root,
                output,
                templates,
            } => tracing::info!(
                output = %output.display(),
                templates,
                "Watching for changes in Handlebars templates under {}...",
                root.display()
            ),
            WatchReport::Changed { path, kind } => {
                tracing::info!(kind = %kind, "change: {}", path.display())
            }
            WatchReport::Compiled { output, message } => {
                tracing::info!(output = %output.display(), "{message}")
            }
            WatchReport::Failed { error } => tracing::error!("{error}"),
            WatchReport::Stopped => tracing::info!("stopped watching"),
        }
    }
}
