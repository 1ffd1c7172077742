//! Terminal and JSON rendering

use episode_events::{DownloadPhase, DownloadProgress};
use serde_json::{Map, Value};
use std::io::Write;

/// Renders progress and results in the selected output mode
pub struct OutputRenderer {
    json: bool,
    last_percent: Option<u8>,
}

impl OutputRenderer {
    pub fn new(json: bool) -> Self {
        Self {
            json,
            last_percent: None,
        }
    }

    /// Show one progress record
    ///
    /// JSON mode prints every record as a line on stdout. Otherwise a single
    /// status line on stderr is rewritten whenever the percentage moves.
    pub fn progress(&mut self, progress: &DownloadProgress) {
        if self.json {
            if let Ok(line) = serde_json::to_string(progress) {
                println!("{line}");
            }
            return;
        }

        let percent = progress.percent();
        let mut stderr = std::io::stderr();
        match progress.phase {
            DownloadPhase::Completed | DownloadPhase::Failed => {
                let status = progress.error_message.as_deref().unwrap_or("done");
                let _ = writeln!(
                    stderr,
                    "\r{}: {percent:>3}% {} ({status})",
                    progress.resource_id,
                    bytes_label(progress)
                );
                self.last_percent = None;
            }
            DownloadPhase::Initial | DownloadPhase::Downloading => {
                if self.last_percent == Some(percent) {
                    return;
                }
                self.last_percent = Some(percent);
                let _ = write!(
                    stderr,
                    "\r{}: {percent:>3}% {}",
                    progress.resource_id,
                    bytes_label(progress)
                );
                let _ = stderr.flush();
            }
        }
    }

    /// Print a command result
    pub fn result(&self, text: &str, value: &Value) {
        if self.json {
            println!("{value}");
        } else {
            println!("{text}");
        }
    }

    /// Print a list of lines, or a JSON array
    pub fn lines(&self, key: &str, lines: &[String], value: Value) {
        if self.json {
            let mut object = Map::new();
            object.insert(key.to_string(), value);
            println!("{}", Value::Object(object));
        } else if lines.is_empty() {
            println!("(none)");
        } else {
            for line in lines {
                println!("{line}");
            }
        }
    }
}

fn bytes_label(progress: &DownloadProgress) -> String {
    if progress.total_bytes == 0 {
        format!("{} bytes", progress.bytes_received)
    } else {
        format!("{}/{} bytes", progress.bytes_received, progress.total_bytes)
    }
}
