use std::fs::{File, OpenOptions};
use std::io::Write;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::trace::trace::TraceEvent;

/// Appends one JSON object per line to the trace file. A logger that could
/// not open its file, or was built with [`TraceLogger::disabled`], drops
/// every event.
pub struct TraceLogger {
    file: Option<Mutex<File>>,
    dropped: AtomicUsize,
}

impl TraceLogger {
    pub fn new(path: &str) -> Self {
        let file = OpenOptions::new().create(true).append(true).open(path);

        match file {
            Ok(f) => Self {
                file: Some(Mutex::new(f)),
                dropped: AtomicUsize::new(0),
            },
            Err(e) => {
                eprintln!("Warning: could not open trace file '{}': {}", path, e);
                Self::disabled()
            }
        }
    }

    pub fn disabled() -> Self {
        Self {
            file: None,
            dropped: AtomicUsize::new(0),
        }
    }

    pub fn from_path(path: Option<&str>) -> Self {
        match path {
            Some(p) => Self::new(p),
            None => Self::disabled(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.file.is_some()
    }

    /// Events that were meant for an open trace file but never reached it.
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Append `event` to the trace file. Returns whether a line was written;
    /// a disabled logger always returns false.
    pub fn log(&self, event: &TraceEvent) -> bool {
        let Some(file) = &self.file else {
            return false;
        };

        match write_event(file, event) {
            Ok(()) => true,
            Err(reason) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                eprintln!(
                    "Warning: {} trace event for '{}' dropped: {}",
                    event.operation, event.source, reason
                );
                false
            }
        }
    }
}

fn write_event(file: &Mutex<File>, event: &TraceEvent) -> Result<(), String> {
    let json = serde_json::to_string(event).map_err(|e| format!("serialize failed: {}", e))?;

    // A panic while holding the lock leaves the file itself usable.
    let mut file = file.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    writeln!(file, "{}", json).map_err(|e| format!("write failed: {}", e))
}
