use chrono::Utc;
use std::sync::{Arc, Mutex};

/// How many entries the in-memory buffer keeps before dropping the oldest.
const LOG_CAPACITY: usize = 500;

/// Shared in-memory activity log.
///
/// The coordinator records operation outcomes here so an embedding UI can
/// render a debug panel without wiring up a log backend.
#[derive(Clone)]
pub struct Logger {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Logger {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a timestamped entry, evicting the oldest past capacity.
    pub fn log(&self, message: impl AsRef<str>) {
        let timestamp = Utc::now().format("%H:%M:%S%.3f");
        let entry = format!("[{}] {}", timestamp, message.as_ref());

        if let Ok(mut entries) = self.entries.lock() {
            if entries.len() >= LOG_CAPACITY {
                entries.remove(0);
            }
            entries.push(entry);
        }
    }

    /// All entries, newest first.
    pub fn entries(&self) -> Vec<String> {
        if let Ok(entries) = self.entries.lock() {
            let mut latest = entries.clone();
            latest.reverse();
            latest
        } else {
            Vec::new()
        }
    }

    /// Drop all entries.
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}
