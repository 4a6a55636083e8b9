use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

pub const MAX_ENTRIES: usize = 100;

/// Requests typed into agent mode, oldest first, persisted one per line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    path: PathBuf,
    entries: Vec<String>,
}

impl History {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Vec::new(),
        }
    }

    /// Read the history file. A missing or unreadable file starts an empty
    /// history.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let mut history = Self::new(path);
        match fs::read_to_string(&history.path) {
            Ok(contents) => {
                history.entries = contents
                    .lines()
                    .filter(|line| !line.trim().is_empty())
                    .map(str::to_string)
                    .collect();
                history.truncate();
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => {
                warn!(path = %history.path.display(), error = %err, "Could not load agent history");
            }
        }
        history
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append `entry` unless it repeats the previous one. Returns whether it
    /// was added.
    pub fn push(&mut self, entry: &str) -> bool {
        let entry = entry.trim();
        if entry.is_empty() || self.entries.last().map(String::as_str) == Some(entry) {
            return false;
        }
        self.entries.push(entry.to_string());
        self.truncate();
        true
    }

    /// Up to `limit` entries, newest first.
    pub fn recent(&self, limit: usize) -> Vec<&str> {
        self.entries
            .iter()
            .rev()
            .take(limit)
            .map(String::as_str)
            .collect()
    }

    pub fn save(&self) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, self.entries.join("\n"))
    }

    fn truncate(&mut self) {
        if self.entries.len() > MAX_ENTRIES {
            let excess = self.entries.len() - MAX_ENTRIES;
            self.entries.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn consecutive_duplicates_are_skipped() {
        let mut history = History::new("unused");
        assert!(history.push("list files"));
        assert!(!history.push("list files"));
        assert!(history.push("show disk usage"));
        assert!(history.push("list files"));
        assert!(!history.push("   "));
        assert_eq!(
            history.recent(2),
            vec!["list files", "show disk usage"]
        );
    }

    #[test]
    fn only_the_newest_entries_are_kept() {
        let mut history = History::new("unused");
        for i in 0..(MAX_ENTRIES + 20) {
            history.push(&format!("request {i}"));
        }
        assert_eq!(history.entries().len(), MAX_ENTRIES);
        assert_eq!(history.entries()[0], "request 20");
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache").join("agent_history.log");

        let mut history = History::new(&path);
        history.push("first");
        history.push("second");
        history.save().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond");
        let loaded = History::load(&path);
        assert_eq!(loaded.entries(), ["first", "second"]);
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let history = History::load(dir.path().join("nope.log"));
        assert!(history.is_empty());
    }
}
