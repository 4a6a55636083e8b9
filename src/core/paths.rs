//! Locations of everything voltx keeps on disk.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::BaseDirs;

/// Overrides the data directory when set.
pub const HOME_ENV: &str = "VOLTX_HOME";
const DATA_DIR_NAME: &str = ".voltx";

#[derive(Debug)]
pub struct NoHomeDirectory;

impl fmt::Display for NoHomeDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Could not determine a home directory; set {HOME_ENV} to choose a data directory"
        )
    }
}

impl std::error::Error for NoHomeDirectory {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoltxPaths {
    root: PathBuf,
}

impl VoltxPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `$VOLTX_HOME` if set, otherwise `~/.voltx`.
    pub fn discover() -> Result<Self, NoHomeDirectory> {
        if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::new(dir));
        }
        let base = BaseDirs::new().ok_or(NoHomeDirectory)?;
        Ok(Self::new(base.home_dir().join(DATA_DIR_NAME)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    pub fn chats_dir(&self) -> PathBuf {
        self.root.join("chats")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.root.join("cache")
    }

    pub fn temp_dir(&self) -> PathBuf {
        self.root.join("temp")
    }

    pub fn history_file(&self) -> PathBuf {
        self.cache_dir().join("agent_history.log")
    }

    pub fn ensure_dirs(&self) -> io::Result<()> {
        for dir in [
            self.root.clone(),
            self.chats_dir(),
            self.logs_dir(),
            self.cache_dir(),
            self.temp_dir(),
        ] {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// Number of saved chat transcripts.
    pub fn saved_chat_count(&self) -> usize {
        fs::read_dir(self.chats_dir())
            .map(|entries| {
                entries
                    .filter_map(Result::ok)
                    .filter(|e| e.path().extension().is_some_and(|ext| ext == "txt"))
                    .count()
            })
            .unwrap_or(0)
    }
}
