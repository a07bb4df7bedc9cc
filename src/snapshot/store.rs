//! HTML snapshot store with bounded history
//!
//! For each subject (typically a page object name) the store keeps one live
//! file, overwritten on every capture, plus a small number of timestamped
//! copies under `history/`. History is pruned after every capture so at most
//! `retention` copies remain per subject, keeping the most recently modified.
//!
//! Capture is best-effort: a snapshot that cannot be written must never fail
//! the test run that asked for it. Failures are logged and swallowed; callers
//! that need to assert success check the filesystem.

use chrono::{DateTime, Local};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};

use crate::core::{Config, PommelError, Result};

/// Filesystem store for page HTML snapshots
///
/// Layout, relative to the store root:
///
/// ```text
/// {subject}.html                        live snapshot, overwritten each capture
/// history/{subject}_{YYYYMMDD_HHMMSS}.html   pruned to the N most recent
/// ```
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    root: PathBuf,
}

impl SnapshotStore {
    /// Create a store rooted at the given directory
    ///
    /// Nothing is created on disk until the first capture.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create a store at the directory named in the config
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.snapshots.dir)
    }

    /// The store's root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn history_dir(&self) -> PathBuf {
        self.root.join("history")
    }

    fn live_path(&self, subject: &str) -> PathBuf {
        self.root.join(format!("{}.html", subject))
    }

    /// Capture a snapshot for `subject`, keeping at most `retention` history
    /// copies
    ///
    /// Never returns an error: any I/O failure is logged as a warning and
    /// swallowed. The subject is used directly as a filename stem, so callers
    /// supply filesystem-safe names.
    pub fn capture(&self, subject: &str, content: &str, retention: usize) {
        self.capture_at(subject, content, retention, Local::now());
    }

    /// Capture with an explicit timestamp instead of the current time
    ///
    /// Two captures in the same second share a history filename; the later
    /// one overwrites the earlier.
    pub fn capture_at(
        &self,
        subject: &str,
        content: &str,
        retention: usize,
        at: DateTime<Local>,
    ) {
        if let Err(e) = self.try_capture(subject, content, retention, at) {
            warn!(subject, error = %e, "could not save HTML snapshot");
        }
    }

    fn try_capture(
        &self,
        subject: &str,
        content: &str,
        retention: usize,
        at: DateTime<Local>,
    ) -> Result<()> {
        let history = self.history_dir();
        fs::create_dir_all(&history)
            .map_err(|e| PommelError::snapshot(format!("create {}: {}", history.display(), e)))?;

        let live = self.live_path(subject);
        fs::write(&live, content)
            .map_err(|e| PommelError::snapshot(format!("write {}: {}", live.display(), e)))?;

        let timestamp = at.format("%Y%m%d_%H%M%S");
        let entry = history.join(format!("{}_{}.html", subject, timestamp));
        fs::write(&entry, content)
            .map_err(|e| PommelError::snapshot(format!("write {}: {}", entry.display(), e)))?;
        debug!(subject, path = %entry.display(), "saved HTML snapshot");

        self.prune(subject, retention)
    }

    /// Delete history entries for `subject` beyond the `retention` most
    /// recently modified
    fn prune(&self, subject: &str, retention: usize) -> Result<()> {
        let mut entries = self.history_paths(subject)?;
        // Newest first, by filesystem mtime rather than the name-embedded
        // timestamp: externally touched copies count as fresh.
        entries.sort_by_key(|(_, modified)| std::cmp::Reverse(*modified));

        for (path, _) in entries.into_iter().skip(retention) {
            fs::remove_file(&path)
                .map_err(|e| PommelError::snapshot(format!("prune {}: {}", path.display(), e)))?;
            debug!(subject, path = %path.display(), "pruned HTML snapshot");
        }
        Ok(())
    }

    fn history_paths(&self, subject: &str) -> Result<Vec<(PathBuf, SystemTime)>> {
        let prefix = format!("{}_", subject);
        let mut entries = Vec::new();

        for entry in fs::read_dir(self.history_dir())? {
            let entry = entry?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if !name.starts_with(&prefix) || !name.ends_with(".html") {
                continue;
            }
            let modified = entry
                .metadata()
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            entries.push((entry.path(), modified));
        }
        Ok(entries)
    }

    /// Read the live snapshot for `subject`, if one has been captured
    pub fn read_live(&self, subject: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.live_path(subject)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List history entries for `subject`, newest first by mtime
    pub fn history(&self, subject: &str) -> Result<Vec<PathBuf>> {
        let mut entries = match self.history_paths(subject) {
            Ok(entries) => entries,
            Err(PommelError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };
        entries.sort_by_key(|(_, modified)| std::cmp::Reverse(*modified));
        Ok(entries.into_iter().map(|(path, _)| path).collect())
    }
}
