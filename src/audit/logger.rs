//! Encrypted, append-only credential history
//!
//! Each line of the history file is one JSON-encoded [`SealedRecord`] holding an
//! encrypted [`AuditRecord`]. Records are sealed independently, so a damaged
//! line only costs that one record.

use std::fs::{self, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::crypto::{open_json, seal_json, SealedRecord, SecretKey};
use crate::error::{AutomatorError, AutomatorResult};

use super::record::{AuditRecord, HistoryListing, SkippedRecord};

/// Handles appending to and reading from a history file
pub struct AuditLog {
    /// Path to the history file
    history_path: PathBuf,
}

impl AuditLog {
    /// Create an AuditLog over the specified history file
    pub fn new(history_path: impl Into<PathBuf>) -> Self {
        Self {
            history_path: history_path.into(),
        }
    }

    /// Encrypt a record and append it as one line
    ///
    /// The file is created on first use; existing lines are never rewritten.
    pub fn append(&self, record: &AuditRecord, key: &SecretKey) -> AutomatorResult<()> {
        let sealed = seal_json(record, key)?;
        let line = serde_json::to_string(&sealed)
            .map_err(|e| AutomatorError::Json(format!("Failed to serialize record: {}", e)))?;

        if let Some(parent) = self.history_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AutomatorError::Io(format!("Failed to create history directory: {}", e))
            })?;
        }

        let mut file = open_for_append(&self.history_path)
            .map_err(|e| AutomatorError::Io(format!("Failed to open history: {}", e)))?;

        if ends_mid_line(&mut file)
            .map_err(|e| AutomatorError::Io(format!("Failed to inspect history: {}", e)))?
        {
            warn!(path = %self.history_path.display(), "history ends in a partial record");
            file.write_all(b"\n").map_err(|e| {
                AutomatorError::Io(format!("Failed to terminate partial record: {}", e))
            })?;
        }

        writeln!(file, "{}", line)
            .map_err(|e| AutomatorError::Io(format!("Failed to write history record: {}", e)))?;

        file.sync_all()
            .map_err(|e| AutomatorError::Io(format!("Failed to sync history: {}", e)))?;

        info!(
            app_name = %record.app_name,
            environment = %record.environment,
            "app logged to secure history"
        );
        Ok(())
    }

    /// Decrypt every record into a secret-free summary
    ///
    /// Unreadable records are skipped with a warning and reported in the
    /// listing instead of failing the whole call.
    pub fn list(&self, key: &SecretKey) -> AutomatorResult<HistoryListing> {
        let mut listing = HistoryListing::default();

        for (position, line) in self.read_lines()? {
            match line.and_then(|line| decode_line(&line, key)) {
                Ok(record) => listing.records.push(record.summary(position)),
                Err(e) => {
                    warn!(position, error = %e, "skipping unreadable history record");
                    listing.skipped.push(SkippedRecord {
                        position,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(listing)
    }

    /// Decrypt the full record at `index` (1-based), secret included
    pub fn reveal(&self, key: &SecretKey, index: usize) -> AutomatorResult<AuditRecord> {
        let line = self
            .read_lines()?
            .into_iter()
            .find(|(position, _)| *position == index)
            .map(|(_, line)| line)
            .ok_or_else(|| AutomatorError::record_not_found(format!("#{}", index)))?;

        decode_line(&line?, key)
    }

    /// Number of records in the history, readable or not
    pub fn entry_count(&self) -> AutomatorResult<usize> {
        Ok(self.read_lines()?.len())
    }

    /// Check if the history file exists
    pub fn exists(&self) -> bool {
        self.history_path.exists()
    }

    /// Get the path to the history file
    pub fn path(&self) -> &Path {
        &self.history_path
    }

    /// Non-empty lines with their 1-based positions
    ///
    /// Lines that are not valid UTF-8 are returned as errors so callers can
    /// skip them individually.
    fn read_lines(&self) -> AutomatorResult<Vec<(usize, AutomatorResult<String>)>> {
        if !self.history_path.exists() {
            return Ok(Vec::new());
        }

        let bytes = fs::read(&self.history_path)
            .map_err(|e| AutomatorError::Io(format!("Failed to read history: {}", e)))?;

        Ok(bytes
            .split(|b| *b == b'\n')
            .filter(|line| !line.iter().all(u8::is_ascii_whitespace))
            .enumerate()
            .map(|(i, line)| {
                let text = String::from_utf8(line.to_vec()).map_err(|_| {
                    AutomatorError::Encryption("History record is not valid UTF-8".to_string())
                });
                (i + 1, text)
            })
            .collect())
    }
}

fn decode_line(line: &str, key: &SecretKey) -> AutomatorResult<AuditRecord> {
    let sealed: SealedRecord = serde_json::from_str(line.trim())
        .map_err(|e| AutomatorError::Encryption(format!("Malformed history record: {}", e)))?;
    open_json(&sealed, key)
}

/// True if the file is non-empty and its last byte is not a newline
fn ends_mid_line(file: &mut fs::File) -> std::io::Result<bool> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::Start(len - 1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

#[cfg(unix)]
fn open_for_append(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;

    OpenOptions::new()
        .create(true)
        .read(true)
        .append(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_for_append(path: &Path) -> std::io::Result<fs::File> {
    OpenOptions::new()
        .create(true)
        .read(true)
        .append(true)
        .open(path)
}
