//! File I/O utilities with atomic writes
//!
//! Provides safe file operations that won't corrupt data on failure.

use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::AutomatorError;

/// Read a text file, returning an empty string if it doesn't exist
pub fn read_text<P: AsRef<Path>>(path: P) -> Result<String, AutomatorError> {
    let path = path.as_ref();

    match fs::read_to_string(path) {
        Ok(contents) => Ok(contents),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(AutomatorError::Storage(format!(
            "Failed to read {}: {}",
            path.display(),
            e
        ))),
    }
}

/// Sibling temp file used while replacing `path`
///
/// Hidden and named after the full file name, so `.env` and `.env.local`
/// never share a temp file.
pub fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string());
    let temp_name = format!(".{}.tmp", name.trim_start_matches('.'));
    path.with_file_name(temp_name)
}

/// Write text to a file atomically (write to temp, then rename)
///
/// This ensures that the file is either completely written or not modified at all,
/// preventing corruption on crashes or interruption. Permissions of an existing
/// file are carried over to the replacement.
pub fn write_text_atomic<P: AsRef<Path>>(path: P, contents: &str) -> Result<(), AutomatorError> {
    let path = path.as_ref();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            AutomatorError::Storage(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    let existing_permissions = fs::metadata(path).ok().map(|m| m.permissions());

    // Temp file in same directory (important for atomic rename)
    let temp_path = temp_path_for(path);

    let result = write_and_sync(&temp_path, contents).and_then(|_| {
        if let Some(permissions) = existing_permissions {
            fs::set_permissions(&temp_path, permissions).map_err(|e| {
                AutomatorError::Storage(format!("Failed to copy file permissions: {}", e))
            })?;
        }
        fs::rename(&temp_path, path)
            .map_err(|e| AutomatorError::Storage(format!("Failed to rename temp file: {}", e)))
    });

    if result.is_err() {
        // Leave the original untouched and don't litter the directory.
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn write_and_sync(temp_path: &Path, contents: &str) -> Result<(), AutomatorError> {
    let file = File::create(temp_path)
        .map_err(|e| AutomatorError::Storage(format!("Failed to create temp file: {}", e)))?;

    let mut writer = BufWriter::new(file);
    writer
        .write_all(contents.as_bytes())
        .map_err(|e| AutomatorError::Storage(format!("Failed to write temp file: {}", e)))?;

    writer
        .flush()
        .map_err(|e| AutomatorError::Storage(format!("Failed to flush data: {}", e)))?;

    // Sync to disk before rename
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| AutomatorError::Storage(format!("Failed to sync data: {}", e)))
}
