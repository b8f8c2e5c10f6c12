//! Symmetric key file management
//!
//! The history is protected by a single random AES-256 key stored next to it.
//! The key file is created once, base64 encoded, and readable by its owner only.
//! If the owner-only permission cannot be established, logging does not proceed.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::OsRng;
use base64::{engine::general_purpose::STANDARD, Engine};
use tracing::{info, warn};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{AutomatorError, AutomatorResult};

/// Size of an AES-256 key in bytes
pub const KEY_SIZE: usize = 32;

/// A 256-bit symmetric key, zeroed on drop
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey {
    key: [u8; KEY_SIZE],
}

impl SecretKey {
    /// Generate a fresh random key
    pub fn generate() -> Self {
        let mut key = [0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut key);
        Self { key }
    }

    /// Build a key from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> AutomatorResult<Self> {
        if bytes.len() != KEY_SIZE {
            return Err(AutomatorError::Encryption(format!(
                "Invalid key length: expected {}, got {}",
                KEY_SIZE,
                bytes.len()
            )));
        }
        let mut key = [0u8; KEY_SIZE];
        key.copy_from_slice(bytes);
        Ok(Self { key })
    }

    /// Get the key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }

    fn encode(&self) -> String {
        STANDARD.encode(self.key)
    }

    fn decode(encoded: &str) -> AutomatorResult<Self> {
        let mut bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| AutomatorError::Encryption(format!("Invalid key encoding: {}", e)))?;
        let key = Self::from_bytes(&bytes);
        bytes.zeroize();
        key
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey([REDACTED])")
    }
}

/// Load the key at `path`, creating it on first use
pub fn load_or_create_key(path: &Path) -> AutomatorResult<SecretKey> {
    if path.exists() {
        if !is_empty_file(path) {
            return load_key(path);
        }
        // An empty key never sealed anything; replace it.
        warn!(path = %path.display(), "replacing empty key file");
        fs::remove_file(path).map_err(|e| {
            AutomatorError::KeyPermission(format!(
                "Failed to remove empty key file {}: {}",
                path.display(),
                e
            ))
        })?;
    }

    let key = SecretKey::generate();
    match write_new_key_file(path, &key) {
        Ok(()) => info!(path = %path.display(), "created new key file"),
        // Lost a race against another writer; use theirs.
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return load_key(path),
        Err(e) => {
            return Err(AutomatorError::KeyPermission(format!(
                "Failed to create key file {}: {}",
                path.display(),
                e
            )))
        }
    }

    restrict_to_owner(path)?;
    Ok(key)
}

/// Load an existing key file
///
/// Fails with `NotFound` if the key has never been created.
pub fn load_key(path: &Path) -> AutomatorResult<SecretKey> {
    if !path.exists() {
        return Err(AutomatorError::NotFound {
            entity_type: "Key file",
            identifier: path.display().to_string(),
        });
    }

    restrict_to_owner(path)?;

    let mut contents = fs::read_to_string(path).map_err(|e| {
        AutomatorError::Io(format!("Failed to read key file {}: {}", path.display(), e))
    })?;
    let key = SecretKey::decode(&contents);
    contents.zeroize();
    key
}

#[cfg(unix)]
fn write_new_key_file(path: &Path, key: &SecretKey) -> std::io::Result<()> {
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o600)
        .open(path)?;
    let written = write_key(&mut file, key);
    drop(file);
    discard_on_failure(path, written)
}

#[cfg(not(unix))]
fn write_new_key_file(path: &Path, key: &SecretKey) -> std::io::Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    let written = write_key(&mut file, key);
    drop(file);
    discard_on_failure(path, written)
}

fn write_key(file: &mut fs::File, key: &SecretKey) -> std::io::Result<()> {
    let mut encoded = key.encode();
    let result = file
        .write_all(encoded.as_bytes())
        .and_then(|_| file.sync_all());
    encoded.zeroize();
    result
}

/// Remove a key file whose contents could not be fully written
fn discard_on_failure(path: &Path, written: std::io::Result<()>) -> std::io::Result<()> {
    if written.is_err() {
        if let Err(e) = fs::remove_file(path) {
            warn!(path = %path.display(), error = %e, "failed to remove partial key file");
        }
    }
    written
}

fn is_empty_file(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.len() == 0).unwrap_or(false)
}

/// Force mode 0600 and confirm it took effect
#[cfg(unix)]
fn restrict_to_owner(path: &Path) -> AutomatorResult<()> {
    use std::os::unix::fs::PermissionsExt;

    let permission_error = |e: std::io::Error| {
        AutomatorError::KeyPermission(format!("{}: {}", path.display(), e))
    };

    let mode = fs::metadata(path).map_err(permission_error)?.permissions().mode();
    if mode & 0o077 == 0 {
        return Ok(());
    }

    warn!(
        path = %path.display(),
        mode = format!("{:o}", mode & 0o777),
        "key file readable by others, restricting to owner"
    );
    fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(permission_error)?;

    let mode = fs::metadata(path).map_err(permission_error)?.permissions().mode();
    if mode & 0o077 != 0 {
        return Err(AutomatorError::KeyPermission(format!(
            "{} still has mode {:o}",
            path.display(),
            mode & 0o777
        )));
    }
    Ok(())
}

#[cfg(not(unix))]
fn restrict_to_owner(_path: &Path) -> AutomatorResult<()> {
    Ok(())
}
