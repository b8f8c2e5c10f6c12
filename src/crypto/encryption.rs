//! AES-256-GCM sealing of history records
//!
//! Each record is encrypted on its own with a fresh random nonce, so one
//! damaged record never prevents reading the others. GCM authentication makes
//! any modification of a sealed record fail decryption instead of yielding
//! altered plaintext.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::{AutomatorError, AutomatorResult};

use super::SecretKey;

/// Size of the AES-GCM nonce in bytes (96 bits)
const NONCE_SIZE: usize = 12;

/// Current sealing format
const SEAL_VERSION: u8 = 1;

/// One encrypted record as stored on a history line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SealedRecord {
    /// The nonce used for this record (base64 encoded)
    pub nonce: String,
    /// The ciphertext with authentication tag (base64 encoded)
    pub ciphertext: String,
    /// Format version for future algorithm upgrades
    #[serde(default = "default_version")]
    pub version: u8,
}

fn default_version() -> u8 {
    SEAL_VERSION
}

impl SealedRecord {
    fn new(nonce: &[u8], ciphertext: &[u8]) -> Self {
        Self {
            nonce: STANDARD.encode(nonce),
            ciphertext: STANDARD.encode(ciphertext),
            version: SEAL_VERSION,
        }
    }

    fn decode_nonce(&self) -> AutomatorResult<Vec<u8>> {
        STANDARD
            .decode(&self.nonce)
            .map_err(|e| AutomatorError::Encryption(format!("Invalid nonce encoding: {}", e)))
    }

    fn decode_ciphertext(&self) -> AutomatorResult<Vec<u8>> {
        STANDARD
            .decode(&self.ciphertext)
            .map_err(|e| AutomatorError::Encryption(format!("Invalid ciphertext encoding: {}", e)))
    }
}

fn cipher(key: &SecretKey) -> AutomatorResult<Aes256Gcm> {
    Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| AutomatorError::Encryption(format!("Failed to create cipher: {}", e)))
}

/// Encrypt raw bytes with a fresh nonce
pub fn seal(plaintext: &[u8], key: &SecretKey) -> AutomatorResult<SealedRecord> {
    let cipher = cipher(key)?;

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| AutomatorError::Encryption(format!("Encryption failed: {}", e)))?;

    Ok(SealedRecord::new(&nonce_bytes, &ciphertext))
}

/// Decrypt and authenticate a sealed record
pub fn open(sealed: &SealedRecord, key: &SecretKey) -> AutomatorResult<Vec<u8>> {
    if sealed.version != SEAL_VERSION {
        return Err(AutomatorError::Encryption(format!(
            "Unsupported record version: {}",
            sealed.version
        )));
    }

    let cipher = cipher(key)?;

    let nonce_bytes = sealed.decode_nonce()?;
    if nonce_bytes.len() != NONCE_SIZE {
        return Err(AutomatorError::Encryption(format!(
            "Invalid nonce size: expected {}, got {}",
            NONCE_SIZE,
            nonce_bytes.len()
        )));
    }
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = sealed.decode_ciphertext()?;

    cipher.decrypt(nonce, ciphertext.as_ref()).map_err(|_| {
        AutomatorError::Encryption("Decryption failed: invalid key or corrupted data".to_string())
    })
}

/// Serialize a value to JSON and seal it
pub fn seal_json<T: Serialize>(value: &T, key: &SecretKey) -> AutomatorResult<SealedRecord> {
    let mut plaintext = serde_json::to_vec(value)?;
    let sealed = seal(&plaintext, key);
    zeroize::Zeroize::zeroize(&mut plaintext);
    sealed
}

/// Open a sealed record and deserialize its JSON payload
pub fn open_json<T: DeserializeOwned>(sealed: &SealedRecord, key: &SecretKey) -> AutomatorResult<T> {
    let mut plaintext = open(sealed, key)?;
    let value = serde_json::from_slice(&plaintext).map_err(|e| {
        AutomatorError::Encryption(format!("Decrypted record is not valid JSON: {}", e))
    });
    zeroize::Zeroize::zeroize(&mut plaintext);
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seal_open() {
        let key = SecretKey::generate();
        let plaintext = b"Ov23liExampleClientId";

        let sealed = seal(plaintext, &key).unwrap();
        let opened = open(&sealed, &key).unwrap();

        assert_eq!(plaintext, opened.as_slice());
    }

    #[test]
    fn test_different_nonces() {
        let key = SecretKey::generate();
        let plaintext = b"same plaintext";

        let sealed1 = seal(plaintext, &key).unwrap();
        let sealed2 = seal(plaintext, &key).unwrap();

        assert_ne!(sealed1.nonce, sealed2.nonce);
        assert_ne!(sealed1.ciphertext, sealed2.ciphertext);
    }

    #[test]
    fn test_wrong_key_fails() {
        let sealed = seal(b"secret", &SecretKey::generate()).unwrap();
        let result = open(&sealed, &SecretKey::generate());
        assert!(result.unwrap_err().is_encryption());
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let key = SecretKey::generate();
        let mut sealed = seal(b"Hello, World!", &key).unwrap();

        let mut ciphertext = STANDARD.decode(&sealed.ciphertext).unwrap();
        ciphertext[0] ^= 0x01;
        sealed.ciphertext = STANDARD.encode(&ciphertext);

        assert!(open(&sealed, &key).is_err());
    }

    #[test]
    fn test_unsupported_version() {
        let key = SecretKey::generate();
        let mut sealed = seal(b"data", &key).unwrap();
        sealed.version = 9;

        let err = open(&sealed, &key).unwrap_err();
        assert!(err.to_string().contains("Unsupported record version"));
    }

    #[test]
    fn test_json_round_trip() {
        let key = SecretKey::generate();
        let value = serde_json::json!({"app_name": "acme", "env_type": "DEV"});

        let sealed = seal_json(&value, &key).unwrap();
        let opened: serde_json::Value = open_json(&sealed, &key).unwrap();

        assert_eq!(opened, value);
    }
}
