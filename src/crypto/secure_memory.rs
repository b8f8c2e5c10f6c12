//! Secure memory handling for sensitive data
//!
//! Provides types that zero their memory on drop so client secrets, passwords
//! and key material do not linger after use.

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A string type that zeros its contents on drop
///
/// Use this for client secrets, passwords and other sensitive string data.
/// `Debug` and `Display` never print the contents.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecureString {
    inner: String,
}

impl SecureString {
    /// Create a new SecureString
    pub fn new(s: impl Into<String>) -> Self {
        Self { inner: s.into() }
    }

    /// Get the string contents
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Get the length
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Partially masked form: first 10 and last 4 characters
    ///
    /// Values too short to leave anything hidden are fully masked.
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.inner.chars().collect();
        if chars.len() < 14 {
            return "*".repeat(8);
        }
        let head: String = chars[..10].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

impl Deref for SecureString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl AsRef<str> for SecureString {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl From<String> for SecureString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecureString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

// Don't print the contents in Debug output
impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureString")
            .field("len", &self.inner.len())
            .finish()
    }
}

// Don't print the contents in Display output
impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED {} bytes]", self.inner.len())
    }
}

impl Serialize for SecureString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.inner)
    }
}

impl<'de> Deserialize<'de> for SecureString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_string_basic() {
        let s = SecureString::new("secret123");
        assert_eq!(s.as_str(), "secret123");
        assert_eq!(s.len(), 9);
        assert!(!s.is_empty());
    }

    #[test]
    fn test_secure_string_debug_redacted() {
        let s = SecureString::new("secret123");
        let debug = format!("{:?}", s);
        assert!(!debug.contains("secret123"));
        assert!(debug.contains("len"));
    }

    #[test]
    fn test_secure_string_display_redacted() {
        let s = SecureString::new("secret123");
        let display = format!("{}", s);
        assert!(!display.contains("secret123"));
        assert!(display.contains("REDACTED"));
    }

    #[test]
    fn test_masked() {
        let s = SecureString::new("0123456789abcdefWXYZ");
        assert_eq!(s.masked(), "0123456789...WXYZ");

        let short = SecureString::new("tiny");
        assert_eq!(short.masked(), "********");
    }

    #[test]
    fn test_serde_transparent() {
        let s = SecureString::new("abc");
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, "\"abc\"");
        let back: SecureString = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
