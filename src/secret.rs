//! Redacting wrapper for sensitive strings.
//!
//! Used for the transient signing key of a send request and for the provider
//! API key. The wrapped value is zeroed on drop and never shows up in `Debug`
//! or `Display` output.

use serde::{Deserialize, Deserializer};
use std::fmt;
use zeroize::Zeroizing;

/// A string that must never reach a log line.
#[derive(Clone)]
pub struct SecretString(Zeroizing<String>);

impl SecretString {
    /// Wrap a sensitive value.
    pub fn new(value: String) -> Self {
        Self(Zeroizing::new(value))
    }

    /// Expose the raw value.
    ///
    /// Callers must not log or persist the returned slice.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretString(***REDACTED***)")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***REDACTED***")
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Self::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_and_display_redact() {
        let secret = SecretString::from("ac0974bec39a17e36ba4a6b4d238ff94");
        assert_eq!(format!("{:?}", secret), "SecretString(***REDACTED***)");
        assert_eq!(secret.to_string(), "***REDACTED***");
        assert_eq!(secret.expose_secret(), "ac0974bec39a17e36ba4a6b4d238ff94");
    }

    #[test]
    fn test_deserialize_from_plain_string() {
        let secret: SecretString = serde_json::from_str("\"key\"").unwrap();
        assert_eq!(secret.expose_secret(), "key");
        assert!(!secret.is_empty());
    }
}
