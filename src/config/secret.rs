//! Secure credential handling using the secrecy crate
//!
//! The outbound bearer token is the only secret the engine holds. It is kept
//! in a `Secret` so it is zeroed on drop, redacted in `Debug` output and only
//! reachable through `expose_secret()`.
//!
//! # Example
//!
//! ```rust
//! use emr_hl7::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let token = secret_string("his-token".to_string());
//! assert_eq!(token.expose_secret(), "his-token");
//! assert!(!format!("{token:?}").contains("his-token"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// Newtype wrapper for String that implements the required traits for Secret
#[derive(Clone, Debug, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SecretValue {
    /// Check if the secret value is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `Authorization` header value carrying this token
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl Serialize for SecretValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// Type alias for a secret string
pub type SecretString = Secret<SecretValue>;

/// Helper function to create a SecretString from a String
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_secret_string_creation() {
        let secret = secret_string("token-abc".to_string());
        assert_eq!(secret.expose_secret(), "token-abc");
        assert!(!secret.expose_secret().is_empty());
    }

    #[test]
    fn test_secret_debug_redacted() {
        let secret = secret_string("sensitive-token".to_string());
        let debug_output = format!("{secret:?}");
        assert!(!debug_output.contains("sensitive-token"));
    }

    #[test]
    fn test_secret_deserialize_from_toml() {
        #[derive(Deserialize)]
        struct Transport {
            auth_token: SecretString,
        }

        let transport: Transport = toml::from_str(r#"auth_token = "abc""#).unwrap();
        assert_eq!(transport.auth_token.expose_secret(), "abc");
    }

    #[test]
    fn test_bearer_header_value() {
        let secret = secret_string("his-token".to_string());
        assert_eq!(secret.expose_secret().bearer(), "Bearer his-token");
        assert_eq!(secret.expose_secret().as_str(), "his-token");
    }
}
