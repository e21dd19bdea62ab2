//! Secure credential handling using the secrecy crate
//!
//! The Cosmos DB account key is kept in a [`SecretString`]: memory is zeroed
//! when it is dropped, `Debug` output is redacted, and reading it requires an
//! explicit `expose_secret()`.
//!
//! # Example
//!
//! ```rust
//! use cosmos_harness::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let key = secret_string("account-key".to_string());
//! assert_eq!(key.expose_secret().as_ref(), "account-key");
//! assert!(!format!("{key:?}").contains("account-key"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret};
use serde::{Deserialize, Deserializer};
use zeroize::Zeroize;

/// String wrapper implementing the traits `Secret` requires
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}

impl SecretValue {
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
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

/// A secret string that is zeroized on drop and redacted in `Debug`
pub type SecretString = Secret<SecretValue>;

/// Wrap a String in a [`SecretString`]
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_secret_debug_redacted() {
        let secret = secret_string("C2y6yDjf5/R+ob0N8A7Cgv30VRDJIWEHLM+4QDU5DE2nQ9nDuVTqobD4b8mGGyPMbIZnqyMsEcaGQy67XIw/Jw==".to_string());
        let debug_output = format!("{secret:?}");
        assert!(!debug_output.contains("C2y6yDjf5"));
        assert!(debug_output.contains("REDACTED"));
    }

    #[test]
    fn test_secret_deserialize() {
        #[derive(Deserialize)]
        struct Holder {
            key: SecretString,
        }

        let holder: Holder = toml::from_str(r#"key = "abc123""#).unwrap();
        assert_eq!(holder.key.expose_secret().as_ref(), "abc123");
        assert!(!holder.key.expose_secret().is_empty());
    }

    #[test]
    fn test_blank_secret_is_empty() {
        assert!(secret_string("   ".to_string()).expose_secret().is_empty());
    }
}
