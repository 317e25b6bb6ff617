//! # API Keys
//!
//! Static keys from configuration gate the network endpoints.

use super::crypto::constant_time_str_eq;
use super::errors::{AuthError, AuthResult};

/// Query parameter carrying the key
pub const API_KEY_PARAM: &str = "key";

/// Header carrying the key
pub const API_KEY_HEADER: &str = "apikey";

/// The set of accepted API keys
#[derive(Debug, Clone, Default)]
pub struct ApiKeyRing {
    keys: Vec<String>,
}

impl ApiKeyRing {
    pub fn new(keys: Vec<String>) -> Self {
        Self {
            keys: keys.into_iter().filter(|k| !k.is_empty()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Check a presented key.
    ///
    /// Every configured key is compared so the time taken does not depend on
    /// which key matched.
    pub fn verify(&self, presented: Option<&str>) -> AuthResult<()> {
        let presented = match presented {
            Some(key) if !key.is_empty() => key,
            _ => return Err(AuthError::MissingApiKey),
        };

        let matched = self
            .keys
            .iter()
            .fold(false, |found, key| constant_time_str_eq(key, presented) | found);

        if matched {
            Ok(())
        } else {
            Err(AuthError::InvalidApiKey)
        }
    }
}
