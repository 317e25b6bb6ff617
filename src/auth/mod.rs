//! # Auth Module
//!
//! API-key gating for the network endpoints and HTTP basic authentication
//! against stored Argon2 password hashes for everything that acts on behalf
//! of a user.

pub mod api_key;
pub mod basic;
pub mod crypto;
pub mod errors;

pub use api_key::{ApiKeyRing, API_KEY_HEADER, API_KEY_PARAM};
pub use basic::BasicCredentials;
pub use crypto::{constant_time_str_eq, hash_password, verify_password};
pub use errors::{AuthError, AuthResult};
