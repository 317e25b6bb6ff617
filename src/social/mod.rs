//! # Social Module
//!
//! Resource operations for networks, users, events and posts. Each function
//! takes the store plus already-parsed identifiers and returns projected
//! records; the HTTP layer only extracts inputs and serializes results.

pub mod events;
pub mod networks;
pub mod posts;
pub mod users;

pub use events::EventRole;
pub use networks::{NetworkQuery, Origin};
