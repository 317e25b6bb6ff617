//! culturemesh - REST API for social networks built around a shared place of
//! origin or language and a current location.
//!
//! Query building, cursor pagination and record projection live in
//! [`rest_api`]; the per-resource operations in [`social`] compose them over
//! the [`store`].

pub mod auth;
pub mod cli;
pub mod http_server;
pub mod observability;
pub mod rest_api;
pub mod social;
pub mod store;
