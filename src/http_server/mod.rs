//! # HTTP Server Module
//!
//! Axum routers for each resource, merged into one server.
//!
//! # Endpoints
//!
//! - `/health`, `/metrics` - Service status
//! - `/network/*` - Networks (API key required)
//! - `/user/*` - Users, memberships and registrations
//! - `/event/*` - Events
//! - `/post/*` - Posts

pub mod config;
pub mod event_routes;
pub mod guard;
pub mod network_routes;
pub mod observability_routes;
pub mod post_routes;
pub mod server;
pub mod state;
pub mod user_routes;

pub use config::HttpServerConfig;
pub use server::HttpServer;
pub use state::AppState;
