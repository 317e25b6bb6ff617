//! # HTTP Server
//!
//! Main HTTP server combining all endpoint routers.

use std::io;
use std::sync::Arc;

use axum::{middleware, Router};
use tokio::net::TcpListener;

use crate::observability::{log_event_with_fields, Event};

use super::config::HttpServerConfig;
use super::event_routes::event_routes;
use super::guard::record_outcome;
use super::network_routes::network_routes;
use super::observability_routes::observability_routes;
use super::post_routes::post_routes;
use super::state::AppState;
use super::user_routes::user_routes;

/// HTTP server for the CultureMesh API
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server over shared state
    pub fn with_config(config: HttpServerConfig, state: Arc<AppState>) -> Self {
        let router = Self::build_router(&config, state);
        Self { config, router }
    }

    /// Build the combined router with all endpoints
    fn build_router(config: &HttpServerConfig, state: Arc<AppState>) -> Router {
        Router::new()
            // Health and metrics at root level
            .merge(observability_routes(state.clone()))
            .nest("/network", network_routes(state.clone()))
            .nest("/user", user_routes(state.clone()))
            .nest("/event", event_routes(state.clone()))
            .nest("/post", post_routes(state.clone()))
            .layer(middleware::from_fn_with_state(state, record_outcome))
            .layer(config.cors_layer())
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Bind and serve until the listener fails
    pub async fn start(self) -> io::Result<()> {
        let addr = self.config.listen_addr()?;

        let listener = TcpListener::bind(addr).await?;
        let bound = listener.local_addr()?.to_string();
        log_event_with_fields(Event::ServerReady, &[("addr", bound.as_str())]);

        axum::serve(listener, self.router).await
    }
}
