//! Observable events
//!
//! Every structured log line names one of these.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    ConfigLoaded,
    SchemaApplied,
    ServerStarting,
    ServerReady,
    ServerFailed,

    // Requests
    RequestRejected,
    RequestFailed,
    AuthRejected,

    // Store
    QueryFailed,

    // Domain
    NetworkCreated,
    UserCreated,
    EventCreated,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::SchemaApplied => "SCHEMA_APPLIED",
            Event::ServerStarting => "SERVER_STARTING",
            Event::ServerReady => "SERVER_READY",
            Event::ServerFailed => "SERVER_FAILED",

            Event::RequestRejected => "REQUEST_REJECTED",
            Event::RequestFailed => "REQUEST_FAILED",
            Event::AuthRejected => "AUTH_REJECTED",

            Event::QueryFailed => "QUERY_FAILED",

            Event::NetworkCreated => "NETWORK_CREATED",
            Event::UserCreated => "USER_CREATED",
            Event::EventCreated => "EVENT_CREATED",
        }
    }

    /// Process cannot continue after this event
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::ServerFailed)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
