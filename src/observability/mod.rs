//! Observability
//!
//! - Structured logging (JSON lines)
//! - Counters for store and request outcomes
//!
//! ```ignore
//! use culturemesh::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::ServerReady, &[("addr", "0.0.0.0:8080")]);
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

/// Log a lifecycle event
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log an event with fields. Fatal events are logged as FATAL, the rest as
/// INFO.
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    let severity = if event.is_fatal() {
        Severity::Fatal
    } else {
        Severity::Info
    };
    Logger::log(severity, event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        // No panic
        log_event(Event::SchemaApplied);
        log_event_with_fields(Event::ConfigLoaded, &[("path", "/tmp/culturemesh.json")]);
    }
}
