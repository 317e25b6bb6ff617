//! # REST API Module
//!
//! Request-independent building blocks shared by every resource: the
//! predicate builder, cursor pagination, record projection and mutation
//! statements.

pub mod errors;
pub mod form;
pub mod mutation;
pub mod pagination;
pub mod projector;
pub mod response;
pub mod selection;
pub mod tables;

pub use errors::{ErrorResponse, RestError, RestResult};
pub use form::{FormSource, PseudoForm, RequestForm};
pub use pagination::{paginate, CursorKind, PageParams, PageQuery};
pub use projector::{project, project_one, Lookup, Record, DEFAULT_REDACTED};
pub use response::{CreatedResponse, DeleteResponse, MessageResponse, StatusResponse};
pub use selection::{parse_id, parse_location, require_id, Location, Predicate, NULL_ID};
pub use tables::Table;
