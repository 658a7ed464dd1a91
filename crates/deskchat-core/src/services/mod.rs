//! HTTP clients for the support desk backend.

pub mod agents;
pub mod answer;
pub mod ingest;
pub mod shared;

pub use shared::{
    DEFAULT_BASE_URL, ServiceError, ServiceErrorKind, ServiceResult, USER_AGENT,
    resolve_base_url,
};
