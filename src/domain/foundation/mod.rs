//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, and error types shared by the
//! billing domain and its ports.

mod errors;
mod ids;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{UserId, WebhookFailureId};
pub use timestamp::Timestamp;
