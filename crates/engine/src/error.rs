//! The error taxonomy of the engine.
//!
//! Four kinds, all returned synchronously and never retried internally
//! (the engine is a pure computation, so retrying with the same input
//! yields the same error):
//!
//! - [`Validation`] — malformed or out-of-range input.
//! - [`Configuration`] — conflicting rule setup.
//! - [`Consistency`] — an invariant violation detected in stored history;
//!   writes to the affected entity are halted until an operator resolves
//!   it.
//! - [`NotApplicable`] — the operation does not apply to the entity.
//!
//! [`Validation`]: EngineError::Validation
//! [`Configuration`]: EngineError::Configuration
//! [`Consistency`]: EngineError::Consistency
//! [`NotApplicable`]: EngineError::NotApplicable

use thiserror::Error;
use uuid::Uuid;

/// Engine custom errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("validation: {0}")]
    Validation(String),
    #[error("configuration: {0}")]
    Configuration(String),
    #[error("data integrity issue on entity {entity_id}: {reason}")]
    Consistency { entity_id: Uuid, reason: String },
    #[error("not applicable: {0}")]
    NotApplicable(String),
}
