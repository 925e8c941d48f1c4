//! Domain services behind the HTTP handlers.
//!
//! Provides the roster import pipeline, attendance aggregation and export
//! shaping, email delivery, and the error type the handlers map to responses.

pub mod email;
pub mod error;
pub mod import;
pub mod reports;

pub use error::ServiceError;
