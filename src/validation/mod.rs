//! Write-time error reporting
//!
//! Rejected writes never fail the caller. They leave the field unchanged
//! and append a [`ValidationError`] to the collector of the instance or
//! managed array that received the write.

mod collector;
mod error;

pub use collector::ErrorCollector;
pub use error::{ErrorCode, ErrorKind, ValidationError};
