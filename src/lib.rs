//! fieldcast - runtime schema enforcement for dynamic objects
//!
//! A schema declares typed fields. Instances bound to it typecast every
//! write, keep the last valid value when a write is rejected, and collect
//! the rejections for later inspection.

pub mod cli;
pub mod instance;
pub mod schema;
pub mod typecast;
pub mod validation;
pub mod value;

pub use instance::{Instance, ManagedArray, Slot};
pub use schema::{FieldDecl, FieldSpec, Kind, Schema, SchemaError, SchemaOptions};
pub use validation::{ErrorCode, ErrorKind, ValidationError};
pub use value::{Map, Value};
