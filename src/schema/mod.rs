//! Schema subsystem
//!
//! Field declarations are normalized once, when a schema is defined, into
//! shared read-only descriptors. Instances never see raw declarations.
//!
//! # Design Principles
//!
//! - Declaration problems fail loudly at definition time
//! - Descriptors are immutable after definition
//! - Field order is declaration order

mod declaration;
mod definition;
mod errors;
mod hooks;
mod loader;
mod normalize;
mod options;
mod types;

pub use declaration::{FieldDecl, FieldSpec, Kind, TypeDecl};
pub use definition::Schema;
pub use errors::{SchemaError, SchemaErrorCode, SchemaResult};
pub use hooks::{
    BeforeSetHook, BooleanHook, Callback, DateHook, DefaultHook, FilterHook, HookContext,
    NumberHook, OutputHook, RequiredHook, StringHook, ValueHook, ValueSetHook,
};
pub use loader::SchemaLoader;
pub use normalize::normalize;
pub use options::{GroupSeparator, SchemaOptions};
pub use types::{Constraint, DefaultValue, FieldDescriptor, FieldType, Required};
