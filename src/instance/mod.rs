//! Instance Subsystem
//!
//! Live objects bound to a schema.
//!
//! # Design Principles
//!
//! - Writes never fail loudly: rejections are recorded, the field keeps
//!   its previous value
//! - Containers are created once per instance and mutated in place
//! - Reads go through getters; stored representation is never exposed raw
//! - Instances share their schema; nothing is re-normalized per instance
//! - Nested containers are reached through scoped handles that carry the
//!   root their callbacks run against

mod array;
mod engine;
mod scoped;
mod serialize;
mod slot;

pub use array::ManagedArray;
pub use engine::Instance;
pub use scoped::{ArrayMut, ObjectMut, ObjectRef};
pub use slot::Slot;
