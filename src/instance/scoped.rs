//! Scoped handles on nested containers
//!
//! A nested instance or managed array reached through its owner carries the
//! scope its callbacks run against, so getters and transforms of an inline
//! schema see the root no matter how the nested instance is reached.
//!
//! Mutable handles hold the container while they live. The owner's slot
//! reads as null until the handle drops and puts the container back.

use std::fmt;
use std::mem;
use std::ops::Deref;

use super::array::ManagedArray;
use super::engine::Instance;
use super::slot::Slot;
use crate::validation::ValidationError;
use crate::value::{Map, Value};

// =============================================================================
// ObjectRef
// =============================================================================

/// Read handle on a nested instance.
#[derive(Clone, Copy)]
pub struct ObjectRef<'a> {
    instance: &'a Instance,
    root: &'a Instance,
}

impl<'a> ObjectRef<'a> {
    pub(super) fn new(instance: &'a Instance, root: &'a Instance) -> Self {
        Self { instance, root }
    }

    /// Scope of the owning instance
    pub fn root(&self) -> &'a Instance {
        self.root
    }

    /// Reads `key` through its getter, scoped like the owner's own reads.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.instance.read(key, Some(self.root))
    }

    pub fn to_object(&self) -> Map {
        self.instance.to_object_in(Some(self.root))
    }

    pub fn to_json(&self) -> serde_json::Value {
        Value::Object(self.to_object()).to_json()
    }

    pub fn get_errors(&self) -> Vec<ValidationError> {
        self.instance.get_errors_in(Some(self.root))
    }

    pub fn is_errors(&self) -> bool {
        !self.get_errors().is_empty()
    }

    pub fn object(&self, key: &str) -> Option<ObjectRef<'a>> {
        let scope = self.instance.scope(Some(self.root));
        self.instance
            .nested(key)
            .map(|nested| ObjectRef::new(nested, scope))
    }
}

impl Deref for ObjectRef<'_> {
    type Target = Instance;

    fn deref(&self) -> &Instance {
        self.instance
    }
}

impl fmt::Debug for ObjectRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObjectRef").field(self.instance).finish()
    }
}

// =============================================================================
// ObjectMut
// =============================================================================

/// Write handle on a nested instance.
pub struct ObjectMut<'a> {
    owner: &'a mut Instance,
    /// Root handed to the owner by its own owner
    owner_root: Option<&'a Instance>,
    key: String,
    instance: Instance,
}

impl<'a> ObjectMut<'a> {
    pub(super) fn detach(
        owner: &'a mut Instance,
        owner_root: Option<&'a Instance>,
        key: &str,
    ) -> Option<Self> {
        let instance = owner.take_object(key)?;
        Some(Self {
            owner,
            owner_root,
            key: key.to_string(),
            instance,
        })
    }

    fn view(&self) -> ObjectRef<'_> {
        ObjectRef::new(&self.instance, self.owner.scope(self.owner_root))
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        let root = self.owner.scope(self.owner_root);
        self.instance.assign(key, Some(value.into()), Some(root));
    }

    pub fn unset(&mut self, key: &str) {
        let root = self.owner.scope(self.owner_root);
        self.instance.assign(key, None, Some(root));
    }

    pub fn populate<I, K, V>(&mut self, values: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let root = self.owner.scope(self.owner_root);
        self.instance.populate_in(values, Some(root));
    }

    pub fn clear(&mut self) {
        self.instance.clear();
    }

    pub fn clear_errors(&mut self) {
        self.instance.clear_errors();
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.view().get(key)
    }

    pub fn to_object(&self) -> Map {
        self.view().to_object()
    }

    pub fn to_json(&self) -> serde_json::Value {
        self.view().to_json()
    }

    pub fn get_errors(&self) -> Vec<ValidationError> {
        self.view().get_errors()
    }

    pub fn is_errors(&self) -> bool {
        self.view().is_errors()
    }

    pub fn object(&self, key: &str) -> Option<ObjectRef<'_>> {
        self.view().object(key)
    }

    pub fn object_mut(&mut self, key: &str) -> Option<ObjectMut<'_>> {
        let root = self.owner.scope(self.owner_root);
        ObjectMut::detach(&mut self.instance, Some(root), key)
    }

    pub fn array_mut(&mut self, key: &str) -> Option<ArrayMut<'_>> {
        let root = self.owner.scope(self.owner_root);
        ArrayMut::detach(&mut self.instance, Some(root), key)
    }
}

impl Deref for ObjectMut<'_> {
    type Target = Instance;

    fn deref(&self) -> &Instance {
        &self.instance
    }
}

impl Drop for ObjectMut<'_> {
    fn drop(&mut self) {
        let hollow = Instance::hollow(self.instance.schema());
        let instance = mem::replace(&mut self.instance, hollow);
        self.owner.restore(&self.key, Slot::Object(instance));
    }
}

impl fmt::Debug for ObjectMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectMut")
            .field("key", &self.key)
            .field("instance", &self.instance)
            .finish()
    }
}

// =============================================================================
// ArrayMut
// =============================================================================

/// Write handle on a managed array.
pub struct ArrayMut<'a> {
    owner: &'a mut Instance,
    owner_root: Option<&'a Instance>,
    key: String,
    array: ManagedArray,
}

impl<'a> ArrayMut<'a> {
    pub(super) fn detach(
        owner: &'a mut Instance,
        owner_root: Option<&'a Instance>,
        key: &str,
    ) -> Option<Self> {
        let array = owner.take_array(key)?;
        Some(Self {
            owner,
            owner_root,
            key: key.to_string(),
            array,
        })
    }

    /// Appends one value; returns the new length.
    pub fn push(&mut self, value: impl Into<Value>) -> usize {
        let root = self.owner.scope(self.owner_root);
        self.array.push_in(value.into(), Some(root))
    }

    /// Appends each value in order; returns the new length.
    pub fn extend<I, V>(&mut self, values: I) -> usize
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let root = self.owner.scope(self.owner_root);
        self.array.extend_in(values, Some(root))
    }

    pub fn concat<I, V>(&self, others: I) -> ManagedArray
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.array
            .concat_in(others, Some(self.owner.scope(self.owner_root)))
    }

    pub fn to_array(&self) -> Vec<Value> {
        self.array.to_array_in(Some(self.owner.scope(self.owner_root)))
    }

    pub fn pop(&mut self) -> Option<Value> {
        self.array.pop()
    }

    pub fn clear(&mut self) {
        self.array.clear();
    }

    pub fn clear_errors(&mut self) {
        self.array.clear_errors();
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Slot> {
        self.array.get_mut(index)
    }
}

impl Deref for ArrayMut<'_> {
    type Target = ManagedArray;

    fn deref(&self) -> &ManagedArray {
        &self.array
    }
}

impl Drop for ArrayMut<'_> {
    fn drop(&mut self) {
        let hollow = self.array.hollow();
        let array = mem::replace(&mut self.array, hollow);
        self.owner.restore(&self.key, Slot::Array(array));
    }
}

impl fmt::Debug for ArrayMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayMut")
            .field("key", &self.key)
            .field("array", &self.array)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::schema::{FieldDecl, FieldSpec, Kind, Schema, SchemaOptions};

    /// `{ age, profile: { age, rootAge (getter), stamp (transform) } }`
    fn profile_schema() -> Arc<Schema> {
        Schema::define(
            vec![
                ("age", FieldDecl::from(Kind::Number)),
                (
                    "profile",
                    FieldDecl::object([
                        ("age", FieldDecl::from(Kind::Number)),
                        (
                            "rootAge",
                            FieldDecl::from(FieldSpec::new(Kind::Any).getter(|_, ctx| ctx.get("age"))),
                        ),
                        (
                            "stamp",
                            FieldDecl::from(FieldSpec::new(Kind::Any).transform(|_, ctx| ctx.get("age"))),
                        ),
                    ]),
                ),
            ],
            SchemaOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_object_ref_reads_against_owner_scope() {
        let s = profile_schema();
        let mut o = Instance::new(&s);
        o.set("age", 20);
        o.object_mut("profile").unwrap().set("age", 60);

        let profile = o.object("profile").unwrap();
        assert_eq!(profile.get("age"), Some(Value::from(60)));
        assert_eq!(profile.get("rootAge"), Some(Value::from(20)));
        assert!(std::ptr::eq(profile.root(), &o));
    }

    #[test]
    fn test_object_mut_restores_on_drop() {
        let s = profile_schema();
        let mut o = Instance::new(&s);
        {
            let mut profile = o.object_mut("profile").unwrap();
            profile.set("age", 33);
            assert_eq!(profile.get("age"), Some(Value::from(33)));
        }
        assert_eq!(o.object("profile").unwrap().get("age"), Some(Value::from(33)));
        assert_eq!(o.slot("profile").and_then(Slot::as_instance).map(|p| p.is_set("age")), Some(true));
    }

    #[test]
    fn test_object_mut_transform_sees_root() {
        let s = profile_schema();
        let mut o = Instance::new(&s);
        o.set("age", 20);
        o.object_mut("profile").unwrap().set("stamp", "ignored");

        let profile = o.object("profile").unwrap();
        assert_eq!(profile.slot("stamp").and_then(Slot::as_value), Some(&Value::from(20)));
    }

    #[test]
    fn test_missing_or_wrong_slot_gives_no_handle() {
        let s = profile_schema();
        let mut o = Instance::new(&s);
        assert!(o.object_mut("age").is_none());
        assert!(o.array_mut("profile").is_none());
        assert!(o.object_mut("nope").is_none());
        assert_eq!(o.get("age"), None);
        assert!(o.object("profile").is_some());
    }
}
