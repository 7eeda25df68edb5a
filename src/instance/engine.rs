//! Instance engine
//!
//! An [`Instance`] is one live object bound to a [`Schema`]. Construction
//! runs in fixed phases:
//! 1. bind the shared, already normalized field table
//! 2. create the container of every array and object field
//! 3. apply defaults (read-only fields accept them in this phase only)
//! 4. assign caller values through the public write path
//!
//! Every write goes: read-only check, alias redirect, typecast, write hooks,
//! commit. A rejected write leaves the field as it was and appends one
//! record to the instance's error collector.
//!
//! Callbacks run against a scope instance. For a schema with
//! `inherit_root` that is the root handed down by the owner, otherwise the
//! instance itself. A nested instance never owns its root: the root arrives
//! with each operation, either from the owner walking down or from the
//! scoped handles returned by `object`, `object_mut` and `array_mut`.

use std::mem;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use super::array::ManagedArray;
use super::scoped::{ArrayMut, ObjectMut, ObjectRef};
use super::slot::Slot;
use crate::schema::{FieldDescriptor, FieldType, HookContext, Schema, SchemaOptions};
use crate::typecast::{self, Rejection};
use crate::validation::{ErrorCode, ErrorCollector, ValidationError};
use crate::value::{Map, Value};

#[derive(Debug)]
pub struct Instance {
    schema: Arc<Schema>,
    /// Fields admitted at first write when the schema is not strict
    dynamic: IndexMap<String, Arc<FieldDescriptor>>,
    storage: IndexMap<String, Slot>,
    errors: ErrorCollector,
}

impl Instance {
    /// Creates an instance with containers and defaults in place.
    pub fn new(schema: &Arc<Schema>) -> Self {
        Self::build(schema, true, None)
    }

    /// Creates an instance and assigns `values` through the public write path.
    pub fn with_values<I, K, V>(schema: &Arc<Schema>, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut instance = Self::new(schema);
        instance.populate(values);
        instance
    }

    /// Instance without defaults, used as the staging target when a live
    /// nested instance is reassigned.
    pub(crate) fn bare(schema: &Arc<Schema>) -> Self {
        Self::build(schema, false, None)
    }

    /// Instance created below an owner whose callbacks run against `root`.
    pub(crate) fn new_in(schema: &Arc<Schema>, root: Option<&Instance>) -> Self {
        Self::build(schema, true, root)
    }

    /// Instance with nothing stored, not even containers.
    pub(super) fn hollow(schema: &Arc<Schema>) -> Self {
        Self {
            schema: Arc::clone(schema),
            dynamic: IndexMap::new(),
            storage: IndexMap::new(),
            errors: ErrorCollector::new(),
        }
    }

    fn build(schema: &Arc<Schema>, with_defaults: bool, root: Option<&Instance>) -> Self {
        let mut instance = Self::hollow(schema);

        for descriptor in schema.fields() {
            let container = match &descriptor.field_type {
                FieldType::Array { .. } => Slot::Array(ManagedArray::new(
                    Arc::clone(descriptor),
                    schema.options().clone(),
                )),
                FieldType::Object {
                    schema: Some(nested),
                } => Slot::Object(Self::build(nested, with_defaults, Some(instance.scope(root)))),
                FieldType::Object { schema: None } => Slot::Value(Value::Object(Map::new())),
                _ => continue,
            };
            instance.storage.insert(descriptor.name.clone(), container);
        }

        if with_defaults {
            for descriptor in schema.fields() {
                if let Some(default) = &descriptor.default {
                    instance.write(descriptor, Some(default.produce()), true, root);
                }
            }
        }
        instance
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    fn options(&self) -> &SchemaOptions {
        self.schema.options()
    }

    /// Descriptor for `key`, declared or dynamically admitted.
    pub fn descriptor(&self, key: &str) -> Option<&Arc<FieldDescriptor>> {
        self.schema.field(key).or_else(|| self.dynamic.get(key))
    }

    /// Declared descriptors in order, then admitted ones in admission order
    pub fn descriptors(&self) -> impl Iterator<Item = &Arc<FieldDescriptor>> {
        self.schema.fields().chain(self.dynamic.values())
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Assigns `value` to `key` through typecasting and validation.
    ///
    /// Never fails: rejections are recorded and readable via `get_errors`.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.assign(key, Some(value.into()), None);
    }

    /// Writes "no value" to `key`. Containers are emptied rather than removed.
    pub fn unset(&mut self, key: &str) {
        self.assign(key, None, None);
    }

    /// Assigns every entry of `values` through `set`.
    pub fn populate<I, K, V>(&mut self, values: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        self.populate_in(values, None);
    }

    pub(crate) fn populate_in<I, K, V>(&mut self, values: I, root: Option<&Instance>)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        for (key, value) in values {
            self.assign(key.as_ref(), Some(value.into()), root);
        }
    }

    pub(super) fn assign(&mut self, key: &str, value: Option<Value>, root: Option<&Instance>) {
        let descriptor = match self.descriptor(key) {
            Some(descriptor) => Arc::clone(descriptor),
            None if self.options().strict => {
                debug!(event = "UNKNOWN_FIELD_IGNORED", field = key);
                return;
            }
            None => {
                debug!(event = "FIELD_ADMITTED", field = key);
                let descriptor = Arc::new(FieldDescriptor::new(key, FieldType::Any));
                self.dynamic.insert(key.to_string(), Arc::clone(&descriptor));
                descriptor
            }
        };
        self.write(&descriptor, value, false, root);
    }

    fn write(
        &mut self,
        descriptor: &Arc<FieldDescriptor>,
        value: Option<Value>,
        initializing: bool,
        root: Option<&Instance>,
    ) {
        if descriptor.read_only && !initializing {
            debug!(event = "READ_ONLY_WRITE_IGNORED", field = %descriptor.name);
            return;
        }

        if let FieldType::Alias { target } = &descriptor.field_type {
            let value = match &descriptor.transform {
                Some(transform) => {
                    transform(value, &HookContext::new(Some(self.scope(root)), &descriptor.name))
                }
                None => value,
            };
            if let Some(target) = self.schema.field(target).cloned() {
                self.write(&target, value, initializing, root);
            }
            return;
        }

        let staged = {
            let ctx = HookContext::new(Some(self.scope(root)), &descriptor.name);
            typecast::cast(
                value,
                self.storage.get(&descriptor.name),
                descriptor,
                self.schema.options(),
                &ctx,
            )
        };
        match staged {
            Ok(staged) => self.commit(descriptor, staged),
            Err(rejection) => self.reject(descriptor, rejection),
        }
    }

    fn reject(&mut self, descriptor: &Arc<FieldDescriptor>, rejection: Rejection) {
        debug!(
            event = "WRITE_REJECTED",
            field = %descriptor.name,
            code = rejection.code.code(),
            message = %rejection.message
        );
        let previous = self.storage.get(&descriptor.name).map(Slot::to_value);
        self.errors.push(ValidationError::new(
            rejection.code,
            rejection.message,
            Arc::clone(descriptor),
            rejection.value,
            previous,
        ));
    }

    /// Consults the write hooks and stores a staged value.
    ///
    /// `None` unsets the field. Staged containers replace the contents of
    /// the live container so the container itself is never swapped out.
    fn commit(&mut self, descriptor: &Arc<FieldDescriptor>, staged: Option<Slot>) {
        let schema = Arc::clone(&self.schema);
        let options = schema.options();
        let name = descriptor.name.as_str();

        if let Some(hook) = &options.on_before_value_set {
            let incoming = staged.as_ref().map(Slot::to_value);
            match hook(incoming.as_ref(), name) {
                Ok(true) => {}
                Ok(false) => {
                    debug!(event = "WRITE_CANCELLED", field = name);
                    return;
                }
                Err(message) => {
                    let message = if message.is_empty() {
                        ErrorCode::WriteRejected.default_message().to_string()
                    } else {
                        message
                    };
                    self.reject(
                        descriptor,
                        Rejection {
                            code: ErrorCode::WriteRejected,
                            message,
                            value: incoming,
                        },
                    );
                    return;
                }
            }
        }

        match staged {
            None => {
                self.storage.shift_remove(name);
            }
            Some(slot) => {
                let replacement = match slot {
                    Slot::Array(staged) => match self.storage.get_mut(name) {
                        Some(Slot::Array(existing)) => {
                            existing.replace_with(staged);
                            None
                        }
                        _ => Some(Slot::Array(staged)),
                    },
                    Slot::Object(staged) => match self.storage.get_mut(name) {
                        Some(Slot::Object(existing)) => {
                            existing.absorb(staged);
                            None
                        }
                        _ => Some(Slot::Object(staged)),
                    },
                    value => Some(value),
                };
                if let Some(slot) = replacement {
                    self.storage.insert(name.to_string(), slot);
                }
            }
        }

        if let Some(hook) = &options.on_value_set {
            let stored = self.storage.get(name).map(Slot::to_value);
            hook(stored.as_ref(), name);
        }
    }

    /// Takes over the contents of a staged instance, keeping this one's
    /// identity and its earlier errors.
    fn absorb(&mut self, staged: Instance) {
        self.storage = staged.storage;
        for (name, descriptor) in staged.dynamic {
            self.dynamic.entry(name).or_insert(descriptor);
        }
        self.errors.extend(staged.errors);
    }

    /// Resets the instance: scalars become unset, containers are emptied in
    /// place. Defaults are not re-applied.
    pub fn clear(&mut self) {
        let descriptors: Vec<Arc<FieldDescriptor>> = self.descriptors().cloned().collect();
        for descriptor in descriptors {
            if descriptor.is_alias() {
                continue;
            }
            match self.storage.get_mut(&descriptor.name) {
                Some(Slot::Object(nested)) => {
                    nested.clear();
                    continue;
                }
                Some(Slot::Array(array)) => {
                    array.clear();
                    continue;
                }
                Some(Slot::Value(Value::Object(map))) if descriptor.is_container() => {
                    map.clear();
                    continue;
                }
                Some(Slot::Value(_)) => {}
                None => continue,
            }
            self.commit(&descriptor, None);
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Reads `key` through its getter. Containers come back as plain copies.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.read(key, None)
    }

    /// Instance callbacks run against: the root when the schema inherits it.
    pub(super) fn scope<'a>(&'a self, root: Option<&'a Instance>) -> &'a Instance {
        if self.options().inherit_root {
            root.unwrap_or(self)
        } else {
            self
        }
    }

    pub(super) fn read(&self, key: &str, root: Option<&Instance>) -> Option<Value> {
        let descriptor = self.descriptor(key)?;
        let source = match &descriptor.field_type {
            FieldType::Alias { target } => target.as_str(),
            _ => key,
        };
        let scope = self.scope(root);
        let raw = self.storage.get(source).map(|slot| slot.to_plain(Some(scope)));
        match &descriptor.getter {
            Some(getter) => getter(raw, &HookContext::new(Some(scope), key)),
            None => raw,
        }
    }

    /// Stored contents of `key`, aliases resolved, getters not applied.
    pub fn slot(&self, key: &str) -> Option<&Slot> {
        let descriptor = self.descriptor(key)?;
        match &descriptor.field_type {
            FieldType::Alias { target } => self.storage.get(target),
            _ => self.storage.get(key),
        }
    }

    /// True when `key` holds a value. Containers always do.
    pub fn is_set(&self, key: &str) -> bool {
        self.slot(key).is_some()
    }

    /// The live nested instance of a schema object field, read against
    /// this instance's scope.
    pub fn object(&self, key: &str) -> Option<ObjectRef<'_>> {
        let root = self.scope(None);
        self.nested(key).map(|nested| ObjectRef::new(nested, root))
    }

    /// Writable handle on a nested instance. Writes through it run the
    /// nested callbacks against this instance's scope.
    pub fn object_mut(&mut self, key: &str) -> Option<ObjectMut<'_>> {
        ObjectMut::detach(self, None, key)
    }

    /// The live managed array of an array field.
    pub fn array(&self, key: &str) -> Option<&ManagedArray> {
        self.storage.get(key).and_then(Slot::as_array)
    }

    /// Writable handle on a managed array. Element casts run against this
    /// instance's scope.
    pub fn array_mut(&mut self, key: &str) -> Option<ArrayMut<'_>> {
        ArrayMut::detach(self, None, key)
    }

    pub(super) fn nested(&self, key: &str) -> Option<&Instance> {
        self.storage.get(key).and_then(Slot::as_instance)
    }

    /// Moves a nested instance out, leaving a null placeholder in its slot
    /// until `restore` puts it back.
    pub(super) fn take_object(&mut self, key: &str) -> Option<Instance> {
        let slot = self.storage.get_mut(key)?;
        if !matches!(slot, Slot::Object(_)) {
            return None;
        }
        match mem::replace(slot, Slot::Value(Value::Null)) {
            Slot::Object(instance) => Some(instance),
            _ => None,
        }
    }

    pub(super) fn take_array(&mut self, key: &str) -> Option<ManagedArray> {
        let slot = self.storage.get_mut(key)?;
        if !matches!(slot, Slot::Array(_)) {
            return None;
        }
        match mem::replace(slot, Slot::Value(Value::Null)) {
            Slot::Array(array) => Some(array),
            _ => None,
        }
    }

    pub(super) fn restore(&mut self, key: &str, slot: Slot) {
        if let Some(held) = self.storage.get_mut(key) {
            *held = slot;
        }
    }

    // =========================================================================
    // Serialization
    // =========================================================================

    /// Plain object of every visible field, through getters.
    ///
    /// Unset fields and empty array or object fields are left out unless
    /// `set_undefined` is on, in which case unset fields appear as null.
    pub fn to_object(&self) -> Map {
        self.to_object_in(None)
    }

    pub(crate) fn to_object_in(&self, root: Option<&Instance>) -> Map {
        let options = self.options();
        let mut out = Map::new();
        for descriptor in self.descriptors() {
            if descriptor.invisible {
                continue;
            }
            match self.read(&descriptor.name, root) {
                None => {
                    if options.set_undefined {
                        out.insert(descriptor.name.clone(), Value::Null);
                    }
                }
                Some(value)
                    if descriptor.is_container()
                        && value.is_empty_composite()
                        && !options.set_undefined => {}
                Some(value) => {
                    out.insert(descriptor.name.clone(), value);
                }
            }
        }
        match &options.to_object {
            Some(hook) => hook(out),
            None => out,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        Value::Object(self.to_object()).to_json()
    }

    // =========================================================================
    // Errors
    // =========================================================================

    /// Every error of this instance and everything below it.
    ///
    /// Order: recorded rejections, missing required fields, nested object
    /// errors as `field.sub`, then array errors. Required checks are
    /// recomputed on every call.
    pub fn get_errors(&self) -> Vec<ValidationError> {
        self.get_errors_in(None)
    }

    pub(crate) fn get_errors_in(&self, root: Option<&Instance>) -> Vec<ValidationError> {
        let mut errors: Vec<ValidationError> = self.errors.iter().cloned().collect();

        for descriptor in self.descriptors() {
            if let Some(required) = &descriptor.required {
                if required.applies(self) && self.is_missing(descriptor, root) {
                    errors.push(ValidationError::required(Arc::clone(descriptor)));
                }
            }
        }

        let scope = self.scope(root);
        for descriptor in self.descriptors() {
            if let Some(Slot::Object(nested)) = self.storage.get(&descriptor.name) {
                errors.extend(
                    nested
                        .get_errors_in(Some(scope))
                        .into_iter()
                        .map(|error| error.within(&descriptor.name)),
                );
            }
        }

        for descriptor in self.descriptors() {
            if let Some(Slot::Array(array)) = self.storage.get(&descriptor.name) {
                errors.extend(array.collect_errors(&descriptor.name, Some(scope)));
            }
        }

        errors
    }

    fn is_missing(&self, descriptor: &FieldDescriptor, root: Option<&Instance>) -> bool {
        let allow_falsy = self.options().allow_falsy_values;
        match self.read(&descriptor.name, root) {
            None => true,
            Some(Value::Null) => !allow_falsy,
            Some(Value::String(s)) => s.is_empty() && !allow_falsy,
            Some(_) => false,
        }
    }

    pub fn is_errors(&self) -> bool {
        !self.get_errors().is_empty()
    }

    /// Clears recorded errors here and in every nested instance and array.
    pub fn clear_errors(&mut self) {
        self.errors.clear();
        for slot in self.storage.values_mut() {
            match slot {
                Slot::Object(nested) => nested.clear_errors(),
                Slot::Array(array) => array.clear_errors(),
                Slot::Value(_) => {}
            }
        }
    }
}

/// Re-validating copy: a new instance built from `to_object`.
///
/// Invisible fields are not carried over.
impl Clone for Instance {
    fn clone(&self) -> Self {
        Instance::with_values(&self.schema, self.to_object())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDecl, FieldSpec, Kind};
    use std::sync::Mutex;

    fn schema(fields: Vec<(&str, FieldDecl)>, options: SchemaOptions) -> Arc<Schema> {
        Schema::define(fields, options).unwrap()
    }

    #[test]
    fn test_rejected_write_keeps_previous_value() {
        let s = schema(
            vec![("count", FieldSpec::new(Kind::Number).max(20.0).into())],
            SchemaOptions::default(),
        );
        let mut o = Instance::new(&s);
        o.set("count", "15");
        assert_eq!(o.get("count"), Some(Value::from(15)));

        o.set("count", 25);
        assert_eq!(o.get("count"), Some(Value::from(15)));

        let errors = o.get_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code(), ErrorCode::Max);
        assert_eq!(errors[0].value(), Some(&Value::from(25)));
        assert_eq!(errors[0].previous(), Some(&Value::from(15)));
    }

    #[test]
    fn test_strict_ignores_unknown_keys() {
        let s = schema(vec![("name", Kind::String.into())], SchemaOptions::default());
        let mut o = Instance::new(&s);
        o.set("other", 1);
        assert_eq!(o.get("other"), None);
        assert!(o.to_object().is_empty());
    }

    #[test]
    fn test_lenient_admits_unknown_keys() {
        let s = schema(vec![("name", Kind::String.into())], SchemaOptions::lenient());
        let mut o = Instance::new(&s);
        o.set("other", vec![1, 2]);
        assert_eq!(o.get("other"), Some(Value::from(vec![1, 2])));
        assert!(o.descriptor("other").is_some());

        let other = Instance::new(&s);
        assert!(other.descriptor("other").is_none());
    }

    #[test]
    fn test_read_only_accepts_default_only() {
        let s = schema(
            vec![("id", FieldSpec::new(Kind::String).read_only().default_value("fixed").into())],
            SchemaOptions::default(),
        );
        let mut o = Instance::new(&s);
        o.set("id", "changed");
        assert_eq!(o.get("id"), Some(Value::from("fixed")));
        assert!(o.get_errors().is_empty());
    }

    #[test]
    fn test_alias_reads_and_writes_target() {
        let s = schema(
            vec![
                ("id", Kind::String.into()),
                (
                    "_id",
                    FieldSpec::alias("id")
                        .transform(|v, _| v.map(|v| Value::from(v.to_display_string().to_uppercase())))
                        .into(),
                ),
            ],
            SchemaOptions::default(),
        );
        let mut o = Instance::new(&s);
        o.set("_id", "abc");
        assert_eq!(o.get("id"), Some(Value::from("ABC")));
        assert_eq!(o.get("_id"), Some(Value::from("ABC")));
    }

    #[test]
    fn test_before_set_hook_cancels_and_rejects() {
        let options = SchemaOptions::default().with_before_set(|value, key| {
            if key == "locked" {
                return Ok(false);
            }
            match value {
                Some(Value::String(s)) if s == "bad" => Err("no bad values".to_string()),
                _ => Ok(true),
            }
        });
        let s = schema(
            vec![("locked", Kind::String.into()), ("name", Kind::String.into())],
            options,
        );
        let mut o = Instance::new(&s);
        o.set("locked", "x");
        o.set("name", "bad");
        o.set("name", "good");
        o.set("name", "bad");

        assert_eq!(o.get("locked"), None);
        assert_eq!(o.get("name"), Some(Value::from("good")));
        let errors = o.get_errors();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].code(), ErrorCode::WriteRejected);
        assert_eq!(errors[0].message(), "no bad values");
        assert_eq!(errors[1].previous(), Some(&Value::from("good")));
    }

    #[test]
    fn test_value_set_hook_sees_committed_value() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        let options = SchemaOptions::default().with_value_set(move |value, key| {
            log.lock().unwrap().push((key.to_string(), value.cloned()));
        });
        let s = schema(vec![("count", Kind::Number.into())], options);
        let mut o = Instance::new(&s);
        o.set("count", "7");
        o.set("count", "nope");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], ("count".to_string(), Some(Value::from(7))));
    }

    #[test]
    fn test_getter_receives_scope() {
        let s = schema(
            vec![
                ("first", Kind::String.into()),
                ("last", Kind::String.into()),
                (
                    "full",
                    FieldSpec::new(Kind::String)
                        .getter(|_, ctx| {
                            let first = ctx.get("first")?.to_display_string();
                            let last = ctx.get("last")?.to_display_string();
                            Some(Value::from(format!("{} {}", first, last)))
                        })
                        .into(),
                ),
            ],
            SchemaOptions::default(),
        );
        let o = Instance::with_values(&s, [("first", "Ada"), ("last", "Lovelace")]);
        assert_eq!(o.get("full"), Some(Value::from("Ada Lovelace")));
        assert_eq!(o.to_object()["full"], Value::from("Ada Lovelace"));
    }

    #[test]
    fn test_inline_nested_getter_sees_root() {
        let s = schema(
            vec![
                ("prefix", Kind::String.into()),
                (
                    "profile",
                    FieldDecl::object([(
                        "label",
                        FieldDecl::from(FieldSpec::new(Kind::String)
                            .getter(|value, ctx| {
                                let prefix = ctx.get("prefix")?.to_display_string();
                                Some(Value::from(format!("{}{}", prefix, value?.to_display_string())))
                            })),
                    )]),
                ),
            ],
            SchemaOptions::default(),
        );
        let mut o = Instance::new(&s);
        o.set("prefix", "Dr. ");
        o.set("profile", Value::from(Map::from_iter([("label".to_string(), Value::from("Who"))])));

        let profile = o.get("profile").unwrap();
        assert_eq!(profile.as_object().unwrap()["label"], Value::from("Dr. Who"));
    }

    #[test]
    fn test_nested_identity_survives_reassignment() {
        let s = schema(
            vec![(
                "profile",
                FieldDecl::object([
                    ("age", FieldDecl::from(Kind::Number)),
                    ("name", FieldDecl::from(Kind::String)),
                ]),
            )],
            SchemaOptions::default(),
        );
        let mut o = Instance::new(&s);
        o.object_mut("profile").unwrap().set("name", "Ada");
        let before: *const Instance = &*o.object("profile").unwrap();

        let mut incoming = Map::new();
        incoming.insert("age".into(), Value::from("30"));
        o.set("profile", incoming);

        let after: *const Instance = &*o.object("profile").unwrap();
        assert_eq!(before, after);
        let profile = o.object("profile").unwrap();
        assert_eq!(profile.get("age"), Some(Value::from(30)));
        assert_eq!(profile.get("name"), None);
    }

    #[test]
    fn test_empty_any_field_kept_in_output() {
        let s = schema(
            vec![("meta", FieldDecl::from(Kind::Any)), ("tags", FieldDecl::list(Kind::String))],
            SchemaOptions::lenient(),
        );
        let mut o = Instance::new(&s);
        o.set("meta", Value::Array(Vec::new()));
        o.set("extra", Value::Object(Map::new()));

        let out = o.to_object();
        assert_eq!(out.get("meta"), Some(&Value::Array(Vec::new())));
        assert_eq!(out.get("extra"), Some(&Value::Object(Map::new())));
        assert!(!out.contains_key("tags"));
    }

    #[test]
    fn test_clear_resets_without_defaults() {
        let s = schema(
            vec![
                ("name", FieldSpec::new(Kind::String).default_value("anon").into()),
                ("tags", FieldDecl::list(Kind::String)),
            ],
            SchemaOptions::default(),
        );
        let mut o = Instance::new(&s);
        o.array_mut("tags").unwrap().push("a");
        o.clear();
        assert_eq!(o.get("name"), None);
        assert!(o.array("tags").unwrap().is_empty());
    }

    #[test]
    fn test_clone_is_independent() {
        let s = schema(
            vec![("name", Kind::String.into()), ("tags", FieldDecl::list(Kind::String))],
            SchemaOptions::default(),
        );
        let mut o = Instance::with_values(&s, [("name", Value::from("a")), ("tags", Value::from(vec!["x"]))]);
        let copy = o.clone();
        o.set("name", "b");
        o.array_mut("tags").unwrap().push("y");

        assert_eq!(copy.get("name"), Some(Value::from("a")));
        assert_eq!(copy.array("tags").unwrap().len(), 1);
    }
}
