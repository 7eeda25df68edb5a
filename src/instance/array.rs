//! Managed arrays
//!
//! A managed array is the live container behind an array field. Every
//! insertion, whether from `push`, from whole-field assignment or from
//! `concat`, takes the same route: typecast against the element
//! descriptor, then the filter predicate, then the uniqueness check.
//! Elements that fail any step are left out; cast failures are recorded.
//!
//! Element callbacks, and nested element instances, run against the scope
//! of the instance owning the array, which `ArrayMut` supplies. Insertions
//! made straight on a `ManagedArray` have no scope.

use std::slice;
use std::sync::Arc;

use tracing::{debug, trace};

use super::engine::Instance;
use super::slot::Slot;
use crate::schema::{FieldDescriptor, HookContext, SchemaOptions};
use crate::typecast;
use crate::validation::{ErrorCollector, ValidationError};
use crate::value::Value;

#[derive(Debug)]
pub struct ManagedArray {
    /// Descriptor of the array field (element type, unique, filter)
    descriptor: Arc<FieldDescriptor>,
    options: SchemaOptions,
    items: Vec<Slot>,
    errors: ErrorCollector,
}

impl ManagedArray {
    pub(crate) fn new(descriptor: Arc<FieldDescriptor>, options: SchemaOptions) -> Self {
        Self {
            descriptor,
            options,
            items: Vec::new(),
            errors: ErrorCollector::new(),
        }
    }

    pub fn descriptor(&self) -> &Arc<FieldDescriptor> {
        &self.descriptor
    }

    /// Empty array with the same element policy and no errors.
    pub(super) fn hollow(&self) -> ManagedArray {
        ManagedArray::new(Arc::clone(&self.descriptor), self.options.clone())
    }

    /// Appends one value; returns the new length.
    pub fn push(&mut self, value: impl Into<Value>) -> usize {
        self.push_in(value.into(), None)
    }

    /// Appends each value in order; returns the new length.
    pub fn extend<I, V>(&mut self, values: I) -> usize
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.extend_in(values, None)
    }

    pub(crate) fn push_in(&mut self, value: Value, root: Option<&Instance>) -> usize {
        self.insert(value, root);
        self.items.len()
    }

    pub(crate) fn extend_in<I, V>(&mut self, values: I, root: Option<&Instance>) -> usize
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        for value in values {
            self.insert(value.into(), root);
        }
        self.items.len()
    }

    fn insert(&mut self, value: Value, root: Option<&Instance>) {
        let slot = match self.descriptor.element() {
            Some(element) => {
                let ctx = HookContext::new(root, &element.name);
                match typecast::cast(Some(value), None, element, &self.options, &ctx) {
                    Ok(Some(slot)) => slot,
                    Ok(None) => {
                        trace!(event = "ELEMENT_EMPTY_SKIPPED", field = %self.descriptor.name);
                        return;
                    }
                    Err(rejection) => {
                        debug!(
                            event = "ELEMENT_REJECTED",
                            field = %self.descriptor.name,
                            code = rejection.code.code(),
                            message = %rejection.message
                        );
                        self.errors.push(ValidationError::new(
                            rejection.code,
                            rejection.message,
                            Arc::clone(element),
                            rejection.value,
                            None,
                        ));
                        return;
                    }
                }
            }
            None => Slot::Value(value),
        };

        if let Some(filter) = &self.descriptor.filter {
            if !filter(&slot.to_value()) {
                trace!(event = "ELEMENT_FILTERED", field = %self.descriptor.name);
                return;
            }
        }
        if self.descriptor.unique && self.items.iter().any(|item| item.strict_eq(&slot)) {
            trace!(event = "ELEMENT_DUPLICATE_SKIPPED", field = %self.descriptor.name);
            return;
        }
        self.items.push(slot);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Slot> {
        self.items.get(index)
    }

    /// Mutable access to an element, e.g. to write into a nested instance.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Slot> {
        self.items.get_mut(index)
    }

    pub fn iter(&self) -> slice::Iter<'_, Slot> {
        self.items.iter()
    }

    /// Removes and returns the last element as a plain value.
    pub fn pop(&mut self) -> Option<Value> {
        self.items.pop().map(|slot| slot.to_value())
    }

    /// Removes every element. Recorded errors are kept.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Plain copy; nested instances are unwrapped through `to_object`.
    pub fn to_array(&self) -> Vec<Value> {
        self.to_array_in(None)
    }

    pub(crate) fn to_array_in(&self, root: Option<&Instance>) -> Vec<Value> {
        self.items.iter().map(|slot| slot.to_plain(root)).collect()
    }

    /// New array with the same element policy holding this array's
    /// elements followed by `others`, every one re-inserted.
    pub fn concat<I, V>(&self, others: I) -> ManagedArray
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.concat_in(others, None)
    }

    pub(crate) fn concat_in<I, V>(&self, others: I, root: Option<&Instance>) -> ManagedArray
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let mut combined = self.hollow();
        combined.extend_in(self.to_array_in(root), root);
        combined.extend_in(others, root);
        combined
    }

    /// Errors recorded for rejected elements
    pub fn errors(&self) -> &[ValidationError] {
        self.errors.as_slice()
    }

    /// Clears element rejections and the errors of nested element instances.
    pub fn clear_errors(&mut self) {
        self.errors.clear();
        for item in &mut self.items {
            if let Slot::Object(instance) = item {
                instance.clear_errors();
            }
        }
    }

    /// Own errors, then nested element errors as `name[i].field`.
    pub(crate) fn collect_errors(&self, name: &str, root: Option<&Instance>) -> Vec<ValidationError> {
        let mut errors: Vec<ValidationError> = self.errors.iter().cloned().collect();
        for (index, item) in self.items.iter().enumerate() {
            if let Slot::Object(instance) = item {
                let prefix = format!("{}[{}]", name, index);
                errors.extend(
                    instance
                        .get_errors_in(root)
                        .into_iter()
                        .map(|e| e.within(&prefix)),
                );
            }
        }
        errors
    }

    /// Takes over the contents of a staged array built for a whole-field write.
    pub(crate) fn replace_with(&mut self, staged: ManagedArray) {
        self.items = staged.items;
        self.errors.extend(staged.errors);
    }
}

impl<'a> IntoIterator for &'a ManagedArray {
    type Item = &'a Slot;
    type IntoIter = slice::Iter<'a, Slot>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{normalize, FieldDecl, FieldSpec, Kind};
    use crate::validation::ErrorCode;

    fn array(decl: impl Into<FieldDecl>) -> ManagedArray {
        let descriptor = normalize(decl.into(), "tags", &SchemaOptions::default()).unwrap();
        ManagedArray::new(Arc::new(descriptor), SchemaOptions::default())
    }

    #[test]
    fn test_push_casts_elements() {
        let mut tags = array(FieldDecl::list(Kind::String));
        assert_eq!(tags.push(1), 1);
        assert_eq!(tags.push(2), 2);
        assert_eq!(tags.to_array(), vec![Value::from("1"), Value::from("2")]);
    }

    #[test]
    fn test_rejected_element_recorded_not_appended() {
        let mut counts = array(FieldDecl::list(Kind::Number));
        assert_eq!(counts.push("abc"), 0);
        assert_eq!(counts.errors().len(), 1);
        assert_eq!(counts.errors()[0].code(), ErrorCode::NumberParse);
        assert_eq!(counts.errors()[0].field(), "tags");
    }

    #[test]
    fn test_unique_skips_duplicates() {
        let mut tags = array(FieldSpec::new(Kind::Array).array_of(Kind::String).unique());
        tags.push("a");
        assert_eq!(tags.push("a"), 1);
        assert_eq!(tags.push(1), 2);
        assert_eq!(tags.push("1"), 2);
    }

    #[test]
    fn test_unique_within_single_extend() {
        let mut tags = array(FieldSpec::new(Kind::Array).array_of(Kind::String).unique());
        assert_eq!(tags.extend(["x", "y", "x"]), 2);
    }

    #[test]
    fn test_filter_runs_before_unique() {
        let mut evens = array(
            FieldSpec::new(Kind::Array)
                .array_of(Kind::Number)
                .unique()
                .filter(|v| v.as_f64().map_or(false, |n| n % 2.0 == 0.0)),
        );
        assert_eq!(evens.extend([1, 2, 3, 4, 4]), 2);
        assert_eq!(evens.to_array(), vec![Value::from(2), Value::from(4)]);
    }

    #[test]
    fn test_untyped_array_keeps_values() {
        let mut raw = array(FieldSpec::new(Kind::Array));
        raw.push(Value::from(vec![1, 2]));
        raw.push("x");
        assert_eq!(raw.len(), 2);
        assert_eq!(raw.get(0).and_then(Slot::as_value), Some(&Value::from(vec![1, 2])));
    }

    #[test]
    fn test_concat_revalidates() {
        let mut tags = array(FieldSpec::new(Kind::Array).array_of(Kind::String).unique());
        tags.extend(["a", "b"]);
        let combined = tags.concat(vec![Value::from("b"), Value::from(3)]);
        assert_eq!(
            combined.to_array(),
            vec![Value::from("a"), Value::from("b"), Value::from("3")]
        );
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn test_clear_keeps_errors() {
        let mut counts = array(FieldDecl::list(Kind::Number));
        counts.extend(vec![Value::from(1), Value::from("bad")]);
        counts.clear();
        assert!(counts.is_empty());
        assert_eq!(counts.errors().len(), 1);
        counts.clear_errors();
        assert!(counts.errors().is_empty());
    }
}
