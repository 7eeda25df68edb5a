//! Per-schema options

use std::sync::Arc;

use serde::Deserialize;

use super::hooks::{BeforeSetHook, Callback, OutputHook, ValueSetHook};
use crate::value::{Map, Value};

/// Thousands separator stripped from numeric strings before parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupSeparator {
    /// `1,234.5`
    #[default]
    Comma,
    /// `1.234,5`
    Period,
}

impl GroupSeparator {
    /// Rewrites `input` into a plain decimal string.
    pub fn normalize(&self, input: &str) -> String {
        match self {
            GroupSeparator::Comma => input.replace(',', ""),
            GroupSeparator::Period => input.replace('.', "").replace(',', "."),
        }
    }
}

/// Options shared by every field of a schema.
///
/// Loaded from the `options` object of a schema file with camelCase keys;
/// hooks can only be attached in code.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SchemaOptions {
    /// Ignore writes to undeclared keys. When off, unknown keys become
    /// untyped fields of that instance.
    pub strict: bool,
    /// Emit unset fields and empty containers in `to_object`
    pub set_undefined: bool,
    /// Store explicit null on scalar fields instead of clearing them
    pub preserve_null: bool,
    /// When off, empty strings and null fail required checks
    pub allow_falsy_values: bool,
    pub number_group_separator: GroupSeparator,
    /// Getters run against the root instance instead of the owning one
    pub inherit_root: bool,
    #[serde(skip)]
    pub on_before_value_set: Option<BeforeSetHook>,
    #[serde(skip)]
    pub on_value_set: Option<ValueSetHook>,
    #[serde(skip)]
    pub to_object: Option<OutputHook>,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self {
            strict: true,
            set_undefined: false,
            preserve_null: false,
            allow_falsy_values: true,
            number_group_separator: GroupSeparator::Comma,
            inherit_root: false,
            on_before_value_set: None,
            on_value_set: None,
            to_object: None,
        }
    }
}

impl SchemaOptions {
    /// Default options: strict, unset fields omitted
    pub fn strict() -> Self {
        Self::default()
    }

    /// Unknown keys are admitted as untyped fields
    pub fn lenient() -> Self {
        Self {
            strict: false,
            ..Self::default()
        }
    }

    pub fn with_before_set<F>(mut self, hook: F) -> Self
    where
        F: Fn(Option<&Value>, &str) -> Result<bool, String> + Send + Sync + 'static,
    {
        self.on_before_value_set = Some(Callback(Arc::new(hook)));
        self
    }

    pub fn with_value_set<F>(mut self, hook: F) -> Self
    where
        F: Fn(Option<&Value>, &str) + Send + Sync + 'static,
    {
        self.on_value_set = Some(Callback(Arc::new(hook)));
        self
    }

    pub fn with_output<F>(mut self, hook: F) -> Self
    where
        F: Fn(Map) -> Map + Send + Sync + 'static,
    {
        self.to_object = Some(Callback(Arc::new(hook)));
        self
    }

    /// Options for a nested schema declared inline.
    ///
    /// The output hook belongs to the declaring schema only, and inline
    /// schemas always resolve getters against the root instance.
    pub(crate) fn for_nested(&self) -> Self {
        Self {
            to_object: None,
            inherit_root: true,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = SchemaOptions::default();
        assert!(options.strict);
        assert!(!options.set_undefined);
        assert!(!options.preserve_null);
        assert!(options.allow_falsy_values);
        assert_eq!(options.number_group_separator, GroupSeparator::Comma);
    }

    #[test]
    fn test_deserialize_camel_case() {
        let options: SchemaOptions = serde_json::from_str(
            r#"{"strict": false, "setUndefined": true, "numberGroupSeparator": "period"}"#,
        )
        .unwrap();
        assert!(!options.strict);
        assert!(options.set_undefined);
        assert_eq!(options.number_group_separator, GroupSeparator::Period);
        assert!(options.allow_falsy_values);
    }

    #[test]
    fn test_group_separator_normalize() {
        assert_eq!(GroupSeparator::Comma.normalize("1,234.5"), "1234.5");
        assert_eq!(GroupSeparator::Period.normalize("1.234,5"), "1234.5");
    }

    #[test]
    fn test_nested_options_drop_output_hook() {
        let options = SchemaOptions::lenient().with_output(|map| map);
        let nested = options.for_nested();
        assert!(nested.to_object.is_none());
        assert!(nested.inherit_root);
        assert!(!nested.strict);
    }
}
