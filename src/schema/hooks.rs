//! Caller-supplied callbacks
//!
//! Descriptors and schema options carry user functions (getters, transforms,
//! defaults, write hooks). They are stored behind [`Callback`], a cheaply
//! clonable shared handle, so descriptors stay `Clone` and `Debug`.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::instance::Instance;
use crate::value::{Map, Value};

/// Shared handle to a callback.
pub struct Callback<F: ?Sized>(pub(crate) Arc<F>);

impl<F: ?Sized> Clone for Callback<F> {
    fn clone(&self) -> Self {
        Callback(Arc::clone(&self.0))
    }
}

impl<F: ?Sized> fmt::Debug for Callback<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback(..)")
    }
}

impl<F: ?Sized> Deref for Callback<F> {
    type Target = F;

    fn deref(&self) -> &F {
        &self.0
    }
}

/// What a callback can see of the instance it runs for.
///
/// `scope` is the instance being read or written, or the root instance
/// when the owning schema inherits its root. Elements of a managed array
/// get the scope of the instance owning the array. A standalone `typecast`
/// or an array outside any instance has no scope.
#[derive(Clone, Copy)]
pub struct HookContext<'a> {
    scope: Option<&'a Instance>,
    field: &'a str,
}

impl<'a> HookContext<'a> {
    pub(crate) fn new(scope: Option<&'a Instance>, field: &'a str) -> Self {
        Self { scope, field }
    }

    /// Name of the field the callback runs for
    pub fn field(&self) -> &'a str {
        self.field
    }

    /// Instance the callback runs against
    pub fn scope(&self) -> Option<&'a Instance> {
        self.scope
    }

    /// Reads another field of the scope instance through its public getter.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.scope.and_then(|scope| scope.get(key))
    }
}

impl fmt::Debug for HookContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookContext")
            .field("field", &self.field)
            .field("scoped", &self.scope.is_some())
            .finish()
    }
}

/// Read-time or pre-type transformation of a raw value
pub type ValueHook = Callback<dyn Fn(Option<Value>, &HookContext<'_>) -> Option<Value> + Send + Sync>;

/// Post-type string transformation
pub type StringHook = Callback<dyn Fn(String, &HookContext<'_>) -> String + Send + Sync>;

/// Post-type number transformation
pub type NumberHook = Callback<dyn Fn(f64, &HookContext<'_>) -> f64 + Send + Sync>;

/// Post-type boolean transformation
pub type BooleanHook = Callback<dyn Fn(bool, &HookContext<'_>) -> bool + Send + Sync>;

/// Post-type date transformation
pub type DateHook = Callback<dyn Fn(DateTime<Utc>, &HookContext<'_>) -> DateTime<Utc> + Send + Sync>;

/// Array element admission predicate, called with the typecast element
pub type FilterHook = Callback<dyn Fn(&Value) -> bool + Send + Sync>;

/// Conditional requiredness, evaluated against the owning instance
pub type RequiredHook = Callback<dyn Fn(&Instance) -> bool + Send + Sync>;

/// Default value producer, called once per construction
pub type DefaultHook = Callback<dyn Fn() -> Value + Send + Sync>;

/// Consulted after typecast and before commit.
///
/// `Ok(false)` cancels the write silently, `Err(message)` cancels it and
/// records a rejection with that message.
pub type BeforeSetHook = Callback<dyn Fn(Option<&Value>, &str) -> Result<bool, String> + Send + Sync>;

/// Notified after a committed write
pub type ValueSetHook = Callback<dyn Fn(Option<&Value>, &str) + Send + Sync>;

/// Final rewrite of a serialized object
pub type OutputHook = Callback<dyn Fn(Map) -> Map + Send + Sync>;
