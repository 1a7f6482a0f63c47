use std::cell::Cell;
use std::collections::HashMap;

use indexmap::IndexMap;

use crate::ast::{FunctionRef, Value};

/// Named inputs a function is evaluated against.
///
/// Implementations are read-only views; evaluation never writes back.
pub trait Values {
    fn has_value(&self, id: &str) -> bool;

    /// Value bound to `id`. Only meaningful when [`Values::has_value`] is true.
    fn get_string(&self, id: &str) -> Value;

    fn get_boolean(&self, id: &str) -> bool {
        self.get_string(id).is_true()
    }
}

/// The empty input set. Used for static evaluation while parsing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoValues;

impl Values for NoValues {
    fn has_value(&self, _id: &str) -> bool {
        false
    }

    fn get_string(&self, _id: &str) -> Value {
        Value::text("")
    }

    fn get_boolean(&self, _id: &str) -> bool {
        false
    }
}

/// Plain map of input names to text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimpleValues {
    values: HashMap<String, String>,
}

impl SimpleValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, id: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.insert(id.into(), value.into())
    }

    pub fn with(mut self, id: impl Into<String>, value: impl Into<String>) -> Self {
        self.put(id, value);
        self
    }

    pub fn remove(&mut self, id: &str) -> Option<String> {
        self.values.remove(id)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Values for SimpleValues {
    fn has_value(&self, id: &str) -> bool {
        self.values.contains_key(id)
    }

    fn get_string(&self, id: &str) -> Value {
        Value::text(self.values.get(id).cloned().unwrap_or_default())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SimpleValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// View used by `BIND`: overridden names are computed from their set
/// functions against the caller's inputs, everything else passes through.
///
/// Lives on the stack of a single evaluation, so the error flag never leaks
/// between calls.
pub(crate) struct TranslatedValues<'a> {
    overrides: &'a IndexMap<String, FunctionRef>,
    inner: &'a dyn Values,
    has_error: Cell<bool>,
}

impl<'a> TranslatedValues<'a> {
    pub(crate) fn new(overrides: &'a IndexMap<String, FunctionRef>, inner: &'a dyn Values) -> Self {
        Self {
            overrides,
            inner,
            has_error: Cell::new(false),
        }
    }

    /// Whether any override evaluated to the error sentinel.
    pub(crate) fn has_error(&self) -> bool {
        self.has_error.get()
    }
}

impl Values for TranslatedValues<'_> {
    fn has_value(&self, id: &str) -> bool {
        self.overrides.contains_key(id) || self.inner.has_value(id)
    }

    fn get_string(&self, id: &str) -> Value {
        match self.overrides.get(id) {
            Some(function) => {
                let value = function.eval_string(self.inner);
                if value.is_error() {
                    self.has_error.set(true);
                }
                value
            }
            None => self.inner.get_string(id),
        }
    }

    fn get_boolean(&self, id: &str) -> bool {
        match self.overrides.get(id) {
            Some(_) => self.get_string(id).is_true(),
            None => self.inner.get_boolean(id),
        }
    }
}
