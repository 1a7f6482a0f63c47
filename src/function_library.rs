//! Named function registry.
//!
//! A library maps names to parsed functions. A lookup that misses falls back
//! to the optional parent, which lets a document-level library extend a
//! global one without copying it.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use indexmap::IndexMap;
use tracing::debug;

use crate::ast::FunctionRef;

enum Entries {
    Ordered(IndexMap<String, FunctionRef>),
    Unordered(HashMap<String, FunctionRef>),
}

impl Entries {
    fn insert(&mut self, name: String, function: FunctionRef) {
        match self {
            Entries::Ordered(map) => {
                map.insert(name, function);
            }
            Entries::Unordered(map) => {
                map.insert(name, function);
            }
        }
    }

    fn get(&self, name: &str) -> Option<&FunctionRef> {
        match self {
            Entries::Ordered(map) => map.get(name),
            Entries::Unordered(map) => map.get(name),
        }
    }

    fn remove(&mut self, name: &str) -> Option<FunctionRef> {
        match self {
            Entries::Ordered(map) => map.shift_remove(name),
            Entries::Unordered(map) => map.remove(name),
        }
    }

    fn names(&self) -> Vec<String> {
        match self {
            Entries::Ordered(map) => map.keys().cloned().collect(),
            Entries::Unordered(map) => map.keys().cloned().collect(),
        }
    }

    fn values(&self) -> Vec<FunctionRef> {
        match self {
            Entries::Ordered(map) => map.values().cloned().collect(),
            Entries::Unordered(map) => map.values().cloned().collect(),
        }
    }

    fn len(&self) -> usize {
        match self {
            Entries::Ordered(map) => map.len(),
            Entries::Unordered(map) => map.len(),
        }
    }
}

pub struct FunctionLibrary {
    entries: RwLock<Entries>,
    parent: Option<Arc<FunctionLibrary>>,
}

impl Default for FunctionLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionLibrary {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Entries::Unordered(HashMap::new())),
            parent: None,
        }
    }

    pub fn with_parent(parent: Arc<FunctionLibrary>) -> Self {
        Self {
            entries: RwLock::new(Entries::Unordered(HashMap::new())),
            parent: Some(parent),
        }
    }

    /// Library whose [`functions`](Self::functions) keep insertion order.
    pub fn ordered(parent: Option<Arc<FunctionLibrary>>) -> Self {
        Self {
            entries: RwLock::new(Entries::Ordered(IndexMap::new())),
            parent,
        }
    }

    pub fn parent(&self) -> Option<&Arc<FunctionLibrary>> {
        self.parent.as_ref()
    }

    fn read(&self) -> RwLockReadGuard<'_, Entries> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Entries> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds `function` under `name`, replacing a local function of that name.
    pub fn add(&self, name: impl Into<String>, function: FunctionRef) {
        let name = name.into();
        debug!("adding function {}", name);
        self.write().insert(name, function);
    }

    /// Local function `name`, or the parent's when there is none.
    pub fn get(&self, name: &str) -> Option<FunctionRef> {
        if let Some(function) = self.read().get(name) {
            return Some(function.clone());
        }
        self.parent.as_ref().and_then(|parent| parent.get(name))
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Removes `name` here and along the parent chain. True when no library
    /// in the chain knows `name` afterwards.
    pub fn remove(&self, name: &str) -> bool {
        self.write().remove(name);
        if let Some(parent) = &self.parent {
            parent.remove(name);
        }
        !self.has_function(name)
    }

    /// Names known here or in any ancestor.
    pub fn names(&self) -> Vec<String> {
        let mut names = self.read().names();
        if let Some(parent) = &self.parent {
            for name in parent.names() {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Local functions only, in insertion order for ordered libraries.
    pub fn functions(&self) -> Vec<FunctionRef> {
        self.read().values()
    }

    /// Number of local functions.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for FunctionLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionLibrary")
            .field("functions", &self.read().names())
            .field("parent", &self.parent)
            .finish()
    }
}
