//! Callables backed by Rust closures, addressed as `native:<name>`.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, instrument};

use super::types::{split_url, Callable, ExternalProvider, ProviderError, ProviderResult};

type NativeFn = dyn Fn(&[String]) -> ProviderResult<Option<serde_json::Value>> + Send + Sync;

/// A registered closure, optionally checking its argument count.
pub struct NativeFunction {
    name: String,
    arity: Option<usize>,
    func: Box<NativeFn>,
}

impl NativeFunction {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[String]) -> ProviderResult<Option<serde_json::Value>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            arity: None,
            func: Box::new(func),
        }
    }

    pub fn with_arity(mut self, arity: usize) -> Self {
        self.arity = Some(arity);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Callable for NativeFunction {
    fn invoke(&self, args: &[String]) -> ProviderResult<Option<serde_json::Value>> {
        if let Some(expected) = self.arity {
            if args.len() != expected {
                return Err(ProviderError::ArgumentCount {
                    expected,
                    actual: args.len(),
                });
            }
        }
        (self.func)(args)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
pub struct NativeProvider {
    functions: DashMap<String, Arc<dyn Callable>>,
}

impl NativeProvider {
    pub const SCHEME: &'static str = "native";

    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a closure under `name`, replacing any previous one.
    pub fn register<F>(&self, name: &str, func: F)
    where
        F: Fn(&[String]) -> ProviderResult<Option<serde_json::Value>> + Send + Sync + 'static,
    {
        self.register_callable(name, Arc::new(NativeFunction::new(name, func)));
    }

    pub fn register_callable(&self, name: &str, callable: Arc<dyn Callable>) {
        debug!("registering native function {}", name);
        self.functions.insert(name.to_string(), callable);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }
}

impl ExternalProvider for NativeProvider {
    #[instrument(level = "debug", skip(self))]
    fn resolve(&self, url: &str) -> ProviderResult<Arc<dyn Callable>> {
        let name = match split_url(url) {
            Some((Self::SCHEME, name)) => name,
            _ => return Err(ProviderError::UnsupportedUrl(url.to_string())),
        };
        self.functions
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ProviderError::FunctionNotFound(name.to_string()))
    }
}

impl fmt::Debug for NativeProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.functions.iter().map(|e| e.key().clone()).collect();
        f.debug_struct("NativeProvider")
            .field("functions", &names)
            .finish()
    }
}
