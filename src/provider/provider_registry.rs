use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, instrument};

use super::native::NativeProvider;
use super::types::{split_url, Callable, ExternalProvider, ProviderError, ProviderResult};

/// Dispatches `scheme:rest` URLs to the provider registered for `scheme`.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: DashMap<String, Arc<dyn ExternalProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with `native` served by `native`.
    pub fn with_native(native: Arc<NativeProvider>) -> Self {
        let registry = Self::new();
        registry.register(NativeProvider::SCHEME, native);
        registry
    }

    #[instrument(level = "debug", skip(self, provider))]
    pub fn register(&self, scheme: &str, provider: Arc<dyn ExternalProvider>) {
        if self
            .providers
            .insert(scheme.to_string(), provider)
            .is_some()
        {
            debug!("replaced provider for scheme {}", scheme);
        }
    }

    pub fn unregister(&self, scheme: &str) -> bool {
        self.providers.remove(scheme).is_some()
    }

    pub fn schemes(&self) -> Vec<String> {
        self.providers.iter().map(|e| e.key().clone()).collect()
    }
}

impl ExternalProvider for ProviderRegistry {
    #[instrument(level = "debug", skip(self))]
    fn resolve(&self, url: &str) -> ProviderResult<Arc<dyn Callable>> {
        let (scheme, _) =
            split_url(url).ok_or_else(|| ProviderError::UnsupportedUrl(url.to_string()))?;
        let provider = self
            .providers
            .get(scheme)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ProviderError::NotFound(scheme.to_string()))?;
        provider.resolve(url)
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("schemes", &self.schemes())
            .finish()
    }
}
