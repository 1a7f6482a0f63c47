use std::sync::Arc;

use thiserror::Error;

/// A function living outside the expression engine.
#[mockall::automock]
pub trait Callable: Send + Sync {
    /// Invokes the function with one text argument per declared parameter.
    /// `Ok(None)` means the function produced no value.
    fn invoke(&self, args: &[String]) -> ProviderResult<Option<serde_json::Value>>;
}

/// Resolves URL-like descriptors (`scheme:rest`) to callables.
#[mockall::automock]
pub trait ExternalProvider: Send + Sync {
    fn resolve(&self, url: &str) -> ProviderResult<Arc<dyn Callable>>;
}

/// External callable errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Unsupported URL: {0}")]
    UnsupportedUrl(String),

    #[error("Provider not found for scheme: {0}")]
    NotFound(String),

    #[error("Function not found: {0}")]
    FunctionNotFound(String),

    #[error("Invalid arguments: expected {expected}, got {actual}")]
    ArgumentCount { expected: usize, actual: usize },

    #[error("Invocation failed: {0}")]
    Invocation(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Splits `scheme:rest`. `None` without a non-empty scheme.
pub fn split_url(url: &str) -> Option<(&str, &str)> {
    url.split_once(':')
        .filter(|(scheme, _)| !scheme.is_empty())
}
