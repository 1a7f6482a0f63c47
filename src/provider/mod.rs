//! External callables for `EXTERN`.
//!
//! An [`ExternalProvider`] turns the URL of an `EXTERN` definition into a
//! [`Callable`] once, at parse time. [`ProviderRegistry`] dispatches on the
//! URL scheme; [`NativeProvider`] serves `native:` URLs from registered
//! closures.

pub mod native;
pub mod provider_registry;
pub mod types;

pub use native::{NativeFunction, NativeProvider};
pub use provider_registry::ProviderRegistry;
pub use types::{Callable, ExternalProvider, ProviderError, ProviderResult};
