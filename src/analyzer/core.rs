use thiserror::Error;

use crate::config_tree::ConfigNode;
use crate::provider::ProviderError;

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while turning a configuration tree into functions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Opening bracket without preceding function name: {excerpt}")]
    MissingFunctionName { excerpt: String },

    #[error("Unsupported function {name}: {excerpt}")]
    UnknownFunction { name: String, excerpt: String },

    #[error("{function}: {message}")]
    InvalidArguments { function: String, message: String },

    #[error("{function}: invalid regular expression {pattern:?}: {source}")]
    InvalidRegex {
        function: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Function {0} used before it was defined")]
    UndefinedFunction(String),

    #[error("Unknown dialog: {0}")]
    UndefinedDialog(String),

    #[error("{0} requires a dialog session")]
    MissingSession(String),

    #[error("EXTERN requires an external provider")]
    MissingProvider,

    #[error("BIND: parameter {0} is set more than once")]
    DuplicateBinding(String),

    #[error("Empty definition: {0}")]
    EmptyDefinition(String),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("WithContext: {message}, {inner}")]
    WithContext {
        message: String,
        inner: Box<ConfigError>,
    },
}

impl ConfigError {
    pub fn invalid(function: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::InvalidArguments {
            function: function.into(),
            message: message.into(),
        }
    }

    pub fn with_context(self, message: impl Into<String>) -> Self {
        ConfigError::WithContext {
            message: message.into(),
            inner: Box::new(self),
        }
    }
}

/// Rendered subtree cut to `limit` characters.
pub fn excerpt<N: ConfigNode>(node: &N, limit: usize) -> String {
    node.render().chars().take(limit).collect()
}
