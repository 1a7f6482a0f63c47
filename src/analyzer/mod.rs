//! Function Parser
//!
//! The analyzer turns a configuration tree into an executable
//! [`Function`](crate::ast::Function) tree. It is a recursive descent over
//! [`ConfigNode`](crate::config_tree::ConfigNode)s: a childless node is a
//! literal, any other node names a function keyword and its children are the
//! operands and clauses.
//!
//! All shape checking happens here, so evaluation never has to deal with a
//! malformed tree. Regular expressions are compiled, `BIND` targets are
//! resolved against the [`FunctionLibrary`](crate::function_library::FunctionLibrary),
//! dialogs are instantiated in the session and `EXTERN` URLs are resolved
//! once, at parse time.

pub mod core;
pub mod factory;
pub(crate) mod parsers;

pub use core::{ConfigError, ConfigResult};
pub use factory::{legacy_section_name, FunctionFactory, FUNCTIONS_SECTION};
