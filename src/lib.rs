//! # fieldfunc: Declarative Field Functions
//!
//! fieldfunc computes text and boolean values from named inputs (form fields,
//! database columns, dialog answers) using small functions written in a
//! configuration language. Typical uses are conditional text blocks, derived
//! form fields, input validation and column transformations.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Configuration tree → FunctionFactory → Function tree → eval_string / eval_bool
//! ```
//!
//! ### Stage 1: Configuration Trees
//!
//! The [`config_tree`] module describes the input: an ordered tree of named
//! nodes, already parsed from the textual configuration syntax by the caller.
//! A childless node is a scalar. `IF(VALUE("Anrede") THEN("Herr"))` is an
//! `IF` node with a `VALUE` and a `THEN` child.
//!
//! ### Stage 2: Parsing
//!
//! The [`analyzer`] module turns a tree into a [`Function`] tree. Every shape
//! rule is checked here and reported as a [`ConfigError`]; regular expressions
//! are compiled, named functions are looked up in the [`FunctionLibrary`],
//! dialogs are bound to a [`Session`](dialog::Session) and external callables
//! are resolved through a [`provider`].
//!
//! ### Stage 3: Evaluation
//!
//! The [`eval`] module evaluates a function against [`Values`]. Evaluation
//! does not fail: anything that cannot be computed yields [`Value::Error`],
//! which propagates through most composite functions. The same tree can be
//! evaluated any number of times, from any number of threads.
//!
//! ## Function Families
//!
//! - Boolean: `AND`, `OR`, `NOT`
//! - Control flow: `IF`/`THEN`/`ELSE`, `SELECT`/`ONERROR`, `CAT`
//! - Numeric: `SUM`, `DIFF`, `PRODUCT`, `MINUS`, `ABS`, `SIGN`,
//!   `DIVIDE`/`FORMAT`, `LT`, `LE`, `GT`, `GE`, `NUMCMP`, `STRCMP`
//! - Text: `VALUE`, `MATCH`, `REPLACE`, `SPLIT`, `LENGTH`
//! - Composition: `BIND`, `DIALOG`, `EXTERN`
//! - Error introspection: `ISERROR`, `ISERRORSTRING`
//!
//! ## Example
//!
//! ```
//! use fieldfunc::config_tree::{leaf, node};
//! use fieldfunc::dialog::DialogLibrary;
//! use fieldfunc::eval::SimpleValues;
//! use fieldfunc::{FunctionFactory, FunctionLibrary};
//!
//! let tree = node(
//!     "IF",
//!     [
//!         node("MATCH", [node("VALUE", [leaf("Anrede")]), leaf("Herr")]),
//!         node("THEN", [leaf("Sehr geehrter Herr")]),
//!         node("ELSE", [leaf("Sehr geehrte Frau")]),
//!     ],
//! );
//! let function = FunctionFactory::default()
//!     .parse(&tree, &FunctionLibrary::new(), &DialogLibrary::new(), None)
//!     .unwrap();
//! let values = SimpleValues::new().with("Anrede", "Herr");
//! assert_eq!(function.eval_string(&values).as_str(), "Sehr geehrter Herr");
//! ```

pub mod analyzer;
pub mod ast;
pub mod config;
pub mod config_tree;
pub mod dialog;
pub mod error;
pub mod eval;
pub mod function_library;
pub mod provider;

// Re-exports
pub use analyzer::{ConfigError, ConfigResult, FunctionFactory};
pub use ast::*;
pub use config::EngineConfig;
pub use error::*;
pub use eval::{NoValues, SimpleValues, Values};
pub use function_library::FunctionLibrary;
