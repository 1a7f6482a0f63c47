//! Evaluation System
//!
//! Evaluation turns a parsed [`Function`](crate::ast::Function) tree and a set
//! of named inputs into text or a boolean. It is pure: no node carries state
//! between calls, so one tree may be evaluated concurrently.
//!
//! # Core Components
//!
//! ## Expression Evaluation
//! `Function::eval_string` and `Function::eval_bool` dispatch on the node
//! kind. Errors are values, not `Result`s: anything that cannot be computed
//! yields the error sentinel and most composites propagate it.
//!
//! ## Inputs
//! [`Values`] is the read-only view of named inputs. [`SimpleValues`] is a
//! plain map, [`NoValues`] is used for static evaluation while parsing.
//!
//! ## Numeric Functions
//! Arbitrary-precision decimal folding, division and comparison, with the
//! decimal separator fixed when the function was parsed.

pub mod context;
pub mod expression;
pub mod numeric;

pub use context::{NoValues, SimpleValues, Values};
pub use numeric::DecimalFormat;
