//! # Expression Nodes
//!
//! A parsed function is a tree of [`Function`] nodes. Each node wraps one
//! [`FunctionKind`] variant and the set of input names it needs, computed once
//! when the node is built. Nodes are immutable and shared through
//! [`FunctionRef`] (`Arc<Function>`), so a single tree can be registered in a
//! library, bound into other functions and evaluated from several threads.
//!
//! Evaluation produces a [`Value`]: either text or the [`Value::Error`]
//! sentinel. The evaluator lives in [`crate::eval`].

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use regex::Regex;
use strum_macros::{Display, EnumIter, EnumString};

use crate::dialog::DialogInstance;
use crate::eval::numeric::DecimalFormat;
use crate::provider::Callable;

/// Textual form of [`Value::Error`].
pub const ERROR_TEXT: &str = "!¤£!INVALID DATA!¤£!";

/// Result of evaluating a function as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    /// The distinguished "could not compute" sentinel.
    Error,
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    /// Identity check: true only for the sentinel itself.
    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error)
    }

    /// Value check: true for the sentinel and for any text equal to
    /// [`ERROR_TEXT`].
    pub fn is_error_text(&self) -> bool {
        self.as_str() == ERROR_TEXT
    }

    pub fn as_str(&self) -> &str {
        match self {
            Value::Text(s) => s,
            Value::Error => ERROR_TEXT,
        }
    }

    /// Boolean coercion: case-insensitive `"true"`.
    pub fn is_true(&self) -> bool {
        self.as_str().eq_ignore_ascii_case("true")
    }

    pub fn into_string(self) -> String {
        match self {
            Value::Text(s) => s,
            Value::Error => ERROR_TEXT.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Text(if b { "true" } else { "false" }.to_string())
    }
}

/// Function keywords recognised by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum FunctionName {
    #[strum(serialize = "AND")]
    And,
    #[strum(serialize = "OR")]
    Or,
    #[strum(serialize = "NOT")]
    Not,
    #[strum(serialize = "VALUE")]
    Value,
    #[strum(serialize = "MATCH")]
    Match,
    #[strum(serialize = "REPLACE")]
    Replace,
    #[strum(serialize = "SPLIT")]
    Split,
    #[strum(serialize = "IF")]
    If,
    #[strum(serialize = "THEN")]
    Then,
    #[strum(serialize = "ELSE")]
    Else,
    #[strum(serialize = "EXTERN")]
    Extern,
    #[strum(serialize = "DIALOG")]
    Dialog,
    #[strum(serialize = "BIND")]
    Bind,
    #[strum(serialize = "SELECT")]
    Select,
    #[strum(serialize = "CAT")]
    Cat,
    #[strum(serialize = "LENGTH")]
    Length,
    #[strum(serialize = "FORMAT")]
    Format,
    #[strum(serialize = "DIVIDE")]
    Divide,
    #[strum(serialize = "MINUS")]
    Minus,
    #[strum(serialize = "SUM")]
    Sum,
    #[strum(serialize = "DIFF")]
    Diff,
    #[strum(serialize = "PRODUCT")]
    Product,
    #[strum(serialize = "ABS")]
    Abs,
    #[strum(serialize = "SIGN")]
    Sign,
    #[strum(serialize = "LT")]
    Lt,
    #[strum(serialize = "LE")]
    Le,
    #[strum(serialize = "GT")]
    Gt,
    #[strum(serialize = "GE")]
    Ge,
    #[strum(serialize = "NUMCMP")]
    NumCmp,
    #[strum(serialize = "STRCMP")]
    StrCmp,
    #[strum(serialize = "ISERROR")]
    IsError,
    #[strum(serialize = "ISERRORSTRING")]
    IsErrorString,
}

/// Members of the numeric accumulator family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum NumericOp {
    Sum,
    Diff,
    Product,
    Minus,
    Abs,
    Sign,
}

/// Members of the numeric comparison family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum CompareMode {
    Lt,
    Le,
    Gt,
    Ge,
    NumCmp,
}

/// How `ISERROR`/`ISERRORSTRING` recognise the sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCheck {
    /// Only [`Value::Error`] itself.
    Identity,
    /// Anything whose text equals [`ERROR_TEXT`].
    Text,
}

pub type FunctionRef = Arc<Function>;

/// `DIVIDE`/`FORMAT` operands and scale bounds.
#[derive(Debug)]
pub struct Division {
    pub dividend: FunctionRef,
    pub divisor: Option<FunctionRef>,
    pub min_scale: u32,
    pub max_scale: u32,
    pub format: DecimalFormat,
}

/// `BIND` target plus the parameters it overrides.
#[derive(Debug)]
pub struct Binding {
    pub target: FunctionRef,
    pub overrides: IndexMap<String, FunctionRef>,
}

/// `DIALOG` reference to one session-scoped dialog instance.
pub struct DialogBinding {
    pub dialog: String,
    pub datum: String,
    pub instance: Arc<dyn DialogInstance>,
}

impl fmt::Debug for DialogBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogBinding")
            .field("dialog", &self.dialog)
            .field("datum", &self.datum)
            .finish_non_exhaustive()
    }
}

/// `EXTERN` callable with its ordered parameter list.
pub struct ExternalFunction {
    pub url: String,
    pub params: Vec<String>,
    pub callable: Arc<dyn Callable>,
}

impl fmt::Debug for ExternalFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalFunction")
            .field("url", &self.url)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub enum FunctionKind {
    Literal(String),
    /// Input lookup by name.
    Value(String),
    And(Vec<FunctionRef>),
    Or(Vec<FunctionRef>),
    Not(Vec<FunctionRef>),
    Cat(Vec<FunctionRef>),
    Length(Vec<FunctionRef>),
    If {
        condition: FunctionRef,
        then_branch: FunctionRef,
        else_branch: FunctionRef,
    },
    Select {
        alternatives: Vec<FunctionRef>,
        on_error: Option<FunctionRef>,
    },
    Numeric {
        op: NumericOp,
        operands: Vec<FunctionRef>,
        format: DecimalFormat,
    },
    Divide(Division),
    Compare {
        mode: CompareMode,
        operands: Vec<FunctionRef>,
        margin: Option<FunctionRef>,
        format: DecimalFormat,
    },
    StrCmp(Vec<FunctionRef>),
    Match {
        input: FunctionRef,
        pattern: Regex,
    },
    Replace {
        input: FunctionRef,
        pattern: Regex,
        replacement: FunctionRef,
    },
    Split {
        input: FunctionRef,
        pattern: Regex,
        index: usize,
    },
    Bind(Binding),
    Dialog(DialogBinding),
    Extern(ExternalFunction),
    IsError {
        operand: FunctionRef,
        check: ErrorCheck,
    },
}

impl FunctionKind {
    /// Direct sub-functions, in evaluation order.
    pub fn children(&self) -> Vec<&FunctionRef> {
        match self {
            FunctionKind::Literal(_)
            | FunctionKind::Value(_)
            | FunctionKind::Dialog(_)
            | FunctionKind::Extern(_) => Vec::new(),
            FunctionKind::And(operands)
            | FunctionKind::Or(operands)
            | FunctionKind::Not(operands)
            | FunctionKind::Cat(operands)
            | FunctionKind::Length(operands)
            | FunctionKind::StrCmp(operands)
            | FunctionKind::Numeric { operands, .. } => operands.iter().collect(),
            FunctionKind::If {
                condition,
                then_branch,
                else_branch,
            } => vec![condition, then_branch, else_branch],
            FunctionKind::Select {
                alternatives,
                on_error,
            } => alternatives.iter().chain(on_error.iter()).collect(),
            FunctionKind::Divide(division) => std::iter::once(&division.dividend)
                .chain(division.divisor.iter())
                .collect(),
            FunctionKind::Compare {
                operands, margin, ..
            } => operands.iter().chain(margin.iter()).collect(),
            FunctionKind::Match { input, .. } | FunctionKind::Split { input, .. } => vec![input],
            FunctionKind::Replace {
                input, replacement, ..
            } => vec![input, replacement],
            FunctionKind::Bind(binding) => std::iter::once(&binding.target)
                .chain(binding.overrides.values())
                .collect(),
            FunctionKind::IsError { operand, .. } => vec![operand],
        }
    }

    fn collect_parameters(&self) -> IndexSet<String> {
        match self {
            FunctionKind::Value(name) => IndexSet::from([name.clone()]),
            FunctionKind::Extern(external) => external.params.iter().cloned().collect(),
            FunctionKind::Bind(binding) => {
                let mut params: IndexSet<String> = binding
                    .target
                    .parameters()
                    .iter()
                    .filter(|name| !binding.overrides.contains_key(*name))
                    .cloned()
                    .collect();
                for set_function in binding.overrides.values() {
                    params.extend(set_function.parameters().iter().cloned());
                }
                params
            }
            _ => {
                let mut params = IndexSet::new();
                for child in self.children() {
                    params.extend(child.parameters().iter().cloned());
                }
                params
            }
        }
    }
}

/// One node of a parsed function.
#[derive(Debug)]
pub struct Function {
    kind: FunctionKind,
    parameters: IndexSet<String>,
}

impl Function {
    pub fn new(kind: FunctionKind) -> Self {
        let parameters = kind.collect_parameters();
        Self { kind, parameters }
    }

    pub fn literal(s: impl Into<String>) -> FunctionRef {
        Arc::new(Self::new(FunctionKind::Literal(s.into())))
    }

    /// Constant `"true"`.
    pub fn always_true() -> FunctionRef {
        Self::literal("true")
    }

    pub fn kind(&self) -> &FunctionKind {
        &self.kind
    }

    /// Input names that must be bound for a meaningful result, in first
    /// occurrence order.
    pub fn parameters(&self) -> &IndexSet<String> {
        &self.parameters
    }

    /// Adds the names of every dialog referenced anywhere in this tree.
    pub fn dialog_references(&self, out: &mut HashSet<String>) {
        if let FunctionKind::Dialog(binding) = &self.kind {
            out.insert(binding.dialog.clone());
            return;
        }
        for child in self.kind.children() {
            child.dialog_references(out);
        }
    }
}

impl From<FunctionKind> for Function {
    fn from(kind: FunctionKind) -> Self {
        Self::new(kind)
    }
}
