use regex::Regex;
use tracing::{debug, error, trace};

use super::context::{TranslatedValues, Values};
use super::numeric;
use crate::ast::{ErrorCheck, Function, FunctionKind, FunctionRef, Value};

impl Function {
    /// Evaluates this node as text.
    ///
    /// Never fails: anything that cannot be computed yields [`Value::Error`],
    /// which most composite functions propagate.
    pub fn eval_string(&self, values: &dyn Values) -> Value {
        match self.kind() {
            FunctionKind::Literal(text) => Value::text(text.as_str()),
            FunctionKind::Value(name) => {
                if values.has_value(name) {
                    values.get_string(name)
                } else {
                    Value::Error
                }
            }
            FunctionKind::And(operands) => eval_and(operands, values),
            FunctionKind::Or(operands) => eval_or(operands, values),
            FunctionKind::Not(operands) => eval_not(operands, values),
            FunctionKind::Cat(operands) => concat(operands, values),
            FunctionKind::Length(operands) => match concat(operands, values) {
                Value::Error => Value::Error,
                Value::Text(text) => Value::text(text.chars().count().to_string()),
            },
            FunctionKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let test = condition.eval_string(values);
                if test.is_error() {
                    Value::Error
                } else if test.is_true() {
                    then_branch.eval_string(values)
                } else {
                    else_branch.eval_string(values)
                }
            }
            FunctionKind::Select {
                alternatives,
                on_error,
            } => eval_select(alternatives, on_error.as_ref(), values),
            FunctionKind::Numeric {
                op,
                operands,
                format,
            } => numeric::accumulate(*op, operands, format, values),
            FunctionKind::Divide(division) => numeric::divide(division, values),
            FunctionKind::Compare {
                mode,
                operands,
                margin,
                format,
            } => numeric::compare(*mode, operands, margin.as_ref(), format, values),
            FunctionKind::StrCmp(operands) => numeric::compare_strings(operands, values),
            FunctionKind::Match { input, pattern } => match input.eval_string(values) {
                Value::Error => Value::Error,
                Value::Text(text) => Value::from(pattern.is_match(&text)),
            },
            FunctionKind::Replace {
                input,
                pattern,
                replacement,
            } => {
                let text = input.eval_string(values);
                let with = replacement.eval_string(values);
                if text.is_error() || with.is_error() {
                    return Value::Error;
                }
                match replacement_template(with.as_str(), pattern) {
                    Some(template) => {
                        Value::text(pattern.replace_all(text.as_str(), template.as_str()))
                    }
                    None => {
                        debug!("REPLACE: malformed replacement {:?}", with.as_str());
                        Value::Error
                    }
                }
            }
            FunctionKind::Split {
                input,
                pattern,
                index,
            } => match input.eval_string(values) {
                Value::Error => Value::Error,
                Value::Text(text) => {
                    let mut parts: Vec<&str> = pattern.split(&text).collect();
                    while parts.last().is_some_and(|part| part.is_empty()) {
                        parts.pop();
                    }
                    Value::text(parts.get(*index).copied().unwrap_or_default())
                }
            },
            FunctionKind::Bind(binding) => {
                let translated = TranslatedValues::new(&binding.overrides, values);
                let result = binding.target.eval_string(&translated);
                if translated.has_error() {
                    Value::Error
                } else {
                    result
                }
            }
            FunctionKind::Dialog(binding) => match binding.instance.get_data(&binding.datum) {
                Some(data) => Value::text(data_to_text(data)),
                None => {
                    trace!("dialog {} has no datum {}", binding.dialog, binding.datum);
                    Value::Error
                }
            },
            FunctionKind::Extern(external) => {
                let args: Vec<String> = external
                    .params
                    .iter()
                    .map(|param| values.get_string(param).into_string())
                    .collect();
                match external.callable.invoke(&args) {
                    Ok(Some(result)) => Value::text(data_to_text(result)),
                    Ok(None) => {
                        error!("external function {} returned no value", external.url);
                        Value::Error
                    }
                    Err(e) => {
                        error!("external function {} failed: {}", external.url, e);
                        Value::Error
                    }
                }
            }
            FunctionKind::IsError { operand, check } => {
                Value::from(is_error(operand, *check, values))
            }
        }
    }

    /// Evaluates this node as a boolean.
    pub fn eval_bool(&self, values: &dyn Values) -> bool {
        match self.kind() {
            FunctionKind::Length(_) | FunctionKind::Divide(_) => false,
            FunctionKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let test = condition.eval_string(values);
                if test.is_error() {
                    false
                } else if test.is_true() {
                    then_branch.eval_bool(values)
                } else {
                    else_branch.eval_bool(values)
                }
            }
            FunctionKind::Bind(binding) => {
                let translated = TranslatedValues::new(&binding.overrides, values);
                let result = binding.target.eval_bool(&translated);
                result && !translated.has_error()
            }
            FunctionKind::IsError { operand, check } => is_error(operand, *check, values),
            _ => self.eval_string(values).is_true(),
        }
    }
}

fn eval_and(operands: &[FunctionRef], values: &dyn Values) -> Value {
    for operand in operands {
        let result = operand.eval_string(values);
        if result.is_error() {
            return Value::Error;
        }
        if !result.is_true() {
            return Value::from(false);
        }
    }
    Value::from(true)
}

fn eval_or(operands: &[FunctionRef], values: &dyn Values) -> Value {
    for operand in operands {
        let result = operand.eval_string(values);
        if result.is_error() {
            return Value::Error;
        }
        if result.is_true() {
            return Value::from(true);
        }
    }
    Value::from(false)
}

/// `"true"` as soon as one operand is not true.
fn eval_not(operands: &[FunctionRef], values: &dyn Values) -> Value {
    for operand in operands {
        let result = operand.eval_string(values);
        if result.is_error() {
            return Value::Error;
        }
        if !result.is_true() {
            return Value::from(true);
        }
    }
    Value::from(false)
}

fn concat(operands: &[FunctionRef], values: &dyn Values) -> Value {
    let mut out = String::new();
    for operand in operands {
        match operand.eval_string(values) {
            Value::Error => return Value::Error,
            Value::Text(text) => out.push_str(&text),
        }
    }
    Value::Text(out)
}

fn eval_select(
    alternatives: &[FunctionRef],
    on_error: Option<&FunctionRef>,
    values: &dyn Values,
) -> Value {
    let mut result = Value::Error;
    for alternative in alternatives {
        let value = alternative.eval_string(values);
        if !value.is_error() {
            let done = !value.as_str().is_empty();
            result = value;
            if done {
                break;
            }
        } else if let Some(on_error) = on_error {
            return on_error.eval_string(values);
        }
    }
    result
}

fn is_error(operand: &FunctionRef, check: ErrorCheck, values: &dyn Values) -> bool {
    let value = operand.eval_string(values);
    match check {
        ErrorCheck::Identity => value.is_error(),
        ErrorCheck::Text => value.is_error_text(),
    }
}

/// Rewrites a replacement string into `regex` expansion syntax.
///
/// `$n` refers to group `n`, taking further digits only while they still name
/// an existing group, so `$1x` is group 1 followed by `x`. `${name}` refers to
/// a named group and a backslash takes the next character literally. `None`
/// for references to missing groups, a dangling `$` and a trailing backslash.
fn replacement_template(replacement: &str, pattern: &Regex) -> Option<String> {
    let group_count = pattern.captures_len() - 1;
    let mut template = String::with_capacity(replacement.len());
    let mut chars = replacement.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next()? {
                '$' => template.push_str("$$"),
                escaped => template.push(escaped),
            },
            '$' => match chars.next()? {
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next()? {
                            '}' => break,
                            c if c.is_ascii_alphanumeric() => name.push(c),
                            _ => return None,
                        }
                    }
                    let starts_with_letter =
                        name.chars().next().is_some_and(|c| c.is_ascii_alphabetic());
                    let known = pattern.capture_names().any(|n| n == Some(name.as_str()));
                    if !starts_with_letter || !known {
                        return None;
                    }
                    template.push_str(&format!("${{{}}}", name));
                }
                digit => {
                    let mut group = digit.to_digit(10)? as usize;
                    if group > group_count {
                        return None;
                    }
                    while let Some(next) = chars.peek().and_then(|c| c.to_digit(10)) {
                        let extended = group * 10 + next as usize;
                        if extended > group_count {
                            break;
                        }
                        group = extended;
                        chars.next();
                    }
                    template.push_str(&format!("${{{}}}", group));
                }
            },
            other => template.push(other),
        }
    }
    Some(template)
}

fn data_to_text(data: serde_json::Value) -> String {
    match data {
        serde_json::Value::String(text) => text,
        other => other.to_string(),
    }
}
