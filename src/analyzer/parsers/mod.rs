pub(crate) mod binding;
pub(crate) mod control;
pub(crate) mod logic;
pub(crate) mod numeric;
pub(crate) mod text;

use regex::Regex;

use super::core::{ConfigError, ConfigResult};
use super::factory::Scope;
use crate::config_tree::ConfigNode;
use crate::eval::NoValues;

pub(crate) fn arity<N: ConfigNode>(node: &N, expected: usize) -> ConfigError {
    ConfigError::invalid(
        node.name(),
        format!(
            "expects exactly {} argument(s), found {}",
            expected,
            node.child_count()
        ),
    )
}

pub(crate) fn single_child<N: ConfigNode>(node: &N) -> ConfigResult<&N> {
    match node.children() {
        [only] => Ok(only),
        _ => Err(arity(node, 1)),
    }
}

/// Text of `node` evaluated without inputs.
pub(crate) fn static_text<N: ConfigNode>(
    scope: &Scope<'_>,
    node: &N,
    function: &str,
) -> ConfigResult<String> {
    let value = scope.parse(node)?.eval_string(&NoValues);
    if value.is_error() {
        return Err(ConfigError::invalid(
            function,
            format!("{} cannot be evaluated without inputs", scope.excerpt(node)),
        ));
    }
    Ok(value.into_string())
}

/// Regex compiled once from the static text of `node`.
pub(crate) fn static_regex<N: ConfigNode>(
    scope: &Scope<'_>,
    node: &N,
    function: &str,
    full_match: bool,
) -> ConfigResult<Regex> {
    let pattern = static_text(scope, node, function)?;
    let compiled = if full_match {
        Regex::new(&format!("^(?:{})$", pattern))
    } else {
        Regex::new(&pattern)
    };
    compiled.map_err(|source| ConfigError::InvalidRegex {
        function: function.to_string(),
        pattern,
        source,
    })
}

/// Non-negative integer held by the leaf `node`.
pub(crate) fn leaf_integer<N: ConfigNode>(node: &N, function: &str, what: &str) -> ConfigResult<u32> {
    let invalid = || {
        ConfigError::invalid(
            function,
            format!("{} must be a non-negative integer", what),
        )
    };
    if !node.is_leaf() {
        return Err(invalid());
    }
    node.as_scalar().trim().parse::<u32>().map_err(|_| invalid())
}
