use crate::analyzer::core::ConfigResult;
use crate::analyzer::factory::Scope;
use crate::ast::FunctionKind;
use crate::config_tree::ConfigNode;

use super::{arity, leaf_integer, single_child, static_regex, static_text};

/// `VALUE(name)`; the name is fixed when parsing.
pub(crate) fn parse_value<N: ConfigNode>(
    scope: &Scope<'_>,
    node: &N,
) -> ConfigResult<FunctionKind> {
    let name = static_text(scope, single_child(node)?, "VALUE")?;
    Ok(FunctionKind::Value(name))
}

pub(crate) fn parse_match<N: ConfigNode>(
    scope: &Scope<'_>,
    node: &N,
) -> ConfigResult<FunctionKind> {
    let [input, pattern] = node.children() else {
        return Err(arity(node, 2));
    };
    Ok(FunctionKind::Match {
        input: scope.parse(input)?,
        pattern: static_regex(scope, pattern, "MATCH", true)?,
    })
}

pub(crate) fn parse_replace<N: ConfigNode>(
    scope: &Scope<'_>,
    node: &N,
) -> ConfigResult<FunctionKind> {
    let [input, pattern, replacement] = node.children() else {
        return Err(arity(node, 3));
    };
    Ok(FunctionKind::Replace {
        input: scope.parse(input)?,
        pattern: static_regex(scope, pattern, "REPLACE", false)?,
        replacement: scope.parse(replacement)?,
    })
}

pub(crate) fn parse_split<N: ConfigNode>(
    scope: &Scope<'_>,
    node: &N,
) -> ConfigResult<FunctionKind> {
    let [input, pattern, index] = node.children() else {
        return Err(arity(node, 3));
    };
    Ok(FunctionKind::Split {
        input: scope.parse(input)?,
        pattern: static_regex(scope, pattern, "SPLIT", false)?,
        index: leaf_integer(index, "SPLIT", "index")? as usize,
    })
}
