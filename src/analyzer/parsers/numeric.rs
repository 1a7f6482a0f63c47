use crate::analyzer::core::{ConfigError, ConfigResult};
use crate::analyzer::factory::Scope;
use crate::ast::{CompareMode, Division, FunctionKind, NumericOp};
use crate::config_tree::ConfigNode;

use super::{leaf_integer, logic, single_child};

pub(crate) fn parse_accumulator<N: ConfigNode>(
    scope: &Scope<'_>,
    node: &N,
    op: NumericOp,
) -> ConfigResult<FunctionKind> {
    Ok(FunctionKind::Numeric {
        op,
        operands: logic::operands(scope, node)?,
        format: scope.decimal_format(),
    })
}

/// `DIVIDE`/`FORMAT`: one dividend plus optional `BY`, `MIN` and `MAX`.
pub(crate) fn parse_divide<N: ConfigNode>(
    scope: &Scope<'_>,
    node: &N,
) -> ConfigResult<FunctionKind> {
    let function = node.name();
    let mut dividend = None;
    let mut divisor = None;
    let mut min_scale = None;
    let mut max_scale = None;

    for child in node.children() {
        match child.name() {
            "BY" => {
                if divisor.is_some() {
                    return Err(ConfigError::invalid(function, "more than one BY"));
                }
                divisor = Some(scope.parse(single_child(child)?)?);
            }
            "MIN" => {
                if min_scale.is_some() {
                    return Err(ConfigError::invalid(function, "more than one MIN"));
                }
                min_scale = Some(leaf_integer(single_child(child)?, function, "MIN")?);
            }
            "MAX" => {
                if max_scale.is_some() {
                    return Err(ConfigError::invalid(function, "more than one MAX"));
                }
                max_scale = Some(leaf_integer(single_child(child)?, function, "MAX")?);
            }
            _ => {
                if dividend.is_some() {
                    return Err(ConfigError::invalid(
                        function,
                        format!("exactly one dividend expected: {}", scope.excerpt(node)),
                    ));
                }
                dividend = Some(scope.parse(child)?);
            }
        }
    }

    let dividend = dividend.ok_or_else(|| ConfigError::invalid(function, "missing dividend"))?;
    let max_scale = match (max_scale, &divisor) {
        (Some(max), _) => max,
        (None, Some(_)) => {
            return Err(ConfigError::invalid(function, "MAX is required together with BY"))
        }
        (None, None) => scope.default_max_scale(),
    };
    let min_scale = min_scale.unwrap_or(0);
    if min_scale > max_scale {
        return Err(ConfigError::invalid(function, "MIN must not exceed MAX"));
    }

    Ok(FunctionKind::Divide(Division {
        dividend,
        divisor,
        min_scale,
        max_scale,
        format: scope.decimal_format(),
    }))
}

pub(crate) fn parse_compare<N: ConfigNode>(
    scope: &Scope<'_>,
    node: &N,
    mode: CompareMode,
) -> ConfigResult<FunctionKind> {
    let mut operands = Vec::new();
    let mut margin = None;

    for child in node.children() {
        if child.name() == "MARGIN" {
            if margin.is_some() {
                return Err(ConfigError::invalid(node.name(), "more than one MARGIN"));
            }
            margin = Some(scope.parse(single_child(child)?)?);
        } else {
            operands.push(scope.parse(child)?);
        }
    }

    if operands.len() < 2 {
        return Err(ConfigError::invalid(
            node.name(),
            "requires at least two arguments",
        ));
    }
    Ok(FunctionKind::Compare {
        mode,
        operands,
        margin,
        format: scope.decimal_format(),
    })
}

pub(crate) fn parse_strcmp<N: ConfigNode>(
    scope: &Scope<'_>,
    node: &N,
) -> ConfigResult<FunctionKind> {
    let operands = scope.parse_all(node.children())?;
    if operands.len() < 2 {
        return Err(ConfigError::invalid(
            "STRCMP",
            "requires at least two arguments",
        ));
    }
    Ok(FunctionKind::StrCmp(operands))
}
