use crate::analyzer::core::{ConfigError, ConfigResult};
use crate::analyzer::factory::Scope;
use crate::ast::{Function, FunctionKind};
use crate::config_tree::ConfigNode;

use super::logic;

pub(crate) fn parse_if<N: ConfigNode>(scope: &Scope<'_>, node: &N) -> ConfigResult<FunctionKind> {
    let mut condition = None;
    let mut then_branch = None;
    let mut else_branch = None;

    for child in node.children() {
        match child.name() {
            "THEN" => {
                if then_branch.is_some() {
                    return Err(ConfigError::invalid("IF", "more than one THEN"));
                }
                then_branch = Some(logic::clause(scope, child)?);
            }
            "ELSE" => {
                if else_branch.is_some() {
                    return Err(ConfigError::invalid("IF", "more than one ELSE"));
                }
                else_branch = Some(logic::clause(scope, child)?);
            }
            _ => {
                if condition.is_some() {
                    return Err(ConfigError::invalid(
                        "IF",
                        format!("exactly one condition expected: {}", scope.excerpt(node)),
                    ));
                }
                condition = Some(scope.parse(child)?);
            }
        }
    }

    let condition = condition.ok_or_else(|| ConfigError::invalid("IF", "missing condition"))?;
    Ok(FunctionKind::If {
        condition,
        then_branch: then_branch.unwrap_or_else(|| Function::literal("")),
        else_branch: else_branch.unwrap_or_else(|| Function::literal("")),
    })
}

pub(crate) fn parse_select<N: ConfigNode>(
    scope: &Scope<'_>,
    node: &N,
) -> ConfigResult<FunctionKind> {
    let mut alternatives = Vec::new();
    let mut on_error = None;

    for child in node.children() {
        if child.name() == "ONERROR" {
            if on_error.is_some() {
                return Err(ConfigError::invalid("SELECT", "more than one ONERROR"));
            }
            on_error = Some(logic::clause(scope, child)?);
        } else {
            alternatives.push(scope.parse(child)?);
        }
    }

    if alternatives.is_empty() {
        return Err(ConfigError::invalid(
            "SELECT",
            "requires at least one argument",
        ));
    }
    Ok(FunctionKind::Select {
        alternatives,
        on_error,
    })
}
