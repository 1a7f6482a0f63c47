use indexmap::IndexMap;
use tracing::warn;

use crate::analyzer::core::{ConfigError, ConfigResult};
use crate::analyzer::factory::Scope;
use crate::ast::{Binding, DialogBinding, ErrorCheck, ExternalFunction, FunctionKind};
use crate::config_tree::ConfigNode;

use super::{arity, single_child};

/// `BIND(FUNCTION f SET(name value)...)`.
pub(crate) fn parse_bind<N: ConfigNode>(
    scope: &Scope<'_>,
    node: &N,
) -> ConfigResult<FunctionKind> {
    let mut target = None;
    let mut overrides = IndexMap::new();

    for child in node.children() {
        match child.name() {
            "FUNCTION" => {
                if target.is_some() {
                    return Err(ConfigError::invalid("BIND", "more than one FUNCTION"));
                }
                let definition = single_child(child)?;
                let function = if definition.is_leaf() {
                    let name = definition.as_scalar();
                    scope
                        .library
                        .get(name)
                        .ok_or_else(|| ConfigError::UndefinedFunction(name.to_string()))?
                } else {
                    scope.parse(definition)?
                };
                target = Some(function);
            }
            "SET" => {
                let [name, value] = child.children() else {
                    return Err(arity(child, 2));
                };
                let name = name.as_scalar();
                if overrides.contains_key(name) {
                    return Err(ConfigError::DuplicateBinding(name.to_string()));
                }
                overrides.insert(name.to_string(), scope.parse(value)?);
            }
            other => warn!("BIND: ignoring {}", other),
        }
    }

    let target = target.ok_or_else(|| ConfigError::invalid("BIND", "missing FUNCTION"))?;
    Ok(FunctionKind::Bind(Binding { target, overrides }))
}

/// `DIALOG(dialog datum)`, bound to the session's instance of the dialog.
pub(crate) fn parse_dialog<N: ConfigNode>(
    scope: &Scope<'_>,
    node: &N,
) -> ConfigResult<FunctionKind> {
    let [dialog, datum] = node.children() else {
        return Err(arity(node, 2));
    };
    let dialog = dialog.as_scalar();
    let template = scope
        .dialogs
        .get(dialog)
        .ok_or_else(|| ConfigError::UndefinedDialog(dialog.to_string()))?;
    let session = scope
        .session
        .ok_or_else(|| ConfigError::MissingSession("DIALOG".to_string()))?;

    Ok(FunctionKind::Dialog(DialogBinding {
        dialog: dialog.to_string(),
        datum: datum.as_scalar().to_string(),
        instance: session.instance(dialog, template.as_ref()),
    }))
}

/// `EXTERN(URL "scheme:..." PARAMS(...))`.
pub(crate) fn parse_extern<N: ConfigNode>(
    scope: &Scope<'_>,
    node: &N,
) -> ConfigResult<FunctionKind> {
    let mut url = None;
    let mut params = Vec::new();

    for child in node.children() {
        match child.name() {
            "URL" => {
                if url.is_some() {
                    return Err(ConfigError::invalid("EXTERN", "more than one URL"));
                }
                url = Some(single_child(child)?.as_scalar().to_string());
            }
            "PARAMS" => params.extend(
                child
                    .children()
                    .iter()
                    .map(|param| param.as_scalar().to_string()),
            ),
            other => warn!("EXTERN: ignoring {}", other),
        }
    }

    let url = url.ok_or_else(|| ConfigError::invalid("EXTERN", "missing URL"))?;
    let provider = scope.provider().ok_or(ConfigError::MissingProvider)?;
    let callable = provider.resolve(&url)?;
    Ok(FunctionKind::Extern(ExternalFunction {
        url,
        params,
        callable,
    }))
}

pub(crate) fn parse_is_error<N: ConfigNode>(
    scope: &Scope<'_>,
    node: &N,
    check: ErrorCheck,
) -> ConfigResult<FunctionKind> {
    Ok(FunctionKind::IsError {
        operand: scope.parse(single_child(node)?)?,
        check,
    })
}
