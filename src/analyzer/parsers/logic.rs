use std::sync::Arc;

use crate::analyzer::core::{ConfigError, ConfigResult};
use crate::analyzer::factory::Scope;
use crate::ast::{Function, FunctionKind, FunctionRef};
use crate::config_tree::ConfigNode;

/// All children of `node`, at least one.
pub(crate) fn operands<N: ConfigNode>(
    scope: &Scope<'_>,
    node: &N,
) -> ConfigResult<Vec<FunctionRef>> {
    let operands = scope.parse_all(node.children())?;
    if operands.is_empty() {
        return Err(ConfigError::invalid(
            node.name(),
            "requires at least one argument",
        ));
    }
    Ok(operands)
}

/// A clause such as `THEN`, `ELSE` or `ONERROR` read as the `CAT` of its
/// children.
pub(crate) fn clause<N: ConfigNode>(scope: &Scope<'_>, node: &N) -> ConfigResult<FunctionRef> {
    Ok(Arc::new(Function::new(FunctionKind::Cat(operands(
        scope, node,
    )?))))
}
