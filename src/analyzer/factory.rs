use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, error, instrument, trace};

use super::core::{excerpt, ConfigError, ConfigResult};
use super::parsers::{binding, control, logic, numeric, text};
use crate::ast::{
    CompareMode, ErrorCheck, Function, FunctionKind, FunctionName, FunctionRef, NumericOp,
};
use crate::config::EngineConfig;
use crate::config_tree::ConfigNode;
use crate::dialog::{DialogLibrary, Session};
use crate::eval::numeric::DecimalFormat;
use crate::function_library::FunctionLibrary;
use crate::provider::ExternalProvider;

/// Section holding global function definitions.
pub const FUNCTIONS_SECTION: &str = "Functions";

/// Older German section names, read when a configuration has none of the
/// current name.
const LEGACY_SECTIONS: &[(&str, &str)] = &[
    ("Functions", "Funktionen"),
    ("ColumnTransformation", "Spaltenumsetzung"),
    ("SenderDataColumnTransformation", "AbsenderdatenSpaltenumsetzung"),
];

/// Legacy name of section `name`, if it has one.
pub fn legacy_section_name(name: &str) -> Option<&'static str> {
    LEGACY_SECTIONS
        .iter()
        .find(|(current, _)| *current == name)
        .map(|(_, legacy)| *legacy)
}

/// Translates configuration trees into [`Function`] trees.
pub struct FunctionFactory {
    config: EngineConfig,
    provider: Option<Arc<dyn ExternalProvider>>,
}

impl Default for FunctionFactory {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl FunctionFactory {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            provider: None,
        }
    }

    /// Resolver for `EXTERN` URLs. Without one, `EXTERN` fails to parse.
    pub fn with_provider(mut self, provider: Arc<dyn ExternalProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn scope<'a>(
        &'a self,
        library: &'a FunctionLibrary,
        dialogs: &'a DialogLibrary,
        session: Option<&'a Session>,
    ) -> Scope<'a> {
        Scope {
            factory: self,
            library,
            dialogs,
            session,
        }
    }

    /// Parses `node` as one function.
    pub fn parse<N: ConfigNode>(
        &self,
        node: &N,
        library: &FunctionLibrary,
        dialogs: &DialogLibrary,
        session: Option<&Session>,
    ) -> ConfigResult<FunctionRef> {
        self.scope(library, dialogs, session).parse(node)
    }

    /// `None` without children, the child itself for one, an implicit `AND`
    /// for several.
    pub fn parse_children<N: ConfigNode>(
        &self,
        node: &N,
        library: &FunctionLibrary,
        dialogs: &DialogLibrary,
        session: Option<&Session>,
    ) -> ConfigResult<Option<FunctionRef>> {
        self.scope(library, dialogs, session)
            .parse_sequence(node.children().iter())
    }

    /// Like [`parse_children`](Self::parse_children) over the children of all
    /// children of `node`.
    pub fn parse_grandchildren<N: ConfigNode>(
        &self,
        node: &N,
        library: &FunctionLibrary,
        dialogs: &DialogLibrary,
        session: Option<&Session>,
    ) -> ConfigResult<Option<FunctionRef>> {
        self.scope(library, dialogs, session)
            .parse_sequence(node.children().iter().flat_map(|child| child.children()))
    }

    /// Adds every definition found under the `section` nodes of `conf` to
    /// `library`, or under its legacy name when there are none. Broken
    /// definitions are logged and skipped. Returns the number of functions
    /// added.
    #[instrument(level = "debug", skip(self, conf, library, dialogs, session))]
    pub fn parse_functions<N: ConfigNode>(
        &self,
        conf: &N,
        section: &str,
        library: &FunctionLibrary,
        dialogs: &DialogLibrary,
        session: Option<&Session>,
    ) -> usize {
        let mut sections = conf.query(section);
        if sections.is_empty() {
            if let Some(legacy) = legacy_section_name(section) {
                debug!("no {} section, reading {}", section, legacy);
                sections = conf.query(legacy);
            }
        }

        let mut added = 0;
        for section_node in sections {
            for definition in section_node.children() {
                let name = definition.name();
                let parsed = self
                    .parse_children(definition, library, dialogs, session)
                    .and_then(|function| {
                        function.ok_or_else(|| ConfigError::EmptyDefinition(name.to_string()))
                    });
                match parsed {
                    Ok(function) => {
                        library.add(name, function);
                        added += 1;
                    }
                    Err(e) => error!(
                        "{}",
                        e.with_context(format!("function {} in section {}", name, section))
                    ),
                }
            }
        }
        added
    }

    /// New library on top of `base`, filled from the [`FUNCTIONS_SECTION`]
    /// sections of `conf`.
    pub fn parse_function_library<N: ConfigNode>(
        &self,
        conf: &N,
        dialogs: &DialogLibrary,
        session: Option<&Session>,
        base: Option<Arc<FunctionLibrary>>,
    ) -> FunctionLibrary {
        let library = match base {
            Some(parent) => FunctionLibrary::with_parent(parent),
            None => FunctionLibrary::new(),
        };
        self.parse_functions(conf, FUNCTIONS_SECTION, &library, dialogs, session);
        library
    }

    /// Column transformations: every child of each direct `node_name` child of
    /// `conf`, keyed by its name. Broken or empty definitions are logged and
    /// skipped. Falls back to the legacy name of `node_name` when `conf` has
    /// no such child.
    #[instrument(level = "debug", skip(self, conf, library, dialogs, session))]
    pub fn parse_trafos<N: ConfigNode>(
        &self,
        conf: &N,
        node_name: &str,
        library: &FunctionLibrary,
        dialogs: &DialogLibrary,
        session: Option<&Session>,
    ) -> HashMap<String, FunctionRef> {
        let mut trafos = HashMap::new();
        let mut groups: Vec<&N> = conf
            .children()
            .iter()
            .filter(|child| child.name() == node_name)
            .collect();
        if groups.is_empty() {
            if let Some(legacy) = legacy_section_name(node_name) {
                debug!("no {} node, reading {}", node_name, legacy);
                groups = conf
                    .children()
                    .iter()
                    .filter(|child| child.name() == legacy)
                    .collect();
            }
        }
        for group in groups {
            for definition in group.children() {
                let name = definition.name();
                let parsed = self
                    .parse_children(definition, library, dialogs, session)
                    .and_then(|function| {
                        function.ok_or_else(|| ConfigError::EmptyDefinition(name.to_string()))
                    });
                match parsed {
                    Ok(function) => {
                        trafos.insert(name.to_string(), function);
                    }
                    Err(e) => error!(
                        "{}",
                        e.with_context(format!("transformation for column {}", name))
                    ),
                }
            }
        }
        trafos
    }
}

/// Everything a single parse needs, borrowed for its duration.
pub(crate) struct Scope<'a> {
    factory: &'a FunctionFactory,
    pub(crate) library: &'a FunctionLibrary,
    pub(crate) dialogs: &'a DialogLibrary,
    pub(crate) session: Option<&'a Session>,
}

impl Scope<'_> {
    pub(crate) fn parse<N: ConfigNode>(&self, node: &N) -> ConfigResult<FunctionRef> {
        match self.dispatch(node) {
            Ok(function) => {
                trace!("parsed {}", node.name());
                Ok(function)
            }
            Err(e) => {
                debug!("failed to parse {}: {}", node.name(), e);
                Err(e)
            }
        }
    }

    fn dispatch<N: ConfigNode>(&self, node: &N) -> ConfigResult<FunctionRef> {
        if node.is_leaf() {
            return Ok(Function::literal(node.name()));
        }

        let name = node.name();
        if name.is_empty() {
            return Err(ConfigError::MissingFunctionName {
                excerpt: self.excerpt(node),
            });
        }
        let keyword = FunctionName::from_str(name).map_err(|_| ConfigError::UnknownFunction {
            name: name.to_string(),
            excerpt: self.excerpt(node),
        })?;

        let kind = match keyword {
            FunctionName::And => FunctionKind::And(logic::operands(self, node)?),
            FunctionName::Or => FunctionKind::Or(logic::operands(self, node)?),
            FunctionName::Not => FunctionKind::Not(logic::operands(self, node)?),
            FunctionName::Cat | FunctionName::Then | FunctionName::Else => {
                FunctionKind::Cat(logic::operands(self, node)?)
            }
            FunctionName::Length => FunctionKind::Length(logic::operands(self, node)?),
            FunctionName::If => control::parse_if(self, node)?,
            FunctionName::Select => control::parse_select(self, node)?,
            FunctionName::Value => text::parse_value(self, node)?,
            FunctionName::Match => text::parse_match(self, node)?,
            FunctionName::Replace => text::parse_replace(self, node)?,
            FunctionName::Split => text::parse_split(self, node)?,
            FunctionName::Sum => numeric::parse_accumulator(self, node, NumericOp::Sum)?,
            FunctionName::Diff => numeric::parse_accumulator(self, node, NumericOp::Diff)?,
            FunctionName::Product => numeric::parse_accumulator(self, node, NumericOp::Product)?,
            FunctionName::Minus => numeric::parse_accumulator(self, node, NumericOp::Minus)?,
            FunctionName::Abs => numeric::parse_accumulator(self, node, NumericOp::Abs)?,
            FunctionName::Sign => numeric::parse_accumulator(self, node, NumericOp::Sign)?,
            FunctionName::Divide | FunctionName::Format => numeric::parse_divide(self, node)?,
            FunctionName::Lt => numeric::parse_compare(self, node, CompareMode::Lt)?,
            FunctionName::Le => numeric::parse_compare(self, node, CompareMode::Le)?,
            FunctionName::Gt => numeric::parse_compare(self, node, CompareMode::Gt)?,
            FunctionName::Ge => numeric::parse_compare(self, node, CompareMode::Ge)?,
            FunctionName::NumCmp => numeric::parse_compare(self, node, CompareMode::NumCmp)?,
            FunctionName::StrCmp => numeric::parse_strcmp(self, node)?,
            FunctionName::Bind => binding::parse_bind(self, node)?,
            FunctionName::Dialog => binding::parse_dialog(self, node)?,
            FunctionName::Extern => binding::parse_extern(self, node)?,
            FunctionName::IsError => binding::parse_is_error(self, node, ErrorCheck::Identity)?,
            FunctionName::IsErrorString => binding::parse_is_error(self, node, ErrorCheck::Text)?,
        };
        Ok(Arc::new(Function::new(kind)))
    }

    pub(crate) fn parse_all<'n, N, I>(&self, nodes: I) -> ConfigResult<Vec<FunctionRef>>
    where
        N: ConfigNode + 'n,
        I: IntoIterator<Item = &'n N>,
    {
        nodes.into_iter().map(|node| self.parse(node)).collect()
    }

    fn parse_sequence<'n, N, I>(&self, nodes: I) -> ConfigResult<Option<FunctionRef>>
    where
        N: ConfigNode + 'n,
        I: IntoIterator<Item = &'n N>,
    {
        let mut functions = self.parse_all(nodes)?;
        Ok(match functions.len() {
            0 => None,
            1 => functions.pop(),
            _ => Some(Arc::new(Function::new(FunctionKind::And(functions)))),
        })
    }

    pub(crate) fn excerpt<N: ConfigNode>(&self, node: &N) -> String {
        excerpt(node, self.factory.config.error_excerpt_len)
    }

    pub(crate) fn decimal_format(&self) -> DecimalFormat {
        self.factory.config.decimal_format()
    }

    pub(crate) fn default_max_scale(&self) -> u32 {
        self.factory.config.default_max_scale
    }

    pub(crate) fn provider(&self) -> Option<&Arc<dyn ExternalProvider>> {
        self.factory.provider.as_ref()
    }
}
