mod function_tests;

use std::sync::Arc;

use fieldfunc::config_tree::Node;
use fieldfunc::dialog::{DialogLibrary, Session};
use fieldfunc::{ConfigResult, EngineConfig, FunctionFactory, FunctionLibrary, FunctionRef};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[ctor::ctor]
fn init_tests() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Parser plus the libraries a test parses against.
pub struct Fixture {
    pub factory: FunctionFactory,
    pub library: Arc<FunctionLibrary>,
    pub dialogs: DialogLibrary,
    pub session: Session,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::with_config(EngineConfig::default())
    }
}

impl Fixture {
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            factory: FunctionFactory::new(config),
            library: Arc::new(FunctionLibrary::new()),
            dialogs: DialogLibrary::new(),
            session: Session::new(),
        }
    }

    pub fn parse(&self, tree: &Node) -> ConfigResult<FunctionRef> {
        self.factory
            .parse(tree, &self.library, &self.dialogs, Some(&self.session))
    }
}
