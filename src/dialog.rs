//! # Dialogs
//!
//! A dialog collects data interactively and answers `DIALOG(name, datum)`
//! lookups. Templates are registered by name in a [`DialogLibrary`]; the first
//! function in a [`Session`] that refers to a dialog creates its instance, and
//! every later reference in the same session shares it.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// A live dialog holding the data it collected.
#[mockall::automock]
pub trait DialogInstance: Send + Sync {
    /// The datum called `id`, or `None` when the dialog does not provide it.
    fn get_data(&self, id: &str) -> Option<serde_json::Value>;
}

/// Factory for dialog instances.
#[mockall::automock]
pub trait DialogTemplate: Send + Sync {
    fn instantiate(&self) -> Arc<dyn DialogInstance>;

    /// Names of the data this dialog provides.
    fn schema(&self) -> Vec<String>;
}

/// Dialog answering from a fixed set of data. Acts as its own template: every
/// instance starts from a copy of the same data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticDialog {
    #[serde(default)]
    data: HashMap<String, serde_json::Value>,
}

impl StaticDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.data.insert(id.into(), value.into());
        self
    }
}

impl DialogInstance for StaticDialog {
    fn get_data(&self, id: &str) -> Option<serde_json::Value> {
        self.data.get(id).cloned()
    }
}

impl DialogTemplate for StaticDialog {
    fn instantiate(&self) -> Arc<dyn DialogInstance> {
        Arc::new(self.clone())
    }

    fn schema(&self) -> Vec<String> {
        let mut names: Vec<String> = self.data.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Dialog templates by name.
#[derive(Clone, Default)]
pub struct DialogLibrary {
    templates: HashMap<String, Arc<dyn DialogTemplate>>,
}

impl DialogLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, template: Arc<dyn DialogTemplate>) {
        self.templates.insert(name.into(), template);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn DialogTemplate>> {
        self.templates.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.templates.keys().cloned().collect()
    }
}

impl fmt::Debug for DialogLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogLibrary")
            .field("templates", &self.names())
            .finish()
    }
}

/// Per-session cache of dialog instances.
pub struct Session {
    id: Uuid,
    instances: DashMap<String, Arc<dyn DialogInstance>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            instances: DashMap::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The session's instance of `name`, created from `template` on first use.
    pub fn instance(&self, name: &str, template: &dyn DialogTemplate) -> Arc<dyn DialogInstance> {
        self.instances
            .entry(name.to_string())
            .or_insert_with(|| {
                debug!("session {}: instantiating dialog {}", self.id, name);
                template.instantiate()
            })
            .value()
            .clone()
    }

    pub fn has_instance(&self, name: &str) -> bool {
        self.instances.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("instances", &self.instances.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_static_dialog() {
        let dialog = StaticDialog::new().with("Name", "Meier").with("Age", 42);
        assert_eq!(dialog.get_data("Name"), Some(json!("Meier")));
        assert_eq!(dialog.get_data("Missing"), None);
        assert_eq!(dialog.schema(), vec!["Age".to_string(), "Name".to_string()]);
    }

    #[test]
    fn test_session_instantiates_once() {
        let mut template = MockDialogTemplate::new();
        template
            .expect_instantiate()
            .times(1)
            .returning(|| Arc::new(StaticDialog::new().with("x", "1")));

        let session = Session::new();
        assert!(session.is_empty());
        let first = session.instance("D", &template);
        let second = session.instance("D", &template);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(session.has_instance("D"));
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn test_sessions_do_not_share_instances() {
        let template = StaticDialog::new();
        let a = Session::new();
        let b = Session::new();
        assert_ne!(a.id(), b.id());
        let first = a.instance("D", &template);
        let second = b.instance("D", &template);
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_library_lookup() {
        let mut library = DialogLibrary::new();
        library.add("Empfaenger", Arc::new(StaticDialog::new()));
        assert!(library.contains("Empfaenger"));
        assert!(library.get("Empfaenger").is_some());
        assert!(library.get("Other").is_none());
    }
}
