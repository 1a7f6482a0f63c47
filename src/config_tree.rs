//! # Configuration Trees
//!
//! Function definitions reach the engine as already-parsed configuration trees:
//! every node has a name and an ordered list of children, and a childless node
//! doubles as a scalar whose value is its name. `AND("true" VALUE("Name"))` is
//! an `AND` node with a leaf `true` and a `VALUE` node holding the leaf `Name`.
//!
//! The [`ConfigNode`] trait is the only thing the parser relies on, so callers
//! can feed their own tree types. [`Node`] is the in-crate implementation used
//! by tests, fixtures and callers without a tree of their own.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Read-only view of one node of a configuration tree.
pub trait ConfigNode: Sized {
    /// Node name. For leaves this is the scalar value.
    fn name(&self) -> &str;

    /// Ordered children.
    fn children(&self) -> &[Self];

    fn child_count(&self) -> usize {
        self.children().len()
    }

    fn is_leaf(&self) -> bool {
        self.children().is_empty()
    }

    /// Scalar value of a leaf. Only meaningful when `child_count() == 0`.
    fn as_scalar(&self) -> &str {
        self.name()
    }

    fn first_child(&self) -> Option<&Self> {
        self.children().first()
    }

    fn last_child(&self) -> Option<&Self> {
        self.children().last()
    }

    /// Breadth-first search below this node. Returns every node called `name`
    /// on the shallowest level that has at least one match.
    fn query(&self, name: &str) -> Vec<&Self> {
        let mut level: Vec<&Self> = self.children().iter().collect();
        while !level.is_empty() {
            let found: Vec<&Self> = level
                .iter()
                .copied()
                .filter(|node| node.name() == name)
                .collect();
            if !found.is_empty() {
                return found;
            }
            level = level
                .iter()
                .flat_map(|node| node.children().iter())
                .collect();
        }
        Vec::new()
    }

    /// Textual form of the subtree, e.g. `IF(VALUE("x") THEN "a")`.
    fn render(&self) -> String {
        let mut out = String::new();
        render_into(self, &mut out);
        out
    }
}

fn render_into<N: ConfigNode>(node: &N, out: &mut String) {
    if node.is_leaf() {
        out.push('"');
        out.push_str(&node.name().replace('"', "\"\""));
        out.push('"');
        return;
    }
    out.push_str(node.name());
    out.push('(');
    for (i, child) in node.children().iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        render_into(child, out);
    }
    out.push(')');
}

/// Owned configuration tree node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(name: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            name: name.into(),
            children,
        }
    }

    pub fn leaf(value: impl Into<String>) -> Self {
        Self::new(value, Vec::new())
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn push(&mut self, child: Node) -> &mut Self {
        self.children.push(child);
        self
    }
}

impl ConfigNode for Node {
    fn name(&self) -> &str {
        &self.name
    }

    fn children(&self) -> &[Self] {
        &self.children
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Shorthand for [`Node::new`].
pub fn node<I>(name: &str, children: I) -> Node
where
    I: IntoIterator<Item = Node>,
{
    Node::new(name, children.into_iter().collect())
}

/// Shorthand for [`Node::leaf`].
pub fn leaf(value: &str) -> Node {
    Node::leaf(value)
}
