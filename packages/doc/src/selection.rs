//! Selections over the child-index position model.

use serde::{Deserialize, Serialize};

use crate::node::{Node, NodePath};
use crate::schema::Schema;

/// The current selection.
///
/// `Text` addresses a child-index range inside a single parent node; a
/// caret is a range with `from == to`. `Node` selects one whole node,
/// which is what node-view selection reports against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Selection {
    Text {
        parent: NodePath,
        from: usize,
        to: usize,
    },
    Node {
        path: NodePath,
    },
}

impl Selection {
    /// A caret before child `index` of `parent`.
    pub fn caret(parent: NodePath, index: usize) -> Self {
        Selection::Text {
            parent,
            from: index,
            to: index,
        }
    }

    pub fn node(path: NodePath) -> Self {
        Selection::Node { path }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Selection::Text { from, to, .. } => from == to,
            Selection::Node { .. } => false,
        }
    }

    /// Caret in the first textblock of the document.
    pub fn at_start(doc: &Node, schema: &Schema) -> Selection {
        match first_textblock(doc, schema) {
            Some(path) => Selection::caret(path, 0),
            None => Selection::caret(NodePath::root(), 0),
        }
    }

    /// Caret after the last child of the last textblock.
    pub fn at_end(doc: &Node, schema: &Schema) -> Selection {
        match last_textblock(doc, schema) {
            Some(path) => {
                let len = doc.node_at(&path).map(Node::child_count).unwrap_or(0);
                Selection::caret(path, len)
            }
            None => Selection::caret(NodePath::root(), doc.child_count()),
        }
    }
}

fn first_textblock(doc: &Node, schema: &Schema) -> Option<NodePath> {
    let mut found = None;
    doc.descendants(&mut |node, path| {
        if found.is_none() && schema.is_textblock(node) {
            found = Some(path.clone());
        }
    });
    found
}

fn last_textblock(doc: &Node, schema: &Schema) -> Option<NodePath> {
    let mut found = None;
    doc.descendants(&mut |node, path| {
        if schema.is_textblock(node) {
            found = Some(path.clone());
        }
    });
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{NodeSpec, Schema};
    use indexmap::IndexMap;

    fn schema() -> Schema {
        let mut nodes = IndexMap::new();
        nodes.insert(
            "doc".to_string(),
            NodeSpec {
                content: Some("block+".to_string()),
                ..Default::default()
            },
        );
        nodes.insert(
            "paragraph".to_string(),
            NodeSpec {
                content: Some("inline*".to_string()),
                ..Default::default()
            },
        );
        nodes.insert("text".to_string(), NodeSpec::default());
        Schema::new(nodes, IndexMap::new()).unwrap()
    }

    #[test]
    fn test_at_start_finds_first_textblock() {
        let doc = Node::new("doc")
            .with_child(Node::new("paragraph").with_child(Node::text("one")))
            .with_child(Node::new("paragraph").with_child(Node::text("two")));

        assert_eq!(
            Selection::at_start(&doc, &schema()),
            Selection::caret(NodePath::new(vec![0]), 0)
        );
    }

    #[test]
    fn test_at_end_sits_after_last_child() {
        let doc = Node::new("doc")
            .with_child(Node::new("paragraph"))
            .with_child(
                Node::new("paragraph")
                    .with_child(Node::text("a"))
                    .with_child(Node::text("b")),
            );

        assert_eq!(
            Selection::at_end(&doc, &schema()),
            Selection::caret(NodePath::new(vec![1]), 2)
        );
    }

    #[test]
    fn test_caret_is_empty() {
        assert!(Selection::caret(NodePath::root(), 0).is_empty());
        assert!(!Selection::node(NodePath::new(vec![1])).is_empty());
    }
}
