//! The immutable document tree.
//!
//! A [`Node`] is a plain owned value: cloning the document and splicing
//! children is how every mutation is realized. Text lives in leaf nodes
//! with `text: Some(..)`; inline formatting is carried by [`Mark`]s on
//! those leaves.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Attribute bag for nodes and marks.
pub type Attrs = serde_json::Map<String, Value>;

/// Build an attribute bag from key/value pairs.
pub fn attrs<I>(entries: I) -> Attrs
where
    I: IntoIterator<Item = (&'static str, Value)>,
{
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

/// An inline formatting span applied to a text node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    pub type_name: String,

    #[serde(default, skip_serializing_if = "Attrs::is_empty")]
    pub attrs: Attrs,
}

impl Mark {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            attrs: Attrs::new(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attrs.insert(key.into(), value);
        self
    }

    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.attrs.get(key)
    }
}

/// A node in the document tree.
///
/// Identity comparison between a node and its replacement is by
/// `type_name`; everything else may differ across an update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub type_name: String,

    #[serde(default, skip_serializing_if = "Attrs::is_empty")]
    pub attrs: Attrs,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<Mark>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<Node>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Node {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            attrs: Attrs::new(),
            marks: Vec::new(),
            content: Vec::new(),
            text: None,
        }
    }

    /// A `text` leaf node.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            type_name: "text".to_string(),
            attrs: Attrs::new(),
            marks: Vec::new(),
            content: Vec::new(),
            text: Some(content.into()),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attrs.insert(key.into(), value);
        self
    }

    pub fn with_content(mut self, content: Vec<Node>) -> Self {
        self.content = content;
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.content.push(child);
        self
    }

    pub fn with_marks(mut self, marks: Vec<Mark>) -> Self {
        self.marks = marks;
        self
    }

    pub fn is_text(&self) -> bool {
        self.text.is_some()
    }

    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.attrs.get(key)
    }

    pub fn child_count(&self) -> usize {
        self.content.len()
    }

    pub fn child(&self, index: usize) -> Option<&Node> {
        self.content.get(index)
    }

    /// Concatenated text of this node's descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(text) = &self.text {
            out.push_str(text);
        }
        for child in &self.content {
            child.collect_text(out);
        }
    }

    /// Whether a mark of the given type is present on this node.
    pub fn has_mark(&self, type_name: &str) -> bool {
        self.marks.iter().any(|m| m.type_name == type_name)
    }

    /// Resolve a child-index path relative to this node.
    pub fn node_at(&self, path: &NodePath) -> Option<&Node> {
        let mut current = self;
        for &index in &path.0 {
            current = current.content.get(index)?;
        }
        Some(current)
    }

    pub(crate) fn node_at_mut(&mut self, path: &NodePath) -> Option<&mut Node> {
        let mut current = self;
        for &index in &path.0 {
            current = current.content.get_mut(index)?;
        }
        Some(current)
    }

    /// Depth-first walk over every descendant, with its path.
    pub fn descendants<F>(&self, f: &mut F)
    where
        F: FnMut(&Node, &NodePath),
    {
        let mut path = NodePath::root();
        self.walk(&mut path, f);
    }

    fn walk<F>(&self, path: &mut NodePath, f: &mut F)
    where
        F: FnMut(&Node, &NodePath),
    {
        for (index, child) in self.content.iter().enumerate() {
            path.0.push(index);
            f(child, path);
            child.walk(path, f);
            path.0.pop();
        }
    }
}

/// A child-index path from the document root to a node.
///
/// Paths are positional, not stable: any mutation of the tree may
/// invalidate every previously obtained path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct NodePath(pub Vec<usize>);

impl NodePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn child(&self, index: usize) -> NodePath {
        let mut indices = self.0.clone();
        indices.push(index);
        NodePath(indices)
    }

    /// The path of the containing node, or `None` at the root.
    pub fn parent(&self) -> Option<NodePath> {
        if self.0.is_empty() {
            return None;
        }
        Some(NodePath(self.0[..self.0.len() - 1].to_vec()))
    }

    /// The index of this node within its parent.
    pub fn last_index(&self) -> Option<usize> {
        self.0.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_doc() -> Node {
        Node::new("doc")
            .with_child(
                Node::new("paragraph")
                    .with_child(Node::text("hello "))
                    .with_child(Node::text("world").with_marks(vec![Mark::new("strong")])),
            )
            .with_child(Node::new("horizontal_rule"))
    }

    #[test]
    fn test_text_content_concatenates_leaves() {
        assert_eq!(sample_doc().text_content(), "hello world");
    }

    #[test]
    fn test_node_at_resolves_paths() {
        let doc = sample_doc();
        let para = doc.node_at(&NodePath::new(vec![0])).unwrap();
        assert_eq!(para.type_name, "paragraph");

        let bold = doc.node_at(&NodePath::new(vec![0, 1])).unwrap();
        assert!(bold.has_mark("strong"));

        assert!(doc.node_at(&NodePath::new(vec![5])).is_none());
    }

    #[test]
    fn test_descendants_visits_in_document_order() {
        let mut seen = Vec::new();
        sample_doc().descendants(&mut |node, path| {
            seen.push((node.type_name.clone(), path.clone()));
        });

        assert_eq!(seen[0].0, "paragraph");
        assert_eq!(seen[1].1, NodePath::new(vec![0, 0]));
        assert_eq!(seen.last().unwrap().0, "horizontal_rule");
    }

    #[test]
    fn test_node_serialization_roundtrip() {
        let doc = sample_doc().with_attr("dir", json!("rtl"));
        let json = serde_json::to_string(&doc).unwrap();
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(doc, back);
    }
}
