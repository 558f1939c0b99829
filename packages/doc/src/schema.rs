//! Schema: the node and mark type tables.
//!
//! A [`Schema`] is compiled once from the specs contributed by the
//! extension list and is immutable afterwards. Type tables keep
//! insertion order so that composing the same extension list twice
//! yields a structurally identical schema.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::node::{Attrs, Mark, Node};

/// Specification of one node or mark attribute.
///
/// An attribute without a default is required: constructing a node of the
/// type without supplying it is a schema error.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AttrSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl AttrSpec {
    pub fn with_default(value: Value) -> Self {
        Self {
            default: Some(value),
        }
    }

    pub fn required() -> Self {
        Self { default: None }
    }
}

/// Specification of a node type.
///
/// Content expressions are informational except for their leading
/// element: a `content` starting with `inline` or `text` marks the node
/// as a textblock, which is what selection resolution keys off.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    #[serde(default)]
    pub inline: bool,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attrs: IndexMap<String, AttrSpec>,
}

/// Specification of a mark type.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MarkSpec {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attrs: IndexMap<String, AttrSpec>,
}

/// A realized node type: name plus spec.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeType {
    pub name: String,
    pub spec: NodeSpec,
}

impl NodeType {
    /// Whether nodes of this type directly contain inline content.
    pub fn is_textblock(&self) -> bool {
        match &self.spec.content {
            Some(expr) => expr.starts_with("inline") || expr.starts_with("text"),
            None => false,
        }
    }

    pub fn is_inline(&self) -> bool {
        self.spec.inline || self.name == "text"
    }

    /// Instantiate a node of this type, filling attribute defaults.
    pub fn create(&self, attrs: Attrs, content: Vec<Node>) -> Result<Node, SchemaError> {
        let attrs = fill_defaults(&self.name, &self.spec.attrs, attrs)?;
        Ok(Node {
            type_name: self.name.clone(),
            attrs,
            marks: Vec::new(),
            content,
            text: None,
        })
    }
}

/// A realized mark type: name plus spec.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkType {
    pub name: String,
    pub spec: MarkSpec,
}

impl MarkType {
    pub fn create(&self, attrs: Attrs) -> Result<Mark, SchemaError> {
        let attrs = fill_defaults(&self.name, &self.spec.attrs, attrs)?;
        Ok(Mark {
            type_name: self.name.clone(),
            attrs,
        })
    }
}

fn fill_defaults(
    type_name: &str,
    specs: &IndexMap<String, AttrSpec>,
    mut attrs: Attrs,
) -> Result<Attrs, SchemaError> {
    for (name, spec) in specs {
        if attrs.contains_key(name) {
            continue;
        }
        match &spec.default {
            Some(value) => {
                attrs.insert(name.clone(), value.clone());
            }
            None => {
                return Err(SchemaError::MissingAttr {
                    type_name: type_name.to_string(),
                    attr: name.clone(),
                })
            }
        }
    }
    Ok(attrs)
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("unknown node type: {0}")]
    UnknownNode(String),

    #[error("unknown mark type: {0}")]
    UnknownMark(String),

    #[error("schema has no `doc` node type")]
    MissingDoc,

    #[error("type `{type_name}` is missing required attribute `{attr}`")]
    MissingAttr { type_name: String, attr: String },
}

/// The compiled document schema.
#[derive(Debug, Clone)]
pub struct Schema {
    pub nodes: IndexMap<String, Arc<NodeType>>,
    pub marks: IndexMap<String, Arc<MarkType>>,
}

impl Schema {
    pub fn new(
        nodes: IndexMap<String, NodeSpec>,
        marks: IndexMap<String, MarkSpec>,
    ) -> Result<Self, SchemaError> {
        if !nodes.contains_key("doc") {
            return Err(SchemaError::MissingDoc);
        }

        let nodes = nodes
            .into_iter()
            .map(|(name, spec)| {
                let node_type = Arc::new(NodeType {
                    name: name.clone(),
                    spec,
                });
                (name, node_type)
            })
            .collect();

        let marks = marks
            .into_iter()
            .map(|(name, spec)| {
                let mark_type = Arc::new(MarkType {
                    name: name.clone(),
                    spec,
                });
                (name, mark_type)
            })
            .collect();

        Ok(Self { nodes, marks })
    }

    pub fn node_type(&self, name: &str) -> Result<&Arc<NodeType>, SchemaError> {
        self.nodes
            .get(name)
            .ok_or_else(|| SchemaError::UnknownNode(name.to_string()))
    }

    pub fn mark_type(&self, name: &str) -> Result<&Arc<MarkType>, SchemaError> {
        self.marks
            .get(name)
            .ok_or_else(|| SchemaError::UnknownMark(name.to_string()))
    }

    /// Instantiate a node by type name, applying attribute defaults.
    pub fn node_of(
        &self,
        name: &str,
        attrs: Attrs,
        content: Vec<Node>,
    ) -> Result<Node, SchemaError> {
        self.node_type(name)?.create(attrs, content)
    }

    pub fn mark_of(&self, name: &str, attrs: Attrs) -> Result<Mark, SchemaError> {
        self.mark_type(name)?.create(attrs)
    }

    pub fn text(&self, content: impl Into<String>) -> Node {
        Node::text(content)
    }

    /// Whether the given node directly contains inline content.
    pub fn is_textblock(&self, node: &Node) -> bool {
        self.nodes
            .get(&node.type_name)
            .map(|t| t.is_textblock())
            .unwrap_or(false)
    }

    /// The empty document: a `doc` holding one empty `paragraph` when the
    /// schema has one, otherwise a childless `doc`.
    pub fn empty_doc(&self) -> Node {
        let mut doc = Node::new("doc");
        if self.nodes.contains_key("paragraph") {
            doc = doc.with_child(Node::new("paragraph"));
        }
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_schema() -> Schema {
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
                group: Some("block".to_string()),
                ..Default::default()
            },
        );
        nodes.insert(
            "heading".to_string(),
            NodeSpec {
                content: Some("inline*".to_string()),
                group: Some("block".to_string()),
                attrs: [("level".to_string(), AttrSpec::with_default(json!(1)))]
                    .into_iter()
                    .collect(),
                ..Default::default()
            },
        );
        nodes.insert("text".to_string(), NodeSpec::default());

        let mut marks = IndexMap::new();
        marks.insert(
            "link".to_string(),
            MarkSpec {
                attrs: [("href".to_string(), AttrSpec::required())]
                    .into_iter()
                    .collect(),
            },
        );

        Schema::new(nodes, marks).unwrap()
    }

    #[test]
    fn test_schema_requires_doc() {
        let result = Schema::new(IndexMap::new(), IndexMap::new());
        assert_eq!(result.unwrap_err(), SchemaError::MissingDoc);
    }

    #[test]
    fn test_node_of_fills_defaults() {
        let schema = sample_schema();
        let heading = schema.node_of("heading", Attrs::new(), vec![]).unwrap();
        assert_eq!(heading.attr("level"), Some(&json!(1)));
    }

    #[test]
    fn test_missing_required_attr_is_an_error() {
        let schema = sample_schema();
        let err = schema.mark_of("link", Attrs::new()).unwrap_err();
        assert!(matches!(err, SchemaError::MissingAttr { .. }));
    }

    #[test]
    fn test_unknown_type_is_an_error() {
        let schema = sample_schema();
        assert_eq!(
            schema.node_of("video", Attrs::new(), vec![]).unwrap_err(),
            SchemaError::UnknownNode("video".to_string())
        );
    }

    #[test]
    fn test_textblock_detection() {
        let schema = sample_schema();
        assert!(schema.is_textblock(&Node::new("paragraph")));
        assert!(!schema.is_textblock(&Node::new("doc")));
        assert!(!schema.is_textblock(&Node::text("plain")));
    }
}
