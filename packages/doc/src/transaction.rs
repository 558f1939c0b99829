//! Transactions: atomic, immutable descriptions of document mutations.

use serde::{Deserialize, Serialize};

use crate::node::{Attrs, Node, NodePath};
use crate::selection::Selection;

/// One primitive mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Step {
    /// Replace the currently selected range with the given content.
    ReplaceSelection { content: Vec<Node> },

    /// Splice `content` over children `from..to` of `parent`.
    ReplaceChildren {
        parent: NodePath,
        from: usize,
        to: usize,
        content: Vec<Node>,
    },

    /// Splice `text` over character range `from..to` of a text node.
    ReplaceText {
        path: NodePath,
        from: usize,
        to: usize,
        text: String,
    },

    /// Merge the given attributes into the node at `path`.
    SetNodeAttrs { path: NodePath, attrs: Attrs },

    /// Move the selection.
    SetSelection { selection: Selection },
}

impl Step {
    pub fn changes_doc(&self) -> bool {
        !matches!(self, Step::SetSelection { .. })
    }
}

/// An ordered list of steps applied atomically.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Transaction {
    pub steps: Vec<Step>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace_selection(mut self, content: Vec<Node>) -> Self {
        self.steps.push(Step::ReplaceSelection { content });
        self
    }

    pub fn replace_children(
        mut self,
        parent: NodePath,
        from: usize,
        to: usize,
        content: Vec<Node>,
    ) -> Self {
        self.steps.push(Step::ReplaceChildren {
            parent,
            from,
            to,
            content,
        });
        self
    }

    pub fn replace_text(mut self, path: NodePath, from: usize, to: usize, text: String) -> Self {
        self.steps.push(Step::ReplaceText {
            path,
            from,
            to,
            text,
        });
        self
    }

    pub fn set_node_attrs(mut self, path: NodePath, attrs: Attrs) -> Self {
        self.steps.push(Step::SetNodeAttrs { path, attrs });
        self
    }

    pub fn set_selection(mut self, selection: Selection) -> Self {
        self.steps.push(Step::SetSelection { selection });
        self
    }

    /// Whether applying this transaction changes the document tree.
    pub fn doc_changed(&self) -> bool {
        self.steps.iter().any(Step::changes_doc)
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
