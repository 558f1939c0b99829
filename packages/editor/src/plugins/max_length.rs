use std::sync::Arc;

use tracing::debug;
use vellum_doc::{EditorState, Plugin, Transaction};

use crate::extension::Extension;

/// Drops transactions that would push the document's text length past
/// the configured maximum. Without a maximum it contributes nothing.
pub struct MaxLength {
    max_length: Option<usize>,
}

impl MaxLength {
    pub fn new(max_length: Option<usize>) -> Self {
        Self { max_length }
    }
}

impl Extension for MaxLength {
    fn name(&self) -> &str {
        "max_length"
    }

    fn plugins(&self) -> Vec<Arc<dyn Plugin>> {
        match self.max_length {
            Some(max_length) => vec![Arc::new(MaxLengthPlugin { max_length })],
            None => Vec::new(),
        }
    }
}

struct MaxLengthPlugin {
    max_length: usize,
}

impl Plugin for MaxLengthPlugin {
    fn name(&self) -> &str {
        "max_length"
    }

    fn filter_transaction(&self, tr: &Transaction, state: &EditorState) -> bool {
        if !tr.doc_changed() {
            return true;
        }
        match state.apply(tr) {
            Ok(next) => {
                let length = next.doc.text_content().chars().count();
                let allowed = length <= self.max_length;
                if !allowed {
                    debug!(length, max = self.max_length, "transaction over max length dropped");
                }
                allowed
            }
            Err(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use vellum_doc::{Node, NodePath, NodeSpec, Schema};

    fn state(text: &str) -> EditorState {
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
        let schema = Arc::new(Schema::new(nodes, IndexMap::new()).unwrap());
        let doc = Node::new("doc")
            .with_child(Node::new("paragraph").with_child(Node::text(text)));
        EditorState::new(schema, doc)
    }

    #[test]
    fn test_transactions_within_limit_pass() {
        let plugin = MaxLengthPlugin { max_length: 10 };
        let state = state("short");
        let tr = Transaction::new().replace_text(NodePath::new(vec![0, 0]), 5, 5, "er".into());

        assert!(plugin.filter_transaction(&tr, &state));
    }

    #[test]
    fn test_transactions_over_limit_are_dropped() {
        let plugin = MaxLengthPlugin { max_length: 6 };
        let state = state("short");
        let tr =
            Transaction::new().replace_text(NodePath::new(vec![0, 0]), 5, 5, "and long".into());

        assert!(!plugin.filter_transaction(&tr, &state));
    }
}
