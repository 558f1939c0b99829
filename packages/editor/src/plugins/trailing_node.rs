use std::sync::Arc;

use vellum_doc::{EditorState, Node, NodePath, Plugin, Transaction};

use crate::extension::Extension;

/// Keeps an empty trailing paragraph at the end of the document so
/// there is always a textblock to type into after a block node.
pub struct TrailingNode;

impl Extension for TrailingNode {
    fn name(&self) -> &str {
        "trailing_node"
    }

    fn plugins(&self) -> Vec<Arc<dyn Plugin>> {
        vec![Arc::new(TrailingNodePlugin)]
    }
}

struct TrailingNodePlugin;

impl Plugin for TrailingNodePlugin {
    fn name(&self) -> &str {
        "trailing_node"
    }

    fn append_transaction(
        &self,
        transactions: &[Transaction],
        _old_state: &EditorState,
        new_state: &EditorState,
    ) -> Option<Transaction> {
        if !transactions.iter().any(Transaction::doc_changed) {
            return None;
        }
        let ends_with_paragraph = new_state
            .doc
            .content
            .last()
            .map(|node| node.type_name == "paragraph")
            .unwrap_or(false);
        if ends_with_paragraph {
            return None;
        }

        let end = new_state.doc.child_count();
        Some(Transaction::new().replace_children(
            NodePath::root(),
            end,
            end,
            vec![Node::new("paragraph")],
        ))
    }
}
