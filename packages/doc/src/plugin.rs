//! The raw plugin surface of the transaction pipeline.

use serde::{Deserialize, Serialize};

use crate::node::{Attrs, NodePath};
use crate::state::EditorState;
use crate::transaction::Transaction;

/// A plugin hooks into the transaction pipeline.
///
/// Plugins are stateless with respect to the document: everything they
/// need is handed to them per call. `filter_transaction` may veto the
/// root transaction before it is applied; `append_transaction` may
/// produce a follow-up after a batch has been applied.
pub trait Plugin {
    fn name(&self) -> &str;

    /// Return `false` to drop the transaction entirely.
    fn filter_transaction(&self, _tr: &Transaction, _state: &EditorState) -> bool {
        true
    }

    /// Produce a follow-up transaction for an applied batch, or `None`.
    fn append_transaction(
        &self,
        _transactions: &[Transaction],
        _old_state: &EditorState,
        _new_state: &EditorState,
    ) -> Option<Transaction> {
        None
    }

    /// Presentation decorations for the current state, recomputed on
    /// every view update.
    fn decorations(&self, _state: &EditorState) -> Vec<Decoration> {
        Vec::new()
    }
}

/// Presentation metadata attached to a position, passed through to
/// node-view factories untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decoration {
    pub path: NodePath,

    #[serde(default, skip_serializing_if = "Attrs::is_empty")]
    pub attrs: Attrs,
}
