//! Editor state and the transaction apply pipeline.

use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

use crate::node::{Node, NodePath};
use crate::plugin::Plugin;
use crate::schema::Schema;
use crate::selection::Selection;
use crate::transaction::{Step, Transaction};

/// Upper bound on plugin append passes for a single dispatch.
const MAX_APPEND_PASSES: usize = 8;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    #[error("path {0:?} does not resolve to a node")]
    InvalidPath(NodePath),

    #[error("range {from}..{to} is out of bounds for a node with {len} children")]
    RangeOutOfBounds { from: usize, to: usize, len: usize },

    #[error("text range {from}..{to} is out of bounds for text of length {len}")]
    TextRangeOutOfBounds { from: usize, to: usize, len: usize },

    #[error("step targets a non-text node at {0:?}")]
    NotATextNode(NodePath),

    #[error("the document root cannot be replaced")]
    CannotReplaceRoot,
}

/// The immutable editor state: schema, document, selection.
///
/// Applying a transaction never mutates a state in place; it produces a
/// fresh value, which is what makes the dispatch hook safe to re-enter
/// observationally (the previous state is still intact).
#[derive(Debug, Clone)]
pub struct EditorState {
    pub schema: Arc<Schema>,
    pub doc: Node,
    pub selection: Selection,
}

/// Outcome of [`EditorState::apply_transaction`]: the new state plus the
/// sub-transactions actually applied (root first, then plugin appends).
/// An empty `transactions` list means the root transaction was filtered
/// out and `state` is unchanged.
#[derive(Debug, Clone)]
pub struct ApplyResult {
    pub state: EditorState,
    pub transactions: Vec<Transaction>,
}

impl EditorState {
    pub fn new(schema: Arc<Schema>, doc: Node) -> Self {
        let selection = Selection::at_start(&doc, &schema);
        Self {
            schema,
            doc,
            selection,
        }
    }

    /// Apply a single transaction, without the plugin pipeline.
    pub fn apply(&self, tr: &Transaction) -> Result<EditorState, StateError> {
        let mut next = self.clone();
        for step in &tr.steps {
            next.apply_step(step)?;
        }
        next.normalize_selection();
        Ok(next)
    }

    /// Apply a transaction through the plugin pipeline.
    ///
    /// Plugins may veto the root transaction (`filter_transaction`) and
    /// append follow-ups (`append_transaction`); appended transactions
    /// are themselves subject to filtering. Append passes are bounded.
    pub fn apply_transaction(
        &self,
        tr: Transaction,
        plugins: &[Arc<dyn Plugin>],
    ) -> Result<ApplyResult, StateError> {
        if !plugins.iter().all(|p| p.filter_transaction(&tr, self)) {
            return Ok(ApplyResult {
                state: self.clone(),
                transactions: Vec::new(),
            });
        }

        let mut state = self.apply(&tr)?;
        let mut applied = vec![tr];

        for pass in 0..MAX_APPEND_PASSES {
            let mut appended = false;

            for plugin in plugins {
                let Some(extra) = plugin.append_transaction(&applied, self, &state) else {
                    continue;
                };
                if extra.is_empty() {
                    continue;
                }
                if !plugins.iter().all(|p| p.filter_transaction(&extra, &state)) {
                    continue;
                }

                state = state.apply(&extra)?;
                applied.push(extra);
                appended = true;
            }

            if !appended {
                break;
            }
            if pass == MAX_APPEND_PASSES - 1 {
                warn!(passes = MAX_APPEND_PASSES, "plugin append pass bound hit; stopping");
            }
        }

        Ok(ApplyResult {
            state,
            transactions: applied,
        })
    }

    fn apply_step(&mut self, step: &Step) -> Result<(), StateError> {
        match step {
            Step::ReplaceSelection { content } => {
                let (parent, from, to) = match self.selection.clone() {
                    Selection::Text { parent, from, to } => (parent, from, to),
                    Selection::Node { path } => {
                        let index = path.last_index().ok_or(StateError::CannotReplaceRoot)?;
                        let parent = path.parent().ok_or(StateError::CannotReplaceRoot)?;
                        (parent, index, index + 1)
                    }
                };
                let inserted = content.len();
                self.splice_children(&parent, from, to, content.clone())?;
                self.selection = Selection::caret(parent, from + inserted);
            }

            Step::ReplaceChildren {
                parent,
                from,
                to,
                content,
            } => {
                self.splice_children(parent, *from, *to, content.clone())?;
            }

            Step::ReplaceText {
                path,
                from,
                to,
                text,
            } => {
                let node = self
                    .doc
                    .node_at_mut(path)
                    .ok_or_else(|| StateError::InvalidPath(path.clone()))?;
                let existing = node
                    .text
                    .as_ref()
                    .ok_or_else(|| StateError::NotATextNode(path.clone()))?;

                let chars: Vec<char> = existing.chars().collect();
                if *from > *to || *to > chars.len() {
                    return Err(StateError::TextRangeOutOfBounds {
                        from: *from,
                        to: *to,
                        len: chars.len(),
                    });
                }

                let mut updated: String = chars[..*from].iter().collect();
                updated.push_str(text);
                updated.extend(&chars[*to..]);

                if updated.is_empty() {
                    // Empty text nodes are not kept in the tree.
                    let index = path.last_index().ok_or(StateError::CannotReplaceRoot)?;
                    let parent = path.parent().ok_or(StateError::CannotReplaceRoot)?;
                    self.splice_children(&parent, index, index + 1, Vec::new())?;
                } else {
                    node.text = Some(updated);
                }
            }

            Step::SetNodeAttrs { path, attrs } => {
                let node = self
                    .doc
                    .node_at_mut(path)
                    .ok_or_else(|| StateError::InvalidPath(path.clone()))?;
                for (key, value) in attrs {
                    node.attrs.insert(key.clone(), value.clone());
                }
            }

            Step::SetSelection { selection } => {
                self.selection = selection.clone();
            }
        }
        Ok(())
    }

    fn splice_children(
        &mut self,
        parent: &NodePath,
        from: usize,
        to: usize,
        content: Vec<Node>,
    ) -> Result<(), StateError> {
        let node = self
            .doc
            .node_at_mut(parent)
            .ok_or_else(|| StateError::InvalidPath(parent.clone()))?;
        let len = node.content.len();
        if from > to || to > len {
            return Err(StateError::RangeOutOfBounds { from, to, len });
        }
        node.content.splice(from..to, content);
        Ok(())
    }

    /// Reset the selection if a structural change invalidated it.
    fn normalize_selection(&mut self) {
        let valid = match &self.selection {
            Selection::Text { parent, from, to } => self
                .doc
                .node_at(parent)
                .map(|n| *from <= *to && *to <= n.child_count())
                .unwrap_or(false),
            Selection::Node { path } => self.doc.node_at(path).is_some(),
        };
        if !valid {
            self.selection = Selection::at_start(&self.doc, &self.schema);
        }
    }
}
