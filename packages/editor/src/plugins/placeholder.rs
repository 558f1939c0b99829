use std::sync::Arc;

use serde_json::json;
use vellum_doc::{attrs, Decoration, EditorState, NodePath, Plugin};

use crate::extension::Extension;

/// Decorates the single empty textblock of an empty document with the
/// configured placeholder text.
pub struct Placeholder {
    text: String,
}

impl Placeholder {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Extension for Placeholder {
    fn name(&self) -> &str {
        "placeholder"
    }

    fn plugins(&self) -> Vec<Arc<dyn Plugin>> {
        vec![Arc::new(PlaceholderPlugin {
            text: self.text.clone(),
        })]
    }
}

struct PlaceholderPlugin {
    text: String,
}

impl Plugin for PlaceholderPlugin {
    fn name(&self) -> &str {
        "placeholder"
    }

    fn decorations(&self, state: &EditorState) -> Vec<Decoration> {
        let is_empty = state.doc.child_count() == 1
            && state
                .doc
                .child(0)
                .map(|child| state.schema.is_textblock(child) && child.child_count() == 0)
                .unwrap_or(false);
        if !is_empty {
            return Vec::new();
        }

        vec![Decoration {
            path: NodePath::new(vec![0]),
            attrs: attrs([
                ("class", json!("placeholder")),
                ("data-empty-text", json!(self.text)),
            ]),
        }]
    }
}
