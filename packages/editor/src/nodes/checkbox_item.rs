use std::rc::Rc;

use serde_json::json;
use vellum_doc::{AttrSpec, NodeSpec};
use vellum_markdown::ParseSpec;

use crate::extension::{Extension, MarkdownRule, SchemaContribution};

/// A task-list item. Toggling `checked` is the one edit permitted in an
/// otherwise read-only document (see the orchestrator's dispatch hook).
pub struct CheckboxItem;

impl Extension for CheckboxItem {
    fn name(&self) -> &str {
        "checkbox_item"
    }

    fn schema(&self) -> Option<SchemaContribution> {
        Some(SchemaContribution::Node(NodeSpec {
            content: Some("paragraph block*".to_string()),
            attrs: [("checked".to_string(), AttrSpec::with_default(json!(false)))]
                .into_iter()
                .collect(),
            ..Default::default()
        }))
    }

    fn to_markdown(&self) -> Option<MarkdownRule> {
        Some(MarkdownRule::Node(Rc::new(|state, node| {
            let checked = node
                .attr("checked")
                .and_then(serde_json::Value::as_bool)
                .unwrap_or(false);
            state.write(if checked { "[x] " } else { "[ ] " });
            state.render_content(node)
        })))
    }

    fn parse_markdown(&self) -> Option<ParseSpec> {
        Some(ParseSpec::block("checkbox_item"))
    }
}
