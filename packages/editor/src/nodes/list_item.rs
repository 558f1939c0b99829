use std::rc::Rc;

use vellum_doc::NodeSpec;
use vellum_markdown::ParseSpec;

use crate::extension::{Extension, MarkdownRule, SchemaContribution};

pub struct ListItem;

impl Extension for ListItem {
    fn name(&self) -> &str {
        "list_item"
    }

    fn schema(&self) -> Option<SchemaContribution> {
        Some(SchemaContribution::Node(NodeSpec {
            content: Some("paragraph block*".to_string()),
            ..Default::default()
        }))
    }

    fn to_markdown(&self) -> Option<MarkdownRule> {
        Some(MarkdownRule::Node(Rc::new(|state, node| {
            state.render_content(node)
        })))
    }

    fn parse_markdown(&self) -> Option<ParseSpec> {
        Some(ParseSpec::block("list_item"))
    }
}
