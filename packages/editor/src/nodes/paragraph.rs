use std::rc::Rc;

use vellum_doc::NodeSpec;
use vellum_markdown::ParseSpec;

use crate::commands::{set_block_type, Command};
use crate::extension::{Extension, ExtensionContext, MarkdownRule, SchemaContribution};

pub struct Paragraph;

impl Extension for Paragraph {
    fn name(&self) -> &str {
        "paragraph"
    }

    fn schema(&self) -> Option<SchemaContribution> {
        Some(SchemaContribution::Node(NodeSpec {
            content: Some("inline*".to_string()),
            group: Some("block".to_string()),
            ..Default::default()
        }))
    }

    fn commands(&self, _ctx: &ExtensionContext) -> Vec<(String, Command)> {
        vec![("paragraph".to_string(), set_block_type("paragraph"))]
    }

    fn to_markdown(&self) -> Option<MarkdownRule> {
        Some(MarkdownRule::Node(Rc::new(|state, node| {
            state.render_inline(node)?;
            state.close_block();
            Ok(())
        })))
    }

    fn parse_markdown(&self) -> Option<ParseSpec> {
        Some(ParseSpec::block("paragraph"))
    }
}
