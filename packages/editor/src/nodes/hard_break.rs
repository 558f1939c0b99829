use std::rc::Rc;

use vellum_doc::NodeSpec;
use vellum_markdown::ParseSpec;

use crate::commands::{insert_block, KeyBinding};
use crate::extension::{Extension, ExtensionContext, MarkdownRule, SchemaContribution};

pub struct HardBreak;

impl Extension for HardBreak {
    fn name(&self) -> &str {
        "hard_break"
    }

    fn markdown_token(&self) -> String {
        "br".to_string()
    }

    fn schema(&self) -> Option<SchemaContribution> {
        Some(SchemaContribution::Node(NodeSpec {
            inline: true,
            group: Some("inline".to_string()),
            ..Default::default()
        }))
    }

    fn keys(&self, _ctx: &ExtensionContext) -> Vec<KeyBinding> {
        vec![KeyBinding::new("Shift-Enter", insert_block("hard_break"))]
    }

    fn to_markdown(&self) -> Option<MarkdownRule> {
        Some(MarkdownRule::Node(Rc::new(|state, _node| {
            state.write("\\\n");
            Ok(())
        })))
    }

    fn parse_markdown(&self) -> Option<ParseSpec> {
        Some(ParseSpec::node("hard_break"))
    }
}
