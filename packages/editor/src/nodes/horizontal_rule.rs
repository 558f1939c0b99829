use std::rc::Rc;

use vellum_doc::{Attrs, NodeSpec};
use vellum_markdown::ParseSpec;

use crate::commands::{insert_block, replace_textblock_with, Command, InputRule};
use crate::extension::{Extension, ExtensionContext, MarkdownRule, SchemaContribution};

pub struct HorizontalRule;

impl Extension for HorizontalRule {
    fn name(&self) -> &str {
        "horizontal_rule"
    }

    fn markdown_token(&self) -> String {
        "hr".to_string()
    }

    fn schema(&self) -> Option<SchemaContribution> {
        Some(SchemaContribution::Node(NodeSpec {
            group: Some("block".to_string()),
            ..Default::default()
        }))
    }

    fn commands(&self, _ctx: &ExtensionContext) -> Vec<(String, Command)> {
        vec![("hr".to_string(), insert_block("horizontal_rule"))]
    }

    fn input_rules(&self, _ctx: &ExtensionContext) -> Vec<InputRule> {
        vec![InputRule::new(
            r"^(?:---|___|\*\*\*)$",
            Rc::new(|state, m| {
                let rule = state
                    .schema
                    .node_of("horizontal_rule", Attrs::new(), vec![])
                    .ok()?;
                replace_textblock_with(m, rule)
            }),
        )]
    }

    fn to_markdown(&self) -> Option<MarkdownRule> {
        Some(MarkdownRule::Node(Rc::new(|state, _node| {
            state.write("---");
            state.close_block();
            Ok(())
        })))
    }

    fn parse_markdown(&self) -> Option<ParseSpec> {
        Some(ParseSpec::node("horizontal_rule"))
    }
}
