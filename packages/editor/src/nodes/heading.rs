use std::rc::Rc;

use serde_json::json;
use vellum_doc::{attrs, AttrSpec, NodeSpec};
use vellum_markdown::ParseSpec;

use crate::commands::{
    children_without_match, replace_textblock_with, set_block_type, Command, InputRule, KeyBinding,
};
use crate::extension::{Extension, ExtensionContext, MarkdownRule, SchemaContribution};

pub struct Heading;

fn heading_command(level: u64) -> Command {
    let inner = set_block_type("heading");
    Rc::new(move |state, _attrs| inner(state, &attrs([("level", json!(level))])))
}

impl Extension for Heading {
    fn name(&self) -> &str {
        "heading"
    }

    fn schema(&self) -> Option<SchemaContribution> {
        Some(SchemaContribution::Node(NodeSpec {
            content: Some("inline*".to_string()),
            group: Some("block".to_string()),
            attrs: [("level".to_string(), AttrSpec::with_default(json!(1)))]
                .into_iter()
                .collect(),
            ..Default::default()
        }))
    }

    fn commands(&self, _ctx: &ExtensionContext) -> Vec<(String, Command)> {
        vec![("heading".to_string(), set_block_type("heading"))]
    }

    fn keys(&self, _ctx: &ExtensionContext) -> Vec<KeyBinding> {
        (1..=4)
            .map(|level| KeyBinding::new(format!("Shift-Ctrl-{level}"), heading_command(level)))
            .collect()
    }

    fn input_rules(&self, _ctx: &ExtensionContext) -> Vec<InputRule> {
        vec![InputRule::new(
            r"^(#{1,6})\s$",
            Rc::new(|state, m| {
                let level = m.capture(1)?.len() as u64;
                let children = children_without_match(state, m)?;
                let heading = state
                    .schema
                    .node_of("heading", attrs([("level", json!(level))]), children)
                    .ok()?;
                replace_textblock_with(m, heading)
            }),
        )]
    }

    fn to_markdown(&self) -> Option<MarkdownRule> {
        Some(MarkdownRule::Node(Rc::new(|state, node| {
            let level = node
                .attr("level")
                .and_then(serde_json::Value::as_u64)
                .unwrap_or(1) as usize;
            state.write(&"#".repeat(level));
            state.write(" ");
            state.render_inline(node)?;
            state.close_block();
            Ok(())
        })))
    }

    fn parse_markdown(&self) -> Option<ParseSpec> {
        Some(ParseSpec::block("heading"))
    }
}
