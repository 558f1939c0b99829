use std::rc::Rc;

use serde_json::json;
use vellum_doc::{attrs, AttrSpec, NodeSpec};
use vellum_markdown::ParseSpec;

use crate::commands::{
    children_without_match, replace_textblock_with, set_block_type, Command, InputRule, KeyBinding,
};
use crate::extension::{Extension, ExtensionContext, MarkdownRule, SchemaContribution};

pub struct CodeFence;

impl Extension for CodeFence {
    fn name(&self) -> &str {
        "code_fence"
    }

    fn markdown_token(&self) -> String {
        "fence".to_string()
    }

    fn schema(&self) -> Option<SchemaContribution> {
        Some(SchemaContribution::Node(NodeSpec {
            content: Some("text*".to_string()),
            group: Some("block".to_string()),
            attrs: [("language".to_string(), AttrSpec::with_default(json!("")))]
                .into_iter()
                .collect(),
            ..Default::default()
        }))
    }

    fn commands(&self, _ctx: &ExtensionContext) -> Vec<(String, Command)> {
        vec![("code_fence".to_string(), set_block_type("code_fence"))]
    }

    fn keys(&self, _ctx: &ExtensionContext) -> Vec<KeyBinding> {
        vec![KeyBinding::new(
            "Shift-Ctrl-\\",
            set_block_type("code_fence"),
        )]
    }

    fn input_rules(&self, _ctx: &ExtensionContext) -> Vec<InputRule> {
        vec![InputRule::new(
            r"^```(\S+)?\s$",
            Rc::new(|state, m| {
                let language = m.capture(1).unwrap_or("").to_string();
                let children = children_without_match(state, m)?;
                let fence = state
                    .schema
                    .node_of("code_fence", attrs([("language", json!(language))]), children)
                    .ok()?;
                replace_textblock_with(m, fence)
            }),
        )]
    }

    fn to_markdown(&self) -> Option<MarkdownRule> {
        Some(MarkdownRule::Node(Rc::new(|state, node| {
            let language = node
                .attr("language")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("");
            state.write(&format!("```{language}\n"));
            state.write(&node.text_content());
            state.ensure_new_line();
            state.write("```");
            state.close_block();
            Ok(())
        })))
    }

    fn parse_markdown(&self) -> Option<ParseSpec> {
        Some(ParseSpec::block("code_fence"))
    }
}
