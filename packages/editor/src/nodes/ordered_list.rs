use std::rc::Rc;

use serde_json::json;
use vellum_doc::{attrs, AttrSpec, NodeSpec};
use vellum_markdown::ParseSpec;

use crate::commands::{
    children_without_match, replace_textblock_with, toggle_list, Command, InputRule, KeyBinding,
};
use crate::extension::{Extension, ExtensionContext, MarkdownRule, SchemaContribution};

pub struct OrderedList;

impl Extension for OrderedList {
    fn name(&self) -> &str {
        "ordered_list"
    }

    fn schema(&self) -> Option<SchemaContribution> {
        Some(SchemaContribution::Node(NodeSpec {
            content: Some("list_item+".to_string()),
            group: Some("block".to_string()),
            attrs: [("order".to_string(), AttrSpec::with_default(json!(1)))]
                .into_iter()
                .collect(),
            ..Default::default()
        }))
    }

    fn commands(&self, _ctx: &ExtensionContext) -> Vec<(String, Command)> {
        vec![(
            "ordered_list".to_string(),
            toggle_list("ordered_list", "list_item"),
        )]
    }

    fn keys(&self, _ctx: &ExtensionContext) -> Vec<KeyBinding> {
        vec![KeyBinding::new(
            "Shift-Ctrl-9",
            toggle_list("ordered_list", "list_item"),
        )]
    }

    fn input_rules(&self, _ctx: &ExtensionContext) -> Vec<InputRule> {
        vec![InputRule::new(
            r"^(\d+)\.\s$",
            Rc::new(|state, m| {
                let order: u64 = m.capture(1)?.parse().ok()?;
                let children = children_without_match(state, m)?;
                let paragraph = state
                    .schema
                    .node_of("paragraph", vellum_doc::Attrs::new(), children)
                    .ok()?;
                let item = state
                    .schema
                    .node_of("list_item", vellum_doc::Attrs::new(), vec![paragraph])
                    .ok()?;
                let list = state
                    .schema
                    .node_of("ordered_list", attrs([("order", json!(order))]), vec![item])
                    .ok()?;
                replace_textblock_with(m, list)
            }),
        )]
    }

    fn to_markdown(&self) -> Option<MarkdownRule> {
        Some(MarkdownRule::Node(Rc::new(|state, node| {
            let start = node
                .attr("order")
                .and_then(serde_json::Value::as_u64)
                .unwrap_or(1);
            state.render_list(node, "   ", |index| format!("{}. ", start + index as u64))
        })))
    }

    fn parse_markdown(&self) -> Option<ParseSpec> {
        Some(ParseSpec::block("ordered_list"))
    }
}
