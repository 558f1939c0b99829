use std::rc::Rc;

use vellum_doc::{Attrs, NodeSpec};
use vellum_markdown::ParseSpec;

use crate::commands::{
    children_without_match, replace_textblock_with, toggle_list, Command, InputRule, KeyBinding,
};
use crate::extension::{Extension, ExtensionContext, MarkdownRule, SchemaContribution};

pub struct BulletList;

impl Extension for BulletList {
    fn name(&self) -> &str {
        "bullet_list"
    }

    fn schema(&self) -> Option<SchemaContribution> {
        Some(SchemaContribution::Node(NodeSpec {
            content: Some("list_item+".to_string()),
            group: Some("block".to_string()),
            ..Default::default()
        }))
    }

    fn commands(&self, _ctx: &ExtensionContext) -> Vec<(String, Command)> {
        vec![(
            "bullet_list".to_string(),
            toggle_list("bullet_list", "list_item"),
        )]
    }

    fn keys(&self, _ctx: &ExtensionContext) -> Vec<KeyBinding> {
        vec![KeyBinding::new(
            "Shift-Ctrl-8",
            toggle_list("bullet_list", "list_item"),
        )]
    }

    fn input_rules(&self, _ctx: &ExtensionContext) -> Vec<InputRule> {
        vec![InputRule::new(
            r"^\s*([-+*])\s$",
            Rc::new(|state, m| {
                let children = children_without_match(state, m)?;
                let paragraph = state
                    .schema
                    .node_of("paragraph", Attrs::new(), children)
                    .ok()?;
                let item = state
                    .schema
                    .node_of("list_item", Attrs::new(), vec![paragraph])
                    .ok()?;
                let list = state
                    .schema
                    .node_of("bullet_list", Attrs::new(), vec![item])
                    .ok()?;
                replace_textblock_with(m, list)
            }),
        )]
    }

    fn to_markdown(&self) -> Option<MarkdownRule> {
        Some(MarkdownRule::Node(Rc::new(|state, node| {
            state.render_list(node, "  ", |_| "* ".to_string())
        })))
    }

    fn parse_markdown(&self) -> Option<ParseSpec> {
        Some(ParseSpec::block("bullet_list"))
    }
}
