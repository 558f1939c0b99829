use std::rc::Rc;

use vellum_doc::{Attrs, NodeSpec};
use vellum_markdown::ParseSpec;

use crate::commands::{
    children_without_match, replace_textblock_with, toggle_wrap, Command, InputRule, KeyBinding,
};
use crate::extension::{Extension, ExtensionContext, MarkdownRule, SchemaContribution};

pub struct Blockquote;

impl Extension for Blockquote {
    fn name(&self) -> &str {
        "blockquote"
    }

    fn schema(&self) -> Option<SchemaContribution> {
        Some(SchemaContribution::Node(NodeSpec {
            content: Some("block+".to_string()),
            group: Some("block".to_string()),
            ..Default::default()
        }))
    }

    fn commands(&self, _ctx: &ExtensionContext) -> Vec<(String, Command)> {
        vec![("blockquote".to_string(), toggle_wrap("blockquote"))]
    }

    fn keys(&self, _ctx: &ExtensionContext) -> Vec<KeyBinding> {
        vec![KeyBinding::new("Ctrl->", toggle_wrap("blockquote"))]
    }

    fn input_rules(&self, _ctx: &ExtensionContext) -> Vec<InputRule> {
        vec![InputRule::new(
            r"^>\s$",
            Rc::new(|state, m| {
                let children = children_without_match(state, m)?;
                let block = state.doc.node_at(&m.parent)?;
                let inner = state
                    .schema
                    .node_of(&block.type_name, block.attrs.clone(), children)
                    .ok()?;
                let wrapper = state
                    .schema
                    .node_of("blockquote", Attrs::new(), vec![inner])
                    .ok()?;
                replace_textblock_with(m, wrapper)
            }),
        )]
    }

    fn to_markdown(&self) -> Option<MarkdownRule> {
        Some(MarkdownRule::Node(Rc::new(|state, node| {
            state.wrap_block("> ", None, |state| state.render_content(node))
        })))
    }

    fn parse_markdown(&self) -> Option<ParseSpec> {
        Some(ParseSpec::block("blockquote"))
    }
}
