use std::rc::Rc;

use serde_json::{json, Value};
use vellum_doc::{AttrSpec, NodeSpec};
use vellum_markdown::ParseSpec;

use crate::commands::{insert_block, Command};
use crate::extension::{Extension, ExtensionContext, MarkdownRule, SchemaContribution};
use crate::fragment::Fragment;
use crate::node_view::{NodeViewContext, NodeViewRenderer};

/// Inline image with an externally rendered widget.
pub struct Image;

impl Extension for Image {
    fn name(&self) -> &str {
        "image"
    }

    fn schema(&self) -> Option<SchemaContribution> {
        Some(SchemaContribution::Node(NodeSpec {
            inline: true,
            group: Some("inline".to_string()),
            attrs: [
                ("src".to_string(), AttrSpec::required()),
                ("alt".to_string(), AttrSpec::with_default(json!(""))),
                ("title".to_string(), AttrSpec::with_default(json!(""))),
            ]
            .into_iter()
            .collect(),
            ..Default::default()
        }))
    }

    fn commands(&self, _ctx: &ExtensionContext) -> Vec<(String, Command)> {
        vec![("image".to_string(), insert_block("image"))]
    }

    fn to_markdown(&self) -> Option<MarkdownRule> {
        Some(MarkdownRule::Node(Rc::new(|state, node| {
            let alt = node.attr("alt").and_then(Value::as_str).unwrap_or("");
            let src = node.attr("src").and_then(Value::as_str).unwrap_or("");
            let title = node.attr("title").and_then(Value::as_str).unwrap_or("");
            if title.is_empty() {
                state.write(&format!("![{alt}]({src})"));
            } else {
                state.write(&format!("![{alt}]({src} \"{title}\")"));
            }
            Ok(())
        })))
    }

    fn parse_markdown(&self) -> Option<ParseSpec> {
        Some(ParseSpec::node("image"))
    }

    fn node_view(&self) -> Option<NodeViewRenderer> {
        Some(Rc::new(|ctx: &NodeViewContext| {
            let src = ctx.node.attr("src").and_then(Value::as_str).unwrap_or("");
            let alt = ctx.node.attr("alt").and_then(Value::as_str).unwrap_or("");
            let mut image = Fragment::element("img")
                .with_attr("src", src)
                .with_attr("alt", alt);
            if ctx.is_selected {
                image = image.with_attr("class", "selected");
            }
            if !ctx.is_editable {
                image = image.with_attr("draggable", "false");
            }
            image
        }))
    }
}
