use serde_json::{json, Value};
use vellum_doc::{attrs, AttrSpec, MarkSpec};
use vellum_markdown::{MarkSerializer, ParseSpec};

use crate::commands::{event_command, toggle_mark, Command, EditorEvent, KeyBinding};
use crate::extension::{Extension, ExtensionContext, MarkdownRule, SchemaContribution};

pub struct Link;

impl Extension for Link {
    fn name(&self) -> &str {
        "link"
    }

    fn schema(&self) -> Option<SchemaContribution> {
        Some(SchemaContribution::Mark(MarkSpec {
            attrs: [
                ("href".to_string(), AttrSpec::required()),
                ("title".to_string(), AttrSpec::with_default(json!(""))),
            ]
            .into_iter()
            .collect(),
        }))
    }

    fn commands(&self, _ctx: &ExtensionContext) -> Vec<(String, Command)> {
        vec![("link".to_string(), toggle_mark("link"))]
    }

    fn keys(&self, _ctx: &ExtensionContext) -> Vec<KeyBinding> {
        vec![KeyBinding::new(
            "Mod-k",
            event_command(EditorEvent::OpenLinkMenu),
        )]
    }

    fn to_markdown(&self) -> Option<MarkdownRule> {
        Some(MarkdownRule::Mark(MarkSerializer::dynamic(
            |_mark| "[".to_string(),
            |mark| {
                let href = mark.attr("href").and_then(Value::as_str).unwrap_or("");
                format!("]({href})")
            },
        )))
    }

    fn parse_markdown(&self) -> Option<ParseSpec> {
        Some(ParseSpec::mark("link").with_attrs(|token| {
            attrs([
                (
                    "href",
                    token.attrs.get("href").cloned().unwrap_or(json!("")),
                ),
                (
                    "title",
                    token.attrs.get("title").cloned().unwrap_or(json!("")),
                ),
            ])
        }))
    }
}
