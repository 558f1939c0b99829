use vellum_doc::MarkSpec;
use vellum_markdown::{MarkSerializer, ParseSpec};

use crate::commands::{mark_rule, toggle_mark, Command, InputRule, KeyBinding};
use crate::extension::{Extension, ExtensionContext, MarkdownRule, SchemaContribution};

pub struct Strikethrough;

impl Extension for Strikethrough {
    fn name(&self) -> &str {
        "strikethrough"
    }

    fn markdown_token(&self) -> String {
        "s".to_string()
    }

    fn schema(&self) -> Option<SchemaContribution> {
        Some(SchemaContribution::Mark(MarkSpec::default()))
    }

    fn commands(&self, _ctx: &ExtensionContext) -> Vec<(String, Command)> {
        vec![("strikethrough".to_string(), toggle_mark("strikethrough"))]
    }

    fn keys(&self, _ctx: &ExtensionContext) -> Vec<KeyBinding> {
        vec![KeyBinding::new("Mod-d", toggle_mark("strikethrough"))]
    }

    fn input_rules(&self, _ctx: &ExtensionContext) -> Vec<InputRule> {
        vec![mark_rule(r"~~([^~]+)~~$", "strikethrough")]
    }

    fn to_markdown(&self) -> Option<MarkdownRule> {
        Some(MarkdownRule::Mark(MarkSerializer::fixed("~~", "~~")))
    }

    fn parse_markdown(&self) -> Option<ParseSpec> {
        Some(ParseSpec::mark("strikethrough"))
    }
}
