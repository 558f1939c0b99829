use vellum_doc::MarkSpec;
use vellum_markdown::{MarkSerializer, ParseSpec};

use crate::commands::{mark_rule, toggle_mark, Command, InputRule, KeyBinding};
use crate::extension::{Extension, ExtensionContext, MarkdownRule, SchemaContribution};

pub struct Strong;

impl Extension for Strong {
    fn name(&self) -> &str {
        "strong"
    }

    fn schema(&self) -> Option<SchemaContribution> {
        Some(SchemaContribution::Mark(MarkSpec::default()))
    }

    fn commands(&self, _ctx: &ExtensionContext) -> Vec<(String, Command)> {
        vec![("strong".to_string(), toggle_mark("strong"))]
    }

    fn keys(&self, _ctx: &ExtensionContext) -> Vec<KeyBinding> {
        vec![KeyBinding::new("Mod-b", toggle_mark("strong"))]
    }

    fn input_rules(&self, _ctx: &ExtensionContext) -> Vec<InputRule> {
        vec![mark_rule(r"\*\*([^*]+)\*\*$", "strong")]
    }

    fn to_markdown(&self) -> Option<MarkdownRule> {
        Some(MarkdownRule::Mark(MarkSerializer::fixed("**", "**")))
    }

    fn parse_markdown(&self) -> Option<ParseSpec> {
        Some(ParseSpec::mark("strong"))
    }
}
