use vellum_doc::MarkSpec;
use vellum_markdown::{MarkSerializer, ParseSpec};

use crate::commands::{mark_rule, toggle_mark, Command, InputRule, KeyBinding};
use crate::extension::{Extension, ExtensionContext, MarkdownRule, SchemaContribution};

pub struct Em;

impl Extension for Em {
    fn name(&self) -> &str {
        "em"
    }

    fn schema(&self) -> Option<SchemaContribution> {
        Some(SchemaContribution::Mark(MarkSpec::default()))
    }

    fn commands(&self, _ctx: &ExtensionContext) -> Vec<(String, Command)> {
        vec![("em".to_string(), toggle_mark("em"))]
    }

    fn keys(&self, _ctx: &ExtensionContext) -> Vec<KeyBinding> {
        vec![KeyBinding::new("Mod-i", toggle_mark("em"))]
    }

    fn input_rules(&self, _ctx: &ExtensionContext) -> Vec<InputRule> {
        vec![mark_rule(r"\*([^*\s][^*]*)\*$", "em")]
    }

    fn to_markdown(&self) -> Option<MarkdownRule> {
        Some(MarkdownRule::Mark(MarkSerializer::fixed("*", "*")))
    }

    fn parse_markdown(&self) -> Option<ParseSpec> {
        Some(ParseSpec::mark("em"))
    }
}
