use vellum_doc::MarkSpec;
use vellum_markdown::{MarkSerializer, ParseSpec};

use crate::commands::{toggle_mark, Command, KeyBinding};
use crate::extension::{Extension, ExtensionContext, MarkdownRule, SchemaContribution};

/// `__underlined__` spans; the tokenizer distinguishes the underscore
/// delimiter from `**strong**`.
pub struct Underline;

impl Extension for Underline {
    fn name(&self) -> &str {
        "underline"
    }

    fn schema(&self) -> Option<SchemaContribution> {
        Some(SchemaContribution::Mark(MarkSpec::default()))
    }

    fn commands(&self, _ctx: &ExtensionContext) -> Vec<(String, Command)> {
        vec![("underline".to_string(), toggle_mark("underline"))]
    }

    fn keys(&self, _ctx: &ExtensionContext) -> Vec<KeyBinding> {
        vec![KeyBinding::new("Mod-u", toggle_mark("underline"))]
    }

    fn to_markdown(&self) -> Option<MarkdownRule> {
        Some(MarkdownRule::Mark(MarkSerializer::fixed("__", "__")))
    }

    fn parse_markdown(&self) -> Option<ParseSpec> {
        Some(ParseSpec::mark("underline"))
    }
}
