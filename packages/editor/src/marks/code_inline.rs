use vellum_doc::MarkSpec;
use vellum_markdown::{MarkSerializer, ParseSpec};

use crate::commands::{mark_rule, toggle_mark, Command, InputRule, KeyBinding};
use crate::extension::{Extension, ExtensionContext, MarkdownRule, SchemaContribution};

pub struct CodeInline;

impl Extension for CodeInline {
    fn name(&self) -> &str {
        "code_inline"
    }

    fn schema(&self) -> Option<SchemaContribution> {
        Some(SchemaContribution::Mark(MarkSpec::default()))
    }

    fn commands(&self, _ctx: &ExtensionContext) -> Vec<(String, Command)> {
        vec![("code_inline".to_string(), toggle_mark("code_inline"))]
    }

    fn keys(&self, _ctx: &ExtensionContext) -> Vec<KeyBinding> {
        vec![KeyBinding::new("Mod-e", toggle_mark("code_inline"))]
    }

    fn input_rules(&self, _ctx: &ExtensionContext) -> Vec<InputRule> {
        vec![mark_rule(r"`([^`]+)`$", "code_inline")]
    }

    fn to_markdown(&self) -> Option<MarkdownRule> {
        // Text under an inline-code mark is emitted verbatim.
        Some(MarkdownRule::Mark(MarkSerializer::fixed("`", "`").raw()))
    }

    fn parse_markdown(&self) -> Option<ParseSpec> {
        Some(ParseSpec::mark("code_inline"))
    }
}
