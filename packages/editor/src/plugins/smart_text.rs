use crate::commands::{text_rule, InputRule};
use crate::extension::{Extension, ExtensionContext};

/// Typographic replacements applied as you type.
pub struct SmartText;

impl Extension for SmartText {
    fn name(&self) -> &str {
        "smart_text"
    }

    fn input_rules(&self, _ctx: &ExtensionContext) -> Vec<InputRule> {
        vec![
            text_rule(r"\.\.\.$", "…"),
            text_rule(r"--$", "—"),
            text_rule(r"->$", "→"),
            text_rule(r"<-$", "←"),
        ]
    }
}
