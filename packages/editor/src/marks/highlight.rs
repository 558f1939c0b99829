use std::rc::Rc;

use once_cell::sync::Lazy;
use regex::Regex;
use vellum_doc::MarkSpec;
use vellum_markdown::{MarkSerializer, ParseSpec, RulePlugin, Token, TokenKind};

use crate::commands::{mark_rule, toggle_mark, Command, InputRule, KeyBinding};
use crate::extension::{Extension, ExtensionContext, MarkdownRule, SchemaContribution};

/// `==highlighted==` spans. The base tokenizer has no rule for the `==`
/// delimiters, so this extension ships the rewrite as a rule plugin.
pub struct Highlight;

impl Extension for Highlight {
    fn name(&self) -> &str {
        "highlight"
    }

    fn markdown_token(&self) -> String {
        "mark".to_string()
    }

    fn schema(&self) -> Option<SchemaContribution> {
        Some(SchemaContribution::Mark(MarkSpec::default()))
    }

    fn commands(&self, _ctx: &ExtensionContext) -> Vec<(String, Command)> {
        vec![("highlight".to_string(), toggle_mark("highlight"))]
    }

    fn keys(&self, _ctx: &ExtensionContext) -> Vec<KeyBinding> {
        vec![KeyBinding::new("Mod-Ctrl-h", toggle_mark("highlight"))]
    }

    fn input_rules(&self, _ctx: &ExtensionContext) -> Vec<InputRule> {
        vec![mark_rule(r"==([^=]+)==$", "highlight")]
    }

    fn rule_plugins(&self) -> Vec<RulePlugin> {
        vec![Rc::new(rewrite_highlight_tokens)]
    }

    fn to_markdown(&self) -> Option<MarkdownRule> {
        Some(MarkdownRule::Mark(MarkSerializer::fixed("==", "==")))
    }

    fn parse_markdown(&self) -> Option<ParseSpec> {
        Some(ParseSpec::mark("highlight"))
    }
}

static HIGHLIGHT_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"==([^=\n]+)==").unwrap());

fn rewrite_highlight_tokens(tokens: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len());
    for token in tokens {
        let TokenKind::Text(content) = &token.kind else {
            out.push(token);
            continue;
        };
        if token.name != "text" || !HIGHLIGHT_SPAN.is_match(content) {
            out.push(token);
            continue;
        }

        let mut cursor = 0;
        for span in HIGHLIGHT_SPAN.captures_iter(content) {
            let whole = span.get(0).expect("full match");
            if whole.start() > cursor {
                out.push(Token::text(&content[cursor..whole.start()]));
            }
            out.push(Token::open("mark"));
            out.push(Token::text(span.get(1).expect("inner group").as_str()));
            out.push(Token::close("mark"));
            cursor = whole.end();
        }
        if cursor < content.len() {
            out.push(Token::text(&content[cursor..]));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_markdown::{tokenize, ParserRules};

    #[test]
    fn test_highlight_spans_are_rewritten() {
        let plugin: RulePlugin = Rc::new(rewrite_highlight_tokens);
        let tokens = tokenize("some ==bright== words", &ParserRules::new(), &[plugin]);

        assert!(tokens.iter().any(|t| t.is_open("mark")));
        let texts: Vec<_> = tokens.iter().filter_map(|t| t.text_content()).collect();
        assert_eq!(texts, vec!["some ", "bright", " words"]);
    }
}
