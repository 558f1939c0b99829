use std::rc::Rc;

use serde_json::json;
use vellum_doc::NodeSpec;
use vellum_markdown::{ParseSpec, RulePlugin, Token, TokenKind};

use crate::commands::{toggle_list, Command};
use crate::extension::{Extension, ExtensionContext, MarkdownRule, SchemaContribution};

pub struct CheckboxList;

impl Extension for CheckboxList {
    fn name(&self) -> &str {
        "checkbox_list"
    }

    fn schema(&self) -> Option<SchemaContribution> {
        Some(SchemaContribution::Node(NodeSpec {
            content: Some("checkbox_item+".to_string()),
            group: Some("block".to_string()),
            ..Default::default()
        }))
    }

    fn commands(&self, _ctx: &ExtensionContext) -> Vec<(String, Command)> {
        vec![(
            "checkbox_list".to_string(),
            toggle_list("checkbox_list", "checkbox_item"),
        )]
    }

    fn rule_plugins(&self) -> Vec<RulePlugin> {
        vec![Rc::new(rewrite_checkbox_tokens)]
    }

    fn to_markdown(&self) -> Option<MarkdownRule> {
        Some(MarkdownRule::Node(Rc::new(|state, node| {
            state.render_list(node, "  ", |_| "- ".to_string())
        })))
    }

    fn parse_markdown(&self) -> Option<ParseSpec> {
        Some(ParseSpec::block("checkbox_list"))
    }
}

/// Rewrites list items whose text leads with a `[ ]`/`[x]` marker into
/// checkbox items, then renames bullet lists made up of them.
fn rewrite_checkbox_tokens(mut tokens: Vec<Token>) -> Vec<Token> {
    let mut index = 0;
    while index < tokens.len() {
        if tokens[index].is_open("list_item") {
            let mut content = index + 1;
            if tokens
                .get(content)
                .map(|t| t.is_open("paragraph"))
                .unwrap_or(false)
            {
                content += 1;
            }

            let marker = tokens.get(content).and_then(|token| {
                if token.name != "text" {
                    return None;
                }
                let text = token.text_content()?;
                if text.starts_with("[x] ") || text.starts_with("[X] ") {
                    Some((true, text[4..].to_string()))
                } else if text.starts_with("[ ] ") {
                    Some((false, text[4..].to_string()))
                } else {
                    None
                }
            });

            if let Some((checked, rest)) = marker {
                if let Some(close) = matching_close(&tokens, index, "list_item") {
                    tokens[close] = Token::close("checkbox_item");
                }
                tokens[index] =
                    Token::open("checkbox_item").with_attr("checked", json!(checked));
                if rest.is_empty() {
                    tokens.remove(content);
                } else {
                    tokens[content] = Token::text(rest);
                }
            }
        }
        index += 1;
    }

    let mut index = 0;
    while index < tokens.len() {
        let is_checkbox_list = tokens[index].is_open("bullet_list")
            && tokens
                .get(index + 1)
                .map(|t| t.is_open("checkbox_item"))
                .unwrap_or(false);
        if is_checkbox_list {
            if let Some(close) = matching_close(&tokens, index, "bullet_list") {
                tokens[close] = Token::close("checkbox_list");
            }
            tokens[index] = Token::open("checkbox_list");
        }
        index += 1;
    }
    tokens
}

fn matching_close(tokens: &[Token], open_index: usize, name: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (index, token) in tokens.iter().enumerate().skip(open_index) {
        match &token.kind {
            TokenKind::Open if token.name == name => depth += 1,
            TokenKind::Close if token.name == name => {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_markdown::{tokenize, ParserRules};

    #[test]
    fn test_task_markers_become_checkbox_tokens() {
        let plugin: RulePlugin = Rc::new(rewrite_checkbox_tokens);
        let tokens = tokenize("- [x] done\n- [ ] todo", &ParserRules::new(), &[plugin]);

        assert!(tokens.iter().any(|t| t.is_open("checkbox_list")));
        let items: Vec<_> = tokens.iter().filter(|t| t.is_open("checkbox_item")).collect();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].attrs.get("checked"), Some(&json!(true)));
        assert_eq!(items[1].attrs.get("checked"), Some(&json!(false)));
        assert!(!tokens.iter().any(|t| t.is_open("list_item")));
    }

    #[test]
    fn test_plain_lists_are_untouched() {
        let plugin: RulePlugin = Rc::new(rewrite_checkbox_tokens);
        let tokens = tokenize("- plain item", &ParserRules::new(), &[plugin]);

        assert!(tokens.iter().any(|t| t.is_open("bullet_list")));
        assert!(!tokens.iter().any(|t| t.is_open("checkbox_list")));
    }
}
