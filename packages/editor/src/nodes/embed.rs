use std::rc::Rc;

use regex::Regex;
use serde_json::{json, Value};
use vellum_doc::{AttrSpec, NodeSpec};
use vellum_markdown::{ParseSpec, RulePlugin, Token};

use crate::error::CompositionError;
use crate::extension::{Extension, MarkdownRule, SchemaContribution};
use crate::fragment::Fragment;
use crate::node_view::{NodeViewContext, NodeViewRenderer};

/// Caller-supplied description of one embeddable service: links whose
/// href matches `pattern` become embed nodes on parse.
#[derive(Debug, Clone)]
pub struct EmbedDescriptor {
    pub title: String,
    pub pattern: String,
}

impl EmbedDescriptor {
    pub fn new(title: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            pattern: pattern.into(),
        }
    }
}

/// Block-level embedded content with an externally rendered widget.
pub struct Embed {
    embeds: Vec<EmbedDescriptor>,
}

impl Embed {
    pub fn new(embeds: Vec<EmbedDescriptor>) -> Self {
        Self { embeds }
    }
}

impl Extension for Embed {
    fn name(&self) -> &str {
        "embed"
    }

    fn validate(&self) -> Result<(), CompositionError> {
        for descriptor in &self.embeds {
            Regex::new(&descriptor.pattern).map_err(|err| CompositionError::InvalidConfig {
                extension: "embed".to_string(),
                message: format!("invalid matcher for `{}`: {err}", descriptor.title),
            })?;
        }
        Ok(())
    }

    fn schema(&self) -> Option<SchemaContribution> {
        Some(SchemaContribution::Node(NodeSpec {
            group: Some("block".to_string()),
            attrs: [("href".to_string(), AttrSpec::required())]
                .into_iter()
                .collect(),
            ..Default::default()
        }))
    }

    fn rule_plugins(&self) -> Vec<RulePlugin> {
        let matchers: Vec<Regex> = self
            .embeds
            .iter()
            .filter_map(|descriptor| Regex::new(&descriptor.pattern).ok())
            .collect();
        vec![Rc::new(move |tokens| rewrite_embed_tokens(tokens, &matchers))]
    }

    fn to_markdown(&self) -> Option<MarkdownRule> {
        Some(MarkdownRule::Node(Rc::new(|state, node| {
            let href = node.attr("href").and_then(Value::as_str).unwrap_or("");
            state.write(&format!("[{href}]({href})"));
            state.close_block();
            Ok(())
        })))
    }

    fn parse_markdown(&self) -> Option<ParseSpec> {
        Some(ParseSpec::node("embed"))
    }

    fn node_view(&self) -> Option<NodeViewRenderer> {
        Some(Rc::new(|ctx: &NodeViewContext| {
            let href = ctx.node.attr("href").and_then(Value::as_str).unwrap_or("");
            let mut frame = Fragment::element("iframe").with_attr("src", href);
            if ctx.is_selected {
                frame = frame.with_attr("class", "selected");
            }
            frame
        }))
    }
}

/// Rewrites a paragraph holding nothing but one matching link into an
/// embed token.
fn rewrite_embed_tokens(tokens: Vec<Token>, matchers: &[Regex]) -> Vec<Token> {
    if matchers.is_empty() {
        return tokens;
    }

    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut index = 0;
    while index < tokens.len() {
        let is_link_paragraph = tokens[index].is_open("paragraph")
            && tokens
                .get(index + 1)
                .map(|t| t.is_open("link"))
                .unwrap_or(false)
            && tokens
                .get(index + 2)
                .map(|t| t.name == "text")
                .unwrap_or(false)
            && tokens
                .get(index + 3)
                .map(|t| t.is_close("link"))
                .unwrap_or(false)
            && tokens
                .get(index + 4)
                .map(|t| t.is_close("paragraph"))
                .unwrap_or(false);

        if is_link_paragraph {
            let href = tokens[index + 1]
                .attrs
                .get("href")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string();
            if matchers.iter().any(|matcher| matcher.is_match(&href)) {
                out.push(Token::atom("embed").with_attr("href", json!(href)));
                index += 5;
                continue;
            }
        }
        out.push(tokens[index].clone());
        index += 1;
    }
    out
}
