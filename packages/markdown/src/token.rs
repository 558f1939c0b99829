//! The token stream: a flat, rewritable view of tokenized markdown.
//!
//! pulldown-cmark does the CommonMark tokenization; this module adapts
//! its event stream into named [`Token`]s that extension-supplied rule
//! plugins can rewrite before the parser builds the tree. The adapter
//! plus the ordered plugin list is the whole tokenizer configuration —
//! built once, never mutated.

use once_cell::sync::Lazy;
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use regex::Regex;
use serde_json::json;
use std::collections::HashMap;
use std::rc::Rc;

use vellum_doc::Attrs;

/// A rewriting pass over the token stream, applied in list order.
pub type RulePlugin = Rc<dyn Fn(Vec<Token>) -> Vec<Token>>;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Opens a container (matched by a `Close` of the same name).
    Open,
    Close,
    /// A childless token.
    Atom,
    /// Literal content; `text` tokens and content-carrying inline
    /// tokens such as `code_inline`.
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub name: String,
    pub attrs: Attrs,
    pub kind: TokenKind,
}

impl Token {
    pub fn open(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Attrs::new(),
            kind: TokenKind::Open,
        }
    }

    pub fn close(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Attrs::new(),
            kind: TokenKind::Close,
        }
    }

    pub fn atom(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Attrs::new(),
            kind: TokenKind::Atom,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self {
            name: "text".to_string(),
            attrs: Attrs::new(),
            kind: TokenKind::Text(content.into()),
        }
    }

    pub fn content(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Attrs::new(),
            kind: TokenKind::Text(content.into()),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attrs.insert(key.into(), value);
        self
    }

    pub fn is_open(&self, name: &str) -> bool {
        self.kind == TokenKind::Open && self.name == name
    }

    pub fn is_close(&self, name: &str) -> bool {
        self.kind == TokenKind::Close && self.name == name
    }

    /// The literal content of a `Text`-kind token.
    pub fn text_content(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Text(content) => Some(content),
            _ => None,
        }
    }
}

/// Named boolean toggles for tokenizer behavior.
///
/// The only rule this core ships is `linkify`, enabled for the
/// paste-time parser so bare URLs become links.
#[derive(Debug, Clone, Default)]
pub struct ParserRules {
    enabled: HashMap<String, bool>,
}

impl ParserRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule(mut self, name: impl Into<String>, on: bool) -> Self {
        self.enabled.insert(name.into(), on);
        self
    }

    pub fn enabled(&self, name: &str) -> bool {
        self.enabled.get(name).copied().unwrap_or(false)
    }
}

/// Tokenize markdown into a token stream, then run the built-in rule
/// passes and the extension-supplied plugins, in order.
pub fn tokenize(input: &str, rules: &ParserRules, plugins: &[RulePlugin]) -> Vec<Token> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut tokens = Vec::new();
    // While inside an image, inline events are folded into its alt text.
    let mut image: Option<(String, String, String)> = None; // (src, title, alt)
    // `**strong**` and `__underline__` tokenize identically; the source
    // delimiter tells them apart.
    let bytes = input.as_bytes();
    let mut strong_kinds: Vec<&'static str> = Vec::new();

    for (event, range) in Parser::new_ext(input, options).into_offset_iter() {
        if let Some((_, _, alt)) = image.as_mut() {
            match event {
                Event::Text(text) | Event::Code(text) => {
                    alt.push_str(&text);
                    continue;
                }
                Event::End(TagEnd::Image) => {
                    let (src, title, alt) = image.take().expect("image frame");
                    push(
                        &mut tokens,
                        Token::atom("image")
                            .with_attr("src", json!(src))
                            .with_attr("alt", json!(alt))
                            .with_attr("title", json!(title)),
                    );
                    continue;
                }
                // Formatting inside alt text is dropped.
                _ => continue,
            }
        }

        match event {
            Event::Start(tag) => match tag {
                Tag::Paragraph => push(&mut tokens, Token::open("paragraph")),
                Tag::Heading { level, .. } => push(
                    &mut tokens,
                    Token::open("heading").with_attr("level", json!(level as u8)),
                ),
                Tag::BlockQuote(_) => push(&mut tokens, Token::open("blockquote")),
                Tag::CodeBlock(kind) => {
                    let language = match kind {
                        CodeBlockKind::Fenced(lang) => lang.to_string(),
                        CodeBlockKind::Indented => String::new(),
                    };
                    push(
                        &mut tokens,
                        Token::open("fence").with_attr("language", json!(language)),
                    );
                }
                Tag::List(Some(start)) => push(
                    &mut tokens,
                    Token::open("ordered_list").with_attr("order", json!(start)),
                ),
                Tag::List(None) => push(&mut tokens, Token::open("bullet_list")),
                Tag::Item => push(&mut tokens, Token::open("list_item")),
                Tag::Emphasis => push(&mut tokens, Token::open("em")),
                Tag::Strong => {
                    let name = if bytes.get(range.start) == Some(&b'_') {
                        "underline"
                    } else {
                        "strong"
                    };
                    strong_kinds.push(name);
                    push(&mut tokens, Token::open(name));
                }
                Tag::Strikethrough => push(&mut tokens, Token::open("s")),
                Tag::Link {
                    dest_url, title, ..
                } => push(
                    &mut tokens,
                    Token::open("link")
                        .with_attr("href", json!(dest_url.to_string()))
                        .with_attr("title", json!(title.to_string())),
                ),
                Tag::Image {
                    dest_url, title, ..
                } => {
                    image = Some((dest_url.to_string(), title.to_string(), String::new()));
                }
                _ => {}
            },

            Event::End(tag) => match tag {
                TagEnd::Paragraph => push(&mut tokens, Token::close("paragraph")),
                TagEnd::Heading(_) => push(&mut tokens, Token::close("heading")),
                TagEnd::BlockQuote(_) => push(&mut tokens, Token::close("blockquote")),
                TagEnd::CodeBlock => push(&mut tokens, Token::close("fence")),
                TagEnd::List(true) => push(&mut tokens, Token::close("ordered_list")),
                TagEnd::List(false) => push(&mut tokens, Token::close("bullet_list")),
                TagEnd::Item => push(&mut tokens, Token::close("list_item")),
                TagEnd::Emphasis => push(&mut tokens, Token::close("em")),
                TagEnd::Strong => {
                    let name = strong_kinds.pop().unwrap_or("strong");
                    push(&mut tokens, Token::close(name));
                }
                TagEnd::Strikethrough => push(&mut tokens, Token::close("s")),
                TagEnd::Link => push(&mut tokens, Token::close("link")),
                _ => {}
            },

            Event::Text(text) => push(&mut tokens, Token::text(text.to_string())),
            Event::Code(code) => push(&mut tokens, Token::content("code_inline", code.to_string())),
            Event::SoftBreak => push(&mut tokens, Token::text("\n")),
            Event::HardBreak => push(&mut tokens, Token::atom("br")),
            Event::Rule => push(&mut tokens, Token::atom("hr")),
            Event::TaskListMarker(checked) => {
                // Surfaced as literal text so the checkbox rule plugin can
                // claim it; without that plugin it stays visible content.
                let marker = if checked { "[x] " } else { "[ ] " };
                push(&mut tokens, Token::text(marker));
            }
            // Raw HTML, footnotes and math are not part of this schema.
            _ => {}
        }
    }

    let tokens = if rules.enabled("linkify") {
        linkify(tokens)
    } else {
        tokens
    };

    plugins.iter().fold(tokens, |tokens, plugin| plugin(tokens))
}

/// Push a token, coalescing adjacent plain-text tokens.
fn push(tokens: &mut Vec<Token>, token: Token) {
    if token.name == "text" {
        if let (Some(last), TokenKind::Text(new)) = (tokens.last_mut(), &token.kind) {
            if last.name == "text" {
                if let TokenKind::Text(existing) = &mut last.kind {
                    existing.push_str(new);
                    return;
                }
            }
        }
    }
    tokens.push(token);
}

static URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://[^\s<>\[\]()]+[^\s<>\[\]().,;:!?'\x22]").unwrap());

/// Split bare URLs in plain text into link tokens. Text already inside
/// a link is left alone.
fn linkify(tokens: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut link_depth = 0usize;

    for token in tokens {
        match &token.kind {
            TokenKind::Open if token.name == "link" => {
                link_depth += 1;
                out.push(token);
            }
            TokenKind::Close if token.name == "link" => {
                link_depth = link_depth.saturating_sub(1);
                out.push(token);
            }
            TokenKind::Text(content) if token.name == "text" && link_depth == 0 => {
                let mut cursor = 0;
                for found in URL_PATTERN.find_iter(content) {
                    if found.start() > cursor {
                        out.push(Token::text(&content[cursor..found.start()]));
                    }
                    out.push(
                        Token::open("link")
                            .with_attr("href", json!(found.as_str()))
                            .with_attr("title", json!("")),
                    );
                    out.push(Token::text(found.as_str()));
                    out.push(Token::close("link"));
                    cursor = found.end();
                }
                if cursor == 0 {
                    out.push(token);
                } else if cursor < content.len() {
                    out.push(Token::text(&content[cursor..]));
                }
            }
            _ => out.push(token),
        }
    }
    out
}
