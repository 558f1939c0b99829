//! Token stream → document tree.

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;
use thiserror::Error;

use vellum_doc::{Attrs, Mark, Node, Schema, SchemaError};

use crate::token::{tokenize, ParserRules, RulePlugin, Token, TokenKind};

/// How a token maps into the document.
#[derive(Clone)]
pub enum ParseKind {
    /// An open/close token pair producing a container node.
    Block(String),
    /// A childless token producing a leaf node.
    Node(String),
    /// A token (pair or content-carrying) producing a mark.
    Mark(String),
    /// Token is dropped from the stream.
    Ignore,
}

/// Extracts node attributes from a token; defaults to the token's own
/// attribute bag.
pub type AttrMapper = Rc<dyn Fn(&Token) -> Attrs>;

/// One extension's contribution for one token name.
#[derive(Clone)]
pub struct ParseSpec {
    pub kind: ParseKind,
    pub attrs: Option<AttrMapper>,
}

impl ParseSpec {
    pub fn block(node_name: impl Into<String>) -> Self {
        Self {
            kind: ParseKind::Block(node_name.into()),
            attrs: None,
        }
    }

    pub fn node(node_name: impl Into<String>) -> Self {
        Self {
            kind: ParseKind::Node(node_name.into()),
            attrs: None,
        }
    }

    pub fn mark(mark_name: impl Into<String>) -> Self {
        Self {
            kind: ParseKind::Mark(mark_name.into()),
            attrs: None,
        }
    }

    pub fn ignore() -> Self {
        Self {
            kind: ParseKind::Ignore,
            attrs: None,
        }
    }

    pub fn with_attrs<F>(mut self, f: F) -> Self
    where
        F: Fn(&Token) -> Attrs + 'static,
    {
        self.attrs = Some(Rc::new(f));
        self
    }

    fn attrs_for(&self, token: &Token) -> Attrs {
        match &self.attrs {
            Some(f) => f(token),
            None => token.attrs.clone(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("no parse rule for markdown token `{0}`")]
    MissingParseRule(String),

    #[error("unbalanced `{0}` token in markdown stream")]
    UnbalancedToken(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// A markdown parser wired to the composed schema.
///
/// Construction captures the per-token parse specs, the rule map, and
/// the ordered rule-plugin list; `parse` is a pure function of its
/// input from then on.
pub struct MarkdownParser {
    schema: Arc<Schema>,
    specs: HashMap<String, ParseSpec>,
    rules: ParserRules,
    plugins: Vec<RulePlugin>,
}

struct Frame {
    node_name: String,
    token_name: String,
    attrs: Attrs,
    children: Vec<Node>,
}

impl MarkdownParser {
    pub fn new(
        schema: Arc<Schema>,
        specs: HashMap<String, ParseSpec>,
        rules: ParserRules,
        plugins: Vec<RulePlugin>,
    ) -> Self {
        Self {
            schema,
            specs,
            rules,
            plugins,
        }
    }

    pub fn parse(&self, input: &str) -> Result<Node, ParseError> {
        let tokens = tokenize(input, &self.rules, &self.plugins);

        let mut stack = vec![Frame {
            node_name: "doc".to_string(),
            token_name: String::new(),
            attrs: Attrs::new(),
            children: Vec::new(),
        }];
        let mut marks: Vec<Mark> = Vec::new();

        for token in tokens {
            match &token.kind {
                TokenKind::Text(content) => {
                    if token.name == "text" {
                        if !content.is_empty() {
                            let node = self.schema.text(content.clone()).with_marks(marks.clone());
                            top(&mut stack).children.push(node);
                        }
                        continue;
                    }
                    // Content-carrying token: a mark wrapping literal text
                    // (`code_inline`) or a leaf node with no children.
                    match &self.spec_for(&token)?.kind {
                        ParseKind::Mark(mark_name) => {
                            let spec = self.spec_for(&token)?;
                            let mark = self
                                .schema
                                .mark_of(mark_name, spec.attrs_for(&token))?;
                            let mut node_marks = marks.clone();
                            node_marks.push(mark);
                            let node = self.schema.text(content.clone()).with_marks(node_marks);
                            top(&mut stack).children.push(node);
                        }
                        ParseKind::Node(node_name) => {
                            let spec = self.spec_for(&token)?;
                            let node = self.schema.node_of(
                                node_name,
                                spec.attrs_for(&token),
                                Vec::new(),
                            )?;
                            top(&mut stack).children.push(node);
                        }
                        ParseKind::Ignore => {}
                        ParseKind::Block(_) => {
                            return Err(ParseError::UnbalancedToken(token.name.clone()))
                        }
                    }
                }

                TokenKind::Open => match &self.spec_for(&token)?.kind {
                    ParseKind::Block(node_name) => {
                        let spec = self.spec_for(&token)?;
                        stack.push(Frame {
                            node_name: node_name.clone(),
                            token_name: token.name.clone(),
                            attrs: spec.attrs_for(&token),
                            children: Vec::new(),
                        });
                    }
                    ParseKind::Mark(mark_name) => {
                        let spec = self.spec_for(&token)?;
                        marks.push(self.schema.mark_of(mark_name, spec.attrs_for(&token))?);
                    }
                    ParseKind::Ignore => {}
                    ParseKind::Node(_) => {
                        return Err(ParseError::UnbalancedToken(token.name.clone()))
                    }
                },

                TokenKind::Close => match &self.spec_for(&token)?.kind {
                    ParseKind::Block(_) => {
                        if stack.len() < 2 || top(&mut stack).token_name != token.name {
                            return Err(ParseError::UnbalancedToken(token.name.clone()));
                        }
                        let frame = stack.pop().expect("non-empty stack");
                        let children = self.wrap_loose_inline(&frame.node_name, frame.children)?;
                        let node =
                            self.schema
                                .node_of(&frame.node_name, frame.attrs, children)?;
                        top(&mut stack).children.push(node);
                    }
                    ParseKind::Mark(mark_name) => {
                        if let Some(index) =
                            marks.iter().rposition(|m| &m.type_name == mark_name)
                        {
                            marks.remove(index);
                        }
                    }
                    ParseKind::Ignore => {}
                    ParseKind::Node(_) => {
                        return Err(ParseError::UnbalancedToken(token.name.clone()))
                    }
                },

                TokenKind::Atom => match &self.spec_for(&token)?.kind {
                    ParseKind::Node(node_name) => {
                        let spec = self.spec_for(&token)?;
                        let node =
                            self.schema
                                .node_of(node_name, spec.attrs_for(&token), Vec::new())?;
                        top(&mut stack).children.push(node);
                    }
                    ParseKind::Ignore => {}
                    _ => return Err(ParseError::UnbalancedToken(token.name.clone())),
                },
            }
        }

        if stack.len() != 1 {
            return Err(ParseError::UnbalancedToken(
                top(&mut stack).token_name.clone(),
            ));
        }
        let root = stack.pop().expect("root frame");
        let mut children = self.wrap_loose_inline("doc", root.children)?;
        if children.is_empty() && self.schema.nodes.contains_key("paragraph") {
            // An empty document still holds one empty textblock.
            children.push(self.schema.node_of("paragraph", Attrs::new(), vec![])?);
        }
        Ok(self.schema.node_of("doc", Attrs::new(), children)?)
    }

    fn spec_for(&self, token: &Token) -> Result<&ParseSpec, ParseError> {
        self.specs
            .get(&token.name)
            .ok_or_else(|| ParseError::MissingParseRule(token.name.clone()))
    }

    /// Group bare inline children of a non-textblock container into
    /// paragraphs. Tight lists tokenize without explicit paragraphs;
    /// the tree keeps them anyway.
    fn wrap_loose_inline(
        &self,
        node_name: &str,
        children: Vec<Node>,
    ) -> Result<Vec<Node>, ParseError> {
        let is_textblock = self
            .schema
            .nodes
            .get(node_name)
            .map(|t| t.is_textblock())
            .unwrap_or(false);
        if is_textblock || !self.schema.nodes.contains_key("paragraph") {
            return Ok(children);
        }

        let mut out: Vec<Node> = Vec::with_capacity(children.len());
        let mut run: Vec<Node> = Vec::new();
        for child in children {
            let inline = child.is_text()
                || self
                    .schema
                    .nodes
                    .get(&child.type_name)
                    .map(|t| t.is_inline())
                    .unwrap_or(false);
            if inline {
                run.push(child);
            } else {
                if !run.is_empty() {
                    out.push(self.schema.node_of(
                        "paragraph",
                        Attrs::new(),
                        std::mem::take(&mut run),
                    )?);
                }
                out.push(child);
            }
        }
        if !run.is_empty() {
            out.push(self.schema.node_of("paragraph", Attrs::new(), run)?);
        }
        Ok(out)
    }
}

fn top(stack: &mut Vec<Frame>) -> &mut Frame {
    stack.last_mut().expect("non-empty parse stack")
}
