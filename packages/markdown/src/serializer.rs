//! Document tree → markdown text.

use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;

use vellum_doc::{Mark, Node};

/// Writes one node type; contributed per extension, keyed by name.
pub type NodeSerializerFn = Rc<dyn Fn(&mut SerializerState, &Node) -> Result<(), SerializeError>>;

/// Open/close emission for one mark type.
#[derive(Clone)]
pub struct MarkSerializer {
    pub open: Rc<dyn Fn(&Mark) -> String>,
    pub close: Rc<dyn Fn(&Mark) -> String>,
    /// Text under this mark is emitted verbatim (inline code).
    pub raw_content: bool,
}

impl MarkSerializer {
    /// A mark delimited by fixed strings, e.g. `**`/`**`.
    pub fn fixed(open: &str, close: &str) -> Self {
        let open = open.to_string();
        let close = close.to_string();
        Self {
            open: Rc::new(move |_| open.clone()),
            close: Rc::new(move |_| close.clone()),
            raw_content: false,
        }
    }

    /// A mark whose delimiters depend on its attributes, e.g. links.
    pub fn dynamic<O, C>(open: O, close: C) -> Self
    where
        O: Fn(&Mark) -> String + 'static,
        C: Fn(&Mark) -> String + 'static,
    {
        Self {
            open: Rc::new(open),
            close: Rc::new(close),
            raw_content: false,
        }
    }

    pub fn raw(mut self) -> Self {
        self.raw_content = true;
        self
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SerializeError {
    #[error("no markdown serializer for node type `{0}`")]
    MissingNodeSerializer(String),

    #[error("no markdown serializer for mark type `{0}`")]
    MissingMarkSerializer(String),
}

/// A markdown serializer assembled from per-type contributions.
pub struct MarkdownSerializer {
    nodes: HashMap<String, NodeSerializerFn>,
    marks: HashMap<String, MarkSerializer>,
}

impl MarkdownSerializer {
    pub fn new(
        nodes: HashMap<String, NodeSerializerFn>,
        marks: HashMap<String, MarkSerializer>,
    ) -> Self {
        Self { nodes, marks }
    }

    /// Serialize a document. Fails on the first node or mark type with
    /// no contribution — a codec gap is an error at use, not at build.
    pub fn serialize(&self, doc: &Node) -> Result<String, SerializeError> {
        let mut state = SerializerState::new(self);
        state.render_content(doc)?;
        Ok(state.finish())
    }
}

/// The write cursor handed to node serializer functions.
pub struct SerializerState<'a> {
    serializer: &'a MarkdownSerializer,
    out: String,
    delim: String,
    at_line_start: bool,
    closed: bool,
}

impl<'a> SerializerState<'a> {
    fn new(serializer: &'a MarkdownSerializer) -> Self {
        Self {
            serializer,
            out: String::new(),
            delim: String::new(),
            at_line_start: true,
            closed: false,
        }
    }

    /// Render every child of `parent` as a block.
    pub fn render_content(&mut self, parent: &Node) -> Result<(), SerializeError> {
        for child in &parent.content {
            self.render_node(child)?;
        }
        Ok(())
    }

    /// Render one node through its contributed serializer.
    pub fn render_node(&mut self, node: &Node) -> Result<(), SerializeError> {
        let f = self
            .serializer
            .nodes
            .get(&node.type_name)
            .cloned()
            .ok_or_else(|| SerializeError::MissingNodeSerializer(node.type_name.clone()))?;
        f(self, node)
    }

    /// Render the children of `parent` as inline content, opening and
    /// closing marks as they change between adjacent children.
    pub fn render_inline(&mut self, parent: &Node) -> Result<(), SerializeError> {
        let mut active: Vec<Mark> = Vec::new();

        for child in &parent.content {
            let target = &child.marks;

            let mut keep = 0;
            while keep < active.len() && keep < target.len() && active[keep] == target[keep] {
                keep += 1;
            }
            while active.len() > keep {
                let mark = active.pop().expect("active mark");
                let ser = self.mark_serializer(&mark.type_name)?;
                let text = (ser.close)(&mark);
                self.write(&text);
            }
            for mark in &target[keep..] {
                let ser = self.mark_serializer(&mark.type_name)?;
                let text = (ser.open)(mark);
                self.write(&text);
                active.push(mark.clone());
            }

            if let Some(text) = &child.text {
                let raw = self.any_raw(&active);
                if raw {
                    self.write(text);
                } else {
                    self.text(text);
                }
            } else {
                self.render_node(child)?;
            }
        }

        while let Some(mark) = active.pop() {
            let ser = self.mark_serializer(&mark.type_name)?;
            let text = (ser.close)(&mark);
            self.write(&text);
        }
        Ok(())
    }

    fn any_raw(&self, marks: &[Mark]) -> bool {
        marks.iter().any(|m| {
            self.serializer
                .marks
                .get(&m.type_name)
                .map(|s| s.raw_content)
                .unwrap_or(false)
        })
    }

    fn mark_serializer(&self, name: &str) -> Result<MarkSerializer, SerializeError> {
        self.serializer
            .marks
            .get(name)
            .cloned()
            .ok_or_else(|| SerializeError::MissingMarkSerializer(name.to_string()))
    }

    /// Write literal output. Embedded newlines restart the current block
    /// prefix on the following line.
    pub fn write(&mut self, text: &str) {
        self.flush_close();
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.out.push('\n');
                self.at_line_start = true;
            }
            if line.is_empty() {
                continue;
            }
            if self.at_line_start {
                self.out.push_str(&self.delim);
                self.at_line_start = false;
            }
            self.out.push_str(line);
        }
    }

    /// Write inline text, escaping markdown syntax characters.
    pub fn text(&mut self, text: &str) {
        let mut escaped = String::with_capacity(text.len());
        for ch in text.chars() {
            if matches!(ch, '\\' | '`' | '*' | '_' | '[' | ']' | '~') {
                escaped.push('\\');
            }
            escaped.push(ch);
        }
        self.write(&escaped);
    }

    /// Terminate the current line if one is in progress.
    pub fn ensure_new_line(&mut self) {
        if !self.at_line_start {
            self.out.push('\n');
            self.at_line_start = true;
        }
    }

    /// Mark the current block finished; the next write is separated from
    /// it by a (prefixed) blank line.
    pub fn close_block(&mut self) {
        self.closed = true;
    }

    fn flush_close(&mut self) {
        if !self.closed {
            return;
        }
        self.closed = false;
        self.ensure_new_line();
        let prefix = self.delim.trim_end().to_string();
        self.out.push_str(&prefix);
        self.out.push('\n');
        self.at_line_start = true;
    }

    /// Render `f` inside a nested block prefix. `first_delim`, when
    /// given, replaces the prefix on the first line (list bullets).
    pub fn wrap_block<F>(
        &mut self,
        delim: &str,
        first_delim: Option<&str>,
        f: F,
    ) -> Result<(), SerializeError>
    where
        F: FnOnce(&mut Self) -> Result<(), SerializeError>,
    {
        self.flush_close();
        self.ensure_new_line();

        self.out.push_str(&self.delim);
        self.out
            .push_str(first_delim.unwrap_or(delim));
        self.at_line_start = false;

        let old_len = self.delim.len();
        self.delim.push_str(delim);
        let result = f(self);
        self.delim.truncate(old_len);
        result?;

        self.close_block();
        Ok(())
    }

    /// Render a list node: one `wrap_block` per item, bullets supplied
    /// per index. Each item renders through its own contributed writer.
    pub fn render_list<F>(
        &mut self,
        node: &Node,
        indent: &str,
        bullet: F,
    ) -> Result<(), SerializeError>
    where
        F: Fn(usize) -> String,
    {
        for (index, item) in node.content.iter().enumerate() {
            let first = bullet(index);
            self.wrap_block(indent, Some(&first), |state| state.render_node(item))?;
        }
        Ok(())
    }

    fn finish(mut self) -> String {
        let len = self.out.trim_end_matches('\n').len();
        self.out.truncate(len);
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_doc::Node;

    fn serializer() -> MarkdownSerializer {
        let mut nodes: HashMap<String, NodeSerializerFn> = HashMap::new();
        nodes.insert(
            "paragraph".to_string(),
            Rc::new(|state, node| {
                state.render_inline(node)?;
                state.close_block();
                Ok(())
            }),
        );
        nodes.insert(
            "blockquote".to_string(),
            Rc::new(|state, node| state.wrap_block("> ", None, |s| s.render_content(node))),
        );
        nodes.insert(
            "bullet_list".to_string(),
            Rc::new(|state, node| state.render_list(node, "  ", |_| "* ".to_string())),
        );
        nodes.insert(
            "list_item".to_string(),
            Rc::new(|state, node| state.render_content(node)),
        );

        let mut marks = HashMap::new();
        marks.insert("strong".to_string(), MarkSerializer::fixed("**", "**"));
        marks.insert(
            "code_inline".to_string(),
            MarkSerializer::fixed("`", "`").raw(),
        );

        MarkdownSerializer::new(nodes, marks)
    }

    fn paragraph(children: Vec<Node>) -> Node {
        Node::new("paragraph").with_content(children)
    }

    #[test]
    fn test_paragraphs_are_blank_line_separated() {
        let doc = Node::new("doc")
            .with_child(paragraph(vec![Node::text("one")]))
            .with_child(paragraph(vec![Node::text("two")]));

        assert_eq!(serializer().serialize(&doc).unwrap(), "one\n\ntwo");
    }

    #[test]
    fn test_marks_open_and_close() {
        use vellum_doc::Mark;
        let doc = Node::new("doc").with_child(paragraph(vec![
            Node::text("a "),
            Node::text("bold").with_marks(vec![Mark::new("strong")]),
            Node::text(" tail"),
        ]));

        assert_eq!(serializer().serialize(&doc).unwrap(), "a **bold** tail");
    }

    #[test]
    fn test_raw_marks_skip_escaping() {
        use vellum_doc::Mark;
        let doc = Node::new("doc").with_child(paragraph(vec![
            Node::text("a*b").with_marks(vec![Mark::new("code_inline")])
        ]));

        assert_eq!(serializer().serialize(&doc).unwrap(), "`a*b`");
    }

    #[test]
    fn test_blockquote_prefixes_every_line() {
        let doc = Node::new("doc").with_child(
            Node::new("blockquote")
                .with_child(paragraph(vec![Node::text("one")]))
                .with_child(paragraph(vec![Node::text("two")])),
        );

        assert_eq!(serializer().serialize(&doc).unwrap(), "> one\n>\n> two");
    }

    #[test]
    fn test_list_bullets_and_indent() {
        let doc = Node::new("doc").with_child(
            Node::new("bullet_list")
                .with_child(Node::new("list_item").with_child(paragraph(vec![Node::text("one")])))
                .with_child(Node::new("list_item").with_child(paragraph(vec![Node::text("two")]))),
        );

        assert_eq!(serializer().serialize(&doc).unwrap(), "* one\n\n* two");
    }

    #[test]
    fn test_missing_contribution_fails_at_use() {
        let doc = Node::new("doc").with_child(Node::new("video"));
        assert_eq!(
            serializer().serialize(&doc).unwrap_err(),
            SerializeError::MissingNodeSerializer("video".to_string())
        );
    }

    #[test]
    fn test_escaping_of_syntax_characters() {
        let doc = Node::new("doc").with_child(paragraph(vec![Node::text("a *b* [c]")]));
        assert_eq!(
            serializer().serialize(&doc).unwrap(),
            r"a \*b\* \[c\]"
        );
    }
}
