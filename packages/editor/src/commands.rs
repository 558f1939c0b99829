//! Commands, keybindings and input rules.
//!
//! A [`Command`] runs against the current state and yields a
//! [`CommandOutcome`]: a transaction for the orchestrator to dispatch,
//! an editor-level event (save, cancel, auxiliary surfaces), or nothing.
//! Commands never dispatch themselves; the orchestrator owns dispatch.

use indexmap::IndexMap;
use regex::Regex;
use std::rc::Rc;

use vellum_doc::{Attrs, EditorState, Node, NodePath, Selection, Transaction};

/// Editor-level effects a command can request instead of a transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    Save { done: bool },
    Cancel,
    Focus,
    Blur,
    OpenLinkMenu,
}

pub enum CommandOutcome {
    Transaction(Transaction),
    Event(EditorEvent),
    None,
}

/// An invocable operation parameterized by the live state and the
/// attributes supplied at the call site.
pub type Command = Rc<dyn Fn(&EditorState, &Attrs) -> CommandOutcome>;

/// The unified command mapping. Later contributions overwrite earlier
/// ones for the same name; insertion order is the extension list order.
pub type CommandTable = IndexMap<String, Command>;

/// One chord → command association contributed by an extension.
#[derive(Clone)]
pub struct KeyBinding {
    pub key: String,
    pub run: Command,
}

impl KeyBinding {
    pub fn new(key: impl Into<String>, run: Command) -> Self {
        Self {
            key: key.into(),
            run,
        }
    }
}

/// A pattern-triggered auto-transform applied as matching text is typed.
#[derive(Clone)]
pub struct InputRule {
    pub pattern: Regex,
    pub handler: InputRuleHandler,
}

pub type InputRuleHandler = Rc<dyn Fn(&EditorState, &InputRuleMatch) -> Option<Transaction>>;

impl InputRule {
    pub fn new(pattern: &str, handler: InputRuleHandler) -> Self {
        Self {
            // Patterns are authored constants.
            pattern: Regex::new(pattern).expect("valid input rule pattern"),
            handler,
        }
    }
}

/// Where an input rule matched: the contiguous run of text children
/// ending at the caret inside one textblock.
#[derive(Debug, Clone)]
pub struct InputRuleMatch {
    /// Path of the textblock containing the caret.
    pub parent: NodePath,
    /// Child-index caret inside the textblock.
    pub caret: usize,
    /// Child index where the text run starts.
    pub run_start: usize,
    /// Concatenated text of the run.
    pub text: String,
    /// Char offset in `text` where the pattern matched (match always
    /// extends to the end of `text`).
    pub start: usize,
    /// Owned capture groups of the match.
    pub captures: Vec<Option<String>>,
}

impl InputRuleMatch {
    pub fn capture(&self, index: usize) -> Option<&str> {
        self.captures.get(index).and_then(|c| c.as_deref())
    }
}

/// The textblock the (text) selection lives in, if any.
pub fn selection_textblock(state: &EditorState) -> Option<(NodePath, &Node)> {
    match &state.selection {
        Selection::Text { parent, .. } => {
            let node = state.doc.node_at(parent)?;
            if state.schema.is_textblock(node) {
                Some((parent.clone(), node))
            } else {
                None
            }
        }
        Selection::Node { .. } => None,
    }
}

/// Replace char range `start..end` of the matched text run with
/// `content`, leaving surrounding children untouched.
pub fn splice_run(
    state: &EditorState,
    m: &InputRuleMatch,
    start: usize,
    end: usize,
    content: Vec<Node>,
) -> Option<Transaction> {
    let parent = state.doc.node_at(&m.parent)?;

    let mut before: Vec<Node> = Vec::new();
    let mut after: Vec<Node> = Vec::new();
    let mut offset = 0usize;

    for child in &parent.content[m.run_start..m.caret] {
        let len = child
            .text
            .as_ref()
            .map(|t| t.chars().count())
            .unwrap_or(0);
        let child_start = offset;
        let child_end = offset + len;
        offset = child_end;

        if child_end <= start {
            before.push(child.clone());
        } else if child_start >= end {
            after.push(child.clone());
        } else {
            let text = child.text.as_deref().unwrap_or("");
            if start > child_start {
                let head: String = text.chars().take(start - child_start).collect();
                let mut kept = child.clone();
                kept.text = Some(head);
                before.push(kept);
            }
            if end < child_end {
                let tail: String = text.chars().skip(end - child_start).collect();
                let mut kept = child.clone();
                kept.text = Some(tail);
                after.push(kept);
            }
        }
    }

    let caret_after = m.run_start + before.len() + content.len();
    let mut replacement = before;
    replacement.extend(content);
    replacement.extend(after);

    Some(
        Transaction::new()
            .replace_children(m.parent.clone(), m.run_start, m.caret, replacement)
            .set_selection(Selection::caret(m.parent.clone(), caret_after)),
    )
}

/// The textblock's children with the matched range removed; used by
/// block-level rules that consume their trigger text.
pub fn children_without_match(state: &EditorState, m: &InputRuleMatch) -> Option<Vec<Node>> {
    let parent = state.doc.node_at(&m.parent)?;
    let text_len = m.text.chars().count();

    let mut kept: Vec<Node> = Vec::new();
    let mut offset = 0usize;
    for child in &parent.content[m.run_start..m.caret] {
        let len = child
            .text
            .as_ref()
            .map(|t| t.chars().count())
            .unwrap_or(0);
        let child_start = offset;
        let child_end = offset + len;
        offset = child_end;

        if child_end <= m.start {
            kept.push(child.clone());
        } else if child_start >= text_len {
            kept.push(child.clone());
        } else if m.start > child_start {
            let text = child.text.as_deref().unwrap_or("");
            let head: String = text.chars().take(m.start - child_start).collect();
            if !head.is_empty() {
                let mut c = child.clone();
                c.text = Some(head);
                kept.push(c);
            }
        }
    }

    let mut children: Vec<Node> = parent.content[..m.run_start].to_vec();
    children.extend(kept);
    children.extend(parent.content[m.caret..].iter().cloned());
    Some(children)
}

/// Swap the matched textblock for `node` inside its container.
pub fn replace_textblock_with(m: &InputRuleMatch, node: Node) -> Option<Transaction> {
    let index = m.parent.last_index()?;
    let container = m.parent.parent()?;
    Some(Transaction::new().replace_children(container, index, index + 1, vec![node]))
}

/// An input rule that replaces its match with literal text (smart
/// punctuation).
pub fn text_rule(pattern: &str, replacement: &'static str) -> InputRule {
    InputRule::new(
        pattern,
        Rc::new(move |state, m| {
            splice_run(
                state,
                m,
                m.start,
                m.text.chars().count(),
                vec![Node::text(replacement)],
            )
        }),
    )
}

/// An input rule that turns `<delim>content<delim>` into marked text,
/// e.g. `**bold**`.
pub fn mark_rule(pattern: &str, mark_name: &'static str) -> InputRule {
    InputRule::new(
        pattern,
        Rc::new(move |state, m| {
            let content = m.capture(1)?.to_string();
            let mark = state.schema.mark_of(mark_name, Attrs::new()).ok()?;
            splice_run(
                state,
                m,
                m.start,
                m.text.chars().count(),
                vec![Node::text(content).with_marks(vec![mark])],
            )
        }),
    )
}

/// Toggle a mark over the selected inline range.
pub fn toggle_mark(mark_name: &'static str) -> Command {
    Rc::new(move |state, attrs| {
        let Selection::Text { parent, from, to } = &state.selection else {
            return CommandOutcome::None;
        };
        if from == to {
            return CommandOutcome::None;
        }
        let Some(parent_node) = state.doc.node_at(parent) else {
            return CommandOutcome::None;
        };
        if *to > parent_node.child_count() {
            return CommandOutcome::None;
        }

        let covered = &parent_node.content[*from..*to];
        let text_children: Vec<&Node> = covered.iter().filter(|c| c.is_text()).collect();
        if text_children.is_empty() {
            return CommandOutcome::None;
        }
        let all_marked = text_children.iter().all(|c| c.has_mark(mark_name));

        let Ok(mark) = state.schema.mark_of(mark_name, attrs.clone()) else {
            return CommandOutcome::None;
        };

        let replacement: Vec<Node> = covered
            .iter()
            .map(|child| {
                if !child.is_text() {
                    return child.clone();
                }
                let mut updated = child.clone();
                if all_marked {
                    updated.marks.retain(|m| m.type_name != mark_name);
                } else if !updated.has_mark(mark_name) {
                    updated.marks.push(mark.clone());
                }
                updated
            })
            .collect();

        CommandOutcome::Transaction(
            Transaction::new()
                .replace_children(parent.clone(), *from, *to, replacement)
                .set_selection(Selection::Text {
                    parent: parent.clone(),
                    from: *from,
                    to: *to,
                }),
        )
    })
}

/// Toggle the selection's textblock between `node_name` and paragraph.
pub fn set_block_type(node_name: &'static str) -> Command {
    Rc::new(move |state, attrs| {
        let Some((path, block)) = selection_textblock(state) else {
            return CommandOutcome::None;
        };
        let Some(index) = path.last_index() else {
            return CommandOutcome::None;
        };
        let Some(container) = path.parent() else {
            return CommandOutcome::None;
        };

        let same_type = block.type_name == node_name
            && attrs.iter().all(|(k, v)| block.attr(k) == Some(v));
        let target = if same_type { "paragraph" } else { node_name };
        let target_attrs = if same_type { Attrs::new() } else { attrs.clone() };

        let Ok(node) = state
            .schema
            .node_of(target, target_attrs, block.content.clone())
        else {
            return CommandOutcome::None;
        };

        CommandOutcome::Transaction(Transaction::new().replace_children(
            container,
            index,
            index + 1,
            vec![node],
        ))
    })
}

/// Toggle wrapping of the selection's textblock in a container node.
pub fn toggle_wrap(node_name: &'static str) -> Command {
    Rc::new(move |state, _attrs| {
        let Some((path, block)) = selection_textblock(state) else {
            return CommandOutcome::None;
        };
        let Some(index) = path.last_index() else {
            return CommandOutcome::None;
        };
        let Some(container_path) = path.parent() else {
            return CommandOutcome::None;
        };
        let Some(container) = state.doc.node_at(&container_path) else {
            return CommandOutcome::None;
        };

        let tr = if container.type_name == node_name {
            // Unwrap: replace the wrapper with its children.
            let Some(wrapper_index) = container_path.last_index() else {
                return CommandOutcome::None;
            };
            let Some(outer) = container_path.parent() else {
                return CommandOutcome::None;
            };
            Transaction::new().replace_children(
                outer,
                wrapper_index,
                wrapper_index + 1,
                container.content.clone(),
            )
        } else {
            let Ok(wrapper) = state
                .schema
                .node_of(node_name, Attrs::new(), vec![block.clone()])
            else {
                return CommandOutcome::None;
            };
            Transaction::new().replace_children(container_path, index, index + 1, vec![wrapper])
        };
        CommandOutcome::Transaction(tr)
    })
}

/// Toggle the selection's textblock in and out of a list.
pub fn toggle_list(list_name: &'static str, item_name: &'static str) -> Command {
    Rc::new(move |state, _attrs| {
        let Some((path, block)) = selection_textblock(state) else {
            return CommandOutcome::None;
        };

        // Inside this list type already? Unwrap the whole list.
        let mut list_path: Option<NodePath> = None;
        let mut prefix = path.clone();
        while let Some(parent) = prefix.parent() {
            if let Some(node) = state.doc.node_at(&parent) {
                if node.type_name == list_name {
                    list_path = Some(parent.clone());
                }
            }
            prefix = parent;
        }

        if let Some(list_path) = list_path {
            let Some(list) = state.doc.node_at(&list_path) else {
                return CommandOutcome::None;
            };
            let Some(index) = list_path.last_index() else {
                return CommandOutcome::None;
            };
            let Some(outer) = list_path.parent() else {
                return CommandOutcome::None;
            };
            let blocks: Vec<Node> = list
                .content
                .iter()
                .flat_map(|item| item.content.iter().cloned())
                .collect();
            return CommandOutcome::Transaction(Transaction::new().replace_children(
                outer,
                index,
                index + 1,
                blocks,
            ));
        }

        let Some(index) = path.last_index() else {
            return CommandOutcome::None;
        };
        let Some(container) = path.parent() else {
            return CommandOutcome::None;
        };
        let Ok(item) = state
            .schema
            .node_of(item_name, Attrs::new(), vec![block.clone()])
        else {
            return CommandOutcome::None;
        };
        let Ok(list) = state.schema.node_of(list_name, Attrs::new(), vec![item]) else {
            return CommandOutcome::None;
        };
        CommandOutcome::Transaction(Transaction::new().replace_children(
            container,
            index,
            index + 1,
            vec![list],
        ))
    })
}

/// Insert a leaf node of the given type: inline nodes replace the
/// selection, block nodes land after the selection's textblock.
pub fn insert_block(node_name: &'static str) -> Command {
    Rc::new(move |state, attrs| {
        let Ok(node) = state.schema.node_of(node_name, attrs.clone(), vec![]) else {
            return CommandOutcome::None;
        };
        let inline = state
            .schema
            .nodes
            .get(node_name)
            .map(|t| t.is_inline())
            .unwrap_or(false);
        if inline {
            return CommandOutcome::Transaction(
                Transaction::new().replace_selection(vec![node]),
            );
        }

        match selection_textblock(state) {
            Some((path, _)) => {
                let Some(index) = path.last_index() else {
                    return CommandOutcome::None;
                };
                let Some(container) = path.parent() else {
                    return CommandOutcome::None;
                };
                CommandOutcome::Transaction(Transaction::new().replace_children(
                    container,
                    index + 1,
                    index + 1,
                    vec![node],
                ))
            }
            None => CommandOutcome::Transaction(
                Transaction::new().replace_selection(vec![node]),
            ),
        }
    })
}

/// A command that surfaces an editor-level event.
pub fn event_command(event: EditorEvent) -> Command {
    Rc::new(move |_state, _attrs| CommandOutcome::Event(event.clone()))
}
