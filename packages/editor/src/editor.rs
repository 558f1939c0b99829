//! The editor orchestrator.
//!
//! Owns the fixed initialization chain (extensions → schema → codec →
//! state → view → commands), the transaction-dispatch hook that
//! re-enters on every document mutation, and the document-level
//! commands external callers invoke.

use std::collections::HashMap;
use std::rc::Rc;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use once_cell::sync::Lazy;
use regex::Regex;

use vellum_doc::{
    Attrs, EditorState, Node, Plugin, Selection, Step, Transaction,
};
use vellum_markdown::{MarkdownParser, MarkdownSerializer, ParserRules, SerializeError};

use crate::commands::{CommandOutcome, CommandTable, EditorEvent, InputRule, InputRuleMatch};
use crate::error::EditorError;
use crate::extension::{Extension, ExtensionContext};
use crate::fragment::Fragment;
use crate::manager::ExtensionManager;
use crate::marks::{CodeInline, Em, Highlight, Link, Strikethrough, Strong, Underline};
use crate::nodes::{
    Blockquote, BulletList, CheckboxItem, CheckboxList, CodeFence, Doc, Embed, EmbedDescriptor,
    HardBreak, Heading as HeadingExtension, HorizontalRule, Image, ListItem, OrderedList,
    Paragraph, Text,
};
use crate::plugins::{Keys, MaxLength, Placeholder, SmartText, TrailingNode};
use crate::slug;
use crate::view::EditorView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Auto,
    Ltr,
    Rtl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastType {
    Error,
    Info,
}

/// One entry of [`Editor::get_headings`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heading {
    pub title: String,
    pub level: u8,
    pub id: String,
}

/// The serialized document, computed only if the change handler asks.
pub struct LazyValue<'a> {
    serializer: &'a MarkdownSerializer,
    doc: &'a Node,
}

impl LazyValue<'_> {
    pub fn get(&self) -> Result<String, SerializeError> {
        self.serializer.serialize(self.doc)
    }
}

/// Caller-supplied notification channels. Fallible callbacks surface
/// their failures on the toast channel, never as errors out of the
/// dispatch hook.
#[derive(Default)]
pub struct EditorCallbacks {
    pub on_change: Option<Box<dyn FnMut(LazyValue<'_>)>>,
    pub on_save: Option<Box<dyn FnMut(bool)>>,
    pub on_cancel: Option<Box<dyn FnMut()>>,
    pub on_focus: Option<Box<dyn FnMut()>>,
    pub on_blur: Option<Box<dyn FnMut()>>,
    pub on_show_toast: Option<Box<dyn FnMut(&str, ToastType)>>,
    pub on_scroll_to_anchor: Option<Box<dyn FnMut(&str) -> Result<(), String>>>,
}

pub struct EditorOptions {
    pub default_value: String,
    pub placeholder: String,
    pub read_only: bool,
    /// Checkbox toggles still notify the change handler in an otherwise
    /// read-only document.
    pub read_only_write_checkboxes: bool,
    pub dir: Direction,
    pub max_length: Option<usize>,
    pub embeds: Vec<EmbedDescriptor>,
    /// Extensions excluded from composition entirely, by name.
    pub disable_extensions: Vec<String>,
    /// Caller extensions, appended after the built-in set.
    pub extensions: Vec<Rc<dyn Extension>>,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            default_value: String::new(),
            placeholder: "Write something nice…".to_string(),
            read_only: false,
            read_only_write_checkboxes: false,
            dir: Direction::Auto,
            max_length: None,
            embeds: Vec::new(),
            disable_extensions: Vec::new(),
            extensions: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
struct FocusState {
    is_editor_focused: bool,
    selection_menu_open: bool,
    link_menu_open: bool,
    block_menu_open: bool,
    is_blurred: bool,
}

impl FocusState {
    fn any_focused(&self) -> bool {
        self.is_editor_focused
            || self.selection_menu_open
            || self.link_menu_open
            || self.block_menu_open
    }
}

pub struct Editor {
    read_only: bool,
    read_only_write_checkboxes: bool,
    dir: Direction,
    plugins: Vec<std::sync::Arc<dyn Plugin>>,
    keymap: indexmap::IndexMap<String, crate::commands::Command>,
    serializer: MarkdownSerializer,
    parser: MarkdownParser,
    paste_parser: MarkdownParser,
    input_rules: Vec<InputRule>,
    commands: CommandTable,
    view: EditorView,
    callbacks: EditorCallbacks,
    focus: FocusState,
    is_rtl: bool,
    needs_render: bool,
}

impl Editor {
    /// Build an editor instance. The chain is ordered: extensions →
    /// nodes/marks → schema → plugins/rule plugins → keymaps →
    /// serializer → parsers → input rules → node views → view →
    /// commands. Each stage depends only on earlier ones; composition
    /// failures abort before any view exists.
    pub fn new(options: EditorOptions, callbacks: EditorCallbacks) -> Result<Self, EditorError> {
        let EditorOptions {
            default_value,
            placeholder,
            read_only,
            read_only_write_checkboxes,
            dir,
            max_length,
            embeds,
            disable_extensions,
            extensions: extra_extensions,
        } = options;

        let mut extensions = built_in_extensions(&placeholder, max_length, embeds);
        extensions.extend(extra_extensions);

        let manager = ExtensionManager::new(extensions, &disable_extensions)?;
        let schema = manager.schema()?;
        let plugins = manager.plugins();
        let rule_plugins = manager.rule_plugins();

        let ctx = ExtensionContext {
            schema: schema.clone(),
        };
        let mut keymap = indexmap::IndexMap::new();
        for binding in manager.keymaps(&ctx) {
            // Later bindings shadow earlier ones for the same chord.
            keymap.insert(binding.key, binding.run);
        }

        let serializer = manager.serializer();
        let parser = manager.parser(schema.clone(), None, rule_plugins.clone());
        let paste_parser = manager.parser(
            schema.clone(),
            Some(ParserRules::new().with_rule("linkify", true)),
            rule_plugins,
        );
        let input_rules = manager.input_rules(&ctx);
        let node_views = manager.node_views();

        let doc = parser.parse(&default_value)?;
        let state = EditorState::new(schema, doc);
        let view = EditorView::new(state, !read_only, node_views, plugins.clone());
        let commands = manager.commands(&ctx);

        let mut editor = Self {
            read_only,
            read_only_write_checkboxes,
            dir,
            plugins,
            keymap,
            serializer,
            parser,
            paste_parser,
            input_rules,
            commands,
            view,
            callbacks,
            focus: FocusState {
                is_blurred: true,
                ..FocusState::default()
            },
            is_rtl: false,
            needs_render: true,
        };
        editor.calculate_dir();
        Ok(editor)
    }

    pub fn view(&self) -> &EditorView {
        &self.view
    }

    pub fn state(&self) -> &EditorState {
        self.view.state()
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn is_rtl(&self) -> bool {
        self.is_rtl
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
        self.view.set_editable(!read_only);
        self.request_render();
    }

    /// The transaction-dispatch hook, invoked once per mutation, never
    /// concurrently: apply, swap state, reconcile node views, notify
    /// the change handler when appropriate, recompute directionality,
    /// and always request a re-render.
    pub fn dispatch(&mut self, tr: Transaction) -> Result<(), EditorError> {
        let result = self.view.state().apply_transaction(tr, &self.plugins)?;
        let doc_changed = result.transactions.iter().any(Transaction::doc_changed);
        let checkbox_edit = result
            .transactions
            .iter()
            .any(|tr| is_checkbox_edit(tr, &result.state));

        self.view.update_state(result.state);

        if doc_changed
            && (!self.read_only || (self.read_only_write_checkboxes && checkbox_edit))
        {
            let serializer = &self.serializer;
            let doc = &self.view.state().doc;
            if let Some(on_change) = self.callbacks.on_change.as_mut() {
                on_change(LazyValue { serializer, doc });
            }
        }

        self.calculate_dir();
        self.request_render();
        Ok(())
    }

    /// The current document as markdown.
    pub fn value(&self) -> Result<String, EditorError> {
        Ok(self.serializer.serialize(&self.view.state().doc)?)
    }

    /// Replace the document from markdown (external value updates).
    pub fn set_value(&mut self, value: &str) -> Result<(), EditorError> {
        let doc = self.parser.parse(value)?;
        let schema = self.view.state().schema.clone();
        self.view.update_state(EditorState::new(schema, doc));
        self.calculate_dir();
        self.request_render();
        Ok(())
    }

    /// Parse pasted markdown with the paste parser (autolinking on) and
    /// splice it in at the selection.
    pub fn paste_markdown(&mut self, text: &str) -> Result<(), EditorError> {
        if self.read_only {
            return Ok(());
        }
        let parsed = self.paste_parser.parse(text)?;
        self.dispatch(Transaction::new().replace_selection(parsed.content))
    }

    /// Run a named command from the composed table.
    pub fn command(&mut self, name: &str, attrs: &Attrs) -> Result<bool, EditorError> {
        let command = self
            .commands
            .get(name)
            .cloned()
            .ok_or_else(|| EditorError::UnknownCommand(name.to_string()))?;
        let outcome = command(self.view.state(), attrs);
        self.apply_outcome(outcome)
    }

    pub fn command_names(&self) -> Vec<String> {
        self.commands.keys().cloned().collect()
    }

    pub fn keymap_keys(&self) -> Vec<String> {
        self.keymap.keys().cloned().collect()
    }

    /// Run the command bound to a key chord, if any.
    pub fn handle_key(&mut self, key: &str) -> Result<bool, EditorError> {
        if self.read_only {
            return Ok(false);
        }
        let Some(command) = self.keymap.get(key).cloned() else {
            return Ok(false);
        };
        let outcome = command(self.view.state(), &Attrs::new());
        self.apply_outcome(outcome)
    }

    /// Insert typed text at the caret, then apply input rules against
    /// the textblock's trailing text.
    pub fn insert_text(&mut self, text: &str) -> Result<(), EditorError> {
        if self.read_only {
            return Ok(());
        }
        let Some(tr) = self.typing_transaction(text) else {
            return Ok(());
        };
        self.dispatch(tr)?;

        if let Some(tr) = self.match_input_rules() {
            self.dispatch(tr)?;
        }
        Ok(())
    }

    pub fn focus_at_start(&mut self) -> Result<(), EditorError> {
        let selection = {
            let state = self.view.state();
            Selection::at_start(&state.doc, &state.schema)
        };
        self.dispatch(Transaction::new().set_selection(selection))?;
        self.handle_editor_focus();
        Ok(())
    }

    pub fn focus_at_end(&mut self) -> Result<(), EditorError> {
        let selection = {
            let state = self.view.state();
            Selection::at_end(&state.doc, &state.schema)
        };
        self.dispatch(Transaction::new().set_selection(selection))?;
        self.handle_editor_focus();
        Ok(())
    }

    /// Ordered headings with collision-free anchor ids.
    pub fn get_headings(&self) -> Vec<Heading> {
        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut headings = Vec::new();

        self.view.state().doc.descendants(&mut |node, _path| {
            if node.type_name != "heading" {
                return;
            }
            let base = slug::heading_to_slug(node, 0);
            let count = seen.entry(base.clone()).or_insert(0);
            let id = if *count > 0 {
                slug::heading_to_slug(node, *count)
            } else {
                base
            };
            *count += 1;

            let level = node.attr("level").and_then(Value::as_u64).unwrap_or(1) as u8;
            headings.push(Heading {
                title: node.text_content(),
                level,
                id,
            });
        });
        headings
    }

    /// Ask the host to scroll to an anchor. Invalid targets are logged
    /// and ignored; a failing host callback becomes a toast.
    pub fn scroll_to_anchor(&mut self, hash: &str) {
        static ANCHOR: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"^#[A-Za-z][A-Za-z0-9_-]*$").unwrap());

        if hash.is_empty() {
            return;
        }
        if !ANCHOR.is_match(hash) {
            warn!(hash, "attempted to scroll to invalid anchor");
            return;
        }
        let result = match self.callbacks.on_scroll_to_anchor.as_mut() {
            Some(scroll) => scroll(hash),
            None => Ok(()),
        };
        if let Err(message) = result {
            warn!(hash, %message, "scroll callback failed");
            self.show_toast(&message, ToastType::Error);
        }
    }

    pub fn show_toast(&mut self, message: &str, toast_type: ToastType) {
        if let Some(on_show_toast) = self.callbacks.on_show_toast.as_mut() {
            on_show_toast(message, toast_type);
        }
    }

    /// Whether a re-render has been requested since the last `render`.
    pub fn needs_render(&self) -> bool {
        self.needs_render
    }

    /// The cooperative render tick: flush deferred node-view renders and
    /// compose every live binding's fragment in insertion order.
    pub fn render(&mut self) -> Vec<Fragment> {
        self.needs_render = false;
        self.view.render()
    }

    /// Tear the instance down: destroy all bindings and clear the
    /// document to empty.
    pub fn destroy(&mut self) {
        self.view.destroy();
        let schema = self.view.state().schema.clone();
        let empty = EditorState::new(schema.clone(), schema.empty_doc());
        self.view.update_state(empty);
        self.request_render();
    }

    // Focus bookkeeping. The blurred flag tracks the union of editor
    // focus and the open auxiliary surfaces; callbacks fire on edges.

    pub fn handle_editor_focus(&mut self) {
        self.focus.is_editor_focused = true;
        self.update_blurred();
    }

    pub fn handle_editor_blur(&mut self) {
        self.focus.is_editor_focused = false;
        self.update_blurred();
    }

    pub fn open_link_menu(&mut self) {
        self.focus.block_menu_open = false;
        self.focus.link_menu_open = true;
        self.update_blurred();
        self.request_render();
    }

    pub fn close_link_menu(&mut self) {
        self.focus.link_menu_open = false;
        self.update_blurred();
        self.request_render();
    }

    pub fn open_block_menu(&mut self) {
        self.focus.block_menu_open = true;
        self.update_blurred();
        self.request_render();
    }

    pub fn close_block_menu(&mut self) {
        self.focus.block_menu_open = false;
        self.update_blurred();
        self.request_render();
    }

    pub fn is_blurred(&self) -> bool {
        self.focus.is_blurred
    }

    fn update_blurred(&mut self) {
        let focused = self.focus.any_focused();
        if self.focus.is_blurred && focused {
            self.focus.is_blurred = false;
            if let Some(on_focus) = self.callbacks.on_focus.as_mut() {
                on_focus();
            }
        } else if !self.focus.is_blurred && !focused {
            self.focus.is_blurred = true;
            if let Some(on_blur) = self.callbacks.on_blur.as_mut() {
                on_blur();
            }
        }
    }

    fn apply_outcome(&mut self, outcome: CommandOutcome) -> Result<bool, EditorError> {
        match outcome {
            CommandOutcome::Transaction(tr) => {
                self.dispatch(tr)?;
                Ok(true)
            }
            CommandOutcome::Event(event) => {
                self.handle_event(event);
                Ok(true)
            }
            CommandOutcome::None => Ok(false),
        }
    }

    fn handle_event(&mut self, event: EditorEvent) {
        debug!(?event, "editor event");
        match event {
            EditorEvent::Save { done } => {
                if let Some(on_save) = self.callbacks.on_save.as_mut() {
                    on_save(done);
                }
            }
            EditorEvent::Cancel => {
                if let Some(on_cancel) = self.callbacks.on_cancel.as_mut() {
                    on_cancel();
                }
            }
            EditorEvent::Focus => self.handle_editor_focus(),
            EditorEvent::Blur => self.handle_editor_blur(),
            EditorEvent::OpenLinkMenu => self.open_link_menu(),
        }
    }

    fn request_render(&mut self) {
        self.needs_render = true;
    }

    fn calculate_dir(&mut self) {
        self.is_rtl = match self.dir {
            Direction::Rtl => true,
            Direction::Ltr => false,
            Direction::Auto => detect_rtl(&self.view.state().doc),
        };
    }

    fn typing_transaction(&self, text: &str) -> Option<Transaction> {
        let state = self.view.state();
        if let Selection::Text { parent, from, to } = &state.selection {
            if from == to && *from > 0 {
                let parent_node = state.doc.node_at(parent)?;
                if let Some(prev) = parent_node.child(from - 1) {
                    if prev.is_text() && prev.marks.is_empty() {
                        let len = prev.text.as_ref()?.chars().count();
                        return Some(Transaction::new().replace_text(
                            parent.child(from - 1),
                            len,
                            len,
                            text.to_string(),
                        ));
                    }
                }
            }
        }
        Some(Transaction::new().replace_selection(vec![Node::text(text)]))
    }

    fn match_input_rules(&self) -> Option<Transaction> {
        let state = self.view.state();
        let Selection::Text { parent, from, to } = &state.selection else {
            return None;
        };
        if from != to {
            return None;
        }
        let caret = *from;
        let parent_node = state.doc.node_at(parent)?;
        if !state.schema.is_textblock(parent_node) {
            return None;
        }

        let mut run_start = caret;
        while run_start > 0
            && parent_node
                .child(run_start - 1)
                .map(Node::is_text)
                .unwrap_or(false)
        {
            run_start -= 1;
        }
        if run_start == caret {
            return None;
        }
        let text: String = parent_node.content[run_start..caret]
            .iter()
            .filter_map(|c| c.text.clone())
            .collect();

        for rule in &self.input_rules {
            let Some(captures) = rule.pattern.captures(&text) else {
                continue;
            };
            let matched = captures.get(0)?;
            if matched.end() != text.len() {
                continue;
            }
            let rule_match = InputRuleMatch {
                parent: parent.clone(),
                caret,
                run_start,
                text: text.clone(),
                start: text[..matched.start()].chars().count(),
                captures: captures
                    .iter()
                    .map(|c| c.map(|m| m.as_str().to_string()))
                    .collect(),
            };
            if let Some(tr) = (rule.handler)(state, &rule_match) {
                return Some(tr);
            }
        }
        None
    }
}

/// The built-in extension list, in composition order. Caller
/// extensions are appended after these.
fn built_in_extensions(
    placeholder: &str,
    max_length: Option<usize>,
    embeds: Vec<EmbedDescriptor>,
) -> Vec<Rc<dyn Extension>> {
    vec![
        Rc::new(Doc),
        Rc::new(HardBreak),
        Rc::new(Paragraph),
        Rc::new(Blockquote),
        Rc::new(CodeFence),
        Rc::new(Text),
        Rc::new(CheckboxList),
        Rc::new(CheckboxItem),
        Rc::new(BulletList),
        Rc::new(Embed::new(embeds)),
        Rc::new(ListItem),
        Rc::new(HeadingExtension),
        Rc::new(HorizontalRule),
        Rc::new(Image),
        Rc::new(Strong),
        Rc::new(CodeInline),
        Rc::new(Highlight),
        Rc::new(Em),
        Rc::new(Underline),
        Rc::new(Link),
        Rc::new(Strikethrough),
        Rc::new(OrderedList),
        Rc::new(TrailingNode),
        Rc::new(SmartText),
        Rc::new(Keys),
        Rc::new(Placeholder::new(placeholder)),
        Rc::new(MaxLength::new(max_length)),
    ]
}

fn is_checkbox_edit(tr: &Transaction, new_state: &EditorState) -> bool {
    tr.steps.iter().any(|step| match step {
        Step::ReplaceSelection { content } | Step::ReplaceChildren { content, .. } => content
            .first()
            .map(|node| node.type_name == "checkbox_item")
            .unwrap_or(false),
        Step::SetNodeAttrs { path, .. } => new_state
            .doc
            .node_at(path)
            .map(|node| node.type_name == "checkbox_item")
            .unwrap_or(false),
        _ => false,
    })
}

fn detect_rtl(doc: &Node) -> bool {
    for ch in doc.text_content().chars() {
        if is_rtl_char(ch) {
            return true;
        }
        if ch.is_alphabetic() {
            return false;
        }
    }
    false
}

fn is_rtl_char(ch: char) -> bool {
    matches!(
        ch,
        '\u{0590}'..='\u{08FF}' | '\u{FB1D}'..='\u{FDFF}' | '\u{FE70}'..='\u{FEFF}'
    )
}
