//! Integration tests for the editor crate

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;
use vellum_editor::{
    attrs, Attrs, Command, CommandOutcome, Direction, Editor, EditorCallbacks, EditorOptions,
    EditorState, Extension, ExtensionContext, NodePath, Selection, ToastType, Transaction,
};

fn editor_with(default_value: &str) -> Editor {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    Editor::new(
        EditorOptions {
            default_value: default_value.to_string(),
            ..Default::default()
        },
        EditorCallbacks::default(),
    )
    .unwrap()
}

#[test]
fn test_value_round_trips_the_default_value() {
    let editor = editor_with("# Title\n\nHello **bold** text");
    assert_eq!(editor.value().unwrap(), "# Title\n\nHello **bold** text");
}

#[test]
fn test_composition_is_deterministic() {
    let a = editor_with("# Title");
    let b = editor_with("# Title");

    let nodes_a: Vec<_> = a.state().schema.nodes.keys().cloned().collect();
    let nodes_b: Vec<_> = b.state().schema.nodes.keys().cloned().collect();
    assert_eq!(nodes_a, nodes_b);
    assert_eq!(a.command_names(), b.command_names());
    assert_eq!(a.keymap_keys(), b.keymap_keys());
}

#[test]
fn test_disabling_an_extension_removes_every_trace() {
    let options = EditorOptions {
        disable_extensions: vec!["strong".to_string()],
        ..Default::default()
    };
    let disabled = Editor::new(options, EditorCallbacks::default()).unwrap();

    assert!(!disabled.state().schema.marks.contains_key("strong"));
    assert!(!disabled.command_names().contains(&"strong".to_string()));
    assert!(!disabled.keymap_keys().contains(&"Mod-b".to_string()));

    // Re-enabling restores all of it.
    let enabled = editor_with("");
    assert!(enabled.state().schema.marks.contains_key("strong"));
    assert!(enabled.command_names().contains(&"strong".to_string()));
    assert!(enabled.keymap_keys().contains(&"Mod-b".to_string()));
}

#[test]
fn test_parsing_a_disabled_type_fails_loudly() {
    let options = EditorOptions {
        default_value: "**bold**".to_string(),
        disable_extensions: vec!["strong".to_string()],
        ..Default::default()
    };
    assert!(Editor::new(options, EditorCallbacks::default()).is_err());
}

struct RecordingSave {
    name: &'static str,
    tag: &'static str,
    log: Rc<RefCell<Vec<&'static str>>>,
}

impl Extension for RecordingSave {
    fn name(&self) -> &str {
        self.name
    }

    fn commands(&self, _ctx: &ExtensionContext) -> Vec<(String, Command)> {
        let tag = self.tag;
        let log = self.log.clone();
        vec![(
            "save".to_string(),
            Rc::new(move |_state: &EditorState, _attrs: &Attrs| {
                log.borrow_mut().push(tag);
                CommandOutcome::None
            }) as Command,
        )]
    }
}

#[test]
fn test_later_extension_wins_command_conflicts() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let options = EditorOptions {
        extensions: vec![
            Rc::new(RecordingSave {
                name: "save_first",
                tag: "first",
                log: log.clone(),
            }) as Rc<dyn Extension>,
            Rc::new(RecordingSave {
                name: "save_second",
                tag: "second",
                log: log.clone(),
            }) as Rc<dyn Extension>,
        ],
        ..Default::default()
    };
    let mut editor = Editor::new(options, EditorCallbacks::default()).unwrap();

    editor.command("save", &Attrs::new()).unwrap();
    assert_eq!(*log.borrow(), vec!["second"]);
}

#[test]
fn test_dispatch_notifies_change_handler_lazily() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let callbacks = EditorCallbacks {
        on_change: Some(Box::new(move |value| {
            sink.borrow_mut().push(value.get().unwrap());
        })),
        ..Default::default()
    };
    let mut editor = Editor::new(
        EditorOptions {
            default_value: "hello".to_string(),
            ..Default::default()
        },
        callbacks,
    )
    .unwrap();

    // A selection-only transaction must not notify.
    editor.focus_at_end().unwrap();
    assert!(seen.borrow().is_empty());

    let tr = Transaction::new().replace_text(NodePath::new(vec![0, 0]), 5, 5, " world".into());
    editor.dispatch(tr).unwrap();
    assert_eq!(*seen.borrow(), vec!["hello world".to_string()]);
}

#[test]
fn test_read_only_suppresses_change_notification() {
    let changes = Rc::new(RefCell::new(0));
    let sink = changes.clone();
    let callbacks = EditorCallbacks {
        on_change: Some(Box::new(move |_value| {
            *sink.borrow_mut() += 1;
        })),
        ..Default::default()
    };
    let mut editor = Editor::new(
        EditorOptions {
            default_value: "hello".to_string(),
            read_only: true,
            ..Default::default()
        },
        callbacks,
    )
    .unwrap();

    let tr = Transaction::new().replace_text(NodePath::new(vec![0, 0]), 0, 5, "bye".into());
    editor.dispatch(tr).unwrap();
    assert_eq!(*changes.borrow(), 0);
}

#[test]
fn test_checkbox_toggle_is_the_read_only_exception() {
    let changes = Rc::new(RefCell::new(0));
    let sink = changes.clone();
    let callbacks = EditorCallbacks {
        on_change: Some(Box::new(move |_value| {
            *sink.borrow_mut() += 1;
        })),
        ..Default::default()
    };
    let mut editor = Editor::new(
        EditorOptions {
            default_value: "- [ ] todo\n- [x] done".to_string(),
            read_only: true,
            read_only_write_checkboxes: true,
            ..Default::default()
        },
        callbacks,
    )
    .unwrap();

    let item = NodePath::new(vec![0, 0]);
    assert_eq!(
        editor.state().doc.node_at(&item).unwrap().type_name,
        "checkbox_item"
    );

    let tr = Transaction::new().set_node_attrs(item, attrs([("checked", json!(true))]));
    editor.dispatch(tr).unwrap();
    assert_eq!(*changes.borrow(), 1);
}

#[test]
fn test_get_headings_disambiguates_slugs() {
    let editor = editor_with("# Intro\n\n# Intro\n\n# Intro\n\n## Details");
    let headings = editor.get_headings();

    let ids: Vec<_> = headings.iter().map(|h| h.id.as_str()).collect();
    assert_eq!(ids, vec!["intro", "intro-1", "intro-2", "details"]);
    assert_eq!(headings[3].level, 2);
    assert_eq!(headings[0].title, "Intro");
}

#[test]
fn test_heading_input_rule() {
    let mut editor = editor_with("");
    editor.insert_text("# ").unwrap();
    editor.insert_text("Title").unwrap();

    assert_eq!(editor.state().doc.child(0).unwrap().type_name, "heading");
    assert_eq!(editor.value().unwrap(), "# Title");
}

#[test]
fn test_smart_text_input_rule() {
    let mut editor = editor_with("");
    editor.insert_text("wait").unwrap();
    editor.insert_text("--").unwrap();

    assert_eq!(editor.state().doc.text_content(), "wait—");
}

#[test]
fn test_mark_input_rule() {
    let mut editor = editor_with("");
    editor.insert_text("some **bold**").unwrap();

    let paragraph = editor.state().doc.child(0).unwrap();
    let marked = paragraph
        .content
        .iter()
        .find(|child| child.has_mark("strong"))
        .unwrap();
    assert_eq!(marked.text.as_deref(), Some("bold"));
    assert_eq!(editor.value().unwrap(), "some **bold**");
}

#[test]
fn test_toggle_mark_command() {
    let mut editor = editor_with("hello");
    editor
        .dispatch(Transaction::new().set_selection(Selection::Text {
            parent: NodePath::new(vec![0]),
            from: 0,
            to: 1,
        }))
        .unwrap();

    editor.command("strong", &Attrs::new()).unwrap();
    assert_eq!(editor.value().unwrap(), "**hello**");

    editor.command("strong", &Attrs::new()).unwrap();
    assert_eq!(editor.value().unwrap(), "hello");
}

#[test]
fn test_key_chord_runs_bound_command() {
    let mut editor = editor_with("hello");
    editor
        .dispatch(Transaction::new().set_selection(Selection::Text {
            parent: NodePath::new(vec![0]),
            from: 0,
            to: 1,
        }))
        .unwrap();

    assert!(editor.handle_key("Mod-b").unwrap());
    assert_eq!(editor.value().unwrap(), "**hello**");
    assert!(!editor.handle_key("Mod-x").unwrap());
}

#[test]
fn test_save_chord_fires_callback() {
    let saves = Rc::new(RefCell::new(Vec::new()));
    let sink = saves.clone();
    let callbacks = EditorCallbacks {
        on_save: Some(Box::new(move |done| sink.borrow_mut().push(done))),
        ..Default::default()
    };
    let mut editor = Editor::new(EditorOptions::default(), callbacks).unwrap();

    editor.handle_key("Mod-s").unwrap();
    editor.handle_key("Mod-Enter").unwrap();
    assert_eq!(*saves.borrow(), vec![false, true]);
}

#[test]
fn test_trailing_block_gets_a_paragraph_appended() {
    let mut editor = editor_with("some text");
    editor.command("hr", &Attrs::new()).unwrap();

    let doc = &editor.state().doc;
    assert_eq!(doc.child(1).unwrap().type_name, "horizontal_rule");
    assert_eq!(
        doc.content.last().unwrap().type_name,
        "paragraph",
        "trailing node plugin keeps a paragraph at the end"
    );
}

#[test]
fn test_max_length_filters_oversized_transactions() {
    let mut editor = Editor::new(
        EditorOptions {
            default_value: "abc".to_string(),
            max_length: Some(5),
            ..Default::default()
        },
        EditorCallbacks::default(),
    )
    .unwrap();

    editor.focus_at_end().unwrap();
    editor.insert_text("defghij").unwrap();
    assert_eq!(editor.state().doc.text_content(), "abc");

    editor.insert_text("de").unwrap();
    assert_eq!(editor.state().doc.text_content(), "abcde");
}

#[test]
fn test_focus_and_blur_fire_on_edges_of_the_surface_union() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let focus_log = log.clone();
    let blur_log = log.clone();
    let callbacks = EditorCallbacks {
        on_focus: Some(Box::new(move || focus_log.borrow_mut().push("focus"))),
        on_blur: Some(Box::new(move || blur_log.borrow_mut().push("blur"))),
        ..Default::default()
    };
    let mut editor = Editor::new(EditorOptions::default(), callbacks).unwrap();

    editor.handle_editor_focus();
    // Opening a menu while focused is not an edge.
    editor.open_link_menu();
    // Blurring the editor proper is not an edge while the menu is open.
    editor.handle_editor_blur();
    editor.close_link_menu();

    assert_eq!(*log.borrow(), vec!["focus", "blur"]);
}

#[test]
fn test_scroll_to_anchor_degrades_gracefully() {
    let toasts = Rc::new(RefCell::new(Vec::new()));
    let scrolls = Rc::new(RefCell::new(Vec::new()));
    let toast_sink = toasts.clone();
    let scroll_sink = scrolls.clone();
    let callbacks = EditorCallbacks {
        on_show_toast: Some(Box::new(move |message, toast_type| {
            toast_sink
                .borrow_mut()
                .push((message.to_string(), toast_type));
        })),
        on_scroll_to_anchor: Some(Box::new(move |hash| {
            scroll_sink.borrow_mut().push(hash.to_string());
            if hash == "#broken" {
                Err("element not found".to_string())
            } else {
                Ok(())
            }
        })),
        ..Default::default()
    };
    let mut editor = Editor::new(EditorOptions::default(), callbacks).unwrap();

    // Invalid selectors are ignored without reaching the host.
    editor.scroll_to_anchor("#1numeric");
    editor.scroll_to_anchor("not-a-hash");
    assert!(scrolls.borrow().is_empty());

    editor.scroll_to_anchor("#intro");
    assert_eq!(*scrolls.borrow(), vec!["#intro".to_string()]);
    assert!(toasts.borrow().is_empty());

    // A failing host callback surfaces as a toast, not an error.
    editor.scroll_to_anchor("#broken");
    assert_eq!(toasts.borrow().len(), 1);
    assert_eq!(toasts.borrow()[0].1, ToastType::Error);
}

#[test]
fn test_rtl_detection() {
    let rtl = editor_with("# שלום עולם");
    assert!(rtl.is_rtl());

    let ltr = editor_with("# Hello");
    assert!(!ltr.is_rtl());

    let forced = Editor::new(
        EditorOptions {
            default_value: "Hello".to_string(),
            dir: Direction::Rtl,
            ..Default::default()
        },
        EditorCallbacks::default(),
    )
    .unwrap();
    assert!(forced.is_rtl());
}

#[test]
fn test_paste_parser_linkifies() {
    let mut editor = editor_with("");
    editor
        .paste_markdown("see https://example.com for more")
        .unwrap();

    let mut found = false;
    editor.state().doc.descendants(&mut |node, _path| {
        if node.has_mark("link") {
            found = true;
        }
    });
    assert!(found, "pasted bare URL should carry a link mark");
}

#[test]
fn test_destroy_clears_document_and_bindings() {
    let mut editor = editor_with("# Title\n\nbody");
    editor.destroy();

    assert!(editor.view().bindings().is_empty());
    assert_eq!(editor.state().doc.child_count(), 1);
    assert_eq!(editor.state().doc.text_content(), "");
}
