//! Node-view lifecycle through the full editor: creation on first
//! appearance, update on compatible replacement, destruction on type
//! change, and the read-only selection rules.

use serde_json::json;
use vellum_editor::{
    attrs, Editor, EditorCallbacks, EditorOptions, EmbedDescriptor, Fragment, Node, NodePath,
    Selection, Transaction,
};

fn editor() -> Editor {
    Editor::new(
        EditorOptions {
            embeds: vec![EmbedDescriptor::new("Video", r"^https://video\.example\.com/")],
            ..Default::default()
        },
        EditorCallbacks::default(),
    )
    .unwrap()
}

fn insert_image(editor: &mut Editor) -> NodePath {
    editor
        .command("image", &attrs([("src", json!("cat.png"))]))
        .unwrap();
    NodePath::new(vec![0, 0])
}

fn first_child_attr(fragment: &Fragment, key: &str) -> Option<String> {
    let Fragment::Element { children, .. } = fragment else {
        return None;
    };
    children[0].attr(key).map(str::to_string)
}

#[test]
fn test_binding_created_when_node_enters_the_tree() {
    let mut editor = editor();
    let path = insert_image(&mut editor);

    assert_eq!(editor.view().bindings().len(), 1);
    assert!(editor.view().binding_at(&path).is_some());

    let fragments = editor.render();
    assert_eq!(fragments.len(), 1);
    // Inline node views render into a span surface.
    assert_eq!(fragments[0].tag(), Some("span"));
    assert_eq!(first_child_attr(&fragments[0], "src"), Some("cat.png".into()));
}

#[test]
fn test_compatible_replacement_updates_in_place() {
    let mut editor = editor();
    let path = insert_image(&mut editor);
    let id = editor.view().binding_at(&path).unwrap();

    editor
        .dispatch(
            Transaction::new()
                .set_node_attrs(path.clone(), attrs([("src", json!("dog.png"))])),
        )
        .unwrap();

    // Same binding, deferred re-render with the replacement node.
    assert_eq!(editor.view().binding_at(&path), Some(id));
    let fragments = editor.render();
    assert_eq!(first_child_attr(&fragments[0], "src"), Some("dog.png".into()));
}

#[test]
fn test_binding_update_never_renders_stale_data() {
    let mut editor = editor();
    let path = insert_image(&mut editor);

    // Two updates before a single flush: only the latest may render.
    editor
        .dispatch(Transaction::new().set_node_attrs(path.clone(), attrs([("src", json!("a.png"))])))
        .unwrap();
    editor
        .dispatch(Transaction::new().set_node_attrs(path.clone(), attrs([("src", json!("b.png"))])))
        .unwrap();

    let fragments = editor.render();
    assert_eq!(first_child_attr(&fragments[0], "src"), Some("b.png".into()));
}

#[test]
fn test_type_change_destroys_and_recreates() {
    let mut editor = editor();
    let path = insert_image(&mut editor);
    let image_id = editor.view().binding_at(&path).unwrap();

    // Replace the paragraph's image child with an embed block at the
    // document level.
    let embed = {
        let state = editor.state();
        state
            .schema
            .node_of(
                "embed",
                attrs([("href", json!("https://video.example.com/v/9"))]),
                vec![],
            )
            .unwrap()
    };
    editor
        .dispatch(Transaction::new().replace_children(NodePath::root(), 0, 1, vec![embed]))
        .unwrap();

    let embed_path = NodePath::new(vec![0]);
    let embed_id = editor.view().binding_at(&embed_path).unwrap();
    assert_ne!(embed_id, image_id);
    assert!(!editor.view().bindings().contains(image_id));

    let fragments = editor.render();
    assert_eq!(fragments.len(), 1);
    // Block node views render into a div surface.
    assert_eq!(fragments[0].tag(), Some("div"));
    assert_eq!(
        first_child_attr(&fragments[0], "src"),
        Some("https://video.example.com/v/9".into())
    );
}

#[test]
fn test_node_selection_selects_the_binding() {
    let mut editor = editor();
    let path = insert_image(&mut editor);
    let id = editor.view().binding_at(&path).unwrap();

    editor
        .dispatch(Transaction::new().set_selection(Selection::node(path.clone())))
        .unwrap();
    assert!(editor.view().bindings().get(id).unwrap().is_selected());

    let fragments = editor.render();
    assert_eq!(first_child_attr(&fragments[0], "class"), Some("selected".into()));

    // Moving the selection away deselects.
    editor
        .dispatch(Transaction::new().set_selection(Selection::caret(NodePath::new(vec![0]), 0)))
        .unwrap();
    assert!(!editor.view().bindings().get(id).unwrap().is_selected());
}

#[test]
fn test_read_only_selection_requests_are_ignored() {
    let mut editor = editor();
    let path = insert_image(&mut editor);
    let id = editor.view().binding_at(&path).unwrap();
    editor.render();

    editor.set_read_only(true);
    editor
        .dispatch(Transaction::new().set_selection(Selection::node(path.clone())))
        .unwrap();

    let bindings = editor.view().bindings();
    assert!(!bindings.get(id).unwrap().is_selected());
    assert_eq!(
        bindings.pending_count(),
        0,
        "no re-render may be scheduled by an ignored selection"
    );
}

#[test]
fn test_destroyed_binding_ignores_late_deferred_render() {
    let mut editor = editor();
    let path = insert_image(&mut editor);
    let id = editor.view().binding_at(&path).unwrap();
    editor.render();

    // Remove the image; its binding is destroyed and any pending render
    // for it is cancelled.
    editor
        .dispatch(Transaction::new().replace_children(NodePath::new(vec![0]), 0, 1, vec![]))
        .unwrap();
    assert!(!editor.view().bindings().contains(id));

    let fragments = editor.render();
    assert!(fragments.is_empty(), "fragment must not be reanimated");
}

#[test]
fn test_stop_event_and_ignore_mutation() {
    let mut editor = editor();
    let path = insert_image(&mut editor);
    let id = editor.view().binding_at(&path).unwrap();

    let binding = editor.view().bindings().get(id).unwrap();
    assert!(binding.stop_event());
    assert!(binding.ignore_mutation());
}

#[test]
fn test_get_pos_tracks_the_node_and_expires() {
    let mut editor = editor();
    let path = insert_image(&mut editor);

    // The image starts as paragraph child 0; inserting a node before it
    // shifts its path, which the next render observes via get_pos.
    editor
        .dispatch(Transaction::new().replace_children(
            NodePath::new(vec![0]),
            0,
            0,
            vec![Node::text("lead ")],
        ))
        .unwrap();

    let moved = NodePath::new(vec![0, 1]);
    assert!(editor.view().binding_at(&moved).is_some());
    assert!(editor.view().binding_at(&path).is_none());
}
