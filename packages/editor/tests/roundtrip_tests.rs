//! Round-trip law: for documents built only from types declaring both
//! codec directions, parse(serialize(doc)) == doc up to attribute
//! defaults.

use vellum_editor::{Editor, EditorCallbacks, EditorOptions, EmbedDescriptor};

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

fn assert_round_trip(markdown: &str) {
    let mut first = editor();
    first.set_value(markdown).unwrap();
    let serialized = first.value().unwrap();

    let mut second = editor();
    second.set_value(&serialized).unwrap();

    assert_eq!(
        first.state().doc,
        second.state().doc,
        "round trip diverged for:\n{markdown}\nserialized:\n{serialized}"
    );
}

#[test]
fn test_round_trip_headings_and_paragraphs() {
    assert_round_trip("# Title\n\nSome opening text.\n\n## Section\n\nMore text here.");
}

#[test]
fn test_round_trip_inline_marks() {
    assert_round_trip(
        "Mixing **strong**, *emphasis*, `code`, ~~gone~~, __under__, ==bright== and \
         [links](https://example.com) inline.",
    );
}

#[test]
fn test_round_trip_lists() {
    assert_round_trip("- one\n- two\n- three");
    assert_round_trip("1. first\n2. second");
    assert_round_trip("- [x] done\n- [ ] todo");
}

#[test]
fn test_round_trip_blockquote_and_rule() {
    assert_round_trip("> quoted wisdom\n\n---\n\nafterword");
}

#[test]
fn test_round_trip_code_fence() {
    assert_round_trip("```rust\nlet x = 1;\nprintln!(\"{x}\");\n```");
}

#[test]
fn test_round_trip_images_and_embeds() {
    assert_round_trip("An inline ![kitten](cat.png) image.");
    assert_round_trip(
        "[https://video.example.com/v/1](https://video.example.com/v/1)",
    );
}

#[test]
fn test_round_trip_nested_structure() {
    assert_round_trip("> # Quoted heading\n>\n> - a\n> - b");
    assert_round_trip("- outer\n\n  - inner");
}

#[test]
fn test_serialized_output_is_stable() {
    // Serializing twice without edits yields the same text.
    let mut editor = editor();
    editor.set_value("# A\n\n- x\n- y\n\n> q").unwrap();
    let once = editor.value().unwrap();
    let twice = editor.value().unwrap();
    assert_eq!(once, twice);
}
