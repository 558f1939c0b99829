use crate::commands::{event_command, Command, EditorEvent, KeyBinding};
use crate::extension::{Extension, ExtensionContext};

/// Editor-level chords: save, save-and-exit, cancel.
pub struct Keys;

impl Extension for Keys {
    fn name(&self) -> &str {
        "keys"
    }

    fn commands(&self, _ctx: &ExtensionContext) -> Vec<(String, Command)> {
        vec![(
            "save".to_string(),
            event_command(EditorEvent::Save { done: false }),
        )]
    }

    fn keys(&self, _ctx: &ExtensionContext) -> Vec<KeyBinding> {
        vec![
            KeyBinding::new("Mod-s", event_command(EditorEvent::Save { done: false })),
            KeyBinding::new("Mod-Enter", event_command(EditorEvent::Save { done: true })),
            KeyBinding::new("Escape", event_command(EditorEvent::Cancel)),
        ]
    }
}
