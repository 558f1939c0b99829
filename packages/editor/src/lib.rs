//! # Vellum Editor
//!
//! The editing core: extension composition plus the node-view bridge.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ extensions: capability bundles              │
//! │  (schema, codec rules, commands, keys,      │
//! │   input rules, plugins, node views)         │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ manager: ordered fold → schema, codec,      │
//! │  command table, keymaps, plugin pipeline    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: init chain + dispatch hook          │
//! │ view: node-view bindings kept in sync with  │
//! │  the immutable document state               │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Capability polymorphism**: an extension is whatever implements
//!    [`Extension`]; its kind follows from what it contributes.
//! 2. **Order is the contract**: list order decides precedence for
//!    conflicting commands and key chords (later wins).
//! 3. **One dispatch path**: every mutation flows through
//!    [`Editor::dispatch`]; node views, change notification, direction
//!    and re-rendering all hang off it.

pub mod commands;
pub mod editor;
pub mod error;
pub mod extension;
pub mod fragment;
pub mod manager;
pub mod marks;
pub mod node_view;
pub mod nodes;
pub mod plugins;
pub mod slug;
pub mod view;

pub use commands::{
    Command, CommandOutcome, CommandTable, EditorEvent, InputRule, InputRuleMatch, KeyBinding,
};
pub use editor::{
    Direction, Editor, EditorCallbacks, EditorOptions, Heading, LazyValue, ToastType,
};
pub use error::{CompositionError, EditorError};
pub use extension::{
    Extension, ExtensionContext, ExtensionKind, MarkdownRule, SchemaContribution,
};
pub use fragment::Fragment;
pub use manager::ExtensionManager;
pub use node_view::{
    BindingId, NodeViewBinding, NodeViewContext, NodeViewRegistry, NodeViewRenderer,
};
pub use nodes::EmbedDescriptor;
pub use view::{EditorView, NodeViewFactory};

// Re-export the collaborator crates' common types for convenience.
pub use vellum_doc::{
    attrs, Attrs, EditorState, Mark, Node, NodePath, Plugin, Schema, Selection, Step, Transaction,
};
pub use vellum_markdown::{MarkdownParser, MarkdownSerializer, ParseSpec, ParserRules};
