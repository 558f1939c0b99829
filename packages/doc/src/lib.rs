//! # Vellum Document State
//!
//! The host document-state boundary for the Vellum editing core.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ schema: type tables + attribute defaults    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ doc: immutable Node tree + selection        │
//! │  - Replaced wholesale on each transaction   │
//! │  - Positions are child-index paths          │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ state: apply_transaction → new state +      │
//! │        the sub-transactions applied         │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The document is a value**: a transaction never mutates the held
//!    tree; applying one produces a fresh [`EditorState`].
//! 2. **Plugins ride the apply**: a [`Plugin`] may veto a transaction
//!    (`filter_transaction`) or append follow-ups (`append_transaction`).
//! 3. **Positions are paths**: a [`NodePath`] is only valid until the
//!    next mutation; nothing in this crate hands out long-lived handles.

pub mod node;
pub mod plugin;
pub mod schema;
pub mod selection;
pub mod state;
pub mod transaction;

pub use node::{attrs, Attrs, Mark, Node, NodePath};
pub use plugin::{Decoration, Plugin};
pub use schema::{AttrSpec, MarkSpec, MarkType, NodeSpec, NodeType, Schema, SchemaError};
pub use selection::Selection;
pub use state::{ApplyResult, EditorState, StateError};
pub use transaction::{Step, Transaction};
