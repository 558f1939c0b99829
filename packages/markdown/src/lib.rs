//! # Vellum Markdown Codec
//!
//! The bidirectional markdown codec for the Vellum editing core.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ token: markdown text → Token stream         │
//! │  (pulldown-cmark adapter + rule plugins)    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ parser: Token stream → Node tree            │
//! │  (per-token ParseSpec from extensions)      │
//! └─────────────────────────────────────────────┘
//!
//! ┌─────────────────────────────────────────────┐
//! │ serializer: Node tree → markdown text       │
//! │  (per-name writers from extensions)         │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Tokenizer configuration is a pure function of the rule map and the
//! ordered rule-plugin list, fixed at parser construction; nothing is
//! mutated afterwards. A node or mark type appearing in a document
//! without a codec contribution for the needed direction fails loudly
//! at use time, never at build time.

pub mod parser;
pub mod serializer;
pub mod token;

pub use parser::{AttrMapper, MarkdownParser, ParseError, ParseKind, ParseSpec};
pub use serializer::{
    MarkSerializer, MarkdownSerializer, NodeSerializerFn, SerializeError, SerializerState,
};
pub use token::{tokenize, ParserRules, RulePlugin, Token, TokenKind};
