//! Built-in behavior extensions: no schema type, only plugins, keys,
//! commands, or input rules.

mod keys;
mod max_length;
mod placeholder;
mod smart_text;
mod trailing_node;

pub use keys::Keys;
pub use max_length::MaxLength;
pub use placeholder::Placeholder;
pub use smart_text::SmartText;
pub use trailing_node::TrailingNode;
