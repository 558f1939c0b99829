//! Built-in mark extensions.

mod code_inline;
mod em;
mod highlight;
mod link;
mod strikethrough;
mod strong;
mod underline;

pub use code_inline::CodeInline;
pub use em::Em;
pub use highlight::Highlight;
pub use link::Link;
pub use strikethrough::Strikethrough;
pub use strong::Strong;
pub use underline::Underline;
