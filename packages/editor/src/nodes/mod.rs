//! Built-in node extensions.

mod blockquote;
mod bullet_list;
mod checkbox_item;
mod checkbox_list;
mod code_fence;
mod doc;
mod embed;
mod hard_break;
mod heading;
mod horizontal_rule;
mod image;
mod list_item;
mod ordered_list;
mod paragraph;
mod text;

pub use blockquote::Blockquote;
pub use bullet_list::BulletList;
pub use checkbox_item::CheckboxItem;
pub use checkbox_list::CheckboxList;
pub use code_fence::CodeFence;
pub use doc::Doc;
pub use embed::{Embed, EmbedDescriptor};
pub use hard_break::HardBreak;
pub use heading::Heading;
pub use horizontal_rule::HorizontalRule;
pub use image::Image;
pub use list_item::ListItem;
pub use ordered_list::OrderedList;
pub use paragraph::Paragraph;
pub use text::Text;
