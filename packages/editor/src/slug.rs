//! Heading anchor slugs.

use once_cell::sync::Lazy;
use regex::Regex;

use vellum_doc::Node;

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\p{L}\p{N}]+").unwrap());

/// Lowercase the input and collapse every non-alphanumeric run to a
/// single dash.
pub fn slugify(input: &str) -> String {
    let lowered = input.to_lowercase();
    let dashed = NON_WORD.replace_all(&lowered, "-");
    dashed.trim_matches('-').to_string()
}

/// The anchor id for a heading node.
///
/// Empty headings fall back to `h-`; a leading digit gets the same
/// prefix so the id stays a valid selector. A non-zero `discriminator`
/// is appended for repeated slugs (`intro`, `intro-1`, `intro-2`).
pub fn heading_to_slug(node: &Node, discriminator: usize) -> String {
    let slug = slugify(&node.text_content());
    let mut slug = if slug.is_empty() {
        "h".to_string()
    } else {
        slug
    };
    if slug.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        slug = format!("h-{slug}");
    }
    if discriminator > 0 {
        format!("{slug}-{discriminator}")
    } else {
        slug
    }
}
