//! Markup neutralization for user-supplied free text.
//!
//! Output is plain text: executable blocks are dropped with their contents,
//! every other tag is stripped (which removes event-handler attributes with
//! it), and whatever angle brackets remain are escaped. Ampersands are left
//! alone: without a `<` they cannot open markup, and escaping them would
//! change ordinary text such as "Q&A".

use regex::Regex;
use std::sync::LazyLock;

/// Elements whose contents are dropped along with the tags.
static BLOCK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style|iframe|object|embed|noscript|template)\b[^>]*>.*?</(script|style|iframe|object|embed|noscript|template)\s*>")
        .expect("invalid block pattern")
});

/// Any opening, closing, comment or declaration tag.
static TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<(?:/?[A-Za-z][^>]*|!--.*?--|![^>]*)>").expect("invalid tag pattern"));

/// Neutralize HTML in a free-text field.
pub fn sanitize_text(input: &str) -> String {
    let without_blocks = BLOCK_REGEX.replace_all(input, "");
    let without_tags = TAG_REGEX.replace_all(&without_blocks, "");
    escape_brackets(without_tags.trim())
}

fn escape_brackets(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}
