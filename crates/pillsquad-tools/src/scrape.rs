//! HTML text and image extraction

use scraper::{Html, Node};
use url::Url;

/// Maximum characters of page text returned to callers
pub const MAX_TEXT_CHARS: usize = 2000;

/// Elements whose text is never rendered
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Visible text of a document: text nodes outside hidden elements,
/// whitespace-separated and collapsed
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let mut text = String::new();
    for node in document.tree.root().descendants() {
        let Node::Text(t) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|e| HIDDEN_ELEMENTS.contains(&e.name()))
        });
        if !hidden {
            text.push_str(&t.text);
            text.push(' ');
        }
    }

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keep the first `max_chars` characters, marking the cut with `...`
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Absolute URLs of every `<img src>` in document order, `data:` URIs excluded
pub fn image_urls(html: &str, page_url: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let base = Url::parse(page_url).ok();

    document
        .tree
        .root()
        .descendants()
        .filter_map(|node| node.value().as_element())
        .filter(|e| e.name() == "img")
        .filter_map(|e| e.attr("src"))
        .filter(|src| !src.is_empty() && !src.starts_with("data:"))
        .filter_map(|src| {
            let resolved = match &base {
                Some(base) => base.join(src),
                None => Url::parse(src),
            };
            resolved.ok().map(String::from)
        })
        .collect()
}
