//! Plain-text rendering of a page for the LLM path

use scraper::{ElementRef, Html, Selector};

/// Subtrees that never carry page content
const SKIPPED_TAGS: &[&str] = &["script", "style", "iframe", "nav", "footer", "noscript"];

/// Main content containers, most specific first
const MAIN_SELECTORS: &[&str] = &["main", "article", "div#content", "div.content"];

/// Text of the main content container (or the whole page), one text node per
/// line, blank lines dropped.
pub fn page_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let root = main_container(&doc).unwrap_or_else(|| doc.root_element());

    let mut chunks = Vec::new();
    collect_text(root, &mut chunks);

    chunks
        .iter()
        .flat_map(|chunk| chunk.lines())
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn main_container(doc: &Html) -> Option<ElementRef<'_>> {
    MAIN_SELECTORS.iter().find_map(|sel| {
        let selector = Selector::parse(sel).ok()?;
        doc.select(&selector)
            .find(|el| !has_skipped_ancestor(*el))
    })
}

fn is_skipped(el: ElementRef<'_>) -> bool {
    SKIPPED_TAGS.contains(&el.value().name())
}

fn has_skipped_ancestor(el: ElementRef<'_>) -> bool {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .any(is_skipped)
}

fn collect_text(el: ElementRef<'_>, out: &mut Vec<String>) {
    for child in el.children() {
        if let Some(child_el) = ElementRef::wrap(child) {
            if !is_skipped(child_el) {
                collect_text(child_el, out);
            }
        } else if let Some(text) = child.value().as_text() {
            out.push(text.to_string());
        }
    }
}

/// Cut `text` to at most `max_chars` characters
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
