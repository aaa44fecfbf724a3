use scraper::{ElementRef, Node};

use super::sanitize::sanitize;

/// Cleaned text of each direct `<li>` child of `list`, in document order.
/// Subtrees rooted at an excluded tag contribute nothing; items that reduce
/// to an empty string are dropped.
pub fn extract_items(list: ElementRef<'_>, excluded_tags: &[String]) -> Vec<String> {
    list.children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name().eq_ignore_ascii_case("li"))
        .filter_map(|li| {
            let mut text = String::new();
            collect_text(li, excluded_tags, &mut text);
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        })
        .collect()
}

fn collect_text(el: ElementRef<'_>, excluded_tags: &[String], out: &mut String) {
    let mut stack = vec![el.children()];
    while let Some(children) = stack.last_mut() {
        let Some(child) = children.next() else {
            stack.pop();
            continue;
        };
        match child.value() {
            Node::Text(text) => out.push_str(&sanitize(text)),
            Node::Element(e) if is_excluded(e.name(), excluded_tags) => {}
            Node::Element(_) => stack.push(child.children()),
            _ => {}
        }
    }
}

fn is_excluded(name: &str, excluded_tags: &[String]) -> bool {
    excluded_tags.iter().any(|t| t.eq_ignore_ascii_case(name))
}
