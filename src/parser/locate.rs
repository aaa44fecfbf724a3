use scraper::{ElementRef, Node};
use tracing::debug;

use super::labels::LabelSet;

/// Tags recognised as list containers.
const LIST_TAGS: &[&str] = &["ul", "ol"];

/// Outcome of visiting one subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signal {
    /// No label occurrence in this subtree.
    NotFound,
    /// A label was seen but no list has been paired with it yet.
    FoundUnconsumed,
    /// A label was seen and paired with list(s) at this level.
    Consumed,
}

/// Pair every label occurrence under `root` with its nearest list
/// container(s). Lists are returned in the order they were resolved, and a
/// list is never handed out twice.
///
/// The walk keeps its own frame stack, so nesting depth is bounded by heap
/// rather than thread stack.
pub fn locate_lists<'a>(root: ElementRef<'a>, labels: &LabelSet) -> Vec<ElementRef<'a>> {
    let mut found: Vec<ElementRef<'a>> = Vec::new();
    // One frame per open element: the element and its unvisited children.
    let mut stack = vec![(root, root.children())];
    // Signal handed up by a frame that just returned, with its element.
    let mut returned: Option<(ElementRef<'a>, Signal)> = None;

    while let Some((el, children)) = stack.last_mut() {
        let el = *el;
        let (subtree, signal) = match returned.take() {
            Some((child, signal)) => (Some(child), signal),
            None => {
                let Some(child) = children.next() else {
                    stack.pop();
                    returned = Some((el, Signal::NotFound));
                    continue;
                };
                match child.value() {
                    Node::Text(text) if labels.matches(text) => {
                        debug!(label = text.trim(), "found potential section label");
                        (None, Signal::FoundUnconsumed)
                    }
                    Node::Element(_) => {
                        if let Some(child) = ElementRef::wrap(child) {
                            stack.push((child, child.children()));
                        }
                        continue;
                    }
                    _ => (None, Signal::NotFound),
                }
            }
        };

        // A deeper level already paired its label; keep scanning siblings
        // for independent occurrences.
        if signal != Signal::FoundUnconsumed {
            continue;
        }

        let mut lists = subtree.map(collect_lists).unwrap_or_default();
        lists.retain(|l| !found.iter().any(|seen| seen.id() == l.id()));

        let outcome = if lists.is_empty() {
            Signal::FoundUnconsumed
        } else {
            debug!(
                parent = el.value().name(),
                count = lists.len(),
                "paired label with list containers"
            );
            found.extend(lists);
            Signal::Consumed
        };
        stack.pop();
        returned = Some((el, outcome));
    }
    found
}

/// Outermost list containers in `el`'s subtree, in document order. Nested
/// lists belong to their container and are not collected separately.
fn collect_lists(el: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    if is_list(el) {
        return vec![el];
    }
    let mut lists = Vec::new();
    let mut stack = vec![el.children()];
    while let Some(children) = stack.last_mut() {
        let Some(child) = children.next() else {
            stack.pop();
            continue;
        };
        if let Some(child) = ElementRef::wrap(child) {
            if is_list(child) {
                lists.push(child);
            } else {
                stack.push(child.children());
            }
        }
    }
    lists
}

pub fn is_list(el: ElementRef<'_>) -> bool {
    let name = el.value().name();
    LIST_TAGS.iter().any(|t| t.eq_ignore_ascii_case(name))
}

// ── Tests ──
