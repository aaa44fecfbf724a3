use std::io::{self, Write};

use scraper::{ElementRef, Html, Node};

use crate::parser::extract::Extractor;

/// Indented view of the document: opening tags with attributes, trimmed
/// text, closing tags. Text nodes that match a section label are flagged.
pub fn dump_tree<W: Write>(doc: &Html, extractor: &Extractor, out: &mut W) -> io::Result<()> {
    let root = doc.root_element();
    write_open(root, 0, out)?;
    let mut stack = vec![(root, root.children())];

    loop {
        let depth = stack.len();
        let Some((el, children)) = stack.last_mut() else {
            break;
        };
        let el = *el;
        let Some(child) = children.next() else {
            stack.pop();
            writeln!(out, "{}</{}>", "  ".repeat(depth - 1), el.value().name())?;
            continue;
        };
        let inner = "  ".repeat(depth);
        match child.value() {
            Node::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                match extractor.label_kind(text) {
                    Some(kind) => writeln!(out, "{}{}    <-- {} label", inner, text, kind)?,
                    None => writeln!(out, "{}{}", inner, text)?,
                }
            }
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    write_open(child, depth, out)?;
                    stack.push((child, child.children()));
                }
            }
            Node::Comment(comment) => writeln!(out, "{}<!--{}-->", inner, comment.trim())?,
            _ => {}
        }
    }
    Ok(())
}

fn write_open<W: Write>(el: ElementRef<'_>, depth: usize, out: &mut W) -> io::Result<()> {
    let element = el.value();
    write!(out, "{}<{}", "  ".repeat(depth), element.name())?;
    for (key, value) in element.attrs() {
        write!(out, " {}=\"{}\"", key, value)?;
    }
    writeln!(out, ">")
}
