//! HTML serialization with style overrides applied

use scraper::{ElementRef, Html, Node};

use crate::html::styles::StyleOverrides;

const VOID_ELEMENTS: [&str; 16] = [
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame", "hr", "img", "input",
    "keygen", "link", "meta", "source", "wbr",
];

/// Children of these are written without entity escaping
const RAW_TEXT_ELEMENTS: [&str; 7] = [
    "script", "style", "xmp", "iframe", "noembed", "noframes", "plaintext",
];

pub(crate) fn serialize(document: &Html, overrides: &StyleOverrides<'_>, whole_document: bool) -> String {
    let mut out = String::new();

    if !whole_document {
        write_children(document.root_element(), overrides, &mut out);
        return out;
    }

    for node in document.tree.root().children() {
        if let Some(element) = ElementRef::wrap(node) {
            write_element(element, overrides, &mut out);
            continue;
        }
        match node.value() {
            Node::Doctype(doctype) => {
                write_doctype(doctype.name(), doctype.public_id(), doctype.system_id(), &mut out)
            }
            Node::Comment(comment) => write_comment(comment, &mut out),
            _ => {}
        }
    }
    out
}

fn write_element(element: ElementRef<'_>, overrides: &StyleOverrides<'_>, out: &mut String) {
    let name = element.value().name();
    let style = overrides.get(element);

    out.push('<');
    out.push_str(name);
    for (attribute, value) in element.value().attrs.iter() {
        if style.is_some() && attribute.prefix.is_none() && &*attribute.local == "style" {
            continue;
        }
        match &attribute.prefix {
            Some(prefix) => write_attribute(&format!("{}:{}", prefix, attribute.local), value, out),
            None => write_attribute(&attribute.local, value, out),
        }
    }
    if let Some(style) = style {
        write_attribute("style", style, out);
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&name) {
        return;
    }

    write_children(element, overrides, out);
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn write_children(element: ElementRef<'_>, overrides: &StyleOverrides<'_>, out: &mut String) {
    let raw_text = RAW_TEXT_ELEMENTS.contains(&element.value().name());

    for node in element.children() {
        if let Some(child) = ElementRef::wrap(node) {
            write_element(child, overrides, out);
            continue;
        }
        match node.value() {
            Node::Text(text) if raw_text => out.push_str(text),
            Node::Text(text) => out.push_str(&html_escape::encode_text(&**text)),
            Node::Comment(comment) => write_comment(comment, out),
            _ => {}
        }
    }
}

fn write_doctype(name: &str, public_id: &str, system_id: &str, out: &mut String) {
    out.push_str("<!DOCTYPE ");
    out.push_str(name);
    if !public_id.is_empty() {
        out.push_str(" PUBLIC \"");
        out.push_str(public_id);
        out.push('"');
        if !system_id.is_empty() {
            out.push_str(" \"");
            out.push_str(system_id);
            out.push('"');
        }
    } else if !system_id.is_empty() {
        out.push_str(" SYSTEM \"");
        out.push_str(system_id);
        out.push('"');
    }
    out.push('>');
}

fn write_attribute(name: &str, value: &str, out: &mut String) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&html_escape::encode_double_quoted_attribute(value));
    out.push('"');
}

fn write_comment(comment: &str, out: &mut String) {
    out.push_str("<!--");
    out.push_str(comment);
    out.push_str("-->");
}
