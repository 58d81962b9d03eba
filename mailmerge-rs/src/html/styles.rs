//! Inline style rules for the main-body root
//!
//! Mail clients ignore most `<style>` blocks, so layout-critical margins are
//! written onto the elements themselves. Each rule replaces the element's
//! `style` attribute; a later rule wins over an earlier one.

use scraper::{ElementRef, Html, Selector};

use crate::error::{MergeError, Result};
use crate::html::serialize::serialize;

/// `id` of the element whose children get styled
pub const MAIN_BODY_ID: &str = "main-body";

pub const PARAGRAPH_STYLE: &str = "margin:0.6em 0;line-height:1.4";
pub const HEADING_STYLE: &str = "margin:0.8em 0 0;font-size:1.1em";
pub const LIST_PARAGRAPH_STYLE: &str = "margin-bottom:0;";
pub const LIST_ITEM_STYLE: &str = "margin-top:0.5em;";

/// Style values chosen per element, last assignment wins
#[derive(Default)]
pub(crate) struct StyleOverrides<'a>(Vec<(ElementRef<'a>, &'static str)>);

impl<'a> StyleOverrides<'a> {
    fn set(&mut self, element: ElementRef<'a>, style: &'static str) {
        self.0.push((element, style));
    }

    pub(crate) fn get(&self, element: ElementRef<'_>) -> Option<&'static str> {
        self.0
            .iter()
            .rev()
            .find(|(styled, _)| styled.id() == element.id())
            .map(|(_, style)| *style)
    }
}

/// Apply the inline style rules to rendered campaign HTML
///
/// Input may be a fragment or a complete document; a complete document keeps
/// its doctype, `<head>` and `<body>` on output.
///
/// # Errors
/// Fails when the markup has no element with id `main-body`, or more than
/// one.
pub fn inline_styles(html: &str) -> Result<String> {
    let whole_document = is_whole_document(html);
    let document = if whole_document {
        Html::parse_document(html)
    } else {
        Html::parse_fragment(html)
    };

    let root_selector = selector(&format!("#{}", MAIN_BODY_ID))?;
    let mut roots = document.select(&root_selector);
    let root = roots.next().ok_or_else(|| {
        MergeError::PostProcess(format!("no element with id \"{}\"", MAIN_BODY_ID))
    })?;
    if roots.next().is_some() {
        return Err(MergeError::PostProcess(format!(
            "more than one element with id \"{}\"",
            MAIN_BODY_ID
        )));
    }

    let overrides = style_overrides(root)?;
    Ok(serialize(&document, &overrides, whole_document))
}

fn style_overrides(root: ElementRef<'_>) -> Result<StyleOverrides<'_>> {
    let mut overrides = StyleOverrides::default();

    for paragraph in child_elements(root).filter(|el| el.value().name() == "p") {
        overrides.set(paragraph, PARAGRAPH_STYLE);
    }

    for heading in child_elements(root).filter(|el| is_heading(el.value().name())) {
        overrides.set(heading, HEADING_STYLE);
    }

    let list_paragraphs = selector("li > p")?;
    for paragraph in root.select(&list_paragraphs) {
        overrides.set(paragraph, LIST_PARAGRAPH_STYLE);
    }

    for list in child_elements(root).filter(|el| el.value().name() == "ul") {
        for item in child_elements(list).filter(|el| el.value().name() == "li") {
            overrides.set(item, LIST_ITEM_STYLE);
        }
    }

    Ok(overrides)
}

fn child_elements<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    element.children().filter_map(ElementRef::wrap)
}

/// `h1` through `h9`
fn is_heading(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() == 2 && bytes[0] == b'h' && (b'1'..=b'9').contains(&bytes[1])
}

/// Tags whose presence means the markup is a complete document
const DOCUMENT_TAGS: [&str; 3] = ["html", "head", "body"];

fn is_whole_document(html: &str) -> bool {
    let lowered = html.trim_start().to_ascii_lowercase();
    lowered.starts_with("<!doctype") || DOCUMENT_TAGS.iter().any(|tag| has_start_tag(&lowered, tag))
}

/// `<tag` followed by the end of the tag name, so `<head` does not match `<header>`
fn has_start_tag(lowered: &str, tag: &str) -> bool {
    let open = format!("<{}", tag);
    lowered.match_indices(&open).any(|(i, _)| {
        lowered[i + open.len()..]
            .chars()
            .next()
            .is_some_and(|c| c == '>' || c == '/' || c.is_ascii_whitespace())
    })
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| MergeError::PostProcess(format!("invalid selector {:?}: {}", css, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_list_rules() {
        let output =
            inline_styles(r#"<div id="main-body"><p>x</p><ul><li><p>y</p></li></ul></div>"#).unwrap();
        assert_eq!(
            output,
            concat!(
                r#"<div id="main-body">"#,
                r#"<p style="margin:0.6em 0;line-height:1.4">x</p>"#,
                r#"<ul><li style="margin-top:0.5em;"><p style="margin-bottom:0;">y</p></li></ul>"#,
                r#"</div>"#
            )
        );
    }

    #[test]
    fn test_headings_only_at_top_level() {
        let output = inline_styles(
            r#"<div id="main-body"><h1>A</h1><h3>B</h3><div><h2>C</h2><p>nested</p></div></div>"#,
        )
        .unwrap();
        assert!(output.contains(r#"<h1 style="margin:0.8em 0 0;font-size:1.1em">A</h1>"#));
        assert!(output.contains(r#"<h3 style="margin:0.8em 0 0;font-size:1.1em">B</h3>"#));
        assert!(output.contains("<h2>C</h2>"));
        assert!(output.contains("<p>nested</p>"));
    }

    #[test]
    fn test_nested_lists_only_style_list_paragraphs() {
        let output = inline_styles(
            r#"<div id="main-body"><ol><li><p>a</p></li></ol><div><ul><li>b</li></ul></div></div>"#,
        )
        .unwrap();
        assert!(output.contains(r#"<ol><li><p style="margin-bottom:0;">a</p></li></ol>"#));
        assert!(output.contains("<ul><li>b</li></ul>"));
    }

    #[test]
    fn test_existing_style_is_replaced_other_attributes_kept() {
        let output = inline_styles(
            r#"<div id="main-body"><p class="lead" style="color:red">x</p></div>"#,
        )
        .unwrap();
        assert!(output.contains(r#"<p class="lead" style="margin:0.6em 0;line-height:1.4">x</p>"#));
        assert!(!output.contains("color:red"));
    }

    #[test]
    fn test_applying_twice_is_stable() {
        let input = r#"<div id="main-body"><h2>T</h2><p>x</p><ul><li><p>y</p></li></ul></div>"#;
        let once = inline_styles(input).unwrap();
        let twice = inline_styles(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_content_outside_root_is_untouched() {
        let output =
            inline_styles(r#"<p>before</p><div id="main-body"><p>in</p></div><p>after</p>"#).unwrap();
        assert!(output.starts_with("<p>before</p>"));
        assert!(output.ends_with("<p>after</p>"));
    }

    #[test]
    fn test_text_escaping_and_void_elements_survive() {
        let output =
            inline_styles(r#"<div id="main-body"><p>Fish &amp; chips<br>today</p><img src="a.png"></div>"#)
                .unwrap();
        assert!(output.contains("Fish &amp; chips<br>today"));
        assert!(output.contains(r#"<img src="a.png">"#));
        assert!(!output.contains("</br>"));
        assert!(!output.contains("</img>"));
    }

    #[test]
    fn test_whole_document_keeps_head() {
        let output = inline_styles(
            "<!DOCTYPE html><html><head><title>News</title><style>p { color: red; }</style></head><body><div id=\"main-body\"><p>x</p></div></body></html>",
        )
        .unwrap();
        assert!(output.starts_with("<!DOCTYPE html>"));
        assert!(output.contains("<title>News</title>"));
        assert!(output.contains("<style>p { color: red; }</style>"));
        assert!(output.contains(r#"<p style="margin:0.6em 0;line-height:1.4">x</p>"#));
    }

    #[test]
    fn test_doctype_identifiers_are_kept() {
        let doctype = concat!(
            r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Transitional//EN" "#,
            r#""http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd">"#
        );
        let output = inline_styles(&format!(
            r#"{}<html><head></head><body><div id="main-body"><p>x</p></div></body></html>"#,
            doctype
        ))
        .unwrap();
        assert!(output.starts_with(&format!("{}<html>", doctype)));
        assert!(output.contains(r#"<p style="margin:0.6em 0;line-height:1.4">x</p>"#));
    }

    #[test]
    fn test_body_without_html_tag_keeps_body_attributes() {
        let output = inline_styles(
            r#"<body style="margin:0;background:#eee"><div id="main-body"><p>x</p></div></body>"#,
        )
        .unwrap();
        assert!(output.contains(r#"<body style="margin:0;background:#eee">"#));
        assert!(output.contains(r#"<p style="margin:0.6em 0;line-height:1.4">x</p>"#));
        assert!(output.ends_with("</body></html>"));
    }

    #[test]
    fn test_header_element_is_not_a_document_marker() {
        let output =
            inline_styles(r#"<header>Top</header><div id="main-body"><p>x</p></div>"#).unwrap();
        assert!(output.starts_with("<header>Top</header>"));
        assert!(!output.contains("<body"));
    }

    #[test]
    fn test_prefixed_attributes_keep_their_prefix() {
        let output = inline_styles(
            r##"<div id="main-body"><p>x</p><svg><use xlink:href="#logo"></use></svg></div>"##,
        )
        .unwrap();
        assert!(output.contains(r##"<use xlink:href="#logo"></use>"##));
    }

    #[test]
    fn test_is_whole_document() {
        assert!(is_whole_document("<!doctype html><p>x</p>"));
        assert!(is_whole_document("<HTML lang=\"en\"><p>x</p></HTML>"));
        assert!(is_whole_document("<head><title>t</title></head><p>x</p>"));
        assert!(is_whole_document("<body>x</body>"));
        assert!(!is_whole_document("<header>x</header>"));
        assert!(!is_whole_document("<div id=\"main-body\"><p>body text</p></div>"));
    }

    #[test]
    fn test_missing_root_is_an_error() {
        assert!(matches!(
            inline_styles("<p>no root</p>"),
            Err(MergeError::PostProcess(_))
        ));
    }

    #[test]
    fn test_duplicate_root_is_an_error() {
        assert!(inline_styles(r#"<div id="main-body"></div><div id="main-body"></div>"#).is_err());
    }

    #[test]
    fn test_is_heading() {
        assert!(is_heading("h1"));
        assert!(is_heading("h9"));
        assert!(!is_heading("h0"));
        assert!(!is_heading("hr"));
        assert!(!is_heading("h10"));
    }
}
