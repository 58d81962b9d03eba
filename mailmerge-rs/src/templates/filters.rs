//! Template filters shared by the HTML and text renderers

use minijinja::Value;
use pulldown_cmark::{html, Options, Parser};

/// `md` in HTML mode: markdown (with pipe tables) to HTML
pub fn markdown(source: String) -> Value {
    Value::from_safe_string(markdown_to_html(&source))
}

/// `md` in text mode: the value is left exactly as written
pub fn passthrough(value: Value) -> Value {
    value
}

pub fn markdown_to_html(source: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);

    let mut output = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut output, Parser::new_ext(source, options));
    output
}

/// `fix_newlines`: put a blank line between every pair of lines
///
/// Folded YAML scalars (`>`) collapse paragraph breaks into single newlines;
/// this restores them. Any blank-line structure already present is not
/// preserved, and neither is a trailing newline.
pub fn fix_newlines(value: String) -> String {
    split_lines(&value).join("\n\n")
}

/// Split on every line boundary: `\n`, `\r\n`, `\r` and the Unicode
/// separators (VT, FF, FS, GS, RS, NEL, LS, PS)
///
/// A trailing boundary does not produce an empty last line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !is_line_boundary(c) {
            continue;
        }
        lines.push(&text[start..i]);
        let mut end = i + c.len_utf8();
        if c == '\r' {
            if let Some(&(_, '\n')) = chars.peek() {
                chars.next();
                end += 1;
            }
        }
        start = end;
    }

    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

fn is_line_boundary(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0b}' | '\u{0c}' | '\u{1c}' | '\u{1d}' | '\u{1e}' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}
