//! Sanitizing user-edited mixed content (text with embedded EAD markup).
//!
//! Content arrives from rich-text editors and legacy imports: some of it is
//! plain text, some is already escaped, some carries inline markup, and some
//! of that markup is broken. The pipeline normalizes it and then decides how
//! it is written:
//!
//! - markup that passes the well-formedness probe is inlined verbatim,
//! - markup that fails it is written as a CDATA block,
//! - plain text is written as already-escaped character data, so existing
//!   entity references are kept and never escaped twice.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::{ExportError, Result};
use crate::stream::Emitter;
use crate::wellformed::{is_valid_reference, is_well_formed, xml_errors};

const XLINK_ELEMENTS: [&str; 14] = [
    "arc", "archref", "bibref", "extptr", "extptrloc", "extref", "extrefloc", "linkgrp", "ptr",
    "ptrloc", "ref", "refloc", "resource", "title",
];

const XLINK_ATTRIBUTES: [&str; 14] = [
    "actuate", "arcrole", "entityref", "from", "href", "id", "linktype", "parent", "role", "show",
    "target", "title", "to", "xpointer",
];

/// An `&` that starts something already escaped: a named reference, or a
/// numeric one (three or more digits, terminator optional).
static ESCAPED_AMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^&(?:[A-Za-z0-9_]+;|#[0-9]{3})").expect("valid entity pattern")
});

static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^&(#x[0-9A-Fa-f]+|#[0-9]+|[A-Za-z_][A-Za-z0-9_.\-]*);").expect("valid reference pattern")
});

static P_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<p(\s|/|>)").expect("valid paragraph pattern"));

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^<>]+>").expect("valid tag pattern"));

static XLINK_ELEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"<(?:{})\s", XLINK_ELEMENTS.join("|"))).expect("valid xlink pattern")
});

static HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<head( [^<>]+)?>(.+?)</head>").expect("valid head pattern")
});

/// How a sanitized value is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sanitized {
    /// Nothing is written.
    Empty,
    /// Escaped character data.
    Text(String),
    /// Well-formed markup, inlined verbatim.
    Fragment(String),
    /// Markup the probe rejected, kept literally.
    CData(String),
}

/// Replace typographic double and single quotes with ASCII ones.
pub fn remove_smart_quotes(content: &str) -> String {
    content
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'")
}

/// Make `<br>` self-closing and drop stray `</br>`.
pub fn normalize_breaks(content: &str) -> String {
    content.replace("<br>", "<br/>").replace("</br>", "")
}

/// Escape every `&` that does not already start an entity reference.
///
/// Idempotent on its own output.
pub fn escape_content(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut rest = content;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if ESCAPED_AMP.is_match(tail) {
            out.push('&');
        } else {
            out.push_str("&amp;");
        }
        rest = &tail[1..];
    }
    out.push_str(rest);
    out
}

/// Split blank-line separated text into `<p>` paragraphs.
///
/// Text that already starts with a paragraph is left alone. When the
/// paragraphs would not be well-formed the unwrapped text is returned.
pub fn handle_linebreaks(content: &str) -> String {
    let content = content.replace("\n\t", "\n\n");
    let trimmed = content.trim();
    if trimmed.is_empty() || P_START.is_match(trimmed) {
        return content;
    }
    let blocks: Vec<&str> = content
        .split("\n\n")
        .filter(|block| !block.trim().is_empty())
        .collect();
    let wrapped = if blocks.len() > 1 {
        blocks
            .iter()
            .map(|block| format!("<p>{}</p>", escape_content(chomp(block))))
            .collect()
    } else {
        format!("<p>{}</p>", escape_content(trimmed))
    };
    if xml_errors(&wrapped).is_empty() {
        wrapped
    } else {
        debug!(len = content.len(), "paragraph split discarded, content is not well-formed");
        content
    }
}

/// Remove one trailing line terminator.
fn chomp(text: &str) -> &str {
    text.strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .or_else(|| text.strip_suffix('\r'))
        .unwrap_or(text)
}

/// Remove `<p>`, `</p>` and `<p/>`.
pub fn strip_paragraphs(content: &str) -> String {
    content.replace("<p>", "").replace("</p>", "").replace("<p/>", "")
}

/// Prefix linking attributes with `xlink:` when the content holds an element
/// that takes them.
pub fn add_xlink_prefix(content: &str) -> String {
    if !XLINK_ELEMENT.is_match(content) {
        return content.to_string();
    }
    XLINK_ATTRIBUTES
        .iter()
        .fold(content.to_string(), |text, attr| {
            text.replace(&format!(" {attr}="), &format!(" xlink:{attr}="))
        })
}

/// True when the content holds something tag-like.
pub fn has_markup(content: &str) -> bool {
    TAG.is_match(content)
}

/// Normalize content; `allow_p` enables paragraph splitting.
pub fn sanitize(content: &str, allow_p: bool) -> String {
    let text = normalize_breaks(&remove_smart_quotes(content));
    let text = if allow_p {
        handle_linebreaks(&text)
    } else {
        strip_paragraphs(&escape_content(&text))
    };
    add_xlink_prefix(&text)
}

/// Sanitize and decide how the value is written.
pub fn classify(content: &str, allow_p: bool) -> Result<Sanitized> {
    if content.is_empty() || content == "null" {
        return Ok(Sanitized::Empty);
    }
    check_characters(content)?;
    let text = sanitize(content, allow_p);
    if text.is_empty() {
        return Ok(Sanitized::Empty);
    }
    if has_markup(&text) {
        if is_well_formed(&text) {
            Ok(Sanitized::Fragment(text))
        } else {
            Ok(Sanitized::CData(text))
        }
    } else {
        Ok(Sanitized::Text(escape_text(&text)))
    }
}

/// Write mixed content at the emitter's current position.
pub fn write_mixed_content(out: &mut Emitter, content: &str, allow_p: bool) -> Result<()> {
    match classify(content, allow_p)? {
        Sanitized::Empty => Ok(()),
        Sanitized::Text(escaped) => out.escaped_text(&escaped),
        Sanitized::Fragment(markup) => out.fragment(markup).map(|_| ()),
        Sanitized::CData(markup) => {
            debug!(len = markup.len(), "malformed markup written as CDATA");
            out.escaped_text(&cdata(&markup))
        }
    }
}

/// Write stored markup verbatim when it is well-formed, otherwise as mixed
/// content.
pub fn emit_raw(out: &mut Emitter, content: &str) -> Result<()> {
    if content.is_empty() {
        return Ok(());
    }
    check_characters(content)?;
    if is_well_formed(content) {
        out.fragment(content.to_string()).map(|_| ())
    } else {
        write_mixed_content(out, content, false)
    }
}

/// Pull the first `<head>` out of note content.
///
/// Returns the content without that head and the head text, or `backup`
/// when the content has none.
pub fn extract_head_text(content: &str, backup: Option<&str>) -> (String, Option<String>) {
    match HEAD.captures(content.trim()) {
        Some(caps) => {
            let whole = caps.get(0).map_or("", |m| m.as_str());
            let head = caps.get(2).map(|m| m.as_str().to_string());
            (content.replace(whole, ""), head)
        }
        None => (content.to_string(), backup.map(str::to_string)),
    }
}

/// Escape text for character data, keeping valid references.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(ch) = rest.chars().next() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => match REFERENCE.find(rest) {
                Some(m) if is_valid_reference(&m.as_str()[1..m.len() - 1]) => {
                    out.push_str(m.as_str());
                    rest = &rest[m.len()..];
                    continue;
                }
                _ => out.push_str("&amp;"),
            },
            other => out.push(other),
        }
        rest = &rest[ch.len_utf8()..];
    }
    out
}

fn cdata(text: &str) -> String {
    format!("<![CDATA[{}]]>", text.replace("]]>", "]]]]><![CDATA[>"))
}

/// Whether XML 1.0 allows `ch` in a document.
pub fn is_xml_char(ch: char) -> bool {
    matches!(ch,
        '\u{9}' | '\u{A}' | '\u{D}'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

fn check_characters(content: &str) -> Result<()> {
    match content.chars().find(|&ch| !is_xml_char(ch)) {
        Some(ch) => Err(ExportError::InvalidCharacter {
            codepoint: u32::from(ch),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smart_quotes_become_ascii() {
        assert_eq!(
            remove_smart_quotes("\u{201C}x\u{201D} \u{2018}y\u{2019}"),
            "\"x\" 'y'"
        );
    }

    #[test]
    fn breaks_are_self_closing() {
        assert_eq!(normalize_breaks("a<br>b</br>c"), "a<br/>bc");
    }

    #[test]
    fn escape_keeps_existing_entities() {
        assert_eq!(escape_content("A & B"), "A &amp; B");
        assert_eq!(escape_content("A &amp; B"), "A &amp; B");
        assert_eq!(escape_content("&#169; &#1234 &#12"), "&#169; &#1234 &amp;#12");
        assert_eq!(
            escape_content("This is the &lt; test & for <title>Sanford &amp; Son</title>"),
            "This is the &lt; test &amp; for <title>Sanford &amp; Son</title>"
        );
    }

    #[test]
    fn linebreaks_make_paragraphs() {
        assert_eq!(handle_linebreaks("one\n\ntwo\n"), "<p>one</p><p>two</p>");
        assert_eq!(handle_linebreaks("one\n\ttwo"), "<p>one</p><p>two</p>");
        assert_eq!(handle_linebreaks("  single  "), "<p>single</p>");
        assert_eq!(handle_linebreaks("<p>kept</p>"), "<p>kept</p>");
        assert_eq!(handle_linebreaks("   "), "   ");
    }

    #[test]
    fn broken_paragraphs_fall_back_to_input() {
        assert_eq!(handle_linebreaks("a <emph>b"), "a <emph>b");
    }

    #[test]
    fn xlink_prefix_only_for_linking_elements() {
        assert_eq!(
            add_xlink_prefix("<extref href=\"x\" show=\"new\">y</extref>"),
            "<extref xlink:href=\"x\" xlink:show=\"new\">y</extref>"
        );
        assert_eq!(
            add_xlink_prefix("<emph render=\"bold\" id=\"x\">y</emph>"),
            "<emph render=\"bold\" id=\"x\">y</emph>"
        );
    }

    #[test]
    fn classify_chooses_output_form() {
        assert_eq!(classify("", false).expect("empty"), Sanitized::Empty);
        assert_eq!(classify("null", true).expect("null"), Sanitized::Empty);
        assert_eq!(
            classify("A & B", false).expect("text"),
            Sanitized::Text("A &amp; B".to_string())
        );
        assert_eq!(
            classify("&#169; 2001", false).expect("text"),
            Sanitized::Text("&#169; 2001".to_string())
        );
        assert_eq!(
            classify("a <emph>b</emph>", false).expect("fragment"),
            Sanitized::Fragment("a <emph>b</emph>".to_string())
        );
        assert_eq!(
            classify("a <emph>b", false).expect("cdata"),
            Sanitized::CData("a <emph>b".to_string())
        );
    }

    #[test]
    fn undefined_entities_are_escaped_in_text() {
        assert_eq!(
            classify("x&nbsp;y", false).expect("text"),
            Sanitized::Text("x&amp;nbsp;y".to_string())
        );
        assert_eq!(
            classify("&#1234 dangling", false).expect("text"),
            Sanitized::Text("&amp;#1234 dangling".to_string())
        );
    }

    #[test]
    fn invalid_characters_are_errors() {
        assert!(matches!(
            classify("bad\u{0}title", false),
            Err(ExportError::InvalidCharacter { codepoint: 0 })
        ));
    }

    #[test]
    fn cdata_splits_terminator() {
        assert_eq!(cdata("a]]>b"), "<![CDATA[a]]]]><![CDATA[>b]]>");
    }

    #[test]
    fn head_is_extracted() {
        let (rest, head) = extract_head_text("<head>Notes</head><p>Body</p>", Some("Backup"));
        assert_eq!(rest, "<p>Body</p>");
        assert_eq!(head.as_deref(), Some("Notes"));

        let (rest, head) = extract_head_text("<p>Body</p>", Some("Backup"));
        assert_eq!(rest, "<p>Body</p>");
        assert_eq!(head.as_deref(), Some("Backup"));
    }
}
