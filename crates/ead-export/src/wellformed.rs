//! Best-effort well-formedness probe for mixed-content fragments.
//!
//! A fragment is checked by wrapping it in a pseudo root (`<wrap>…</wrap>`)
//! and reading it with quick-xml. The probe does not validate against the
//! EAD schema; it only answers whether a fragment can be inlined verbatim.

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use regex::{Regex, RegexSet};

use crate::sanitize::is_xml_char;

const WRAP_OPEN: &str = "<wrap>";
const WRAP_CLOSE: &str = "</wrap>";

/// Diagnostics matching these patterns do not make a fragment unusable:
/// prefixes such as `xlink:` are bound on the document root.
static SUPPRESSED: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([r"Namespace prefix .* is not defined", r"The prefix .* is not bound"])
        .expect("valid suppression patterns")
});

static XML_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\p{L}_:][\p{L}\p{N}_.:\-]*$").expect("valid XML name pattern")
});

static PREDEFINED_ENTITIES: [&str; 5] = ["lt", "gt", "amp", "apos", "quot"];

/// Category of a well-formedness problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// The reader rejected the input.
    Syntax,
    /// An element was opened but never closed.
    Unclosed,
    /// Content continues after the pseudo root was closed.
    TrailingContent,
    InvalidName,
    Attribute,
    Entity,
    UnboundPrefix,
}

/// One well-formedness problem, positioned relative to the fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Byte offset into the fragment (clamped to its bounds).
    pub offset: usize,
    pub message: String,
}

impl Diagnostic {
    fn new(kind: DiagnosticKind, offset: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            offset,
            message: message.into(),
        }
    }

    /// Whether the diagnostic matches the fixed suppression set.
    pub fn is_suppressed(&self) -> bool {
        SUPPRESSED.is_match(&self.message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at byte {})", self.message, self.offset)
    }
}

/// Every diagnostic for `content`, suppressed ones included.
pub fn diagnose(content: &str) -> Vec<Diagnostic> {
    let mut diagnostics = scan_entities(content);
    diagnostics.extend(scan_markup(content));
    diagnostics.sort_by_key(|d| d.offset);
    diagnostics
}

/// Diagnostics that make `content` unusable as an inline fragment.
pub fn xml_errors(content: &str) -> Vec<Diagnostic> {
    diagnose(content)
        .into_iter()
        .filter(|d| !d.is_suppressed())
        .collect()
}

/// True when `content` can be inlined verbatim.
pub fn is_well_formed(content: &str) -> bool {
    xml_errors(content).is_empty()
}

fn fragment_offset(content: &str, wrapped_pos: u64) -> usize {
    let pos = usize::try_from(wrapped_pos).unwrap_or(usize::MAX);
    pos.saturating_sub(WRAP_OPEN.len()).min(content.len())
}

fn scan_markup(content: &str) -> Vec<Diagnostic> {
    let wrapped = format!("{WRAP_OPEN}{content}{WRAP_CLOSE}");
    let mut reader = Reader::from_str(&wrapped);
    reader.config_mut().check_end_names = true;

    let mut diagnostics = Vec::new();
    // Prefixes declared on each open element.
    let mut scopes: Vec<Vec<String>> = Vec::new();
    let mut root_closed = false;

    loop {
        let offset = fragment_offset(content, reader.buffer_position());
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(err) => {
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::Syntax,
                    fragment_offset(content, reader.error_position()),
                    err.to_string(),
                ));
                return diagnostics;
            }
        };
        match event {
            Event::Eof => break,
            Event::Start(ref start) | Event::Empty(ref start) => {
                if root_closed {
                    diagnostics.push(Diagnostic::new(
                        DiagnosticKind::TrailingContent,
                        offset,
                        "extra content at the end of the document",
                    ));
                    return diagnostics;
                }
                let declared = check_start(start, &scopes, offset, &mut diagnostics);
                if matches!(event, Event::Start(_)) {
                    scopes.push(declared);
                }
            }
            Event::End(_) => {
                scopes.pop();
                if scopes.is_empty() {
                    root_closed = true;
                }
            }
            Event::Text(ref text) if root_closed => {
                if !text.iter().all(u8::is_ascii_whitespace) {
                    diagnostics.push(Diagnostic::new(
                        DiagnosticKind::TrailingContent,
                        offset,
                        "extra content at the end of the document",
                    ));
                    return diagnostics;
                }
            }
            Event::Text(ref text) if contains_cdata_end(text) => {
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::Syntax,
                    offset,
                    "sequence ']]>' not allowed in content",
                ));
            }
            Event::Decl(_) => diagnostics.push(Diagnostic::new(
                DiagnosticKind::Syntax,
                offset,
                "XML declaration allowed only at the start of the document",
            )),
            Event::DocType(_) => diagnostics.push(Diagnostic::new(
                DiagnosticKind::Syntax,
                offset,
                "document type declaration not allowed in content",
            )),
            _ => {}
        }
    }

    if !scopes.is_empty() {
        diagnostics.push(Diagnostic::new(
            DiagnosticKind::Unclosed,
            content.len(),
            "premature end of data: element not closed",
        ));
    }
    diagnostics
}

fn contains_cdata_end(text: &[u8]) -> bool {
    text.windows(3).any(|w| w == b"]]>")
}

/// Check one start tag; returns the prefixes it declares.
fn check_start(
    start: &BytesStart<'_>,
    scopes: &[Vec<String>],
    offset: usize,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<String> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    if !XML_NAME.is_match(&name) {
        diagnostics.push(Diagnostic::new(
            DiagnosticKind::InvalidName,
            offset,
            format!("invalid element name '{name}'"),
        ));
    }

    let mut declared = Vec::new();
    let mut prefixed_attrs = Vec::new();
    let mut seen = HashSet::new();
    for attr in start.attributes() {
        let attr = match attr {
            Ok(attr) => attr,
            Err(err) => {
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::Attribute,
                    offset,
                    format!("malformed attribute on '{name}': {err}"),
                ));
                break;
            }
        };
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        if !XML_NAME.is_match(&key) {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::Attribute,
                offset,
                format!("invalid attribute name '{key}' on '{name}'"),
            ));
            continue;
        }
        if !seen.insert(key.clone()) {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::Attribute,
                offset,
                format!("attribute '{key}' redefined on '{name}'"),
            ));
            continue;
        }
        if attr.value.contains(&b'<') {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::Attribute,
                offset,
                format!("unescaped '<' not allowed in value of attribute '{key}' on '{name}'"),
            ));
            continue;
        }
        if let Some(prefix) = key.strip_prefix("xmlns:") {
            declared.push(prefix.to_string());
        } else if key != "xmlns" {
            prefixed_attrs.push(key);
        }
    }

    let is_bound = |prefix: &str| {
        prefix == "xml"
            || declared.iter().any(|p| p == prefix)
            || scopes.iter().flatten().any(|p| p == prefix)
    };
    if let Some((prefix, _)) = name.split_once(':') {
        if !is_bound(prefix) {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::UnboundPrefix,
                offset,
                format!("Namespace prefix {prefix} on {name} is not defined"),
            ));
        }
    }
    for key in prefixed_attrs {
        if let Some((prefix, _)) = key.split_once(':') {
            if !is_bound(prefix) {
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::UnboundPrefix,
                    offset,
                    format!("The prefix {prefix} for attribute {key} associated with an element type {name} is not bound"),
                ));
            }
        }
    }
    declared
}

/// Check every `&` outside CDATA sections, comments and processing
/// instructions.
fn scan_entities(content: &str) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut pos = 0;
    while pos < content.len() {
        let rest = &content[pos..];
        let skip_to = [("<![CDATA[", "]]>"), ("<!--", "-->"), ("<?", "?>")]
            .into_iter()
            .find(|(open, _)| rest.starts_with(open))
            .map(|(open, close)| {
                rest[open.len()..]
                    .find(close)
                    .map_or(content.len(), |end| pos + open.len() + end + close.len())
            });
        if let Some(next) = skip_to {
            pos = next;
            continue;
        }
        let Some(ch) = rest.chars().next() else {
            break;
        };
        if ch == '&' {
            if let Some(diagnostic) = check_reference(rest, pos) {
                diagnostics.push(diagnostic);
            }
        }
        pos += ch.len_utf8();
    }
    diagnostics
}

fn check_reference(rest: &str, offset: usize) -> Option<Diagnostic> {
    let body = &rest[1..];
    let Some(end) = body.find(';') else {
        return Some(Diagnostic::new(
            DiagnosticKind::Entity,
            offset,
            "EntityRef: expecting ';'",
        ));
    };
    let name = &body[..end];
    if is_valid_reference(name) {
        return None;
    }
    let message = if name.starts_with('#') {
        format!("invalid character reference '&{name};'")
    } else if XML_NAME.is_match(name) {
        format!("Entity '{name}' not defined")
    } else {
        "EntityRef: expecting ';'".to_string()
    };
    Some(Diagnostic::new(DiagnosticKind::Entity, offset, message))
}

/// Whether `&{name};` is a predefined entity or a character reference to a
/// character XML allows.
pub(crate) fn is_valid_reference(name: &str) -> bool {
    let Some(number) = name.strip_prefix('#') else {
        return PREDEFINED_ENTITIES.contains(&name);
    };
    let value = match number.strip_prefix('x') {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None if number.chars().all(|c| c.is_ascii_digit()) => number.parse::<u32>().ok(),
        None => None,
    };
    value
        .and_then(char::from_u32)
        .is_some_and(is_xml_char)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(content: &str) -> Vec<DiagnosticKind> {
        xml_errors(content).into_iter().map(|d| d.kind).collect()
    }

    #[test]
    fn accepts_plain_and_marked_up_text() {
        assert!(is_well_formed("plain text"));
        assert!(is_well_formed("<p>one</p><p>two &amp; three</p>"));
        assert!(is_well_formed("a <emph render=\"italic\">b</emph> &#169; &#x00A9;"));
        assert!(is_well_formed("<![CDATA[ & < ]]>"));
        assert!(is_well_formed(""));
    }

    #[test]
    fn reports_unclosed_and_mismatched_elements() {
        assert_eq!(kinds("<p>bad</q>"), vec![DiagnosticKind::Syntax]);
        assert_eq!(kinds("</p>"), vec![DiagnosticKind::Syntax]);
        assert!(!is_well_formed("<p>open"));
        assert!(!is_well_formed("<wrap>"));
    }

    #[test]
    fn reports_entities() {
        assert!(kinds("A & B").contains(&DiagnosticKind::Entity));
        assert!(kinds("&nbsp;").contains(&DiagnosticKind::Entity));
        assert!(kinds("&#xZZ;").contains(&DiagnosticKind::Entity));
        assert!(kinds("&#0;").contains(&DiagnosticKind::Entity));
        assert!(kinds("&lt;&gt;&quot;&apos;").is_empty());
    }

    #[test]
    fn reports_attribute_problems() {
        assert_eq!(kinds("<p a=\"1\" a=\"2\">x</p>"), vec![DiagnosticKind::Attribute]);
        assert_eq!(kinds("<p a=1>x</p>"), vec![DiagnosticKind::Attribute]);
    }

    #[test]
    fn reports_markup_a_parser_would_reject() {
        assert_eq!(
            kinds("The <emph render=\"a<b\">x</emph>"),
            vec![DiagnosticKind::Attribute]
        );
        assert_eq!(kinds("<emph>a]]>b</emph>"), vec![DiagnosticKind::Syntax]);
        assert_eq!(kinds("a]]>b"), vec![DiagnosticKind::Syntax]);
        assert!(is_well_formed("<emph render=\"a&lt;b\">a]]&gt;b</emph>"));
    }

    #[test]
    fn reports_invalid_names() {
        assert_eq!(kinds("<1p>x</1p>"), vec![DiagnosticKind::InvalidName]);
    }

    #[test]
    fn unbound_prefixes_are_suppressed() {
        let content = "<extref xlink:href=\"http://example.org\">x</extref>";
        let all = diagnose(content);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].kind, DiagnosticKind::UnboundPrefix);
        assert!(all[0].is_suppressed());
        assert!(is_well_formed(content));

        let bound = "<a xmlns:q=\"urn:x\"><q:b/></a>";
        assert!(diagnose(bound).is_empty());
        assert_eq!(diagnose("<q:b/>").len(), 1);
    }

    #[test]
    fn content_closing_the_pseudo_root_is_rejected() {
        assert!(!is_well_formed("</wrap>text<wrap>"));
    }
}
