//! Section emitter and the lazy document stream.

use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::error::{ExportError, Result};
use crate::fragments::{Chunk, FragmentToken, RawFragments, Section, SectionRegistry, SectionToken};
use crate::guard::ExportSummary;

/// Ordered attribute list for one element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attrs(Vec<(&'static str, String)>);

impl Attrs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Add the attribute unless the value is missing, empty or `"null"`.
    pub fn opt(mut self, key: &'static str, value: Option<&str>) -> Self {
        if let Some(value) = value.filter(|v| !v.is_empty() && *v != "null") {
            self.set(key, value);
        }
        self
    }

    /// Add `audience="internal"` when `internal` holds.
    pub fn audience(self, internal: bool) -> Self {
        if internal {
            self.with("audience", "internal")
        } else {
            self
        }
    }

    /// Set or replace an attribute, keeping its original position.
    pub fn set(&mut self, key: &'static str, value: impl Into<String>) {
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn start<'a>(&'a self, tag: &'a str) -> BytesStart<'a> {
        let mut start = BytesStart::new(tag);
        for (key, value) in &self.0 {
            start.push_attribute((*key, value.as_str()));
        }
        start
    }
}

/// Writes one section: XML events into a buffer, tokens as separate chunks.
pub struct Emitter {
    writer: Writer<Vec<u8>>,
    chunks: Vec<Chunk>,
    fragments: RawFragments,
    pretty: bool,
    depth: usize,
}

impl Emitter {
    pub fn new(pretty: bool) -> Self {
        let writer = if pretty {
            Writer::new_with_indent(Vec::new(), b' ', 2)
        } else {
            Writer::new(Vec::new())
        };
        Self {
            writer,
            chunks: Vec::new(),
            fragments: RawFragments::default(),
            pretty,
            depth: 0,
        }
    }

    pub fn pretty(&self) -> bool {
        self.pretty
    }

    pub fn decl(&mut self) -> Result<()> {
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        Ok(())
    }

    pub fn start(&mut self, tag: &str, attrs: &Attrs) -> Result<()> {
        self.writer.write_event(Event::Start(attrs.start(tag)))?;
        self.depth += 1;
        Ok(())
    }

    pub fn end(&mut self, tag: &str) -> Result<()> {
        self.writer.write_event(Event::End(BytesEnd::new(tag)))?;
        self.depth = self.depth.saturating_sub(1);
        Ok(())
    }

    pub fn empty(&mut self, tag: &str, attrs: &Attrs) -> Result<()> {
        self.writer.write_event(Event::Empty(attrs.start(tag)))?;
        Ok(())
    }

    /// Plain text, escaped by the writer.
    pub fn text(&mut self, text: &str) -> Result<()> {
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        Ok(())
    }

    /// Text that is already valid escaped character data.
    pub fn escaped_text(&mut self, escaped: &str) -> Result<()> {
        self.writer
            .write_event(Event::Text(BytesText::from_escaped(escaped)))?;
        Ok(())
    }

    /// `<tag attrs>text</tag>` with writer-escaped text.
    pub fn text_element(&mut self, tag: &str, attrs: &Attrs, text: &str) -> Result<()> {
        self.start(tag, attrs)?;
        self.text(text)?;
        self.end(tag)
    }

    /// Inline a raw markup fragment at the current position.
    pub fn fragment(&mut self, content: String) -> Result<FragmentToken> {
        self.flush()?;
        let token = self.fragments.push(content);
        self.chunks.push(Chunk::Fragment(token));
        // Keeps the writer from breaking the line before the next tag.
        self.text("")?;
        Ok(token)
    }

    /// Place a registered section at the current position.
    pub fn section(&mut self, token: SectionToken) -> Result<()> {
        self.flush()?;
        if self.pretty {
            let indent = " ".repeat(self.depth * 2);
            self.chunks.push(Chunk::Markup(format!("\n{indent}")));
        }
        self.chunks.push(Chunk::Section(token));
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        let bytes = std::mem::take(self.writer.get_mut());
        if !bytes.is_empty() {
            self.chunks.push(Chunk::Markup(String::from_utf8(bytes)?));
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<Section> {
        self.flush()?;
        Ok(Section {
            chunks: self.chunks,
            fragments: self.fragments,
        })
    }
}

struct Frame {
    chunks: std::vec::IntoIter<Chunk>,
    fragments: RawFragments,
}

impl Frame {
    fn new(section: Section) -> Self {
        Self {
            chunks: section.chunks.into_iter(),
            fragments: section.fragments,
        }
    }
}

/// The serialized document as a pull-based sequence of string chunks.
///
/// Sections are resolved in document order and dropped from the registry as
/// they are consumed. After the first error the stream ends.
pub struct EadStream {
    registry: SectionRegistry,
    frames: Vec<Frame>,
    summary: ExportSummary,
    done: bool,
}

impl EadStream {
    pub fn new(registry: SectionRegistry, root: Section, summary: ExportSummary) -> Self {
        Self {
            registry,
            frames: vec![Frame::new(root)],
            summary,
            done: false,
        }
    }

    pub fn summary(&self) -> &ExportSummary {
        &self.summary
    }

    /// Drain every chunk into `writer`.
    pub fn write_to<W: Write>(self, writer: &mut W) -> Result<ExportSummary> {
        let summary = self.summary.clone();
        for chunk in self {
            writer.write_all(chunk?.as_bytes())?;
        }
        writer.flush()?;
        Ok(summary)
    }

    /// Drain the stream into one string.
    pub fn into_string(self) -> Result<String> {
        self.collect()
    }

    fn advance(&mut self) -> Result<Option<String>> {
        loop {
            let Some(frame) = self.frames.last_mut() else {
                if !self.registry.is_empty() {
                    return Err(ExportError::OrphanedSections {
                        count: self.registry.len(),
                    });
                }
                return Ok(None);
            };
            match frame.chunks.next() {
                Some(Chunk::Markup(text)) => return Ok(Some(text)),
                Some(Chunk::Fragment(token)) => return frame.fragments.take(token).map(Some),
                Some(Chunk::Section(token)) => {
                    let section = self.registry.take(token)?;
                    self.frames.push(Frame::new(section));
                }
                None => {
                    self.frames.pop();
                }
            }
        }
    }
}

impl Iterator for EadStream {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.advance() {
            Ok(Some(chunk)) => Some(Ok(chunk)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                self.frames.clear();
                Some(Err(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attrs_skip_empty_and_null_values() {
        let attrs = Attrs::new()
            .opt("id", Some(""))
            .opt("level", Some("null"))
            .opt("type", None)
            .opt("label", Some("Title"))
            .audience(true);
        assert_eq!(attrs.get("label"), Some("Title"));
        assert_eq!(attrs.get("audience"), Some("internal"));
        assert_eq!(attrs.get("id"), None);
    }

    #[test]
    fn set_replaces_in_place() {
        let mut attrs = Attrs::new().with("a", "1").with("b", "2");
        attrs.set("a", "3");
        assert_eq!(attrs, Attrs::new().with("a", "3").with("b", "2"));
    }

    #[test]
    fn fragments_are_inlined_in_order() {
        let mut out = Emitter::new(false);
        out.start("p", &Attrs::new()).expect("start");
        out.text("A").expect("text");
        out.fragment("<emph>x</emph>".to_string()).expect("fragment");
        out.text("B").expect("text");
        out.end("p").expect("end");
        let section = out.finish().expect("finish");

        let stream = EadStream::new(SectionRegistry::new(), section, ExportSummary::default());
        assert_eq!(
            stream.into_string().expect("stream"),
            "<p>A<emph>x</emph>B</p>"
        );
    }

    #[test]
    fn orphaned_sections_end_the_stream() {
        let mut registry = SectionRegistry::new();
        let token = registry.reserve();
        registry
            .fill(token, Section::markup("<c/>"))
            .expect("fill");
        let mut stream = EadStream::new(registry, Section::markup("<dsc/>"), ExportSummary::default());
        assert_eq!(stream.next().and_then(Result::ok).as_deref(), Some("<dsc/>"));
        assert!(matches!(
            stream.next(),
            Some(Err(ExportError::OrphanedSections { count: 1 }))
        ));
        assert!(stream.next().is_none());
    }
}
