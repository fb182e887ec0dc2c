//! Deferred output: raw markup fragments and buffered subtree sections.
//!
//! A section is the serialized output of one subtree, kept as an ordered list
//! of chunks. Chunks are either finished markup or typed tokens standing for
//! content that is spliced in when the document is streamed: a raw fragment
//! (markup inlined verbatim) or another section. Tokens are values, never
//! text, so user content cannot forge one.

use std::collections::BTreeMap;

use tracing::trace;

use crate::error::{ExportError, Result};

/// Handle to a raw fragment in a section's [`RawFragments`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FragmentToken(usize);

impl FragmentToken {
    pub fn id(self) -> usize {
        self.0
    }
}

/// Handle to a section in a [`SectionRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SectionToken(u64);

impl SectionToken {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// One piece of a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    Markup(String),
    Fragment(FragmentToken),
    Section(SectionToken),
}

/// Raw markup fragments owned by one section.
#[derive(Debug, Clone, Default)]
pub struct RawFragments {
    items: Vec<Option<String>>,
}

impl RawFragments {
    pub fn push(&mut self, content: String) -> FragmentToken {
        trace!(id = self.items.len(), len = content.len(), "raw fragment");
        self.items.push(Some(content));
        FragmentToken(self.items.len() - 1)
    }

    /// Resolve a token. Each token resolves exactly once.
    pub fn take(&mut self, token: FragmentToken) -> Result<String> {
        self.items
            .get_mut(token.0)
            .and_then(Option::take)
            .ok_or(ExportError::UnresolvedFragment { id: token.0 })
    }

    /// Fragments not yet resolved.
    pub fn pending(&self) -> usize {
        self.items.iter().filter(|item| item.is_some()).count()
    }
}

/// The buffered output of one subtree.
#[derive(Debug, Clone, Default)]
pub struct Section {
    pub chunks: Vec<Chunk>,
    pub fragments: RawFragments,
}

impl Section {
    /// A section holding finished markup only.
    pub fn markup(text: impl Into<String>) -> Self {
        Self {
            chunks: vec![Chunk::Markup(text.into())],
            fragments: RawFragments::default(),
        }
    }
}

/// Sections of one export, keyed by reservation order.
#[derive(Debug, Default)]
pub struct SectionRegistry {
    next: u64,
    sections: BTreeMap<u64, Option<Section>>,
}

impl SectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a slot; the section is filled once it has been produced.
    pub fn reserve(&mut self) -> SectionToken {
        let token = SectionToken(self.next);
        self.next += 1;
        self.sections.insert(token.0, None);
        token
    }

    pub fn fill(&mut self, token: SectionToken, section: Section) -> Result<()> {
        match self.sections.get_mut(&token.0) {
            Some(slot) => {
                *slot = Some(section);
                Ok(())
            }
            None => Err(ExportError::UnresolvedSection { id: token.0 }),
        }
    }

    /// Token the next reservation will receive.
    pub fn next_token(&self) -> SectionToken {
        SectionToken(self.next)
    }

    /// Drop every slot reserved at or after `token`.
    pub fn discard_from(&mut self, token: SectionToken) -> usize {
        let dropped = self.sections.split_off(&token.0);
        dropped.len()
    }

    /// Reserve a slot and fill it with the producer's output.
    pub fn register<F>(&mut self, producer: F) -> Result<SectionToken>
    where
        F: FnOnce(&mut SectionRegistry) -> Result<Section>,
    {
        let token = self.reserve();
        let section = producer(self)?;
        self.fill(token, section)?;
        Ok(token)
    }

    /// Remove a filled section for streaming.
    pub fn take(&mut self, token: SectionToken) -> Result<Section> {
        self.sections
            .remove(&token.0)
            .flatten()
            .ok_or(ExportError::UnresolvedSection { id: token.0 })
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragments_resolve_once() {
        let mut fragments = RawFragments::default();
        let token = fragments.push("<emph>x</emph>".to_string());
        assert_eq!(fragments.pending(), 1);
        assert_eq!(fragments.take(token).expect("first take"), "<emph>x</emph>");
        assert!(matches!(
            fragments.take(token),
            Err(ExportError::UnresolvedFragment { id: 0 })
        ));
        assert_eq!(fragments.pending(), 0);
    }

    #[test]
    fn unfilled_section_is_unresolved() {
        let mut registry = SectionRegistry::new();
        let token = registry.reserve();
        assert!(matches!(
            registry.take(token),
            Err(ExportError::UnresolvedSection { id: 0 })
        ));
    }

    #[test]
    fn discard_drops_later_reservations() {
        let mut registry = SectionRegistry::new();
        let keep = registry.reserve();
        let failed = registry.reserve();
        let _child = registry.reserve();
        registry.fill(keep, Section::markup("<c/>")).expect("fill");

        assert_eq!(registry.discard_from(failed), 2);
        assert_eq!(registry.len(), 1);
        assert!(registry.fill(failed, Section::default()).is_err());
        assert!(registry.take(keep).is_ok());
        assert!(registry.is_empty());
    }

    #[test]
    fn discard_from_next_token_keeps_earlier_slots() {
        let mut registry = SectionRegistry::new();
        let parent = registry.reserve();
        let sibling = registry.reserve();
        let mark = registry.next_token();
        let _child = registry.reserve();
        assert_eq!(mark.id(), 2);
        assert_eq!(registry.discard_from(mark), 1);
        assert_eq!(registry.len(), 2);
        registry.fill(parent, Section::default()).expect("parent");
        registry.fill(sibling, Section::default()).expect("sibling");
    }

    #[test]
    fn register_nests_sections() {
        let mut registry = SectionRegistry::new();
        let outer = registry
            .register(|registry| {
                let inner = registry.register(|_| Ok(Section::markup("<c02/>")))?;
                Ok(Section {
                    chunks: vec![
                        Chunk::Markup("<c01>".to_string()),
                        Chunk::Section(inner),
                        Chunk::Markup("</c01>".to_string()),
                    ],
                    fragments: RawFragments::default(),
                })
            })
            .expect("register");
        assert_eq!(outer.id(), 0);
        assert_eq!(registry.len(), 2);
        let section = registry.take(outer).expect("outer");
        assert_eq!(section.chunks[1], Chunk::Section(SectionToken(1)));
    }
}
