//! EAD 2002 serialization of a resolved record.
//!
//! The record is walked once. The document body and every component subtree
//! are produced into their own section behind a fault boundary, so a failing
//! subtree is replaced by a diagnostic text node while its siblings are
//! still exported. The result is an [`EadStream`] that assembles the
//! sections lazily in document order.

mod access;
mod archdesc;
mod component;
mod header;
mod notes;
mod physical;

use tracing::{info, info_span, warn};

use ead_model::{Component, Record, Visibility};

use crate::config::{ExportOptions, LabelLookup};
use crate::error::Result;
use crate::fragments::{SectionRegistry, SectionToken};
use crate::guard::{self, ExportSummary, Failure, Outcome, Scope};
use crate::mapping::{EAD_NS, SCHEMA_LOCATION, XLINK_NS, XSI_NS};
use crate::sanitize::write_mixed_content;
use crate::stream::{Attrs, EadStream, Emitter};

/// Serializes records to EAD with fixed options and labels.
pub struct EadSerializer<'a> {
    options: ExportOptions,
    labels: &'a dyn LabelLookup,
}

impl<'a> EadSerializer<'a> {
    pub fn new(options: ExportOptions, labels: &'a dyn LabelLookup) -> Self {
        Self { options, labels }
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Walk `record` and return the document as a lazy stream.
    ///
    /// Fails only on fatal errors; node-level failures are contained and
    /// reported through [`EadStream::summary`].
    pub fn stream(&self, record: &Record) -> Result<EadStream> {
        let identifier = record.identifier();
        let span = info_span!("export", identifier = %identifier);
        let _guard = span.enter();

        let mut session = Session::new(&self.options, self.labels, record);
        let mut root = Emitter::new(self.options.pretty);
        root.decl()?;
        let ead = Attrs::new()
            .with("xmlns", EAD_NS)
            .with("xmlns:xsi", XSI_NS)
            .with("xsi:schemaLocation", SCHEMA_LOCATION)
            .with("xmlns:xlink", XLINK_NS)
            .audience(record.is_unpublished());
        root.start("ead", &ead)?;
        let body = session.isolated_section(Scope::Resource, None, |s, out| {
            header::write_eadheader(s, out)?;
            archdesc::write_archdesc(s, out)
        })?;
        component::write_pending(&mut session)?;
        root.section(body)?;
        root.end("ead")?;
        let root = root.finish()?;

        let summary = session.summary;
        info!(
            written = summary.components_written,
            skipped = summary.components_skipped,
            failures = summary.failures.len(),
            sections = session.sections.len(),
            "record serialized"
        );
        Ok(EadStream::new(session.sections, root, summary))
    }
}

/// Serialize `record` into a single string.
pub fn export_ead(
    record: &Record,
    options: &ExportOptions,
    labels: &dyn LabelLookup,
) -> Result<String> {
    EadSerializer::new(options.clone(), labels)
        .stream(record)?
        .into_string()
}

/// Mutable state of one serialization pass.
pub(crate) struct Session<'a> {
    pub options: &'a ExportOptions,
    pub labels: &'a dyn LabelLookup,
    pub record: &'a Record,
    pub sections: SectionRegistry,
    pub first_persname: bool,
    pub first_corpname: bool,
    pub first_geogname: bool,
    visited: Vec<bool>,
    /// Components still to be written, next one last.
    pub pending: Vec<Pending<'a>>,
    pub summary: ExportSummary,
}

impl<'a> Session<'a> {
    fn new(options: &'a ExportOptions, labels: &'a dyn LabelLookup, record: &'a Record) -> Self {
        Self {
            options,
            labels,
            record,
            sections: SectionRegistry::new(),
            first_persname: true,
            first_corpname: true,
            first_geogname: true,
            visited: vec![false; record.components.len()],
            pending: Vec::new(),
            summary: ExportSummary::default(),
        }
    }

    pub fn include_unpublished(&self) -> bool {
        self.options.include_unpublished
    }

    /// Whether an entity survives the unpublished policy of this run.
    pub fn visible(&self, item: &impl Visibility) -> bool {
        item.is_visible(self.options.include_unpublished)
    }

    /// Apply the identifier prefix. Empty and `"null"` ids stay empty.
    pub fn prefix_id(&self, id: &str) -> String {
        prefix_id(&self.options.id_prefix, id)
    }

    /// Prefixed id for an optional stored id, `None` when it is blank.
    pub fn prefixed(&self, id: Option<&str>) -> Option<String> {
        id.map(|id| self.prefix_id(id)).filter(|id| !id.is_empty())
    }

    /// Record that component `index` is being walked; a second visit means
    /// the child relation is not a tree.
    pub fn visit(&mut self, index: usize) -> Result<()> {
        match self.visited.get_mut(index) {
            Some(seen) if *seen => Err(crate::error::ExportError::MalformedTree { index }),
            Some(seen) => {
                *seen = true;
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// `<tag attrs>` + sanitized content + `</tag>`.
    pub fn mixed_element(
        &self,
        out: &mut Emitter,
        tag: &str,
        attrs: &Attrs,
        content: &str,
        allow_p: bool,
    ) -> Result<()> {
        out.start(tag, attrs)?;
        write_mixed_content(out, content, allow_p)?;
        out.end(tag)
    }

    /// Produce a subtree into its own section behind a fault boundary.
    pub fn isolated_section<F>(
        &mut self,
        scope: Scope,
        reference: Option<&str>,
        producer: F,
    ) -> Result<SectionToken>
    where
        F: FnOnce(&mut Session<'a>, &mut Emitter) -> Result<()>,
    {
        let token = self.sections.reserve();
        self.fill_isolated(token, scope, reference, producer)?;
        Ok(token)
    }

    /// Fill a reserved section behind a fault boundary.
    ///
    /// On a node-level failure everything the producer reserved, queued or
    /// counted is rolled back and the section holds a diagnostic text node.
    pub fn fill_isolated<F>(
        &mut self,
        token: SectionToken,
        scope: Scope,
        reference: Option<&str>,
        producer: F,
    ) -> Result<()>
    where
        F: FnOnce(&mut Session<'a>, &mut Emitter) -> Result<()>,
    {
        let checkpoint = self.checkpoint();
        let mut out = Emitter::new(self.options.pretty);
        let result = producer(self, &mut out).and_then(|()| out.finish());
        match guard::contain(result)? {
            Outcome::Completed(section) => {
                // Children were queued in document order; the queue pops from the back.
                self.pending[checkpoint.pending..].reverse();
                self.sections.fill(token, section)
            }
            Outcome::Failed(error) => {
                let dropped = self.rollback(&checkpoint);
                warn!(
                    scope = %scope,
                    reference = reference.unwrap_or_default(),
                    dropped_sections = dropped,
                    error = %error,
                    "subtree export failed, writing diagnostic instead"
                );
                self.summary.failures.push(Failure {
                    scope,
                    reference: reference.map(str::to_string),
                    message: error.to_string(),
                });
                let mut out = Emitter::new(self.options.pretty);
                out.text(&guard::failure_text(scope, &error))?;
                self.sections.fill(token, out.finish()?)
            }
        }
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            next_section: self.sections.next_token(),
            pending: self.pending.len(),
            first_persname: self.first_persname,
            first_corpname: self.first_corpname,
            first_geogname: self.first_geogname,
            components_written: self.summary.components_written,
            components_skipped: self.summary.components_skipped,
        }
    }

    /// Undo a failed producer; returns the number of sections dropped.
    fn rollback(&mut self, checkpoint: &Checkpoint) -> usize {
        self.pending.truncate(checkpoint.pending);
        self.first_persname = checkpoint.first_persname;
        self.first_corpname = checkpoint.first_corpname;
        self.first_geogname = checkpoint.first_geogname;
        self.summary.components_written = checkpoint.components_written;
        self.summary.components_skipped = checkpoint.components_skipped;
        self.sections.discard_from(checkpoint.next_section)
    }
}

/// A component whose section slot is reserved but not yet produced.
pub(crate) struct Pending<'a> {
    pub component: &'a Component,
    pub index: usize,
    pub depth: usize,
    pub token: SectionToken,
}

/// Session state captured before a producer runs.
struct Checkpoint {
    next_section: SectionToken,
    pending: usize,
    first_persname: bool,
    first_corpname: bool,
    first_geogname: bool,
    components_written: usize,
    components_skipped: usize,
}

/// `prefix + id`, unless `id` is blank or already prefixed.
pub fn prefix_id(prefix: &str, id: &str) -> String {
    if id.is_empty() || id == "null" {
        String::new()
    } else if id.starts_with(prefix) {
        id.to_string()
    } else {
        format!("{prefix}{id}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_id_rules() {
        assert_eq!(prefix_id("aspace_", ""), "");
        assert_eq!(prefix_id("aspace_", "null"), "");
        assert_eq!(prefix_id("aspace_", "aspace_123"), "aspace_123");
        assert_eq!(prefix_id("aspace_", "123"), "aspace_123");
    }
}
