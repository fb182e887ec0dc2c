//! Component subtrees (`c` / `c01`…`c12`).

use tracing::debug;

use ead_model::{Component, ExternalId, Visibility};

use super::{Pending, Session};
use super::{access, notes, physical};
use crate::error::Result;
use crate::guard::Scope;
use crate::stream::{Attrs, Emitter};

/// Reserve a section for each exported child, in order, and queue the
/// children for [`write_pending`].
pub(super) fn write_children(
    s: &mut Session<'_>,
    out: &mut Emitter,
    children: &[usize],
    depth: usize,
) -> Result<()> {
    let record = s.record;
    for &index in children {
        let component = match record.component(index) {
            Ok(component) => component,
            Err(err) => {
                let token =
                    s.isolated_section(Scope::ArchivalObject, None, |_, _| Err(err.into()))?;
                out.section(token)?;
                continue;
            }
        };
        if component.suppressed || !s.visible(component) {
            debug!(index, ref_id = component.ref_id.as_deref(), "component skipped");
            s.summary.components_skipped += 1;
            continue;
        }
        let token = s.sections.reserve();
        out.section(token)?;
        s.pending.push(Pending {
            component,
            index,
            depth,
            token,
        });
    }
    Ok(())
}

/// Produce every queued component, depth first in document order.
/// Uses the session's queue as an explicit stack; no recursion.
pub(super) fn write_pending(s: &mut Session<'_>) -> Result<()> {
    while let Some(next) = s.pending.pop() {
        s.visit(next.index)?;
        let component = next.component;
        s.fill_isolated(
            next.token,
            Scope::ArchivalObject,
            component.ref_id.as_deref(),
            |s, out| write_component(s, out, component, next.depth),
        )?;
    }
    Ok(())
}

/// Element name for a component at `depth` (1 for children of the record).
pub fn component_tag(numbered: bool, depth: usize) -> String {
    if numbered {
        format!("c{depth:02}")
    } else {
        "c".to_string()
    }
}

fn write_component(
    s: &mut Session<'_>,
    out: &mut Emitter,
    component: &Component,
    depth: usize,
) -> Result<()> {
    debug!(depth, ref_id = component.ref_id.as_deref(), "component");
    let tag = component_tag(s.options.use_numbered_c_tags, depth);
    let id = s.prefixed(component.ref_id.as_deref());
    let attrs = Attrs::new()
        .opt("level", component.level.as_deref())
        .opt("otherlevel", component.other_level.as_deref())
        .opt("id", id.as_deref())
        .audience(component.is_unpublished());
    out.start(&tag, &attrs)?;

    out.start("did", &Attrs::new())?;
    if let Some(title) = component.title.as_deref() {
        s.mixed_element(out, "unittitle", &Attrs::new(), title, false)?;
    }
    if let Some(ark_url) = component.ark_url.as_deref().filter(|u| !u.is_empty()) {
        out.start("unitid", &Attrs::new())?;
        let link = Attrs::new()
            .with("xlink:href", ark_url)
            .with("xlink:actuate", "onLoad")
            .with("xlink:show", "new")
            .with("xlink:type", "simple");
        out.text_element("extref", &link, "Archival Resource Key")?;
        out.end("unitid")?;
    }
    if let Some(component_id) = component.component_id.as_deref().filter(|c| !c.is_empty()) {
        out.text_element("unitid", &Attrs::new(), component_id)?;
    }
    write_external_ids(s, out, &component.external_ids)?;
    access::write_origination(s, out, &component.linked_agents)?;
    physical::write_extents(s, out, &component.extents)?;
    physical::write_dates(s, out, &component.dates)?;
    notes::write_did_notes(s, out, &component.notes)?;
    for (instance, sub) in component.containers() {
        physical::write_container(s, out, instance, sub)?;
    }
    if s.options.include_daos {
        for dao in component.digital_objects() {
            physical::write_digital_object(s, out, dao)?;
        }
    }
    out.end("did")?;

    notes::write_nondid_notes(s, out, &component.notes)?;
    notes::write_bibliographies(s, out, &component.notes)?;
    notes::write_indexes(s, out, &component.notes)?;
    access::write_controlaccess(s, out, &component.subjects, &component.linked_agents)?;

    write_children(s, out, &component.children, depth + 1)?;

    out.end(&tag)?;
    s.summary.components_written += 1;
    Ok(())
}

/// External identifiers, exported only for internal audiences.
pub(super) fn write_external_ids(
    s: &Session<'_>,
    out: &mut Emitter,
    external_ids: &[ExternalId],
) -> Result<()> {
    if !s.include_unpublished() {
        return Ok(());
    }
    for exid in external_ids {
        let attrs = Attrs::new()
            .with("audience", "internal")
            .with("type", exid.source.as_str())
            .with("identifier", exid.external_id.as_str());
        out.text_element("unitid", &attrs, &exid.external_id)?;
    }
    Ok(())
}
