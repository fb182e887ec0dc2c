//! `archdesc`: the collection-level description and the `dsc` container.

use super::Session;
use super::header::write_address;
use super::{access, component, notes, physical};
use crate::error::Result;
use crate::mapping::{
    REPOSITORY_ANALOG, REPOSITORY_LABEL, UNITID_ANALOG, UNITID_LABEL, UNITTITLE_ANALOG,
    UNITTITLE_LABEL,
};
use crate::stream::{Attrs, Emitter};

pub(super) fn write_archdesc(s: &mut Session<'_>, out: &mut Emitter) -> Result<()> {
    let record = s.record;
    let attrs = Attrs::new()
        .opt("level", record.level.as_deref())
        .opt("otherlevel", record.other_level.as_deref())
        .with("type", "inventory")
        .with("relatedencoding", "MARC21");
    out.start("archdesc", &attrs)?;

    write_did(s, out)?;

    if s.options.include_daos {
        for dao in record.digital_objects() {
            physical::write_digital_object(s, out, dao)?;
        }
    }
    notes::write_nondid_notes(s, out, &record.notes)?;
    notes::write_bibliographies(s, out, &record.notes)?;
    notes::write_indexes(s, out, &record.notes)?;
    access::write_controlaccess(s, out, &record.subjects, &record.linked_agents)?;

    out.start("dsc", &Attrs::new().with("type", "combined"))?;
    component::write_children(s, out, &record.children, 1)?;
    out.end("dsc")?;

    out.end("archdesc")
}

fn write_did(s: &mut Session<'_>, out: &mut Emitter) -> Result<()> {
    let record = s.record;
    out.start("did", &Attrs::new())?;

    if let Some(title) = record.title.as_deref() {
        let attrs = Attrs::new()
            .with("label", UNITTITLE_LABEL)
            .with("encodinganalog", UNITTITLE_ANALOG);
        s.mixed_element(out, "unittitle", &attrs, title, false)?;
    }

    physical::write_dates(s, out, &record.dates)?;

    let unitid = Attrs::new()
        .opt("countrycode", record.repository.country.as_deref())
        .with("label", UNITID_LABEL)
        .with("encodinganalog", UNITID_ANALOG)
        .opt("repositorycode", record.repository.org_code.as_deref());
    s.mixed_element(out, "unitid", &unitid, &record.identifier(), false)?;

    component::write_external_ids(s, out, &record.external_ids)?;
    access::write_origination(s, out, &record.linked_agents)?;
    physical::write_extents(s, out, &record.extents)?;

    if let Some(language) = record.language.as_deref() {
        physical::write_language(s, out, language)?;
    }

    if let Some(name) = record.repository.name.as_deref() {
        let attrs = Attrs::new()
            .with("label", REPOSITORY_LABEL)
            .with("encodinganalog", REPOSITORY_ANALOG);
        out.start("repository", &attrs)?;
        s.mixed_element(out, "corpname", &Attrs::new(), name, false)?;
        let repo = &record.repository;
        if !repo.address_lines.is_empty() || repo.url.is_some() {
            write_address(s, out, repo)?;
        }
        out.end("repository")?;
    }

    notes::write_did_notes(s, out, &record.notes)?;
    physical::write_lang_materials(s, out, &record.lang_materials)?;
    for (instance, sub) in record.containers() {
        physical::write_container(s, out, instance, sub)?;
    }

    out.end("did")
}
