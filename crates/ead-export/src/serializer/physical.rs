//! Dates, extents, languages, containers and digital objects.

use uuid::Uuid;

use ead_model::{
    DateRange, DateType, DigitalObject, Extent, FileVersion, Instance, LangMaterial, SubContainer,
    Visibility,
};

use super::Session;
use crate::config::{EXTENT_TYPES, INSTANCE_TYPES, SCRIPTS, language_label};
use crate::error::Result;
use crate::mapping::{
    EXTENT_ANALOG, LANGMATERIAL_ANALOG, LANGMATERIAL_LABEL, LANGUAGE_ANALOG, PHYSDESC_LABEL,
    UNITDATE_ANALOG, note_spec,
};
use crate::stream::{Attrs, Emitter};

fn date_type(date_type: DateType) -> Option<&'static str> {
    match date_type {
        DateType::Inclusive => Some("inclusive"),
        DateType::Bulk | DateType::Range => Some("bulk"),
        DateType::Single => None,
    }
}

/// One `unitdate` per visible date with display text.
pub(super) fn write_dates(s: &Session<'_>, out: &mut Emitter, dates: &[DateRange]) -> Result<()> {
    for date in dates.iter().filter(|d| s.visible(*d)) {
        let Some(text) = date.display() else {
            continue;
        };
        let normal = date.normal();
        let attrs = Attrs::new()
            .opt("normal", normal.as_deref())
            .opt("type", date_type(date.date_type))
            .opt("certainty", date.certainty.as_deref())
            .opt("label", date.label.as_deref())
            .opt("era", date.era.as_deref())
            .opt("calendar", date.calendar.as_deref())
            .audience(date.is_unpublished())
            .with("encodinganalog", UNITDATE_ANALOG);
        s.mixed_element(out, "unitdate", &attrs, &text, false)?;
    }
    Ok(())
}

pub(super) fn write_extents(s: &Session<'_>, out: &mut Emitter, extents: &[Extent]) -> Result<()> {
    let none = Attrs::new();
    for extent in extents.iter().filter(|e| s.visible(*e)) {
        let attrs = Attrs::new()
            .opt("altrender", extent.portion.as_deref())
            .audience(extent.is_unpublished())
            .with("label", PHYSDESC_LABEL);
        out.start("physdesc", &attrs)?;

        let number = extent.number.as_deref().unwrap_or_default();
        let kind = extent
            .extent_type
            .as_deref()
            .map(|code| s.labels.label(EXTENT_TYPES, code))
            .unwrap_or_default();
        let measure = format!("{number} {kind}");
        if !measure.trim().is_empty() {
            let attrs = Attrs::new()
                .with("altrender", "materialtype spaceoccupied")
                .with("encodinganalog", EXTENT_ANALOG);
            s.mixed_element(out, "extent", &attrs, measure.trim(), false)?;
        }
        if let Some(summary) = extent.container_summary.as_deref().filter(|c| !c.is_empty()) {
            let attrs = Attrs::new().with("altrender", "carrier");
            s.mixed_element(out, "extent", &attrs, summary, false)?;
        }
        if let Some(details) = extent.physical_details.as_deref().filter(|p| !p.is_empty()) {
            s.mixed_element(out, "physfacet", &none, details, false)?;
        }
        if let Some(dimensions) = extent.dimensions.as_deref().filter(|d| !d.is_empty()) {
            s.mixed_element(out, "dimensions", &none, dimensions, false)?;
        }
        out.end("physdesc")?;
    }
    Ok(())
}

/// Record-level language code.
pub(super) fn write_language(s: &Session<'_>, out: &mut Emitter, code: &str) -> Result<()> {
    let attrs = Attrs::new()
        .with("label", LANGMATERIAL_LABEL)
        .with("encodinganalog", LANGMATERIAL_ANALOG);
    out.start("langmaterial", &attrs)?;
    let language = Attrs::new()
        .with("langcode", code)
        .with("encodinganalog", LANGUAGE_ANALOG);
    out.text_element("language", &language, &language_label(s.labels, code))?;
    out.end("langmaterial")
}

/// Language-of-material notes, or a coded language list when no note was
/// exported.
pub(super) fn write_lang_materials(
    s: &Session<'_>,
    out: &mut Emitter,
    materials: &[LangMaterial],
) -> Result<()> {
    let mut wrote_note = false;
    for note in materials
        .iter()
        .flat_map(|m| &m.notes)
        .filter(|note| s.visible(*note))
    {
        let spec = note_spec(note.note_type);
        let id = s.prefixed(note.persistent_id.as_deref());
        let attrs = Attrs::new()
            .opt("id", id.as_deref())
            .audience(note.is_unpublished());
        let content = note.text(s.include_unpublished());
        s.mixed_element(out, spec.tag, &attrs, &content, spec.include_p)?;
        wrote_note = true;
    }
    if wrote_note {
        return Ok(());
    }

    let languages: Vec<_> = materials
        .iter()
        .filter_map(|m| m.language_and_script.as_ref())
        .filter(|ls| !ls.language.is_empty())
        .collect();
    if languages.is_empty() {
        return Ok(());
    }
    out.start("langmaterial", &Attrs::new())?;
    for (position, ls) in languages.iter().enumerate() {
        if position > 0 {
            out.text(", ")?;
        }
        let mut text = language_label(s.labels, &ls.language);
        if let Some(script) = ls.script.as_deref().filter(|sc| !sc.is_empty()) {
            text.push_str(&format!(", {} script", s.labels.label(SCRIPTS, script)));
        }
        let attrs = Attrs::new()
            .with("langcode", ls.language.as_str())
            .opt("scriptcode", ls.script.as_deref());
        out.text_element("language", &attrs, &text)?;
    }
    out.text(".")?;
    out.end("langmaterial")
}

/// Chained `container` elements for one instance.
pub(super) fn write_container(
    s: &Session<'_>,
    out: &mut Emitter,
    instance: &Instance,
    sub: &SubContainer,
) -> Result<()> {
    let top = &sub.top_container;
    let mut label = s.labels.label(INSTANCE_TYPES, &instance.instance_type);
    if let Some(barcode) = top.barcode.as_deref().filter(|b| !b.is_empty()) {
        label.push_str(&format!(" [{barcode}]"));
    }
    let profile = top
        .container_profile
        .as_ref()
        .and_then(|p| p.url.as_deref().or(p.name.as_deref()));

    let mut parent = container_id(s);
    let attrs = Attrs::new()
        .with("id", parent.as_str())
        .opt("type", top.container_type.as_deref())
        .with("label", label)
        .opt("altrender", profile);
    out.text_element("container", &attrs, &top.indicator)?;

    for (kind, indicator) in sub.levels() {
        let id = container_id(s);
        let attrs = Attrs::new()
            .with("id", id.as_str())
            .with("parent", parent.as_str())
            .with("type", kind);
        out.text_element("container", &attrs, indicator.unwrap_or_default())?;
        parent = id;
    }
    Ok(())
}

fn container_id(s: &Session<'_>) -> String {
    s.prefix_id(&Uuid::new_v4().simple().to_string())
}

fn versions<'d>(s: &Session<'_>, dao: &'d DigitalObject) -> Vec<&'d FileVersion> {
    dao.file_versions
        .iter()
        .filter(|v| s.include_unpublished() || v.is_explicitly_published())
        .collect()
}

/// `dao` or `daogrp` depending on how many file versions are exported.
pub(super) fn write_digital_object(
    s: &Session<'_>,
    out: &mut Emitter,
    dao: &DigitalObject,
) -> Result<()> {
    if dao.suppressed || !s.visible(dao) {
        return Ok(());
    }
    let versions = versions(s, dao);
    let title = dao.title.as_deref();
    let base = Attrs::new()
        .audience(dao.is_unpublished())
        .opt("xlink:title", title);
    let dao_internal = !dao.is_explicitly_published();

    match versions.as_slice() {
        [] => {
            let mut attrs = base
                .with("xlink:type", "simple")
                .with("xlink:href", dao.digital_object_id.as_str())
                .with("xlink:actuate", "onRequest")
                .with("xlink:show", "new");
            if dao_internal {
                attrs.set("audience", "internal");
            }
            write_dao(s, out, "dao", &attrs, dao)
        }
        [version] => {
            let mut attrs = base
                .with("xlink:type", "simple")
                .with(
                    "xlink:actuate",
                    version.xlink_actuate_attribute.as_deref().unwrap_or("onRequest"),
                )
                .with(
                    "xlink:show",
                    version.xlink_show_attribute.as_deref().unwrap_or("new"),
                )
                .opt("xlink:role", version.use_statement.as_deref())
                .with("xlink:href", version.file_uri.as_str());
            if dao_internal || !version.is_explicitly_published() {
                attrs.set("audience", "internal");
            }
            write_dao(s, out, "dao", &attrs, dao)
        }
        versions => {
            let group = base.clone().with("xlink:type", "extended");
            out.start("daogrp", &group)?;
            write_daodesc(s, out, dao)?;
            for version in versions {
                let mut attrs = base
                    .clone()
                    .with("xlink:type", "locator")
                    .with("xlink:href", version.file_uri.as_str())
                    .opt("xlink:role", version.use_statement.as_deref())
                    .opt("xlink:title", version.caption.as_deref());
                if dao_internal || !version.is_explicitly_published() {
                    attrs.set("audience", "internal");
                }
                out.empty("daoloc", &attrs)?;
            }
            out.end("daogrp")
        }
    }
}

fn write_dao(
    s: &Session<'_>,
    out: &mut Emitter,
    tag: &str,
    attrs: &Attrs,
    dao: &DigitalObject,
) -> Result<()> {
    out.start(tag, attrs)?;
    write_daodesc(s, out, dao)?;
    out.end(tag)
}

fn write_daodesc(s: &Session<'_>, out: &mut Emitter, dao: &DigitalObject) -> Result<()> {
    let description = dao.description();
    if description.is_empty() {
        return Ok(());
    }
    s.mixed_element(out, "daodesc", &Attrs::new(), &description, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_dates_carry_no_type() {
        assert_eq!(date_type(DateType::Single), None);
        assert_eq!(date_type(DateType::Inclusive), Some("inclusive"));
        assert_eq!(date_type(DateType::Range), Some("bulk"));
    }
}
