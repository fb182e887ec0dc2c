//! Notes: did notes, descriptive notes with subnotes, bibliographies and
//! indexes.

use ead_model::{Note, NoteType, Subnote, SubnoteBody, Visibility};

use super::Session;
use crate::config::NOTE_TYPES;
use crate::error::Result;
use crate::mapping::{Placement, index_item_tag, note_spec};
use crate::sanitize::{extract_head_text, write_mixed_content};
use crate::stream::{Attrs, Emitter};

fn exported<'n>(
    s: &'n Session<'_>,
    notes: &'n [Note],
    placement: Placement,
) -> impl Iterator<Item = &'n Note> {
    notes
        .iter()
        .filter(move |note| s.visible(*note) && note_spec(note.note_type).placement == placement)
}

fn note_id(s: &Session<'_>, note: &Note) -> Option<String> {
    s.prefixed(note.persistent_id.as_deref())
}

fn head_label(s: &Session<'_>, note: &Note) -> String {
    match note.label.as_deref() {
        Some(label) => label.to_string(),
        None => s.labels.label(NOTE_TYPES, note.note_type.code()),
    }
}

/// Notes that belong inside `did`.
pub(super) fn write_did_notes(s: &Session<'_>, out: &mut Emitter, notes: &[Note]) -> Result<()> {
    for note in exported(s, notes, Placement::Did) {
        let spec = note_spec(note.note_type);
        let content = note.text(s.include_unpublished());
        let id = note_id(s, note);
        let internal = note.is_unpublished();
        match note.note_type {
            NoteType::Dimensions | NoteType::Physfacet => {
                let attrs = Attrs::new()
                    .opt("id", id.as_deref())
                    .opt("label", note.label.as_deref());
                out.start("physdesc", &Attrs::new().audience(internal))?;
                s.mixed_element(out, spec.tag, &attrs, &content, spec.include_p)?;
                out.end("physdesc")?;
            }
            NoteType::Physdesc => {
                let attrs = Attrs::new()
                    .opt("id", id.as_deref())
                    .opt("label", note.label.as_deref())
                    .audience(internal);
                s.mixed_element(out, spec.tag, &attrs, &content, spec.include_p)?;
            }
            _ => {
                let attrs = Attrs::new().opt("id", id.as_deref()).audience(internal);
                s.mixed_element(out, spec.tag, &attrs, &content, spec.include_p)?;
            }
        }
    }
    Ok(())
}

/// Descriptive notes directly under `archdesc` or a component.
pub(super) fn write_nondid_notes(
    s: &Session<'_>,
    out: &mut Emitter,
    notes: &[Note],
) -> Result<()> {
    for note in exported(s, notes, Placement::Archdesc).filter(|note| !note.internal) {
        if note.note_type == NoteType::Legalstatus {
            out.start("accessrestrict", &Attrs::new().audience(note.is_unpublished()))?;
            write_note_content(s, out, note)?;
            out.end("accessrestrict")?;
        } else {
            write_note_content(s, out, note)?;
        }
    }
    Ok(())
}

fn write_note_content(s: &Session<'_>, out: &mut Emitter, note: &Note) -> Result<()> {
    let spec = note_spec(note.note_type);
    let id = note_id(s, note);
    let attrs = Attrs::new()
        .opt("id", id.as_deref())
        .audience(note.is_unpublished())
        .opt("encodinganalog", spec.encoding_analog);

    let backup = head_label(s, note);
    let content = note.content_text().unwrap_or_default();
    let (content, head) = extract_head_text(&content, Some(&backup));

    out.start(spec.tag, &attrs)?;
    let headless = spec.headless || content.trim_start().starts_with("<head");
    if !headless {
        if let Some(head) = head.as_deref() {
            s.mixed_element(out, "head", &Attrs::new(), head, false)?;
        }
    }
    write_mixed_content(out, &content, spec.include_p)?;
    write_subnotes(s, out, &note.subnotes, spec.include_p)?;
    out.end(spec.tag)
}

/// Structured subnotes: text, chronologies and lists.
fn write_subnotes(
    s: &Session<'_>,
    out: &mut Emitter,
    subnotes: &[Subnote],
    include_p: bool,
) -> Result<()> {
    let none = Attrs::new();
    for subnote in subnotes.iter().filter(|sn| s.visible(*sn)) {
        let internal = subnote.is_unpublished();
        let title = subnote.title.as_deref();
        match &subnote.body {
            SubnoteBody::Text { content } => write_mixed_content(out, content, include_p)?,
            SubnoteBody::Chronology { items } => {
                out.start("chronlist", &Attrs::new().audience(internal))?;
                write_list_head(s, out, title)?;
                for item in items {
                    out.start("chronitem", &none)?;
                    if let Some(date) = item.event_date.as_deref() {
                        s.mixed_element(out, "date", &none, date, false)?;
                    }
                    if !item.events.is_empty() {
                        out.start("eventgrp", &none)?;
                        for event in &item.events {
                            s.mixed_element(out, "event", &none, event, false)?;
                        }
                        out.end("eventgrp")?;
                    }
                    out.end("chronitem")?;
                }
                out.end("chronlist")?;
            }
            SubnoteBody::OrderedList { enumeration, items } => {
                let attrs = Attrs::new()
                    .with("type", "ordered")
                    .opt("numeration", enumeration.as_deref())
                    .audience(internal);
                out.start("list", &attrs)?;
                write_list_head(s, out, title)?;
                for item in items {
                    s.mixed_element(out, "item", &none, item, false)?;
                }
                out.end("list")?;
            }
            SubnoteBody::DefinedList { items } => {
                let attrs = Attrs::new().with("type", "deflist").audience(internal);
                out.start("list", &attrs)?;
                write_list_head(s, out, title)?;
                for item in items {
                    out.start("defitem", &none)?;
                    if let Some(label) = item.label.as_deref() {
                        s.mixed_element(out, "label", &none, label, false)?;
                    }
                    if let Some(value) = item.value.as_deref() {
                        s.mixed_element(out, "item", &none, value, false)?;
                    }
                    out.end("defitem")?;
                }
                out.end("list")?;
            }
        }
    }
    Ok(())
}

fn write_list_head(s: &Session<'_>, out: &mut Emitter, title: Option<&str>) -> Result<()> {
    match title {
        Some(title) => s.mixed_element(out, "head", &Attrs::new(), title, false),
        None => Ok(()),
    }
}

pub(super) fn write_bibliographies(
    s: &Session<'_>,
    out: &mut Emitter,
    notes: &[Note],
) -> Result<()> {
    let none = Attrs::new();
    for note in exported(s, notes, Placement::Bibliography) {
        let id = note_id(s, note);
        let attrs = Attrs::new()
            .opt("id", id.as_deref())
            .audience(note.is_unpublished());
        out.start("bibliography", &attrs)?;
        s.mixed_element(out, "head", &none, &head_label(s, note), false)?;
        write_mixed_content(out, &note.text(s.include_unpublished()), true)?;
        for item in note.items.iter().filter(|item| !item.is_empty()) {
            s.mixed_element(out, "bibref", &none, item, false)?;
        }
        out.end("bibliography")?;
    }
    Ok(())
}

pub(super) fn write_indexes(s: &Session<'_>, out: &mut Emitter, notes: &[Note]) -> Result<()> {
    let none = Attrs::new();
    for note in exported(s, notes, Placement::Index) {
        let id = note_id(s, note);
        let attrs = Attrs::new()
            .opt("id", id.as_deref())
            .audience(note.is_unpublished());
        let backup = head_label(s, note);
        let (content, head) = extract_head_text(&note.text(s.include_unpublished()), Some(&backup));

        out.start("index", &attrs)?;
        if let Some(head) = head.as_deref() {
            s.mixed_element(out, "head", &none, head, false)?;
        }
        write_mixed_content(out, &content, true)?;
        for item in &note.index_items {
            let Some(tag) = index_item_tag(&item.item_type) else {
                continue;
            };
            out.start("indexentry", &none)?;
            if let Some(value) = item.value.as_deref() {
                s.mixed_element(out, tag, &none, value, false)?;
            }
            if let Some(text) = item.reference_text.as_deref() {
                let target = s.prefixed(item.reference.as_deref());
                let ref_attrs = Attrs::new().opt("target", target.as_deref());
                s.mixed_element(out, "ref", &ref_attrs, text, false)?;
            }
            out.end("indexentry")?;
        }
        out.end("index")?;
    }
    Ok(())
}
