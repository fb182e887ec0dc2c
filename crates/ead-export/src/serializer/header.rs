//! `eadheader`: finding-aid identification, file description, profile and
//! revisions.

use chrono::Utc;

use ead_model::{Repository, RevisionStatement, Visibility};

use super::Session;
use crate::config::{LabelLookup, RESOURCE, SCRIPTS, language_label};
use crate::error::Result;
use crate::sanitize::emit_raw;
use crate::stream::{Attrs, Emitter};

pub(super) fn write_eadheader(s: &mut Session<'_>, out: &mut Emitter) -> Result<()> {
    let record = s.record;
    let aid = &record.finding_aid;
    let repo = &record.repository;

    let attrs = Attrs::new()
        .opt("findaidstatus", aid.status.as_deref())
        .with("repositoryencoding", "iso15511")
        .with("countryencoding", "iso3166-1")
        .with("dateencoding", "iso8601")
        .with("langencoding", "iso639-2b");
    out.start("eadheader", &attrs)?;

    let eadid_url = record.ark_url.as_deref().or(aid.ead_location.as_deref());
    let eadid = Attrs::new()
        .opt("countrycode", repo.country.as_deref())
        .opt("url", eadid_url)
        .opt("identifier", aid.ead_id.as_deref())
        .opt("mainagencycode", repo.org_code.as_deref());
    match aid.ead_id.as_deref().filter(|id| !id.is_empty()) {
        Some(ead_id) => out.text_element("eadid", &eadid, ead_id)?,
        None => out.empty("eadid", &eadid)?,
    }

    write_filedesc(s, out)?;
    write_profiledesc(s, out)?;
    write_revisiondesc(s, out, &record.revision_statements)?;

    out.end("eadheader")
}

fn write_filedesc(s: &mut Session<'_>, out: &mut Emitter) -> Result<()> {
    let record = s.record;
    let aid = &record.finding_aid;
    let none = Attrs::new();

    out.start("filedesc", &none)?;
    out.start("titlestmt", &none)?;
    if let Some(filing) = aid.filing_title.as_deref() {
        let filing_attrs = Attrs::new().with("type", "filing");
        s.mixed_element(out, "titleproper", &filing_attrs, filing, false)?;
    }
    s.mixed_element(out, "titleproper", &none, &title_proper(s), false)?;
    for (tag, value) in [
        ("subtitle", &aid.subtitle),
        ("author", &aid.author),
        ("sponsor", &aid.sponsor),
    ] {
        if let Some(value) = value.as_deref() {
            s.mixed_element(out, tag, &none, value, false)?;
        }
    }
    out.end("titlestmt")?;

    if let Some(edition) = aid.edition_statement.as_deref() {
        s.mixed_element(out, "editionstmt", &none, edition, true)?;
    }

    write_publicationstmt(s, out)?;

    if let Some(series) = aid.series_statement.as_deref() {
        s.mixed_element(out, "seriesstmt", &none, series, true)?;
    }
    if let Some(note) = aid.note.as_deref() {
        out.start("notestmt", &none)?;
        s.mixed_element(out, "note", &none, note, true)?;
        out.end("notestmt")?;
    }
    out.end("filedesc")
}

/// Finding-aid title (or the record title) followed by the identifier.
fn title_proper(s: &Session<'_>) -> String {
    let record = s.record;
    let mut title = String::new();
    if let Some(aid_title) = record.finding_aid.title.as_deref() {
        title.push_str(aid_title);
        title.push(' ');
    } else if let Some(record_title) = record.title.as_deref() {
        title.push_str(record_title);
    }
    title.push_str(&format!("<num>{}</num>", record.identifier()));
    title
}

fn write_publicationstmt(s: &mut Session<'_>, out: &mut Emitter) -> Result<()> {
    let record = s.record;
    let repo = &record.repository;
    let none = Attrs::new();

    out.start("publicationstmt", &none)?;
    s.mixed_element(
        out,
        "publisher",
        &none,
        repo.name.as_deref().unwrap_or_default(),
        false,
    )?;
    if let Some(image_url) = repo.image_url.as_deref() {
        out.start("p", &Attrs::new().with("id", "logostmt"))?;
        let logo = Attrs::new()
            .with("xlink:href", image_url)
            .with("xlink:actuate", "onLoad")
            .with("xlink:show", "embed")
            .with("xlink:type", "simple");
        out.empty("extref", &logo)?;
        out.end("p")?;
    }
    if let Some(date) = record.finding_aid.date.as_deref() {
        out.start("p", &none)?;
        s.mixed_element(out, "date", &none, date, false)?;
        out.end("p")?;
    }
    if !repo.address_lines.is_empty() {
        write_address(s, out, repo)?;
    }
    out.end("publicationstmt")
}

/// `address` with one `addressline` per line, then the repository URL.
pub(super) fn write_address(s: &Session<'_>, out: &mut Emitter, repo: &Repository) -> Result<()> {
    let none = Attrs::new();
    out.start("address", &none)?;
    for line in &repo.address_lines {
        s.mixed_element(out, "addressline", &none, line, false)?;
    }
    if let Some(url) = repo.url.as_deref() {
        out.start("addressline", &none)?;
        out.text("URL: ")?;
        let link = Attrs::new()
            .with("xlink:href", url)
            .with("xlink:title", url)
            .with("xlink:type", "simple")
            .with("xlink:show", "new");
        out.empty("extptr", &link)?;
        out.end("addressline")?;
    }
    out.end("address")
}

fn write_profiledesc(s: &mut Session<'_>, out: &mut Emitter) -> Result<()> {
    let record = s.record;
    let aid = &record.finding_aid;
    let none = Attrs::new();

    out.start("profiledesc", &none)?;
    let creation = format!(
        "This finding aid was produced using {} on <date>{}</date>.",
        s.options.generator,
        Utc::now().format("%Y-%m-%d %H:%M:%S %z")
    );
    s.mixed_element(out, "creation", &none, &creation, false)?;

    if let Some(note) = aid.language_note.as_deref() {
        out.start("langusage", &none)?;
        emit_raw(out, note)?;
        out.end("langusage")?;
    } else if let Some(language) = aid.language.as_deref() {
        write_langusage(s.labels, out, language, aid.script.as_deref())?;
    }

    if let Some(rules) = aid.description_rules.as_deref() {
        s.mixed_element(out, "descrules", &none, rules, false)?;
    }
    out.end("profiledesc")
}

fn write_langusage(
    labels: &dyn LabelLookup,
    out: &mut Emitter,
    language: &str,
    script: Option<&str>,
) -> Result<()> {
    out.start("langusage", &Attrs::new())?;
    let intro = labels
        .lookup(RESOURCE, "finding_aid_langusage_label")
        .unwrap_or_else(|| "Finding aid written in ".to_string());
    out.text(&intro)?;

    let attrs = Attrs::new()
        .with("langcode", language)
        .opt("scriptcode", script);
    let mut text = language_label(labels, language);
    if let Some(script) = script.filter(|s| !s.is_empty()) {
        let word = labels
            .lookup(RESOURCE, "script")
            .unwrap_or_else(|| "script".to_string());
        text.push_str(&format!(
            ", {} {}",
            labels.label(SCRIPTS, script),
            word.to_lowercase()
        ));
    }
    out.text_element("language", &attrs, &text)?;
    out.text(".")?;
    out.end("langusage")
}

fn write_revisiondesc(
    s: &mut Session<'_>,
    out: &mut Emitter,
    statements: &[RevisionStatement],
) -> Result<()> {
    let exported: Vec<&RevisionStatement> = statements
        .iter()
        .filter(|rs| s.include_unpublished() || rs.is_explicitly_published())
        .collect();
    if exported.is_empty() {
        return Ok(());
    }
    let none = Attrs::new();
    out.start("revisiondesc", &none)?;
    for rs in exported {
        let description = rs.description.as_deref();
        if let Some(markup) = description.filter(|d| d.trim_start().starts_with('<')) {
            emit_raw(out, markup)?;
            continue;
        }
        out.start(
            "change",
            &Attrs::new().audience(!rs.is_explicitly_published()),
        )?;
        out.start("date", &none)?;
        emit_raw(out, rs.date.as_deref().unwrap_or_default())?;
        out.end("date")?;
        if let Some(description) = description {
            out.start("item", &none)?;
            emit_raw(out, description)?;
            out.end("item")?;
        }
        out.end("change")?;
    }
    out.end("revisiondesc")
}
