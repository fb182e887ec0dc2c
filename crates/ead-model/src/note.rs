//! Notes and their structured subnotes.

use serde::{Deserialize, Serialize};

use crate::visibility::impl_visibility;

/// Note type codes.
///
/// The set is closed: anything the exporter does not know deserializes to
/// [`NoteType::Unknown`] and is never emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteType {
    // Descriptive identification notes
    Abstract,
    Dimensions,
    Physdesc,
    Langmaterial,
    Physloc,
    Materialspec,
    Physfacet,
    // Descriptive notes
    Accruals,
    Appraisal,
    Arrangement,
    Bioghist,
    Accessrestrict,
    Userestrict,
    Custodhist,
    Altformavail,
    Originalsloc,
    Fileplan,
    Odd,
    Acqinfo,
    Legalstatus,
    Otherfindaid,
    Phystech,
    Prefercite,
    Processinfo,
    Relatedmaterial,
    Scopecontent,
    Separatedmaterial,
    // Structured notes
    Bibliography,
    Index,
    #[default]
    #[serde(other)]
    Unknown,
}

impl NoteType {
    /// Every known note type, in display order.
    pub const ALL: [NoteType; 29] = [
        NoteType::Abstract,
        NoteType::Dimensions,
        NoteType::Physdesc,
        NoteType::Langmaterial,
        NoteType::Physloc,
        NoteType::Materialspec,
        NoteType::Physfacet,
        NoteType::Accruals,
        NoteType::Appraisal,
        NoteType::Arrangement,
        NoteType::Bioghist,
        NoteType::Accessrestrict,
        NoteType::Userestrict,
        NoteType::Custodhist,
        NoteType::Altformavail,
        NoteType::Originalsloc,
        NoteType::Fileplan,
        NoteType::Odd,
        NoteType::Acqinfo,
        NoteType::Legalstatus,
        NoteType::Otherfindaid,
        NoteType::Phystech,
        NoteType::Prefercite,
        NoteType::Processinfo,
        NoteType::Relatedmaterial,
        NoteType::Scopecontent,
        NoteType::Separatedmaterial,
        NoteType::Bibliography,
        NoteType::Index,
    ];

    /// Parse a note type code; unknown codes map to [`NoteType::Unknown`].
    pub fn from_code(code: &str) -> NoteType {
        NoteType::ALL
            .into_iter()
            .find(|t| t.code() == code)
            .unwrap_or(NoteType::Unknown)
    }

    /// The code as it appears in resolved records.
    pub fn code(self) -> &'static str {
        match self {
            NoteType::Abstract => "abstract",
            NoteType::Dimensions => "dimensions",
            NoteType::Physdesc => "physdesc",
            NoteType::Langmaterial => "langmaterial",
            NoteType::Physloc => "physloc",
            NoteType::Materialspec => "materialspec",
            NoteType::Physfacet => "physfacet",
            NoteType::Accruals => "accruals",
            NoteType::Appraisal => "appraisal",
            NoteType::Arrangement => "arrangement",
            NoteType::Bioghist => "bioghist",
            NoteType::Accessrestrict => "accessrestrict",
            NoteType::Userestrict => "userestrict",
            NoteType::Custodhist => "custodhist",
            NoteType::Altformavail => "altformavail",
            NoteType::Originalsloc => "originalsloc",
            NoteType::Fileplan => "fileplan",
            NoteType::Odd => "odd",
            NoteType::Acqinfo => "acqinfo",
            NoteType::Legalstatus => "legalstatus",
            NoteType::Otherfindaid => "otherfindaid",
            NoteType::Phystech => "phystech",
            NoteType::Prefercite => "prefercite",
            NoteType::Processinfo => "processinfo",
            NoteType::Relatedmaterial => "relatedmaterial",
            NoteType::Scopecontent => "scopecontent",
            NoteType::Separatedmaterial => "separatedmaterial",
            NoteType::Bibliography => "bibliography",
            NoteType::Index => "index",
            NoteType::Unknown => "unknown",
        }
    }
}

/// A note attached to a record, component or language material.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Note {
    #[serde(rename = "type")]
    pub note_type: NoteType,
    pub label: Option<String>,
    pub persistent_id: Option<String>,
    pub publish: Option<bool>,
    /// Staff-only notes are never exported.
    pub internal: bool,
    /// Single-part content paragraphs.
    pub content: Vec<String>,
    /// Multi-part content.
    pub subnotes: Vec<Subnote>,
    /// Bibliography references.
    pub items: Vec<String>,
    pub index_items: Vec<IndexItem>,
}

impl Note {
    /// Flattened text of the note: content paragraphs followed by visible
    /// text subnotes, separated by blank lines.
    pub fn text(&self, include_unpublished: bool) -> String {
        let mut parts: Vec<&str> = self
            .content
            .iter()
            .map(String::as_str)
            .filter(|c| !c.is_empty())
            .collect();
        for subnote in &self.subnotes {
            if subnote.publish == Some(false) && !include_unpublished {
                continue;
            }
            if let SubnoteBody::Text { content } = &subnote.body {
                if !content.is_empty() {
                    parts.push(content);
                }
            }
        }
        parts.join("\n\n")
    }

    /// Joined content paragraphs only, `None` when there is no content.
    pub fn content_text(&self) -> Option<String> {
        let joined = self
            .content
            .iter()
            .filter(|c| !c.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n\n");
        if joined.is_empty() { None } else { Some(joined) }
    }
}

/// One structured part of a multi-part note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subnote {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub publish: Option<bool>,
    #[serde(flatten)]
    pub body: SubnoteBody,
}

/// Payload of a subnote.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubnoteBody {
    Text {
        #[serde(default)]
        content: String,
    },
    Chronology {
        #[serde(default)]
        items: Vec<ChronItem>,
    },
    OrderedList {
        #[serde(default)]
        enumeration: Option<String>,
        #[serde(default)]
        items: Vec<String>,
    },
    DefinedList {
        #[serde(default)]
        items: Vec<DefinedItem>,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChronItem {
    pub event_date: Option<String>,
    pub events: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DefinedItem {
    pub label: Option<String>,
    pub value: Option<String>,
}

/// Entry of an index note.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexItem {
    /// Index item type code (`person`, `geographic_name`, …).
    #[serde(rename = "type")]
    pub item_type: String,
    pub value: Option<String>,
    pub reference: Option<String>,
    pub reference_text: Option<String>,
}

impl_visibility!(Note, Subnote);
