//! Field-to-element and field-to-attribute tables.
//!
//! Encoding analogs are MARC 21 field/subfield pairs written to the
//! `encodinganalog` attribute.

use std::collections::HashMap;
use std::sync::LazyLock;

use ead_model::{AgentType, NoteType};

/// Where a note type is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Inside `did`.
    Did,
    /// Directly under `archdesc` or a component.
    Archdesc,
    Bibliography,
    Index,
    /// Never exported.
    Ignored,
}

/// How one note type is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteSpec {
    pub tag: &'static str,
    pub placement: Placement,
    pub encoding_analog: Option<&'static str>,
    /// Content may be split into `<p>` paragraphs.
    pub include_p: bool,
    /// No `head` element is written.
    pub headless: bool,
    /// Default head label.
    pub label: &'static str,
}

const fn did(tag: &'static str, headless: bool, label: &'static str) -> NoteSpec {
    NoteSpec {
        tag,
        placement: Placement::Did,
        encoding_analog: None,
        include_p: false,
        headless,
        label,
    }
}

const fn archdesc(
    tag: &'static str,
    encoding_analog: Option<&'static str>,
    include_p: bool,
    label: &'static str,
) -> NoteSpec {
    NoteSpec {
        tag,
        placement: Placement::Archdesc,
        encoding_analog,
        include_p,
        headless: false,
        label,
    }
}

pub fn note_spec(note_type: NoteType) -> NoteSpec {
    match note_type {
        NoteType::Abstract => did("abstract", true, "Abstract"),
        NoteType::Dimensions => did("dimensions", false, "Dimensions"),
        NoteType::Physdesc => did("physdesc", false, "Physical Description"),
        NoteType::Langmaterial => did("langmaterial", true, "Language of Materials"),
        NoteType::Physloc => did("physloc", true, "Physical Location"),
        NoteType::Materialspec => did("materialspec", true, "Materials Specific Details"),
        NoteType::Physfacet => did("physfacet", false, "Physical Facet"),
        NoteType::Accruals => archdesc("accruals", None, true, "Accruals"),
        NoteType::Appraisal => archdesc("appraisal", None, true, "Appraisal"),
        NoteType::Arrangement => archdesc("arrangement", Some("351$b"), true, "Arrangement"),
        NoteType::Bioghist => {
            archdesc("bioghist", Some("545$a"), true, "Biographical / Historical")
        }
        NoteType::Accessrestrict => archdesc(
            "accessrestrict",
            Some("506$a"),
            true,
            "Conditions Governing Access",
        ),
        NoteType::Userestrict => archdesc(
            "userestrict",
            Some("540$a"),
            true,
            "Conditions Governing Use",
        ),
        NoteType::Custodhist => archdesc("custodhist", Some("561$a"), true, "Custodial History"),
        NoteType::Altformavail => archdesc(
            "altformavail",
            Some("530$a"),
            true,
            "Existence and Location of Copies",
        ),
        NoteType::Originalsloc => archdesc(
            "originalsloc",
            Some("535$a"),
            true,
            "Existence and Location of Originals",
        ),
        NoteType::Fileplan => archdesc("fileplan", None, true, "File Plan"),
        NoteType::Odd => archdesc("odd", None, true, "General"),
        NoteType::Acqinfo => archdesc(
            "acqinfo",
            Some("541$a"),
            true,
            "Immediate Source of Acquisition",
        ),
        NoteType::Legalstatus => archdesc("legalstatus", None, false, "Legal Status"),
        NoteType::Otherfindaid => archdesc("otherfindaid", None, true, "Other Finding Aids"),
        NoteType::Phystech => archdesc(
            "phystech",
            None,
            true,
            "Physical Characteristics and Technical Requirements",
        ),
        NoteType::Prefercite => archdesc("prefercite", Some("524$a"), true, "Preferred Citation"),
        NoteType::Processinfo => {
            archdesc("processinfo", Some("583$a"), true, "Processing Information")
        }
        NoteType::Relatedmaterial => {
            archdesc("relatedmaterial", Some("544$a"), true, "Related Materials")
        }
        NoteType::Scopecontent => {
            archdesc("scopecontent", Some("520$a"), true, "Scope and Contents")
        }
        NoteType::Separatedmaterial => archdesc(
            "separatedmaterial",
            Some("544$d"),
            true,
            "Separated Materials",
        ),
        NoteType::Bibliography => NoteSpec {
            tag: "bibliography",
            placement: Placement::Bibliography,
            encoding_analog: None,
            include_p: true,
            headless: false,
            label: "Bibliography",
        },
        NoteType::Index => NoteSpec {
            tag: "index",
            placement: Placement::Index,
            encoding_analog: None,
            include_p: true,
            headless: false,
            label: "Index",
        },
        NoteType::Unknown => NoteSpec {
            tag: "odd",
            placement: Placement::Ignored,
            encoding_analog: None,
            include_p: false,
            headless: true,
            label: "",
        },
    }
}

/// Element name for an agent; `None` for agent types without one.
pub fn agent_tag(agent_type: AgentType) -> Option<&'static str> {
    match agent_type {
        AgentType::Person => Some("persname"),
        AgentType::Family => Some("famname"),
        AgentType::CorporateEntity => Some("corpname"),
        AgentType::Software => Some("name"),
        AgentType::Unknown => None,
    }
}

/// Element used for a subject heading in `controlaccess`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SubjectNode {
    Geogname,
    Subject,
    Genreform,
    Function,
    Occupation,
    Title,
}

impl SubjectNode {
    pub fn tag(self) -> &'static str {
        match self {
            SubjectNode::Geogname => "geogname",
            SubjectNode::Subject => "subject",
            SubjectNode::Genreform => "genreform",
            SubjectNode::Function => "function",
            SubjectNode::Occupation => "occupation",
            SubjectNode::Title => "title",
        }
    }

    /// Head of the `controlaccess` group for this node.
    pub fn head(self) -> &'static str {
        match self {
            SubjectNode::Geogname => "Geographic Names",
            SubjectNode::Subject => "Themes",
            SubjectNode::Genreform => "Material Type",
            SubjectNode::Function | SubjectNode::Occupation | SubjectNode::Title => "",
        }
    }

    /// Fixed encoding analog. Geographic names depend on position and are
    /// resolved by [`geogname_encoding`].
    pub fn encoding_analog(self) -> Option<&'static str> {
        match self {
            SubjectNode::Subject => Some("650$a"),
            SubjectNode::Genreform => Some("655$a"),
            SubjectNode::Geogname
            | SubjectNode::Function
            | SubjectNode::Occupation
            | SubjectNode::Title => None,
        }
    }
}

/// Subject node for a term type, with the raw type kept when it is not a
/// known one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectMapping {
    pub node: SubjectNode,
    pub unknown: Option<String>,
}

pub fn subject_mapping(term_type: &str) -> SubjectMapping {
    let node = match term_type {
        "function" => SubjectNode::Function,
        "genre_form" | "style_period" => SubjectNode::Genreform,
        "geographic" | "cultural_context" => SubjectNode::Geogname,
        "occupation" => SubjectNode::Occupation,
        "topical" => SubjectNode::Subject,
        "uniform_title" => SubjectNode::Title,
        other => {
            return SubjectMapping {
                node: SubjectNode::Subject,
                unknown: Some(other.to_string()),
            };
        }
    };
    SubjectMapping {
        node,
        unknown: None,
    }
}

/// `(encodinganalog, role)` for a geographic name, by first occurrence.
pub fn geogname_encoding(first: bool) -> (&'static str, &'static str) {
    if first {
        ("044$c", "country of origin")
    } else {
        ("651$a", "subject")
    }
}

/// Encoding analog of an origination name, by first occurrence.
pub fn origination_encoding(tag: &str, first: bool) -> Option<&'static str> {
    match (tag, first) {
        ("persname", true) => Some("100$a"),
        ("persname", false) => Some("700$a"),
        ("corpname", true) => Some("110$a"),
        ("corpname", false) => Some("710$a"),
        _ => None,
    }
}

/// Head of a `controlaccess` group of subject agents.
pub fn agent_head(tag: &str) -> &'static str {
    match tag {
        "persname" => "Persons",
        "corpname" => "Organizations",
        _ => "",
    }
}

/// Encoding analog of a subject agent in `controlaccess`.
pub fn agent_subject_encoding(tag: &str) -> Option<&'static str> {
    match tag {
        "persname" => Some("600$a"),
        "corpname" => Some("610$a"),
        _ => None,
    }
}

static INDEX_ITEM_TAGS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("corporate_entity", "corpname"),
        ("genre_form", "genreform"),
        ("name", "name"),
        ("occupation", "occupation"),
        ("person", "persname"),
        ("subject", "subject"),
        ("family", "famname"),
        ("function", "function"),
        ("geographic_name", "geogname"),
        ("title", "title"),
    ])
});

/// Element for an index entry value; unmapped types are skipped.
pub fn index_item_tag(item_type: &str) -> Option<&'static str> {
    INDEX_ITEM_TAGS.get(item_type).copied()
}

// Fixed did-level encodings.
pub const UNITTITLE_LABEL: &str = "Title";
pub const UNITTITLE_ANALOG: &str = "245$a";
pub const UNITID_LABEL: &str = "Collection no.";
pub const UNITID_ANALOG: &str = "852$j";
pub const UNITDATE_ANALOG: &str = "245$g";
pub const LANGMATERIAL_LABEL: &str = "Language of Material";
pub const LANGMATERIAL_ANALOG: &str = "546$a";
pub const LANGUAGE_ANALOG: &str = "041$a";
pub const REPOSITORY_LABEL: &str = "Repository";
pub const REPOSITORY_ANALOG: &str = "852$a";
pub const PHYSDESC_LABEL: &str = "Physical Description";
pub const EXTENT_ANALOG: &str = "300$a";

/// Namespaces and schema location of the root element.
pub const EAD_NS: &str = "urn:isbn:1-931666-22-9";
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const XLINK_NS: &str = "http://www.w3.org/1999/xlink";
pub const SCHEMA_LOCATION: &str = "urn:isbn:1-931666-22-9 http://www.loc.gov/ead/ead.xsd";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_known_note_type_has_a_placement() {
        for note_type in NoteType::ALL {
            let spec = note_spec(note_type);
            assert_ne!(spec.placement, Placement::Ignored, "{note_type:?}");
            assert!(!spec.label.is_empty());
        }
        assert_eq!(note_spec(NoteType::Unknown).placement, Placement::Ignored);
    }

    #[test]
    fn did_notes_never_take_paragraphs() {
        for note_type in NoteType::ALL {
            let spec = note_spec(note_type);
            if spec.placement == Placement::Did {
                assert!(!spec.include_p, "{note_type:?}");
                assert!(spec.encoding_analog.is_none());
            }
        }
    }

    #[test]
    fn note_encoding_analogs() {
        let analog = |t| note_spec(t).encoding_analog;
        assert_eq!(analog(NoteType::Bioghist), Some("545$a"));
        assert_eq!(analog(NoteType::Arrangement), Some("351$b"));
        assert_eq!(analog(NoteType::Separatedmaterial), Some("544$d"));
        assert_eq!(analog(NoteType::Odd), None);
    }

    #[test]
    fn subject_term_types() {
        assert_eq!(subject_mapping("geographic").node, SubjectNode::Geogname);
        assert_eq!(subject_mapping("style_period").node, SubjectNode::Genreform);
        let unknown = subject_mapping("temporal");
        assert_eq!(unknown.node, SubjectNode::Subject);
        assert_eq!(unknown.unknown.as_deref(), Some("temporal"));
    }

    #[test]
    fn first_occurrence_encodings() {
        assert_eq!(origination_encoding("persname", true), Some("100$a"));
        assert_eq!(origination_encoding("persname", false), Some("700$a"));
        assert_eq!(origination_encoding("corpname", true), Some("110$a"));
        assert_eq!(origination_encoding("famname", true), None);
        assert_eq!(geogname_encoding(true), ("044$c", "country of origin"));
        assert_eq!(geogname_encoding(false), ("651$a", "subject"));
    }

    #[test]
    fn index_items_map_to_name_elements() {
        assert_eq!(index_item_tag("person"), Some("persname"));
        assert_eq!(index_item_tag("geographic_name"), Some("geogname"));
        assert_eq!(index_item_tag("bogus"), None);
    }
}
