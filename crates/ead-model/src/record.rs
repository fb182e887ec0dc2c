//! The top-level resource record and its finding-aid metadata.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::agent::AgentLink;
use crate::component::{self, Component};
use crate::date::{DateRange, Extent};
use crate::error::{ModelError, Result};
use crate::instance::{DigitalObject, Instance, SubContainer};
use crate::note::Note;
use crate::subject::SubjectLink;
use crate::visibility::impl_visibility;

/// Holding repository.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Repository {
    pub name: Option<String>,
    /// ISO 3166 country code.
    pub country: Option<String>,
    /// ISO 15511 agency code.
    pub org_code: Option<String>,
    pub image_url: Option<String>,
    pub url: Option<String>,
    pub address_lines: Vec<String>,
}

/// Finding-aid metadata rendered in the document header.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FindingAid {
    pub ead_id: Option<String>,
    pub ead_location: Option<String>,
    pub status: Option<String>,
    pub title: Option<String>,
    pub filing_title: Option<String>,
    pub subtitle: Option<String>,
    pub author: Option<String>,
    pub sponsor: Option<String>,
    pub edition_statement: Option<String>,
    pub date: Option<String>,
    pub series_statement: Option<String>,
    pub note: Option<String>,
    pub language_note: Option<String>,
    pub language: Option<String>,
    pub script: Option<String>,
    pub description_rules: Option<String>,
}

/// Identifier assigned by an external system.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalId {
    pub source: String,
    pub external_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageAndScript {
    pub language: String,
    pub script: Option<String>,
}

/// Language of the described materials, either coded or as free-text notes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LangMaterial {
    pub language_and_script: Option<LanguageAndScript>,
    pub notes: Vec<Note>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RevisionStatement {
    pub date: Option<String>,
    pub description: Option<String>,
    pub publish: Option<bool>,
}

/// A resolved resource record: the root of one export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Record {
    /// Identifier segments (at most four), joined with `.` on output.
    pub identifiers: Vec<String>,
    pub title: Option<String>,
    pub level: Option<String>,
    pub other_level: Option<String>,
    /// ISO 639-2 code of the materials.
    pub language: Option<String>,
    pub publish: Option<bool>,
    pub repository: Repository,
    pub finding_aid: FindingAid,
    pub ark_url: Option<String>,
    pub external_ids: Vec<ExternalId>,
    pub dates: Vec<DateRange>,
    pub extents: Vec<Extent>,
    pub notes: Vec<Note>,
    pub lang_materials: Vec<LangMaterial>,
    pub instances: Vec<Instance>,
    pub linked_agents: Vec<AgentLink>,
    pub subjects: Vec<SubjectLink>,
    pub revision_statements: Vec<RevisionStatement>,
    /// Top-level components, as indices into `components`.
    pub children: Vec<usize>,
    /// Every component of the tree.
    pub components: Vec<Component>,
}

impl Record {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Identifier segments joined with `.`.
    pub fn identifier(&self) -> String {
        self.identifiers
            .iter()
            .take(4)
            .filter(|s| !s.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Component at `index` in the arena.
    pub fn component(&self, index: usize) -> Result<&Component> {
        self.components
            .get(index)
            .ok_or(ModelError::ChildOutOfRange {
                index,
                len: self.components.len(),
            })
    }

    pub fn containers(&self) -> impl Iterator<Item = (&Instance, &SubContainer)> {
        component::containers(&self.instances)
    }

    pub fn digital_objects(&self) -> impl Iterator<Item = &DigitalObject> {
        component::digital_objects(&self.instances)
    }
}

impl_visibility!(Record, RevisionStatement);
