use serde::{Deserialize, Serialize};

use crate::agent::Term;
use crate::visibility::impl_visibility;

/// The resolved subject record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Subject {
    pub terms: Vec<Term>,
    pub source: Option<String>,
    pub authority_id: Option<String>,
    /// Normalized form, e.g. an ISO 3166 code for geographic subjects.
    pub normal: Option<String>,
    pub publish: Option<bool>,
}

impl Subject {
    /// Type of the first term, which decides how the subject is encoded.
    pub fn primary_term_type(&self) -> Option<&str> {
        self.terms.first().map(|t| t.term_type.as_str())
    }

    /// All terms joined with `--`.
    pub fn heading(&self) -> String {
        self.terms
            .iter()
            .map(|t| t.term.as_str())
            .collect::<Vec<_>>()
            .join(" -- ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubjectLink {
    pub subject: Subject,
}

impl crate::Visibility for SubjectLink {
    fn publish_flag(&self) -> Option<bool> {
        self.subject.publish
    }
}

impl_visibility!(Subject);
