use serde::{Deserialize, Serialize};

use crate::visibility::impl_visibility;

/// Kind of agent an agent link resolves to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentType {
    #[default]
    #[serde(rename = "agent_person")]
    Person,
    #[serde(rename = "agent_family")]
    Family,
    #[serde(rename = "agent_corporate_entity")]
    CorporateEntity,
    #[serde(rename = "agent_software")]
    Software,
    #[serde(other)]
    Unknown,
}

/// Role an agent plays relative to the linking record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    #[default]
    Creator,
    Source,
    Subject,
    #[serde(other)]
    Unknown,
}

impl AgentRole {
    /// Label used on `origination` elements; `None` for roles that are not
    /// written there.
    pub fn origination_label(self) -> Option<&'static str> {
        match self {
            AgentRole::Creator => Some("Creator"),
            AgentRole::Source => Some("source"),
            AgentRole::Subject | AgentRole::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayName {
    pub sort_name: String,
    pub rules: Option<String>,
    pub source: Option<String>,
    pub authority_id: Option<String>,
}

/// The resolved agent record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Agent {
    pub agent_type: AgentType,
    pub publish: Option<bool>,
    pub display_name: DisplayName,
}

/// Subdivision term attached to a subject-role agent link.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Term {
    pub term: String,
    pub term_type: String,
}

/// Link from a record or component to an agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentLink {
    pub role: AgentRole,
    /// MARC relator code.
    pub relator: Option<String>,
    pub terms: Vec<Term>,
    pub agent: Agent,
}

impl AgentLink {
    /// Sort name followed by any subdivision terms, `--` separated.
    pub fn heading(&self) -> String {
        let mut parts = vec![self.agent.display_name.sort_name.as_str()];
        parts.extend(self.terms.iter().map(|t| t.term.as_str()));
        parts.join(" -- ")
    }
}

impl crate::Visibility for AgentLink {
    fn publish_flag(&self) -> Option<bool> {
        self.agent.publish
    }
}

impl_visibility!(Agent);
