use serde::{Deserialize, Serialize};

use crate::agent::AgentLink;
use crate::date::{DateRange, Extent};
use crate::instance::{DigitalObject, Instance, SubContainer};
use crate::note::Note;
use crate::record::ExternalId;
use crate::subject::SubjectLink;
use crate::visibility::impl_visibility;

/// One node of the archival hierarchy below a record (series, file, item…).
///
/// Children are indices into [`crate::Record::components`]; the depth of a
/// component is not stored and is assigned while walking the tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Component {
    pub ref_id: Option<String>,
    pub component_id: Option<String>,
    pub title: Option<String>,
    pub level: Option<String>,
    pub other_level: Option<String>,
    /// Persistent identifier URL resolved by the authority service.
    pub ark_url: Option<String>,
    pub publish: Option<bool>,
    pub suppressed: bool,
    pub external_ids: Vec<ExternalId>,
    pub dates: Vec<DateRange>,
    pub extents: Vec<Extent>,
    pub notes: Vec<Note>,
    pub linked_agents: Vec<AgentLink>,
    pub subjects: Vec<SubjectLink>,
    pub instances: Vec<Instance>,
    pub children: Vec<usize>,
}

impl Component {
    pub fn containers(&self) -> impl Iterator<Item = (&Instance, &SubContainer)> {
        containers(&self.instances)
    }

    pub fn digital_objects(&self) -> impl Iterator<Item = &DigitalObject> {
        digital_objects(&self.instances)
    }
}

pub(crate) fn containers(instances: &[Instance]) -> impl Iterator<Item = (&Instance, &SubContainer)> {
    instances
        .iter()
        .filter_map(|inst| inst.sub_container.as_ref().map(|sub| (inst, sub)))
}

pub(crate) fn digital_objects(instances: &[Instance]) -> impl Iterator<Item = &DigitalObject> {
    instances
        .iter()
        .filter_map(|inst| inst.digital_object.as_ref())
}

impl_visibility!(Component);
