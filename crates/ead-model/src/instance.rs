//! Instances: physical locations and digital object links.

use serde::{Deserialize, Serialize};

use crate::date::DateRange;
use crate::visibility::impl_visibility;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerProfile {
    pub name: Option<String>,
    pub url: Option<String>,
}

/// Outermost physical container (box, folder, …).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TopContainer {
    #[serde(rename = "type")]
    pub container_type: Option<String>,
    pub indicator: String,
    pub barcode: Option<String>,
    pub container_profile: Option<ContainerProfile>,
}

/// Position within a top container, up to two further levels deep.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubContainer {
    pub top_container: TopContainer,
    pub type_2: Option<String>,
    pub indicator_2: Option<String>,
    pub type_3: Option<String>,
    pub indicator_3: Option<String>,
}

impl SubContainer {
    /// Nested levels below the top container, in order.
    pub fn levels(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        [
            (self.type_2.as_deref(), self.indicator_2.as_deref()),
            (self.type_3.as_deref(), self.indicator_3.as_deref()),
        ]
        .into_iter()
        .filter_map(|(kind, indicator)| kind.map(|k| (k, indicator)))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileVersion {
    pub file_uri: String,
    pub publish: Option<bool>,
    pub use_statement: Option<String>,
    pub caption: Option<String>,
    pub xlink_actuate_attribute: Option<String>,
    pub xlink_show_attribute: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DigitalObject {
    pub digital_object_id: String,
    pub title: Option<String>,
    pub publish: Option<bool>,
    pub suppressed: bool,
    pub dates: Vec<DateRange>,
    pub file_versions: Vec<FileVersion>,
}

impl DigitalObject {
    /// Description text: title, then `: ` and the first date when present.
    pub fn description(&self) -> String {
        let mut text = self.title.clone().unwrap_or_default();
        if let Some(date) = self.dates.first().and_then(DateRange::display) {
            text.push_str(": ");
            text.push_str(&date);
        }
        text
    }
}

/// A record's link to a physical container or a digital object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Instance {
    pub instance_type: String,
    pub sub_container: Option<SubContainer>,
    pub digital_object: Option<DigitalObject>,
}

impl_visibility!(FileVersion, DigitalObject);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_skip_missing_types() {
        let sub = SubContainer {
            type_2: None,
            indicator_2: Some("ignored".to_string()),
            type_3: Some("item".to_string()),
            indicator_3: Some("7".to_string()),
            ..Default::default()
        };
        let levels: Vec<_> = sub.levels().collect();
        assert_eq!(levels, vec![("item", Some("7"))]);
    }

    #[test]
    fn description_appends_date() {
        let dao = DigitalObject {
            title: Some("Scan".to_string()),
            dates: vec![DateRange {
                begin: Some("1950".to_string()),
                end: Some("1951".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert_eq!(dao.description(), "Scan: 1950-1951");
    }
}
