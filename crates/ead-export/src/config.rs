//! Export options and localized labels.
//!
//! Options and label tables are read from a single TOML file:
//!
//! ```toml
//! include_unpublished = false
//! id_prefix = "aspace_"
//!
//! [labels.language_iso639_2]
//! dut = "Dutch; Flemish"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use ead_model::NoteType;

use crate::error::{ExportError, Result};
use crate::mapping::note_spec;

/// Label category for note type heads.
pub const NOTE_TYPES: &str = "_note_types";
/// Label category for ISO 639-2 language names.
pub const LANGUAGES: &str = "language_iso639_2";
/// Label category for ISO 15924 script names.
pub const SCRIPTS: &str = "script_iso15924";
/// Label category for extent types.
pub const EXTENT_TYPES: &str = "extent_extent_type";
/// Label category for instance types.
pub const INSTANCE_TYPES: &str = "instance_instance_type";
/// Label category for resource-level strings (`publication_date`, …).
pub const RESOURCE: &str = "resource";

/// Run-level switches for one export.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExportOptions {
    /// Export nodes explicitly marked unpublished (tagged `audience="internal"`).
    pub include_unpublished: bool,
    /// Emit digital object links.
    pub include_daos: bool,
    /// Name components `c01`, `c02`, … instead of `c`.
    pub use_numbered_c_tags: bool,
    /// Prefix applied to generated and stored identifiers.
    pub id_prefix: String,
    /// Indent output.
    pub pretty: bool,
    /// Producer named in the profile creation note.
    pub generator: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_unpublished: false,
            include_daos: false,
            use_numbered_c_tags: false,
            id_prefix: "aspace_".to_string(),
            pretty: true,
            generator: format!("ead-export {}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Options plus label tables, as stored in a config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    #[serde(flatten)]
    pub options: ExportOptions,
    /// `category -> code -> label`.
    pub labels: BTreeMap<String, BTreeMap<String, String>>,
}

impl ExportConfig {
    /// Load a config file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| ExportError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ExportConfig = toml::from_str(&text).map_err(|source| ExportError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(
            path = %path.display(),
            categories = config.labels.len(),
            "loaded export config"
        );
        Ok(config)
    }

    pub fn catalog(&self) -> LabelCatalog {
        LabelCatalog::new(self.labels.clone())
    }
}

/// Source of localized labels for enumerated codes.
pub trait LabelLookup {
    fn lookup(&self, category: &str, code: &str) -> Option<String>;

    /// Label for `code`, or the code itself when none is known.
    fn label(&self, category: &str, code: &str) -> String {
        self.lookup(category, code)
            .unwrap_or_else(|| code.to_string())
    }
}

/// Label tables loaded from configuration, backed by the built-in note heads.
#[derive(Debug, Clone, Default)]
pub struct LabelCatalog {
    tables: BTreeMap<String, BTreeMap<String, String>>,
}

impl LabelCatalog {
    pub fn new(tables: BTreeMap<String, BTreeMap<String, String>>) -> Self {
        Self { tables }
    }

    pub fn insert(&mut self, category: &str, code: &str, label: &str) {
        self.tables
            .entry(category.to_string())
            .or_default()
            .insert(code.to_string(), label.to_string());
    }
}

impl LabelLookup for LabelCatalog {
    fn lookup(&self, category: &str, code: &str) -> Option<String> {
        if let Some(label) = self.tables.get(category).and_then(|t| t.get(code)) {
            return Some(label.clone());
        }
        if category == NOTE_TYPES {
            return builtin_note_label(code).map(str::to_string);
        }
        None
    }
}

fn builtin_note_label(code: &str) -> Option<&'static str> {
    let label = note_spec(NoteType::from_code(code)).label;
    if label.is_empty() { None } else { Some(label) }
}

/// Label of an ISO 639-2 language, keeping only the first `;` alternative.
pub fn language_label(labels: &dyn LabelLookup, code: &str) -> String {
    let label = labels.label(LANGUAGES, code);
    match label.split_once(';') {
        Some((first, _)) => first.trim().to_string(),
        None => label,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let options = ExportOptions::default();
        assert!(!options.include_unpublished);
        assert!(!options.include_daos);
        assert!(!options.use_numbered_c_tags);
        assert_eq!(options.id_prefix, "aspace_");
        assert!(options.pretty);
        assert!(options.generator.starts_with("ead-export "));
    }

    #[test]
    fn parses_options_and_labels() {
        let config: ExportConfig = toml::from_str(
            r#"
            include_daos = true
            id_prefix = "iisg_"

            [labels.language_iso639_2]
            dut = "Dutch; Flemish"
            "#,
        )
        .expect("parse config");
        assert!(config.options.include_daos);
        assert_eq!(config.options.id_prefix, "iisg_");
        assert!(config.options.pretty);

        let catalog = config.catalog();
        assert_eq!(language_label(&catalog, "dut"), "Dutch");
        assert_eq!(language_label(&catalog, "eng"), "eng");
    }

    #[test]
    fn note_heads_fall_back_to_builtin_labels() {
        let mut catalog = LabelCatalog::default();
        assert_eq!(
            catalog.label(NOTE_TYPES, "scopecontent"),
            "Scope and Contents"
        );
        catalog.insert(NOTE_TYPES, "scopecontent", "Inhoud");
        assert_eq!(catalog.label(NOTE_TYPES, "scopecontent"), "Inhoud");
        assert_eq!(catalog.label(NOTE_TYPES, "nonsense"), "nonsense");
    }
}
