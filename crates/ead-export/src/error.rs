//! Error types for EAD export.
//!
//! Errors fall in two groups. Node-level errors (bad characters in a field, a
//! dangling child index, a writer failure) are contained by the fault
//! boundary around each subtree and replaced with a diagnostic text node.
//! Fatal errors mean the exporter's own bookkeeping is broken, or the input
//! is not a tree at all; they abort the export.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ExportError {
    // =========================================================================
    // NODE-LEVEL ERRORS
    // =========================================================================
    /// Text contains a character that XML 1.0 cannot represent.
    #[error("invalid XML character U+{codepoint:04X} in text content")]
    InvalidCharacter {
        /// Code point of the offending character.
        codepoint: u32,
    },

    /// A child index does not resolve to a component.
    #[error("component could not be resolved: {0}")]
    MissingComponent(#[from] ead_model::ModelError),

    /// Buffered writer output was not UTF-8.
    #[error("writer produced invalid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    /// I/O error from the underlying writer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML writing error.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    // =========================================================================
    // FATAL ERRORS
    // =========================================================================
    /// A component was reached twice while walking the tree.
    #[error("component {index} reached twice; child indices must form a tree")]
    MalformedTree {
        /// Arena index of the component.
        index: usize,
    },

    /// A section token has no content (never filled, or already drained).
    #[error("unresolved section token {id}")]
    UnresolvedSection {
        /// Section id.
        id: u64,
    },

    /// A raw fragment token has no content (already drained).
    #[error("unresolved fragment token {id}")]
    UnresolvedFragment {
        /// Fragment id.
        id: usize,
    },

    /// Sections were registered but never referenced from the document.
    #[error("{count} registered section(s) were never referenced")]
    OrphanedSections {
        /// Number of leftover sections.
        count: usize,
    },

    // =========================================================================
    // CONFIGURATION ERRORS
    // =========================================================================
    /// Failed to read a configuration file.
    #[error("failed to read config {path}: {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a configuration file.
    #[error("failed to parse config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Result type alias for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;

impl ExportError {
    /// Fatal errors abort the whole export instead of being contained.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::MalformedTree { .. }
                | Self::UnresolvedSection { .. }
                | Self::UnresolvedFragment { .. }
                | Self::OrphanedSections { .. }
        )
    }

    /// Messages of this error and every source below it, outermost first.
    pub fn chain(&self) -> Vec<String> {
        let mut messages = vec![self.to_string()];
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            messages.push(err.to_string());
            source = err.source();
        }
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_character_message_names_code_point() {
        let err = ExportError::InvalidCharacter { codepoint: 0 };
        assert_eq!(
            err.to_string(),
            "invalid XML character U+0000 in text content"
        );
        assert!(!err.is_fatal());
    }

    #[test]
    fn bookkeeping_errors_are_fatal() {
        assert!(ExportError::MalformedTree { index: 1 }.is_fatal());
        assert!(ExportError::UnresolvedSection { id: 4 }.is_fatal());
        assert!(ExportError::UnresolvedFragment { id: 0 }.is_fatal());
        assert!(ExportError::OrphanedSections { count: 2 }.is_fatal());
    }

    #[test]
    fn chain_includes_sources() {
        let err = ExportError::from(ead_model::ModelError::ChildOutOfRange { index: 9, len: 2 });
        let chain = err.chain();
        assert_eq!(chain.len(), 2);
        assert!(chain[1].contains("child index 9"));
    }
}
