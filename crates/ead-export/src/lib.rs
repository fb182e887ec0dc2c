//! Streaming EAD 2002 finding-aid export.
//!
//! - **Serializer**: walks a resolved [`ead_model::Record`] once and produces
//!   the document as ordered sections behind per-subtree fault boundaries
//! - **Sanitizer**: normalizes user-entered mixed content before it is written
//! - **Well-formedness check**: decides whether markup may pass through raw
//! - **Stream**: assembles sections lazily into the final document
//!
//! ```ignore
//! let record = Record::load(path)?;
//! let labels = LabelCatalog::default();
//! let xml = export_ead(&record, &ExportOptions::default(), &labels)?;
//! ```

pub mod config;
pub mod error;
pub mod fragments;
pub mod guard;
pub mod mapping;
pub mod sanitize;
mod serializer;
pub mod stream;
pub mod wellformed;

pub use config::{ExportConfig, ExportOptions, LabelCatalog, LabelLookup};
pub use error::{ExportError, Result};
pub use guard::{ExportSummary, Failure, Scope};
pub use serializer::{EadSerializer, export_ead, prefix_id};
pub use stream::EadStream;
pub use wellformed::{Diagnostic, DiagnosticKind, diagnose, is_well_formed, xml_errors};
