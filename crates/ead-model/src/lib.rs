//! Archival description records as resolved by the host application.
//!
//! Everything here is plain data: the data access layer builds a [`Record`]
//! (usually by deserializing JSON) and the exporter walks it read-only.

pub mod agent;
pub mod component;
pub mod date;
pub mod error;
pub mod instance;
pub mod note;
pub mod record;
pub mod subject;
mod visibility;

pub use agent::{Agent, AgentLink, AgentRole, AgentType, DisplayName, Term};
pub use component::Component;
pub use date::{DateRange, DateType, Extent};
pub use error::{ModelError, Result};
pub use instance::{
    ContainerProfile, DigitalObject, FileVersion, Instance, SubContainer, TopContainer,
};
pub use note::{ChronItem, DefinedItem, IndexItem, Note, NoteType, Subnote, SubnoteBody};
pub use record::{
    ExternalId, FindingAid, LangMaterial, LanguageAndScript, Record, Repository,
    RevisionStatement,
};
pub use subject::{Subject, SubjectLink};
pub use visibility::Visibility;
