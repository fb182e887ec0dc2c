//! Fault isolation around subtrees.
//!
//! A node-level failure while producing a component (or the document body)
//! is contained: the partial output is dropped and replaced by a single
//! diagnostic text node, and the export continues with the next sibling.
//! Fatal errors pass through unchanged.

use std::fmt;

use crate::error::{ExportError, Result};

/// What a fault boundary encloses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// The document body below the root element.
    Resource,
    /// One component subtree.
    ArchivalObject,
}

impl Scope {
    fn noun(self) -> &'static str {
        match self {
            Scope::Resource => "YOUR RESOURCE",
            Scope::ArchivalObject => "ARCHIVAL OBJECTS",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Resource => f.write_str("resource"),
            Scope::ArchivalObject => f.write_str("archival object"),
        }
    }
}

/// Result of running a producer behind a fault boundary.
#[derive(Debug)]
pub enum Outcome<T> {
    Completed(T),
    Failed(ExportError),
}

/// Classify a producer result. Fatal errors are returned as `Err`.
pub fn contain<T>(result: Result<T>) -> Result<Outcome<T>> {
    match result {
        Ok(value) => Ok(Outcome::Completed(value)),
        Err(err) if err.is_fatal() => Err(err),
        Err(err) => Ok(Outcome::Failed(err)),
    }
}

/// Text written in place of a failed subtree.
pub fn failure_text(scope: Scope, error: &ExportError) -> String {
    let mut chain = error.chain().into_iter();
    let message = chain.next().unwrap_or_default();
    let trace: Vec<String> = chain.collect();
    format!(
        "EXPORT ERROR : YOU HAVE A PROBLEM WITH YOUR EXPORT OF {}. THE FOLLOWING INFORMATION MAY HELP:\n\
         MESSAGE: {message:?}\n\
         TRACE: {trace:?}\n",
        scope.noun()
    )
}

/// One contained failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub scope: Scope,
    /// Component reference id, when the failed subtree had one.
    pub reference: Option<String>,
    pub message: String,
}

/// Counters collected while serializing one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub components_written: usize,
    /// Components left out by visibility rules.
    pub components_skipped: usize,
    pub failures: Vec<Failure>,
}

impl ExportSummary {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}
