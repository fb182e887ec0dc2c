use serde::{Deserialize, Serialize};

use crate::visibility::impl_visibility;

/// Kind of date statement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateType {
    #[default]
    Single,
    Inclusive,
    Bulk,
    Range,
}

/// A date or date range attached to a record, component or digital object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DateRange {
    pub expression: Option<String>,
    pub begin: Option<String>,
    pub end: Option<String>,
    pub date_type: DateType,
    /// Date label such as `creation` or `publication`.
    pub label: Option<String>,
    pub certainty: Option<String>,
    pub era: Option<String>,
    pub calendar: Option<String>,
    pub publish: Option<bool>,
}

impl DateRange {
    /// Display text: the free-text expression, or `begin-end`.
    pub fn display(&self) -> Option<String> {
        if let Some(expression) = self.expression.as_deref().filter(|e| !e.is_empty()) {
            return Some(expression.to_string());
        }
        let begin = self.begin.as_deref().filter(|b| !b.is_empty())?;
        match self.end.as_deref().filter(|e| !e.is_empty()) {
            Some(end) if end != begin => Some(format!("{begin}-{end}")),
            _ => Some(begin.to_string()),
        }
    }

    /// ISO 8601 `normal` attribute value (`begin/end`).
    pub fn normal(&self) -> Option<String> {
        let begin = self.begin.as_deref().filter(|b| !b.is_empty())?;
        let end = self
            .end
            .as_deref()
            .filter(|e| !e.is_empty())
            .unwrap_or(begin);
        Some(format!("{begin}/{end}"))
    }
}

/// Physical extent statement.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Extent {
    /// `whole` or `part`.
    pub portion: Option<String>,
    pub number: Option<String>,
    pub extent_type: Option<String>,
    pub container_summary: Option<String>,
    pub physical_details: Option<String>,
    pub dimensions: Option<String>,
    pub publish: Option<bool>,
}

impl_visibility!(DateRange, Extent);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefers_expression() {
        let date = DateRange {
            expression: Some("circa 1920".to_string()),
            begin: Some("1920".to_string()),
            ..Default::default()
        };
        assert_eq!(date.display().as_deref(), Some("circa 1920"));
    }

    #[test]
    fn display_collapses_equal_bounds() {
        let date = DateRange {
            begin: Some("1920".to_string()),
            end: Some("1920".to_string()),
            ..Default::default()
        };
        assert_eq!(date.display().as_deref(), Some("1920"));
        assert_eq!(date.normal().as_deref(), Some("1920/1920"));
    }

    #[test]
    fn display_joins_range() {
        let date = DateRange {
            begin: Some("1920".to_string()),
            end: Some("1945".to_string()),
            ..Default::default()
        };
        assert_eq!(date.display().as_deref(), Some("1920-1945"));
    }

    #[test]
    fn empty_date_has_no_display() {
        assert!(DateRange::default().display().is_none());
        assert!(DateRange::default().normal().is_none());
    }
}
