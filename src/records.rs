//! Source records handed in by fetch collaborators
//!
//! One `SourceRecord` is a single registry's view of the individual, already
//! normalized to this shape by the scraping/API collaborators. Records are
//! constructed fresh per evaluation call and never mutated afterwards.
//! Disclosures and the per-source action lists stay free-form
//! (`serde_json::Value`) because the registries disagree on their fields;
//! evaluators read them defensively.

use crate::sources::DataSource;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A qualification exam appearing on the individual's record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Exam {
    /// Exam category, e.g. "Series 7".
    pub category: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// One employment stint on the individual's record.
///
/// `end_date` is optional: some registries only publish the begin date, in
/// which case gap analysis skips the stint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Employment {
    pub firm: String,
    #[serde(default)]
    pub begin_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<String>,
}

/// One source's view of the individual.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SourceRecord {
    pub source: DataSource,

    /// CRD number the registry returned for this record, if any.
    #[serde(default)]
    pub crd_number: Option<String>,

    #[serde(default)]
    pub fetched_name: Option<String>,
    /// Known aliases / alternate names for the individual.
    #[serde(default)]
    pub other_names: Vec<String>,

    /// Broker registration status string, e.g. "Active".
    #[serde(default)]
    pub bc_scope: Option<String>,
    /// Investment-adviser registration status string.
    #[serde(default)]
    pub ia_scope: Option<String>,

    #[serde(default)]
    pub exams: Vec<Exam>,
    #[serde(default)]
    pub employments: Vec<Employment>,

    /// Free-form disclosure dicts as published by the registry.
    #[serde(default)]
    pub disclosures: Vec<Value>,

    #[serde(default)]
    pub arbitration_actions: Vec<Value>,
    #[serde(default)]
    pub disciplinary_actions: Vec<Value>,
    #[serde(default)]
    pub regulatory_actions: Vec<Value>,
}

impl SourceRecord {
    pub fn new(source: DataSource) -> Self {
        Self {
            source,
            ..Self::default()
        }
    }

    /// A scope string counts as active iff it equals "active",
    /// case-insensitively.
    pub fn bc_active(&self) -> bool {
        scope_is_active(self.bc_scope.as_deref())
    }

    pub fn ia_active(&self) -> bool {
        scope_is_active(self.ia_scope.as_deref())
    }
}

fn scope_is_active(scope: Option<&str>) -> bool {
    scope.is_some_and(|s| s.trim().eq_ignore_ascii_case("active"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_active_is_case_insensitive() {
        let mut record = SourceRecord::new(DataSource::FinraBrokerCheck);
        record.bc_scope = Some("Active".to_string());
        assert!(record.bc_active());

        record.bc_scope = Some("ACTIVE".to_string());
        assert!(record.bc_active());

        record.bc_scope = Some("InActive".to_string());
        assert!(!record.bc_active());

        record.bc_scope = None;
        assert!(!record.bc_active());
    }

    #[test]
    fn test_deserialize_with_missing_fields() {
        let record: SourceRecord = serde_json::from_str(
            r#"{"source": "FinraBrokerCheck", "fetched_name": "John Doe"}"#,
        )
        .unwrap();
        assert_eq!(record.source, DataSource::FinraBrokerCheck);
        assert_eq!(record.fetched_name.as_deref(), Some("John Doe"));
        assert!(record.other_names.is_empty());
        assert!(record.exams.is_empty());
        assert!(record.disclosures.is_empty());
    }

    #[test]
    fn test_exam_date_round_trip() {
        let exam = Exam {
            category: "Series 7".to_string(),
            name: Some("General Securities Representative".to_string()),
            date: NaiveDate::from_ymd_opt(2019, 4, 2),
            scope: None,
        };
        let json = serde_json::to_string(&exam).unwrap();
        let back: Exam = serde_json::from_str(&json).unwrap();
        assert_eq!(exam, back);
    }
}
