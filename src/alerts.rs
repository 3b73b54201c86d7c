//! Compliance alerts
//!
//! Evaluators raise an `Alert` whenever a criterion signals risk: a name that
//! does not match, an inactive registration, a disclosure on record. Alerts
//! are immutable value objects; the final report carries the de-duplicated
//! union of every section's alerts.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Alert categories raised by the evaluators.
pub const CATEGORY_NAME_MISMATCH: &str = "NAME_MISMATCH";
pub const CATEGORY_INVALID_CRD: &str = "INVALID_CRD";
pub const CATEGORY_REGISTRATION: &str = "REGISTRATION";
pub const CATEGORY_LICENSE: &str = "LICENSE";
pub const CATEGORY_EXAM: &str = "EXAM";
pub const CATEGORY_EMPLOYMENT: &str = "EMPLOYMENT";
pub const CATEGORY_DISCLOSURE: &str = "DISCLOSURE";
pub const CATEGORY_DISCIPLINARY: &str = "DISCIPLINARY";
pub const CATEGORY_ARBITRATION: &str = "ARBITRATION";
pub const CATEGORY_REGULATORY: &str = "REGULATORY";

/// Severity ladder for alerts. Ordering is load-bearing: the final verdict's
/// risk level is the maximum severity across all collected alerts.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertSeverity::Low => write!(f, "LOW"),
            AlertSeverity::Medium => write!(f, "MEDIUM"),
            AlertSeverity::High => write!(f, "HIGH"),
            AlertSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// One risk signal raised by an evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub alert_type: String,
    pub alert_category: String,
    pub severity: AlertSeverity,
    /// Display name of the originating data source.
    pub source: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    pub description: String,
}

impl Alert {
    pub fn new(
        alert_type: impl Into<String>,
        alert_category: impl Into<String>,
        severity: AlertSeverity,
        source: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            alert_type: alert_type.into(),
            alert_category: alert_category.into(),
            severity,
            source: source.into(),
            metadata: Map::new(),
            description: description.into(),
        }
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_metadata_entry(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Identity used when de-duplicating the final report's alert union.
    /// Metadata is excluded: two sources reporting the same event with
    /// different payload details still count once per (type, source, text).
    pub fn dedup_key(&self) -> (&str, &str, &str) {
        (&self.alert_type, &self.source, &self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_severity_ordering() {
        assert!(AlertSeverity::Low < AlertSeverity::Medium);
        assert!(AlertSeverity::Medium < AlertSeverity::High);
        assert!(AlertSeverity::High < AlertSeverity::Critical);
        assert_eq!(
            [AlertSeverity::Medium, AlertSeverity::Critical, AlertSeverity::Low]
                .iter()
                .max(),
            Some(&AlertSeverity::Critical)
        );
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(AlertSeverity::Critical.to_string(), "CRITICAL");
        assert_eq!(AlertSeverity::Low.to_string(), "LOW");
    }

    #[test]
    fn test_alert_serializes_to_plain_mapping() {
        let alert = Alert::new(
            "CustomerDispute",
            CATEGORY_DISCLOSURE,
            AlertSeverity::Medium,
            "FINRA_BrokerCheck",
            "Customer dispute on record",
        )
        .with_metadata_entry("resolution", json!("Settled"));

        let value = serde_json::to_value(&alert).unwrap();
        assert_eq!(value["alert_type"], "CustomerDispute");
        assert_eq!(value["severity"], "MEDIUM");
        assert_eq!(value["metadata"]["resolution"], "Settled");
    }

    #[test]
    fn test_dedup_key_ignores_metadata() {
        let a = Alert::new(
            "Gap",
            CATEGORY_EMPLOYMENT,
            AlertSeverity::Medium,
            "FINRA_BrokerCheck",
            "Employment gap of 120 days",
        );
        let b = a.clone().with_metadata_entry("days", json!(120));
        assert_eq!(a.dedup_key(), b.dedup_key());
    }
}
