//! The asserted identity under verification
//!
//! A `Claim` is what the caller believes about the individual: name parts,
//! CRD number, employing organization, expected license type. It is owned by
//! the caller and taken by shared reference for the whole evaluation run.

use serde::{Deserialize, Serialize};

/// The claimed identity and case context for one evaluation run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Claim {
    /// Unique per evaluation run; reports are keyed by it downstream.
    pub reference_id: String,

    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub suffix: Option<String>,

    /// Precomputed full name; when absent, derived from the name parts.
    #[serde(default)]
    pub individual_name: Option<String>,

    #[serde(default)]
    pub crd_number: Option<String>,
    #[serde(default)]
    pub organization_crd: Option<String>,
    #[serde(default)]
    pub organization_name: Option<String>,
    #[serde(default)]
    pub employee_number: Option<String>,

    /// Expected license type, e.g. "B", "IA", "B IA".
    #[serde(default)]
    pub license_type: Option<String>,
}

impl Claim {
    /// The full name to match against fetched records.
    ///
    /// Prefers the precomputed `individual_name`; otherwise joins the
    /// non-empty name parts, tolerating an empty first, middle or last.
    pub fn full_name(&self) -> String {
        if let Some(name) = &self.individual_name {
            if !name.trim().is_empty() {
                return name.trim().to_string();
            }
        }

        let middle = self.middle_name.as_deref().unwrap_or("");
        [self.first_name.as_str(), middle, self.last_name.as_str()]
            .iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
