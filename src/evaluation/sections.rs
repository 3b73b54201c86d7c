//! Typed report sections
//!
//! One struct per compliance dimension. Every section carries exactly
//! `compliance` and `compliance_explanation` (plus its `source` tag and
//! alerts); the `EvaluationSection` trait enforces that shape at the type
//! level so the report can be aggregated uniformly.

use crate::alerts::{Alert, AlertSeverity};
use crate::matcher::MatchResult;
use crate::records::Employment;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Explanation recorded for sections disabled by the processing mode.
pub const SKIPPED_EXPLANATION: &str = "Skipped by configuration";

/// Common shape of every report section.
pub trait EvaluationSection {
    fn compliance(&self) -> bool;
    fn compliance_explanation(&self) -> &str;
    fn alerts(&self) -> &[Alert];
}

macro_rules! impl_section {
    ($($ty:ty),* $(,)?) => {
        $(
            impl EvaluationSection for $ty {
                fn compliance(&self) -> bool {
                    self.compliance
                }
                fn compliance_explanation(&self) -> &str {
                    &self.compliance_explanation
                }
                fn alerts(&self) -> &[Alert] {
                    &self.alerts
                }
            }
        )*
    };
}

/// Coarse license scope derived from the registration status strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LicenseScope {
    #[serde(rename = "B")]
    Broker,
    #[serde(rename = "IA")]
    InvestmentAdviser,
    #[serde(rename = "B IA")]
    Both,
    #[serde(rename = "NONE")]
    None,
}

impl LicenseScope {
    /// Reduce active-scope flags to the coarse type.
    pub fn from_scopes(bc_active: bool, ia_active: bool) -> Self {
        match (bc_active, ia_active) {
            (true, true) => LicenseScope::Both,
            (true, false) => LicenseScope::Broker,
            (false, true) => LicenseScope::InvestmentAdviser,
            (false, false) => LicenseScope::None,
        }
    }

    /// Parse a claimed license type ("B", "IA", "B IA", "broker", ...).
    pub fn from_expected(raw: &str) -> Self {
        let lower = raw.to_lowercase();
        let tokens: Vec<&str> = lower
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();

        let wants_broker = tokens.iter().any(|t| *t == "b" || *t == "broker");
        let wants_adviser = tokens
            .iter()
            .any(|t| *t == "ia" || *t == "adviser" || *t == "advisor" || *t == "investment");

        match (wants_broker, wants_adviser) {
            (true, true) => LicenseScope::Both,
            (true, false) => LicenseScope::Broker,
            (false, true) => LicenseScope::InvestmentAdviser,
            (false, false) => LicenseScope::None,
        }
    }

    pub fn has_broker(&self) -> bool {
        matches!(self, LicenseScope::Broker | LicenseScope::Both)
    }

    pub fn has_adviser(&self) -> bool {
        matches!(self, LicenseScope::InvestmentAdviser | LicenseScope::Both)
    }

    /// True iff `expected` is a subset of this scope.
    pub fn covers(&self, expected: LicenseScope) -> bool {
        (!expected.has_broker() || self.has_broker())
            && (!expected.has_adviser() || self.has_adviser())
    }
}

impl fmt::Display for LicenseScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LicenseScope::Broker => write!(f, "B"),
            LicenseScope::InvestmentAdviser => write!(f, "IA"),
            LicenseScope::Both => write!(f, "B IA"),
            LicenseScope::None => write!(f, "NONE"),
        }
    }
}

/// Identity resolution of the claimed CRD against the fetched records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchEvaluation {
    pub compliance: bool,
    pub compliance_explanation: String,
    pub source: String,
    pub crd_number: Option<String>,
    /// The claimed CRD matched no fetched record.
    pub is_invalid_crd: bool,
    pub sources_searched: Vec<String>,
    pub records_found: usize,
    pub alerts: Vec<Alert>,
}

/// Registration status (broker / investment-adviser scopes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEvaluation {
    pub compliance: bool,
    pub compliance_explanation: String,
    pub source: String,
    pub bc_scope: Option<String>,
    pub ia_scope: Option<String>,
    pub alerts: Vec<Alert>,
}

/// Name verification against the fetched and alternate names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameEvaluation {
    pub compliance: bool,
    pub compliance_explanation: String,
    pub source: String,
    pub expected_name: String,
    pub match_result: Option<MatchResult>,
    pub alerts: Vec<Alert>,
}

/// Claimed license type against the active scopes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseEvaluation {
    pub compliance: bool,
    pub compliance_explanation: String,
    pub source: String,
    pub expected_license: Option<String>,
    pub actual_scope: LicenseScope,
    pub alerts: Vec<Alert>,
}

/// Exam requirements derived from the license scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamEvaluation {
    pub compliance: bool,
    pub compliance_explanation: String,
    pub source: String,
    pub passed_series: Vec<String>,
    pub missing_series: Vec<String>,
    pub alerts: Vec<Alert>,
}

/// Employment history: gap detection and claimed-organization check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmploymentEvaluation {
    pub compliance: bool,
    pub compliance_explanation: String,
    pub source: String,
    /// Employments normalized to a common shape, most recent first.
    pub employments: Vec<Employment>,
    pub gap_count: usize,
    pub alerts: Vec<Alert>,
}

/// Disclosure review: compliant iff nothing is on record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisclosureReview {
    pub compliance: bool,
    pub compliance_explanation: String,
    pub source: String,
    pub disclosure_count: usize,
    pub alerts: Vec<Alert>,
}

/// Disciplinary actions from FINRA/SEC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisciplinaryEvaluation {
    pub compliance: bool,
    pub compliance_explanation: String,
    pub source: String,
    pub action_count: usize,
    #[serde(default)]
    pub skipped: bool,
    pub alerts: Vec<Alert>,
}

/// Arbitration cases from FINRA/SEC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArbitrationReview {
    pub compliance: bool,
    pub compliance_explanation: String,
    pub source: String,
    pub action_count: usize,
    #[serde(default)]
    pub skipped: bool,
    pub alerts: Vec<Alert>,
}

/// Regulatory actions from the NFA.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegulatoryEvaluation {
    pub compliance: bool,
    pub compliance_explanation: String,
    pub source: String,
    pub action_count: usize,
    #[serde(default)]
    pub skipped: bool,
    pub alerts: Vec<Alert>,
}

/// Aggregated verdict. Derived from the other sections, so it carries no
/// `source` of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalEvaluation {
    pub compliance: bool,
    pub compliance_explanation: String,
    pub overall_compliance: bool,
    /// Maximum severity among all collected alerts; `None` means no risk.
    pub overall_risk_level: Option<AlertSeverity>,
    pub recommendations: String,
    /// De-duplicated union of every section's alerts, each keeping its
    /// originating source.
    pub alerts: Vec<Alert>,
}

impl_section!(
    SearchEvaluation,
    StatusEvaluation,
    NameEvaluation,
    LicenseEvaluation,
    ExamEvaluation,
    EmploymentEvaluation,
    DisclosureReview,
    DisciplinaryEvaluation,
    ArbitrationReview,
    RegulatoryEvaluation,
    FinalEvaluation,
);

impl DisciplinaryEvaluation {
    pub fn skipped(source: &str) -> Self {
        Self {
            compliance: true,
            compliance_explanation: SKIPPED_EXPLANATION.to_string(),
            source: source.to_string(),
            action_count: 0,
            skipped: true,
            alerts: Vec::new(),
        }
    }
}

impl ArbitrationReview {
    pub fn skipped(source: &str) -> Self {
        Self {
            compliance: true,
            compliance_explanation: SKIPPED_EXPLANATION.to_string(),
            source: source.to_string(),
            action_count: 0,
            skipped: true,
            alerts: Vec::new(),
        }
    }
}

impl RegulatoryEvaluation {
    pub fn skipped(source: &str) -> Self {
        Self {
            compliance: true,
            compliance_explanation: SKIPPED_EXPLANATION.to_string(),
            source: source.to_string(),
            action_count: 0,
            skipped: true,
            alerts: Vec::new(),
        }
    }
}
