//! Report assembly
//!
//! The builder owns no decision logic: it only collects the typed sections
//! and fails if a required one was never set, which indicates an
//! orchestration bug rather than a data problem. Field declaration order is
//! the serialization order, so two runs over identical inputs produce
//! byte-identical JSON.

use crate::alerts::AlertSeverity;
use crate::claim::Claim;
use crate::error::ReportError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::sections::{
    ArbitrationReview, DisciplinaryEvaluation, DisclosureReview, EmploymentEvaluation,
    EvaluationSection, ExamEvaluation, FinalEvaluation, LicenseEvaluation, NameEvaluation,
    RegulatoryEvaluation, SearchEvaluation, StatusEvaluation,
};

/// One complete compliance report for one claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub reference_id: String,
    pub claim: Claim,
    pub search_evaluation: SearchEvaluation,
    pub status_evaluation: StatusEvaluation,
    pub name_evaluation: NameEvaluation,
    pub license_evaluation: LicenseEvaluation,
    pub exam_evaluation: ExamEvaluation,
    pub employment_evaluation: EmploymentEvaluation,
    pub disclosure_review: DisclosureReview,
    pub disciplinary_evaluation: DisciplinaryEvaluation,
    pub arbitration_review: ArbitrationReview,
    pub regulatory_evaluation: RegulatoryEvaluation,
    pub final_evaluation: FinalEvaluation,
}

impl EvaluationReport {
    /// The ten sourced sections, in report order, as the common trait.
    pub fn sections(&self) -> [&dyn EvaluationSection; 10] {
        [
            &self.search_evaluation,
            &self.status_evaluation,
            &self.name_evaluation,
            &self.license_evaluation,
            &self.exam_evaluation,
            &self.employment_evaluation,
            &self.disclosure_review,
            &self.disciplinary_evaluation,
            &self.arbitration_review,
            &self.regulatory_evaluation,
        ]
    }

    /// Serialize to the JSON value handed to persistence collaborators.
    pub fn to_json_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Serialize to a JSON string, stable across runs for identical input.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Step-wise assembly of an [`EvaluationReport`].
#[derive(Debug, Default)]
pub struct EvaluationReportBuilder {
    claim: Option<Claim>,
    search_evaluation: Option<SearchEvaluation>,
    status_evaluation: Option<StatusEvaluation>,
    name_evaluation: Option<NameEvaluation>,
    license_evaluation: Option<LicenseEvaluation>,
    exam_evaluation: Option<ExamEvaluation>,
    employment_evaluation: Option<EmploymentEvaluation>,
    disclosure_review: Option<DisclosureReview>,
    disciplinary_evaluation: Option<DisciplinaryEvaluation>,
    arbitration_review: Option<ArbitrationReview>,
    regulatory_evaluation: Option<RegulatoryEvaluation>,
    final_evaluation: Option<FinalEvaluation>,
}

impl EvaluationReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(mut self, claim: Claim) -> Self {
        self.claim = Some(claim);
        self
    }

    pub fn search_evaluation(mut self, section: SearchEvaluation) -> Self {
        self.search_evaluation = Some(section);
        self
    }

    pub fn status_evaluation(mut self, section: StatusEvaluation) -> Self {
        self.status_evaluation = Some(section);
        self
    }

    pub fn name_evaluation(mut self, section: NameEvaluation) -> Self {
        self.name_evaluation = Some(section);
        self
    }

    pub fn license_evaluation(mut self, section: LicenseEvaluation) -> Self {
        self.license_evaluation = Some(section);
        self
    }

    pub fn exam_evaluation(mut self, section: ExamEvaluation) -> Self {
        self.exam_evaluation = Some(section);
        self
    }

    pub fn employment_evaluation(mut self, section: EmploymentEvaluation) -> Self {
        self.employment_evaluation = Some(section);
        self
    }

    pub fn disclosure_review(mut self, section: DisclosureReview) -> Self {
        self.disclosure_review = Some(section);
        self
    }

    pub fn disciplinary_evaluation(mut self, section: DisciplinaryEvaluation) -> Self {
        self.disciplinary_evaluation = Some(section);
        self
    }

    pub fn arbitration_review(mut self, section: ArbitrationReview) -> Self {
        self.arbitration_review = Some(section);
        self
    }

    pub fn regulatory_evaluation(mut self, section: RegulatoryEvaluation) -> Self {
        self.regulatory_evaluation = Some(section);
        self
    }

    pub fn final_evaluation(mut self, section: FinalEvaluation) -> Self {
        self.final_evaluation = Some(section);
        self
    }

    /// Assemble the report. Fails if any required section was never set.
    pub fn build(self) -> Result<EvaluationReport, ReportError> {
        let claim = self.claim.ok_or(ReportError::MissingSection { section: "claim" })?;
        let reference_id = claim.reference_id.clone();

        Ok(EvaluationReport {
            reference_id,
            claim,
            search_evaluation: self.search_evaluation.ok_or(ReportError::MissingSection {
                section: "search_evaluation",
            })?,
            status_evaluation: self.status_evaluation.ok_or(ReportError::MissingSection {
                section: "status_evaluation",
            })?,
            name_evaluation: self.name_evaluation.ok_or(ReportError::MissingSection {
                section: "name_evaluation",
            })?,
            license_evaluation: self.license_evaluation.ok_or(ReportError::MissingSection {
                section: "license_evaluation",
            })?,
            exam_evaluation: self.exam_evaluation.ok_or(ReportError::MissingSection {
                section: "exam_evaluation",
            })?,
            employment_evaluation: self.employment_evaluation.ok_or(
                ReportError::MissingSection {
                    section: "employment_evaluation",
                },
            )?,
            disclosure_review: self.disclosure_review.ok_or(ReportError::MissingSection {
                section: "disclosure_review",
            })?,
            disciplinary_evaluation: self.disciplinary_evaluation.ok_or(
                ReportError::MissingSection {
                    section: "disciplinary_evaluation",
                },
            )?,
            arbitration_review: self.arbitration_review.ok_or(ReportError::MissingSection {
                section: "arbitration_review",
            })?,
            regulatory_evaluation: self.regulatory_evaluation.ok_or(
                ReportError::MissingSection {
                    section: "regulatory_evaluation",
                },
            )?,
            final_evaluation: self.final_evaluation.ok_or(ReportError::MissingSection {
                section: "final_evaluation",
            })?,
        })
    }
}

/// Explicit statistics over one report, for batch drivers that tally
/// outcomes across many claims.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub reference_id: String,
    pub sections_total: usize,
    pub sections_compliant: usize,
    pub sections_non_compliant: usize,
    pub sections_skipped: usize,
    pub alerts_total: usize,
    pub alerts_by_severity: BTreeMap<String, usize>,
    pub overall_compliance: bool,
    pub overall_risk_level: Option<AlertSeverity>,
}

impl ReportSummary {
    pub fn from_report(report: &EvaluationReport) -> Self {
        let mut sections: Vec<&dyn EvaluationSection> = report.sections().to_vec();
        sections.push(&report.final_evaluation);

        let sections_total = sections.len();
        let sections_compliant = sections.iter().filter(|s| s.compliance()).count();
        let sections_non_compliant = sections_total - sections_compliant;

        let sections_skipped = [
            report.disciplinary_evaluation.skipped,
            report.arbitration_review.skipped,
            report.regulatory_evaluation.skipped,
        ]
        .iter()
        .filter(|&&skipped| skipped)
        .count();

        let mut alerts_by_severity: BTreeMap<String, usize> = BTreeMap::new();
        for alert in &report.final_evaluation.alerts {
            *alerts_by_severity.entry(alert.severity.to_string()).or_insert(0) += 1;
        }

        Self {
            reference_id: report.reference_id.clone(),
            sections_total,
            sections_compliant,
            sections_non_compliant,
            sections_skipped,
            alerts_total: report.final_evaluation.alerts.len(),
            alerts_by_severity,
            overall_compliance: report.final_evaluation.overall_compliance,
            overall_risk_level: report.final_evaluation.overall_risk_level,
        }
    }
}
