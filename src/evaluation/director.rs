//! Evaluation pipeline
//!
//! The director runs the evaluators in a fixed sequence, applies the skip
//! policy, computes the final aggregated verdict and hands the sections to
//! the builder. It owns the only public entry point for evaluating a claim.
//! Evaluating is deterministic: no clocks, no generated ids, so identical
//! inputs always produce identical reports.

use crate::alerts::{Alert, AlertSeverity};
use crate::claim::Claim;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::matcher::NameMatcher;
use crate::records::SourceRecord;
use crate::sources::DataSource;
use std::collections::HashSet;

use super::evaluators::{
    evaluate_arbitration, evaluate_disciplinary, evaluate_disclosures, evaluate_employments,
    evaluate_exams, evaluate_license, evaluate_registration_status, evaluate_regulatory,
    evaluate_search,
};
use super::report::{EvaluationReport, EvaluationReportBuilder};
use super::sections::{
    ArbitrationReview, DisciplinaryEvaluation, EvaluationSection, FinalEvaluation,
    RegulatoryEvaluation,
};

/// Orchestrates one evaluation run per claim.
pub struct EvaluationReportDirector {
    config: EngineConfig,
    matcher: NameMatcher,
}

impl EvaluationReportDirector {
    /// Director over the global nickname index.
    pub fn new(config: EngineConfig) -> Self {
        let matcher = NameMatcher::new(config.match_tier);
        Self { config, matcher }
    }

    /// Director with a custom matcher (custom nickname index or tier).
    pub fn with_matcher(config: EngineConfig, matcher: NameMatcher) -> Self {
        Self { config, matcher }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluate one claim against the already-fetched source records.
    ///
    /// Pipeline: search → status → name → license → exams → employment →
    /// disclosures → disciplinary → arbitration → regulatory → final.
    /// Skipped sections are recorded, never omitted, so the report shape is
    /// constant regardless of mode.
    pub fn evaluate_claim(
        &self,
        claim: &Claim,
        records: &[SourceRecord],
    ) -> Result<EvaluationReport, EngineError> {
        tracing::info!(
            reference_id = %claim.reference_id,
            records = records.len(),
            "Evaluating claim"
        );

        let search = evaluate_search(claim, records);

        let primary = select_primary_record(claim, records);
        let primary_source = primary
            .map(|r| r.source)
            .unwrap_or(DataSource::FinraBrokerCheck);

        let status = evaluate_registration_status(primary, primary_source);

        let expected_name = claim.full_name();
        let (name, _name_alert) = match primary {
            Some(record) => self.matcher.evaluate_name(
                &expected_name,
                record.fetched_name.as_deref(),
                &record.other_names,
                primary_source.display_name(),
            ),
            None => self.matcher.evaluate_name(
                &expected_name,
                None,
                &[],
                primary_source.display_name(),
            ),
        };

        let license = evaluate_license(claim, primary, primary_source);
        let exams = evaluate_exams(primary, primary_source);
        let employment =
            evaluate_employments(claim, primary, primary_source, self.config.employment_gap_days);

        let identity_records: Vec<&SourceRecord> = records
            .iter()
            .filter(|r| r.source.is_identity_source())
            .collect();
        let disclosures = evaluate_disclosures(&identity_records);

        let disciplinary = if self.config.skip_disciplinary {
            DisciplinaryEvaluation::skipped(DataSource::FinraDisciplinary.display_name())
        } else {
            let records: Vec<&SourceRecord> = records
                .iter()
                .filter(|r| {
                    matches!(
                        r.source,
                        DataSource::FinraDisciplinary | DataSource::SecDisciplinary
                    )
                })
                .collect();
            evaluate_disciplinary(&records)
        };

        let arbitration = if self.config.skip_arbitration {
            ArbitrationReview::skipped(DataSource::FinraArbitration.display_name())
        } else {
            let records: Vec<&SourceRecord> = records
                .iter()
                .filter(|r| {
                    matches!(
                        r.source,
                        DataSource::FinraArbitration | DataSource::SecArbitration
                    )
                })
                .collect();
            evaluate_arbitration(&records)
        };

        let regulatory = if self.config.skip_regulatory {
            RegulatoryEvaluation::skipped(DataSource::NfaRegulatory.display_name())
        } else {
            let records: Vec<&SourceRecord> = records
                .iter()
                .filter(|r| matches!(r.source, DataSource::NfaRegulatory))
                .collect();
            evaluate_regulatory(&records)
        };

        let named_sections: [(&str, &dyn EvaluationSection); 10] = [
            ("search_evaluation", &search),
            ("status_evaluation", &status),
            ("name_evaluation", &name),
            ("license_evaluation", &license),
            ("exam_evaluation", &exams),
            ("employment_evaluation", &employment),
            ("disclosure_review", &disclosures),
            ("disciplinary_evaluation", &disciplinary),
            ("arbitration_review", &arbitration),
            ("regulatory_evaluation", &regulatory),
        ];
        let final_evaluation = aggregate_final(&named_sections);

        if !final_evaluation.overall_compliance {
            tracing::debug!(
                reference_id = %claim.reference_id,
                risk = ?final_evaluation.overall_risk_level,
                "Claim evaluated non-compliant"
            );
        }

        let report = EvaluationReportBuilder::new()
            .claim(claim.clone())
            .search_evaluation(search)
            .status_evaluation(status)
            .name_evaluation(name)
            .license_evaluation(license)
            .exam_evaluation(exams)
            .employment_evaluation(employment)
            .disclosure_review(disclosures)
            .disciplinary_evaluation(disciplinary)
            .arbitration_review(arbitration)
            .regulatory_evaluation(regulatory)
            .final_evaluation(final_evaluation)
            .build()?;

        Ok(report)
    }
}

/// Pick the record the identity criteria evaluate against: an identity
/// source whose CRD matches the claim, else the first identity source.
fn select_primary_record<'a>(
    claim: &Claim,
    records: &'a [SourceRecord],
) -> Option<&'a SourceRecord> {
    let claimed_crd = claim
        .crd_number
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    if let Some(crd) = claimed_crd {
        if let Some(record) = records.iter().find(|r| {
            r.source.is_identity_source() && r.crd_number.as_deref().map(str::trim) == Some(crd)
        }) {
            return Some(record);
        }
    }

    records.iter().find(|r| r.source.is_identity_source())
}

/// Aggregate the final verdict from the assembled sections.
fn aggregate_final(sections: &[(&str, &dyn EvaluationSection)]) -> FinalEvaluation {
    // Flattened, order-preserving union of every section's alerts.
    let mut alerts: Vec<Alert> = Vec::new();
    let mut seen: HashSet<(String, String, String)> = HashSet::new();
    for (_, section) in sections {
        for alert in section.alerts() {
            let (alert_type, source, description) = alert.dedup_key();
            let key = (
                alert_type.to_string(),
                source.to_string(),
                description.to_string(),
            );
            if seen.insert(key) {
                alerts.push(alert.clone());
            }
        }
    }

    let non_compliant: Vec<&str> = sections
        .iter()
        .filter(|(_, section)| !section.compliance())
        .map(|(section_name, _)| *section_name)
        .collect();
    let overall_compliance = non_compliant.is_empty();

    let overall_risk_level = alerts.iter().map(|a| a.severity).max();

    let compliance_explanation = if overall_compliance {
        format!("All {} evaluation sections are compliant", sections.len())
    } else {
        format!(
            "{} of {} sections non-compliant: {}",
            non_compliant.len(),
            sections.len(),
            non_compliant.join(", ")
        )
    };

    FinalEvaluation {
        compliance: overall_compliance,
        compliance_explanation,
        overall_compliance,
        overall_risk_level,
        recommendations: recommendation_for(overall_risk_level).to_string(),
        alerts,
    }
}

/// Templated recommendation per risk level.
fn recommendation_for(risk: Option<AlertSeverity>) -> &'static str {
    match risk {
        None => "No immediate action required; continue standard periodic review",
        Some(AlertSeverity::Low) => "Note findings at the next scheduled compliance review",
        Some(AlertSeverity::Medium) => {
            "Schedule a compliance review of the flagged items within 30 days"
        }
        Some(AlertSeverity::High) => "Escalate to a compliance officer for review within 7 days",
        Some(AlertSeverity::Critical) => {
            "Immediate escalation required; suspend onboarding pending manual review"
        }
    }
}
