//! Per-criterion evaluators
//!
//! Each evaluator is a pure function reducing the claim plus the relevant
//! source record(s) to one typed section. Shared contract: evaluators never
//! panic or error on missing or partial input. Absent data yields a
//! non-compliant section with an explanatory message, and malformed
//! free-form entries degrade to a generic alert. Programmer errors are the
//! orchestration layer's problem, not handled here.

use crate::alerts::{
    Alert, AlertSeverity, CATEGORY_ARBITRATION, CATEGORY_DISCIPLINARY, CATEGORY_DISCLOSURE,
    CATEGORY_EMPLOYMENT, CATEGORY_EXAM, CATEGORY_INVALID_CRD, CATEGORY_LICENSE,
    CATEGORY_REGISTRATION, CATEGORY_REGULATORY,
};
use crate::claim::Claim;
use crate::matcher::normalize::normalize_name;
use crate::records::{Employment, SourceRecord};
use crate::sources::DataSource;
use regex::Regex;
use serde_json::{json, Map, Value};
use std::collections::BTreeSet;
use std::sync::OnceLock;

use super::sections::{
    ArbitrationReview, DisciplinaryEvaluation, DisclosureReview, EmploymentEvaluation,
    ExamEvaluation, LicenseEvaluation, LicenseScope, RegulatoryEvaluation, SearchEvaluation,
    StatusEvaluation,
};

/// Source tag for the identity-resolution section; the CRD check is derived
/// across sources rather than owned by one registry.
pub const CRD_VALIDATION_SOURCE: &str = "CRD_Validation";

/// Minimum normalized similarity for a claimed organization to count as
/// found among the employment firms.
const FIRM_MATCH_THRESHOLD: f64 = 0.85;

/// Resolve the claimed CRD against the fetched records.
///
/// A record matches when its `crd_number` equals the claim's. The invalid-CRD
/// flag is raised even when every per-source search merely degraded to "no
/// records found".
pub fn evaluate_search(claim: &Claim, records: &[SourceRecord]) -> SearchEvaluation {
    let mut sources_searched: Vec<String> = Vec::new();
    for record in records {
        let name = record.source.display_name().to_string();
        if !sources_searched.contains(&name) {
            sources_searched.push(name);
        }
    }
    let records_found = records.len();

    let claimed_crd = claim
        .crd_number
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let Some(crd) = claimed_crd else {
        return SearchEvaluation {
            compliance: false,
            compliance_explanation: "No CRD number provided in claim; identity could not be resolved"
                .to_string(),
            source: CRD_VALIDATION_SOURCE.to_string(),
            crd_number: None,
            is_invalid_crd: false,
            sources_searched,
            records_found,
            alerts: Vec::new(),
        };
    };

    let matched = records
        .iter()
        .find(|r| r.crd_number.as_deref().map(str::trim) == Some(crd));

    match matched {
        Some(record) => SearchEvaluation {
            compliance: true,
            compliance_explanation: format!("CRD {} matched a record from {}", crd, record.source),
            source: record.source.display_name().to_string(),
            crd_number: Some(crd.to_string()),
            is_invalid_crd: false,
            sources_searched,
            records_found,
            alerts: Vec::new(),
        },
        None => {
            let description = format!("Claimed CRD {} did not match any fetched record", crd);
            let alert = Alert::new(
                "InvalidCrd",
                CATEGORY_INVALID_CRD,
                AlertSeverity::High,
                CRD_VALIDATION_SOURCE,
                description.clone(),
            )
            .with_metadata_entry("crd_number", json!(crd));

            SearchEvaluation {
                compliance: false,
                compliance_explanation: description,
                source: CRD_VALIDATION_SOURCE.to_string(),
                crd_number: Some(crd.to_string()),
                is_invalid_crd: true,
                sources_searched,
                records_found,
                alerts: vec![alert],
            }
        }
    }
}

/// Compliant iff at least one of the broker / IA scopes is "active".
pub fn evaluate_registration_status(
    record: Option<&SourceRecord>,
    source: DataSource,
) -> StatusEvaluation {
    let source_name = source.display_name();

    let Some(record) = record else {
        return StatusEvaluation {
            compliance: false,
            compliance_explanation: format!("No data available from {}", source_name),
            source: source_name.to_string(),
            bc_scope: None,
            ia_scope: None,
            alerts: Vec::new(),
        };
    };

    let bc_active = record.bc_active();
    let ia_active = record.ia_active();

    if bc_active || ia_active {
        let mut active = Vec::new();
        if bc_active {
            active.push("broker");
        }
        if ia_active {
            active.push("investment-adviser");
        }
        StatusEvaluation {
            compliance: true,
            compliance_explanation: format!("Registration active: {} scope", active.join(" and ")),
            source: source_name.to_string(),
            bc_scope: record.bc_scope.clone(),
            ia_scope: record.ia_scope.clone(),
            alerts: Vec::new(),
        }
    } else {
        let description = format!(
            "No active registration: broker scope '{}', IA scope '{}'",
            record.bc_scope.as_deref().unwrap_or("absent"),
            record.ia_scope.as_deref().unwrap_or("absent")
        );
        let alert = Alert::new(
            "RegistrationInactive",
            CATEGORY_REGISTRATION,
            AlertSeverity::High,
            source_name,
            description.clone(),
        );
        StatusEvaluation {
            compliance: false,
            compliance_explanation: description,
            source: source_name.to_string(),
            bc_scope: record.bc_scope.clone(),
            ia_scope: record.ia_scope.clone(),
            alerts: vec![alert],
        }
    }
}

/// Compliant iff the claimed license type is a subset of the active scopes.
pub fn evaluate_license(
    claim: &Claim,
    record: Option<&SourceRecord>,
    source: DataSource,
) -> LicenseEvaluation {
    let source_name = source.display_name();
    let expected_license = claim.license_type.clone();

    let Some(record) = record else {
        return LicenseEvaluation {
            compliance: false,
            compliance_explanation: format!("No data available from {}", source_name),
            source: source_name.to_string(),
            expected_license,
            actual_scope: LicenseScope::None,
            alerts: Vec::new(),
        };
    };

    let actual = LicenseScope::from_scopes(record.bc_active(), record.ia_active());
    let expected = expected_license
        .as_deref()
        .map(LicenseScope::from_expected)
        .unwrap_or(LicenseScope::None);

    if actual.covers(expected) {
        let compliance_explanation = match expected {
            LicenseScope::None => format!("No license type claimed; active scope is {}", actual),
            _ => format!(
                "Claimed license type {} is covered by active scope {}",
                expected, actual
            ),
        };
        LicenseEvaluation {
            compliance: true,
            compliance_explanation,
            source: source_name.to_string(),
            expected_license,
            actual_scope: actual,
            alerts: Vec::new(),
        }
    } else {
        let description = format!(
            "Claimed license type {} is not covered by active scope {}",
            expected, actual
        );
        let alert = Alert::new(
            "LicenseMismatch",
            CATEGORY_LICENSE,
            AlertSeverity::Medium,
            source_name,
            description.clone(),
        );
        LicenseEvaluation {
            compliance: false,
            compliance_explanation: description,
            source: source_name.to_string(),
            expected_license,
            actual_scope: actual,
            alerts: vec![alert],
        }
    }
}

/// One exam requirement: satisfied when any of the listed series
/// designators appears among the passed exams.
struct SeriesRequirement {
    label: &'static str,
    any_of: &'static [&'static str],
}

const BROKER_EXAMS: &[SeriesRequirement] = &[
    SeriesRequirement { label: "Series 7", any_of: &["7"] },
    SeriesRequirement { label: "Series 63 or 66", any_of: &["63", "66"] },
];

const ADVISER_EXAMS: &[SeriesRequirement] = &[SeriesRequirement {
    label: "Series 65 or 66",
    any_of: &["65", "66"],
}];

fn requirements_for(scope: LicenseScope) -> Vec<&'static SeriesRequirement> {
    match scope {
        LicenseScope::Broker => BROKER_EXAMS.iter().collect(),
        LicenseScope::InvestmentAdviser => ADVISER_EXAMS.iter().collect(),
        LicenseScope::Both => BROKER_EXAMS.iter().chain(ADVISER_EXAMS.iter()).collect(),
        LicenseScope::None => Vec::new(),
    }
}

fn series_regex() -> &'static Regex {
    static SERIES_RE: OnceLock<Regex> = OnceLock::new();
    SERIES_RE.get_or_init(|| {
        Regex::new(r"(?i)\b(?:series|s)\s*-?\s*(\d+[a-z]?)\b").expect("series regex is valid")
    })
}

/// Extract the series designator ("7", "63", "66") from an exam's category
/// or name, tolerating "Series 63", "S63" and "series-63" spellings.
fn exam_series(exam: &crate::records::Exam) -> Option<String> {
    let texts = [Some(exam.category.as_str()), exam.name.as_deref()];
    for text in texts.into_iter().flatten() {
        if let Some(captures) = series_regex().captures(text) {
            if let Some(designator) = captures.get(1) {
                return Some(designator.as_str().to_uppercase());
            }
        }
    }
    None
}

/// Compliant iff every exam required for the derived license scope appears
/// among the passed exams.
pub fn evaluate_exams(record: Option<&SourceRecord>, source: DataSource) -> ExamEvaluation {
    let source_name = source.display_name();

    let Some(record) = record else {
        return ExamEvaluation {
            compliance: false,
            compliance_explanation: format!("No data available from {}", source_name),
            source: source_name.to_string(),
            passed_series: Vec::new(),
            missing_series: Vec::new(),
            alerts: Vec::new(),
        };
    };

    let scope = LicenseScope::from_scopes(record.bc_active(), record.ia_active());
    let passed: BTreeSet<String> = record.exams.iter().filter_map(exam_series).collect();
    let passed_series: Vec<String> = passed.iter().map(|d| format!("Series {}", d)).collect();

    if scope == LicenseScope::None {
        return ExamEvaluation {
            compliance: false,
            compliance_explanation: format!(
                "No active registration scope from {}; exam requirements cannot be derived",
                source_name
            ),
            source: source_name.to_string(),
            passed_series,
            missing_series: Vec::new(),
            alerts: Vec::new(),
        };
    }

    let missing_series: Vec<String> = requirements_for(scope)
        .into_iter()
        .filter(|req| !req.any_of.iter().any(|d| passed.contains(*d)))
        .map(|req| req.label.to_string())
        .collect();

    if missing_series.is_empty() {
        ExamEvaluation {
            compliance: true,
            compliance_explanation: format!("All required exams passed for scope {}", scope),
            source: source_name.to_string(),
            passed_series,
            missing_series,
            alerts: Vec::new(),
        }
    } else {
        let description = format!("Missing required exams: {}", missing_series.join(", "));
        let alert = Alert::new(
            "ExamRequirement",
            CATEGORY_EXAM,
            AlertSeverity::Medium,
            source_name,
            description.clone(),
        )
        .with_metadata_entry("missing", json!(missing_series));
        ExamEvaluation {
            compliance: false,
            compliance_explanation: description,
            source: source_name.to_string(),
            passed_series,
            missing_series,
            alerts: vec![alert],
        }
    }
}

fn firm_matches(claimed: &str, firm: &str) -> bool {
    let a = normalize_name(claimed);
    let b = normalize_name(firm);
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a == b
        || a.contains(&b)
        || b.contains(&a)
        || strsim::normalized_levenshtein(&a, &b) >= FIRM_MATCH_THRESHOLD
}

/// Check employment history for gaps and verify the claimed organization
/// appears among the employment firms. Returns the employments normalized
/// to a common shape, most recent first.
pub fn evaluate_employments(
    claim: &Claim,
    record: Option<&SourceRecord>,
    source: DataSource,
    gap_days: i64,
) -> EmploymentEvaluation {
    let source_name = source.display_name();

    let Some(record) = record else {
        return EmploymentEvaluation {
            compliance: false,
            compliance_explanation: format!("No data available from {}", source_name),
            source: source_name.to_string(),
            employments: Vec::new(),
            gap_count: 0,
            alerts: Vec::new(),
        };
    };

    if record.employments.is_empty() {
        return EmploymentEvaluation {
            compliance: false,
            compliance_explanation: format!(
                "No employment history available from {}",
                source_name
            ),
            source: source_name.to_string(),
            employments: Vec::new(),
            gap_count: 0,
            alerts: Vec::new(),
        };
    }

    let mut employments = record.employments.clone();
    employments.sort_by(|a, b| b.begin_date.cmp(&a.begin_date));

    // Gap detection walks the stints chronologically; stints without dates
    // are skipped rather than treated as gaps.
    let mut chronological: Vec<&Employment> = record
        .employments
        .iter()
        .filter(|e| e.begin_date.is_some())
        .collect();
    chronological.sort_by_key(|e| e.begin_date);

    let mut alerts: Vec<Alert> = Vec::new();
    let mut gap_count = 0;
    for pair in chronological.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        if let (Some(end), Some(begin)) = (prev.end_date, next.begin_date) {
            let days = (begin - end).num_days();
            if days > gap_days {
                gap_count += 1;
                alerts.push(
                    Alert::new(
                        "EmploymentGap",
                        CATEGORY_EMPLOYMENT,
                        AlertSeverity::Medium,
                        source_name,
                        format!(
                            "Employment gap of {} days between {} and {}",
                            days, prev.firm, next.firm
                        ),
                    )
                    .with_metadata_entry("days", json!(days))
                    .with_metadata_entry("from_firm", json!(prev.firm))
                    .with_metadata_entry("to_firm", json!(next.firm)),
                );
            }
        }
    }

    let claimed_org = claim
        .organization_name
        .as_deref()
        .map(str::trim)
        .filter(|o| !o.is_empty());

    let mut org_ok = true;
    let mut org_note = String::new();
    if let Some(org) = claimed_org {
        if employments.iter().any(|e| firm_matches(org, &e.firm)) {
            org_note = format!("; organization '{}' found in employment history", org);
        } else {
            org_ok = false;
            alerts.push(Alert::new(
                "OrganizationMismatch",
                CATEGORY_EMPLOYMENT,
                AlertSeverity::Medium,
                source_name,
                format!("Claimed organization '{}' not found in employment history", org),
            ));
        }
    }

    let compliance = org_ok && gap_count == 0;
    let compliance_explanation = if compliance {
        format!(
            "Employment history verified: {} employment(s), no gaps over {} days{}",
            employments.len(),
            gap_days,
            org_note
        )
    } else {
        let mut reasons = Vec::new();
        if gap_count > 0 {
            reasons.push(format!("{} gap(s) over {} days", gap_count, gap_days));
        }
        if !org_ok {
            reasons.push("claimed organization not found".to_string());
        }
        format!("Employment check failed: {}", reasons.join("; "))
    };

    EmploymentEvaluation {
        compliance,
        compliance_explanation,
        source: source_name.to_string(),
        employments,
        gap_count,
        alerts,
    }
}

fn get_str<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|k| map.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn has_damage_fields(map: &Map<String, Value>) -> bool {
    const DAMAGE_KEYS: &[&str] = &[
        "damageAmountRequested",
        "damage_amount_requested",
        "settlementAmount",
        "settlement_amount",
        "damage_amount",
        "damages",
    ];
    DAMAGE_KEYS
        .iter()
        .any(|k| map.get(*k).is_some_and(|v| !v.is_null()))
}

fn disclosure_severity(disclosure_type: &str, map: &Map<String, Value>) -> AlertSeverity {
    let lower = disclosure_type.to_lowercase();
    if lower.contains("criminal") {
        AlertSeverity::Critical
    } else if lower.contains("regulatory") || lower.contains("civil") {
        AlertSeverity::High
    } else if lower.contains("customer") && has_damage_fields(map) {
        AlertSeverity::High
    } else {
        AlertSeverity::Medium
    }
}

fn disclosure_alert(source: DataSource, entry: &Value) -> Alert {
    let source_name = source.display_name();
    match entry.as_object() {
        None => Alert::new(
            "Disclosure",
            CATEGORY_DISCLOSURE,
            AlertSeverity::Medium,
            source_name,
            "Unstructured disclosure entry on record",
        ),
        Some(map) => {
            let disclosure_type = get_str(map, &["disclosureType", "disclosure_type", "type"])
                .unwrap_or("Disclosure");
            let resolution = get_str(
                map,
                &["disclosureResolution", "disclosure_resolution", "resolution", "status"],
            );
            let description = match resolution {
                Some(resolution) => format!(
                    "{} disclosure on record (resolution: {})",
                    disclosure_type, resolution
                ),
                None => format!("{} disclosure on record", disclosure_type),
            };
            Alert::new(
                disclosure_type,
                CATEGORY_DISCLOSURE,
                disclosure_severity(disclosure_type, map),
                source_name,
                description,
            )
            .with_metadata(map.clone())
        }
    }
}

/// Compliant iff no disclosures exist across the handed identity records.
pub fn evaluate_disclosures(records: &[&SourceRecord]) -> DisclosureReview {
    let source_name = records
        .first()
        .map(|r| r.source.display_name())
        .unwrap_or_else(|| DataSource::FinraBrokerCheck.display_name());

    if records.is_empty() {
        return DisclosureReview {
            compliance: false,
            compliance_explanation: format!("No data available from {}", source_name),
            source: source_name.to_string(),
            disclosure_count: 0,
            alerts: Vec::new(),
        };
    }

    let mut alerts = Vec::new();
    for record in records {
        for entry in &record.disclosures {
            alerts.push(disclosure_alert(record.source, entry));
        }
    }
    let disclosure_count = alerts.len();

    DisclosureReview {
        compliance: disclosure_count == 0,
        compliance_explanation: if disclosure_count == 0 {
            "No disclosures on record".to_string()
        } else {
            format!("{} disclosure(s) on record", disclosure_count)
        },
        source: source_name.to_string(),
        disclosure_count,
        alerts,
    }
}

fn action_alert(
    source: DataSource,
    entry: &Value,
    alert_type: &str,
    category: &str,
    base_severity: AlertSeverity,
    noun: &str,
) -> Alert {
    let source_name = source.display_name();
    match entry.as_object() {
        None => Alert::new(
            alert_type,
            category,
            base_severity,
            source_name,
            format!("Unstructured {} entry on record", noun),
        ),
        Some(map) => {
            let action_type = get_str(map, &["actionType", "action_type", "type"]);
            let severity = if has_damage_fields(map) {
                base_severity.max(AlertSeverity::High)
            } else {
                base_severity
            };
            let description = match action_type {
                Some(action_type) => {
                    format!("{} on record (type: {})", capitalize(noun), action_type)
                }
                None => format!("{} on record", capitalize(noun)),
            };
            Alert::new(alert_type, category, severity, source_name, description)
                .with_metadata(map.clone())
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

struct ActionOutcome {
    compliance: bool,
    compliance_explanation: String,
    source: String,
    action_count: usize,
    alerts: Vec<Alert>,
}

fn evaluate_action_list<'a>(
    records: &[&'a SourceRecord],
    pick: impl Fn(&'a SourceRecord) -> &'a [Value],
    default_source: DataSource,
    alert_type: &str,
    category: &str,
    base_severity: AlertSeverity,
    noun: &str,
) -> ActionOutcome {
    let source_name = records
        .first()
        .map(|r| r.source.display_name())
        .unwrap_or_else(|| default_source.display_name());

    if records.is_empty() {
        return ActionOutcome {
            compliance: false,
            compliance_explanation: format!("No data available from {}", source_name),
            source: source_name.to_string(),
            action_count: 0,
            alerts: Vec::new(),
        };
    }

    let mut alerts = Vec::new();
    for record in records.iter().copied() {
        for entry in pick(record) {
            alerts.push(action_alert(
                record.source,
                entry,
                alert_type,
                category,
                base_severity,
                noun,
            ));
        }
    }
    let action_count = alerts.len();

    ActionOutcome {
        compliance: action_count == 0,
        compliance_explanation: if action_count == 0 {
            format!("No {}s on record", noun)
        } else {
            format!("{} {}(s) on record", action_count, noun)
        },
        source: source_name.to_string(),
        action_count,
        alerts,
    }
}

/// Compliant iff no disciplinary actions exist across the handed records.
pub fn evaluate_disciplinary(records: &[&SourceRecord]) -> DisciplinaryEvaluation {
    let outcome = evaluate_action_list(
        records,
        |r| r.disciplinary_actions.as_slice(),
        DataSource::FinraDisciplinary,
        "DisciplinaryAction",
        CATEGORY_DISCIPLINARY,
        AlertSeverity::High,
        "disciplinary action",
    );
    DisciplinaryEvaluation {
        compliance: outcome.compliance,
        compliance_explanation: outcome.compliance_explanation,
        source: outcome.source,
        action_count: outcome.action_count,
        skipped: false,
        alerts: outcome.alerts,
    }
}

/// Compliant iff no arbitration cases exist across the handed records.
pub fn evaluate_arbitration(records: &[&SourceRecord]) -> ArbitrationReview {
    let outcome = evaluate_action_list(
        records,
        |r| r.arbitration_actions.as_slice(),
        DataSource::FinraArbitration,
        "ArbitrationCase",
        CATEGORY_ARBITRATION,
        AlertSeverity::Medium,
        "arbitration case",
    );
    ArbitrationReview {
        compliance: outcome.compliance,
        compliance_explanation: outcome.compliance_explanation,
        source: outcome.source,
        action_count: outcome.action_count,
        skipped: false,
        alerts: outcome.alerts,
    }
}

/// Compliant iff no regulatory actions exist across the handed records.
pub fn evaluate_regulatory(records: &[&SourceRecord]) -> RegulatoryEvaluation {
    let outcome = evaluate_action_list(
        records,
        |r| r.regulatory_actions.as_slice(),
        DataSource::NfaRegulatory,
        "RegulatoryAction",
        CATEGORY_REGULATORY,
        AlertSeverity::High,
        "regulatory action",
    );
    RegulatoryEvaluation {
        compliance: outcome.compliance,
        compliance_explanation: outcome.compliance_explanation,
        source: outcome.source,
        action_count: outcome.action_count,
        skipped: false,
        alerts: outcome.alerts,
    }
}
