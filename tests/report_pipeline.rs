//! Full evaluation pipeline: report shape, aggregation and idempotence.

use crd_verify::{
    Claim, DataSource, EngineConfig, EvaluationReportDirector, Exam, ReportSummary, SourceRecord,
};
use serde_json::{json, Value};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("crd_verify=debug")
        .with_test_writer()
        .try_init();
}

fn claim() -> Claim {
    Claim {
        reference_id: "EMP-001".to_string(),
        first_name: "Douglas".to_string(),
        last_name: "Couden".to_string(),
        crd_number: Some("12345".to_string()),
        license_type: Some("B".to_string()),
        organization_name: Some("Alpha Securities".to_string()),
        ..Claim::default()
    }
}

fn full_record_set() -> Vec<SourceRecord> {
    let mut brokercheck = SourceRecord::new(DataSource::FinraBrokerCheck);
    brokercheck.crd_number = Some("12345".to_string());
    brokercheck.fetched_name = Some("DOUG SCOTT COUDEN".to_string());
    brokercheck.bc_scope = Some("Active".to_string());
    brokercheck.exams = vec![
        Exam { category: "Series 7".to_string(), ..Exam::default() },
        Exam { category: "Series 63".to_string(), ..Exam::default() },
    ];
    brokercheck.employments = vec![crd_verify::Employment {
        firm: "Alpha Securities LLC".to_string(),
        begin_date: chrono::NaiveDate::from_ymd_opt(2018, 3, 1),
        end_date: None,
        status: Some("Current".to_string()),
    }];

    vec![
        brokercheck,
        SourceRecord::new(DataSource::FinraDisciplinary),
        SourceRecord::new(DataSource::SecDisciplinary),
        SourceRecord::new(DataSource::FinraArbitration),
        SourceRecord::new(DataSource::NfaRegulatory),
    ]
}

/// Every object in the report tree uses the canonical explanation key.
fn assert_no_legacy_explanation_key(value: &Value) {
    match value {
        Value::Object(map) => {
            assert!(
                !map.contains_key("explanation"),
                "found legacy 'explanation' key in {:?}",
                map.keys().collect::<Vec<_>>()
            );
            for nested in map.values() {
                assert_no_legacy_explanation_key(nested);
            }
        }
        Value::Array(items) => {
            for item in items {
                assert_no_legacy_explanation_key(item);
            }
        }
        _ => {}
    }
}

const SECTION_KEYS: [&str; 11] = [
    "search_evaluation",
    "status_evaluation",
    "name_evaluation",
    "license_evaluation",
    "exam_evaluation",
    "employment_evaluation",
    "disclosure_review",
    "disciplinary_evaluation",
    "arbitration_review",
    "regulatory_evaluation",
    "final_evaluation",
];

#[test]
fn report_has_constant_section_shape() {
    init_tracing();
    let director = EvaluationReportDirector::new(EngineConfig::default());
    let report = director.evaluate_claim(&claim(), &full_record_set()).unwrap();
    let value = report.to_json_value().unwrap();

    for key in SECTION_KEYS {
        let section = value
            .get(key)
            .unwrap_or_else(|| panic!("section {} missing from report", key));
        assert!(section["compliance"].is_boolean(), "{} lacks compliance", key);
        assert!(
            section["compliance_explanation"].is_string(),
            "{} lacks compliance_explanation",
            key
        );
    }

    // final_evaluation is derived, not sourced
    assert!(value["final_evaluation"].get("source").is_none());
    assert_no_legacy_explanation_key(&value);
}

#[test]
fn shape_is_constant_even_with_no_records() {
    init_tracing();
    let director = EvaluationReportDirector::new(EngineConfig::default());
    let report = director.evaluate_claim(&claim(), &[]).unwrap();
    let value = report.to_json_value().unwrap();

    for key in SECTION_KEYS {
        assert!(value.get(key).is_some(), "section {} missing", key);
    }
    assert!(!report.final_evaluation.overall_compliance);
    assert_no_legacy_explanation_key(&value);
}

#[test]
fn fully_compliant_claim() {
    init_tracing();
    let director = EvaluationReportDirector::new(EngineConfig::default());
    let report = director.evaluate_claim(&claim(), &full_record_set()).unwrap();

    assert!(report.final_evaluation.overall_compliance, "{:#?}", report.final_evaluation);
    assert_eq!(report.final_evaluation.overall_risk_level, None);
    assert!(report.final_evaluation.alerts.is_empty());
    assert!(report
        .final_evaluation
        .recommendations
        .contains("No immediate action"));
}

#[test]
fn any_non_compliant_section_fails_overall() {
    init_tracing();
    let mut records = full_record_set();
    records[0].bc_scope = Some("Inactive".to_string());

    let director = EvaluationReportDirector::new(EngineConfig::default());
    let report = director.evaluate_claim(&claim(), &records).unwrap();

    assert!(!report.status_evaluation.compliance);
    assert!(!report.final_evaluation.overall_compliance);
    assert!(report
        .final_evaluation
        .compliance_explanation
        .contains("status_evaluation"));
    assert!(report.final_evaluation.overall_risk_level.is_some());
}

#[test]
fn invalid_crd_scenario() {
    init_tracing();
    let mut bad_claim = claim();
    bad_claim.crd_number = Some("111".to_string());

    let director = EvaluationReportDirector::new(EngineConfig::default());
    let report = director.evaluate_claim(&bad_claim, &[]).unwrap();

    assert!(report.search_evaluation.is_invalid_crd);
    assert_eq!(report.search_evaluation.source, "CRD_Validation");
    assert!(!report.search_evaluation.compliance);
}

#[test]
fn skipped_sections_recorded_not_omitted() {
    init_tracing();
    let config = EngineConfig {
        skip_disciplinary: true,
        skip_arbitration: true,
        skip_regulatory: true,
        ..EngineConfig::default()
    };
    let director = EvaluationReportDirector::new(config);
    let report = director.evaluate_claim(&claim(), &full_record_set()).unwrap();

    for section in [
        (&report.disciplinary_evaluation.compliance, &report.disciplinary_evaluation.compliance_explanation),
        (&report.arbitration_review.compliance, &report.arbitration_review.compliance_explanation),
        (&report.regulatory_evaluation.compliance, &report.regulatory_evaluation.compliance_explanation),
    ] {
        assert!(*section.0);
        assert_eq!(section.1, "Skipped by configuration");
    }

    let summary = ReportSummary::from_report(&report);
    assert_eq!(summary.sections_skipped, 3);
    assert_eq!(summary.sections_total, 11);
}

#[test]
fn disclosures_drive_risk_level() {
    init_tracing();
    let mut records = full_record_set();
    records[0].disclosures = vec![
        json!({"disclosureType": "Customer Dispute", "resolution": "Settled"}),
        json!({"disclosureType": "Criminal"}),
    ];

    let director = EvaluationReportDirector::new(EngineConfig::default());
    let report = director.evaluate_claim(&claim(), &records).unwrap();

    assert!(!report.disclosure_review.compliance);
    assert_eq!(report.disclosure_review.disclosure_count, 2);
    assert_eq!(
        report.final_evaluation.overall_risk_level,
        Some(crd_verify::AlertSeverity::Critical)
    );
    assert!(report
        .final_evaluation
        .recommendations
        .contains("Immediate escalation"));
    // alerts keep their originating source in the final union
    assert!(report
        .final_evaluation
        .alerts
        .iter()
        .all(|a| a.source == "FINRA_BrokerCheck"));
}

#[test]
fn evaluation_is_idempotent() {
    init_tracing();
    let director = EvaluationReportDirector::new(EngineConfig::default());
    let records = full_record_set();

    let first = director.evaluate_claim(&claim(), &records).unwrap();
    let second = director.evaluate_claim(&claim(), &records).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
}

#[test]
fn summary_counts_sections_and_alerts() {
    init_tracing();
    let mut records = full_record_set();
    records[0].disclosures = vec![json!({"disclosureType": "Customer Dispute"})];

    let director = EvaluationReportDirector::new(EngineConfig::default());
    let report = director.evaluate_claim(&claim(), &records).unwrap();
    let summary = ReportSummary::from_report(&report);

    assert_eq!(summary.sections_total, 11);
    assert_eq!(
        summary.sections_compliant + summary.sections_non_compliant,
        11
    );
    assert_eq!(summary.alerts_total, 1);
    assert_eq!(summary.alerts_by_severity.get("MEDIUM"), Some(&1));
    assert!(!summary.overall_compliance);
}

#[test]
fn report_round_trips_through_json() {
    init_tracing();
    let director = EvaluationReportDirector::new(EngineConfig::default());
    let report = director.evaluate_claim(&claim(), &full_record_set()).unwrap();

    let json = report.to_json().unwrap();
    let back: crd_verify::EvaluationReport = serde_json::from_str(&json).unwrap();
    assert_eq!(report, back);
}
